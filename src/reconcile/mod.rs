pub mod assets;
pub mod relations;
pub mod shape;
pub mod walker;

pub mod clipboard;
pub mod entry_host;
pub mod host;
pub mod orchestrator;
pub mod status;

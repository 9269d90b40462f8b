use async_trait::async_trait;
use serde_json::Value;

use crate::core::{
    errors::AppResult,
    types::{FileInfo, PageRecord},
};

pub mod strapi;

/// Lists the pages of one environment for relation matching.
#[async_trait(?Send)]
pub trait PageDirectory {
    async fn fetch_pages(&self, locale: Option<&str>) -> AppResult<Vec<PageRecord>>;
}

/// Media library of the destination environment plus access to source binaries.
#[async_trait(?Send)]
pub trait AssetBackend {
    async fn list_assets(&self) -> AppResult<Vec<Value>>;
    async fn download(&self, url: &str) -> AppResult<Vec<u8>>;
    /// Returns the first record the upload endpoint reports as created.
    async fn upload(&self, bytes: Vec<u8>, info: &FileInfo) -> AppResult<Value>;
}

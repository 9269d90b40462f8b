use serde_json::Value;
use tracing::{debug, info, warn};

use crate::core::{
    errors::{AppError, AppResult},
    types::{format_path, FileInfo, PathSegment},
};
use crate::providers::AssetBackend;

/// Attributes that must all be equal for a destination asset to stand in for
/// a source one. Reported size can differ between upload providers, in which
/// case the asset is uploaded again.
pub const MATCH_ATTRIBUTES: [&str; 9] = [
    "name",
    "alternativeText",
    "caption",
    "width",
    "height",
    "ext",
    "mime",
    "size",
    "folder",
];

pub fn is_identical_asset(existing: &Value, node: &Value) -> bool {
    if !existing.is_object() || !node.is_object() {
        return false;
    }
    MATCH_ATTRIBUTES
        .iter()
        .all(|attribute| same_attribute(existing.get(*attribute), node.get(*attribute)))
}

/// Numbers compare by value so `640` and `640.0` are the same width.
fn same_attribute(left: Option<&Value>, right: Option<&Value>) -> bool {
    match (left, right) {
        (Some(Value::Number(left)), Some(Value::Number(right))) => left.as_f64() == right.as_f64(),
        _ => left == right,
    }
}

pub fn find_identical_asset<'i>(inventory: &'i [Value], node: &Value) -> Option<&'i Value> {
    inventory
        .iter()
        .find(|existing| is_identical_asset(existing, node))
}

pub struct AssetResolver<'a> {
    backend: &'a dyn AssetBackend,
    /// `None` when reuse is disabled or the inventory could not be loaded.
    inventory: Option<&'a [Value]>,
}

impl<'a> AssetResolver<'a> {
    pub fn new(backend: &'a dyn AssetBackend, inventory: Option<&'a [Value]>) -> Self {
        Self { backend, inventory }
    }

    pub async fn resolve_asset(&self, node: &Value, path: &[PathSegment]) -> Value {
        match node {
            Value::Null => Value::Null,
            Value::Object(_) => self.resolve_media(node, path).await,
            other => {
                warn!(path = %format_path(path), value = %other, "unhandled file reference, kept as is");
                other.clone()
            }
        }
    }

    async fn resolve_media(&self, node: &Value, path: &[PathSegment]) -> Value {
        if let Some(existing) = self
            .inventory
            .and_then(|inventory| find_identical_asset(inventory, node))
        {
            info!(
                path = %format_path(path),
                asset = existing.get("name").and_then(|name| name.as_str()).unwrap_or(""),
                "found existing asset"
            );
            return existing.clone();
        }

        match self.reupload(node, path).await {
            Ok(created) => created,
            Err(err) => {
                warn!(
                    path = %format_path(path),
                    code = err.code(),
                    error = %err,
                    "file import failed, reference cleared"
                );
                Value::Null
            }
        }
    }

    async fn reupload(&self, node: &Value, path: &[PathSegment]) -> AppResult<Value> {
        let url = node
            .get("url")
            .and_then(Value::as_str)
            .ok_or_else(|| AppError::AssetFetch("media node has no url".to_string()))?;
        debug!(path = %format_path(path), url, "fetching file");
        let bytes = self.backend.download(url).await?;

        let info = FileInfo {
            name: node.get("name").cloned().unwrap_or(Value::Null),
            caption: node.get("caption").cloned().unwrap_or(Value::Null),
            alternative_text: node.get("alternativeText").cloned().unwrap_or(Value::Null),
            folder: None,
        };
        debug!(path = %format_path(path), size = bytes.len(), "uploading file");
        let created = self.backend.upload(bytes, &info).await?;
        info!(
            path = %format_path(path),
            asset = created.get("name").and_then(|name| name.as_str()).unwrap_or(""),
            "file import successful"
        );
        Ok(created)
    }
}

use async_trait::async_trait;
use serde_json::Value;

use crate::core::errors::AppResult;

/// The editor whose form state is exported from and imported into.
#[async_trait(?Send)]
pub trait FormHost {
    /// Current entry data as last loaded by the editor.
    async fn snapshot(&self) -> AppResult<Value>;
    /// Field paths the current user may update, e.g. `seo.metaTitle`.
    async fn updatable_fields(&self) -> AppResult<Vec<String>>;
    async fn write_field(&self, name: &str, value: Value) -> AppResult<()>;
    async fn trigger_validation(&self) -> AppResult<()>;
    async fn publish(&self) -> AppResult<()> {
        Ok(())
    }
}

#[async_trait(?Send)]
pub trait Clipboard {
    /// Fails with `ClipboardUnavailable` when access is denied.
    async fn read_text(&self) -> AppResult<String>;
    async fn write_text(&self, text: &str) -> AppResult<()>;
}

/// Top-level keys that may be written, from the host's field paths.
pub fn updatable_top_level_keys(fields: &[String]) -> Vec<String> {
    let mut keys: Vec<String> = vec![];
    for field in fields {
        let top = field.split('.').next().unwrap_or_default();
        if !top.is_empty() && !keys.iter().any(|known| known == top) {
            keys.push(top.to_string());
        }
    }
    keys
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_only_first_segment_once() {
        let fields = vec![
            "title".to_string(),
            "seo.metaTitle".to_string(),
            "seo.metaImage".to_string(),
            "blocks".to_string(),
        ];
        assert_eq!(updatable_top_level_keys(&fields), vec!["title", "seo", "blocks"]);
    }
}

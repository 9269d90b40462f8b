use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{Map, Value};
use tracing::{info, warn};

use crate::core::{
    errors::{AppError, AppResult},
    types::{child_path, format_path, FieldPath, PathSegment},
};
use crate::providers::strapi::StrapiClient;
use crate::reconcile::relations::is_unresolved_sentinel;
use crate::workflow::host::FormHost;

/// Keys the content manager manages itself and never accepts on update.
const SYSTEM_FIELDS: &[&str] = &[
    "id",
    "createdAt",
    "updatedAt",
    "publishedAt",
    "createdBy",
    "updatedBy",
    "locale",
    "localizations",
];

/// `FormHost` over one content-manager entry. Field writes are staged and
/// sent in a single update by [`EntryHost::save`].
pub struct EntryHost<'c> {
    client: &'c StrapiClient,
    uid: String,
    id: String,
    allowed_fields: Option<Vec<String>>,
    loaded: Mutex<Option<Value>>,
    staged: Mutex<Map<String, Value>>,
}

impl<'c> EntryHost<'c> {
    pub fn new(client: &'c StrapiClient, uid: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            client,
            uid: uid.into(),
            id: id.into(),
            allowed_fields: None,
            loaded: Mutex::new(None),
            staged: Mutex::new(Map::new()),
        }
    }

    pub fn with_allowed_fields(mut self, fields: Vec<String>) -> Self {
        if !fields.is_empty() {
            self.allowed_fields = Some(fields);
        }
        self
    }

    fn staged(&self) -> AppResult<std::sync::MutexGuard<'_, Map<String, Value>>> {
        self.staged
            .lock()
            .map_err(|_| AppError::Internal("staged fields lock poisoned".to_string()))
    }

    /// Paths of staged links still carrying the unresolved page placeholder.
    pub fn validation_issues(&self) -> AppResult<Vec<String>> {
        let staged = self.staged()?;
        let mut issues = vec![];
        for (key, value) in staged.iter() {
            collect_sentinels(value, vec![PathSegment::Key(key.clone())], &mut issues);
        }
        Ok(issues)
    }

    pub async fn save(&self) -> AppResult<Value> {
        let body = Value::Object(self.staged()?.clone());
        let saved = self.client.update_entry(&self.uid, &self.id, &body).await?;
        info!(uid = %self.uid, id = %self.id, "entry saved");
        if let Ok(mut loaded) = self.loaded.lock() {
            *loaded = Some(saved.clone());
        }
        Ok(saved)
    }
}

fn collect_sentinels(value: &Value, path: FieldPath, issues: &mut Vec<String>) {
    match value {
        Value::Array(items) => {
            for (index, item) in items.iter().enumerate() {
                collect_sentinels(item, child_path(&path, PathSegment::Index(index)), issues);
            }
        }
        Value::Object(node) => {
            if node
                .get("page")
                .and_then(|page| page.get("id"))
                .map(is_unresolved_sentinel)
                .unwrap_or(false)
            {
                issues.push(format_path(&path));
            }
            for (key, child) in node {
                collect_sentinels(child, child_path(&path, PathSegment::Key(key.clone())), issues);
            }
        }
        _ => {}
    }
}

#[async_trait(?Send)]
impl<'c> FormHost for EntryHost<'c> {
    async fn snapshot(&self) -> AppResult<Value> {
        if let Some(cached) = self.loaded.lock().ok().and_then(|guard| guard.clone()) {
            return Ok(cached);
        }
        let entry = self.client.get_entry(&self.uid, &self.id).await?;
        if let Ok(mut loaded) = self.loaded.lock() {
            *loaded = Some(entry.clone());
        }
        Ok(entry)
    }

    async fn updatable_fields(&self) -> AppResult<Vec<String>> {
        if let Some(fields) = &self.allowed_fields {
            return Ok(fields.clone());
        }
        let entry = self.snapshot().await?;
        let fields: Vec<String> = entry
            .as_object()
            .map(|node| {
                node.keys()
                    .filter(|key| !SYSTEM_FIELDS.contains(&key.as_str()))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        Ok(fields)
    }

    async fn write_field(&self, name: &str, value: Value) -> AppResult<()> {
        if name.trim().is_empty() {
            return Err(AppError::HostWrite("field name cannot be empty".to_string()));
        }
        self.staged()?.insert(name.to_string(), value);
        Ok(())
    }

    async fn trigger_validation(&self) -> AppResult<()> {
        let issues = self.validation_issues()?;
        for path in &issues {
            warn!(path = %path, "page relation must be selected manually");
        }
        Ok(())
    }

    async fn publish(&self) -> AppResult<()> {
        self.client.publish_entry(&self.uid, &self.id).await?;
        info!(uid = %self.uid, id = %self.id, "entry published");
        Ok(())
    }
}

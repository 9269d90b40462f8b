#![allow(dead_code)]

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
    time::Duration,
};

use async_trait::async_trait;
use formport_lib::{
    core::{
        errors::{AppError, AppResult},
        types::{FileInfo, PageRecord},
    },
    providers::{AssetBackend, PageDirectory},
    workflow::host::{Clipboard, FormHost},
};
use serde_json::{json, Value};
use tokio::sync::Notify;

#[derive(Default)]
pub struct FakeHost {
    pub entry: Value,
    pub fields: Vec<String>,
    pub failing_fields: Vec<String>,
    pub writes: Mutex<Vec<(String, Value)>>,
    pub validations: Mutex<usize>,
    pub published: Mutex<bool>,
}

impl FakeHost {
    pub fn new(entry: Value, fields: &[&str]) -> Self {
        Self {
            entry,
            fields: fields.iter().map(ToString::to_string).collect(),
            ..Self::default()
        }
    }

    pub fn written(&self) -> Vec<(String, Value)> {
        self.writes.lock().expect("writes lock").clone()
    }

    pub fn written_field(&self, name: &str) -> Option<Value> {
        self.written()
            .into_iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value)
    }
}

#[async_trait(?Send)]
impl FormHost for FakeHost {
    async fn snapshot(&self) -> AppResult<Value> {
        Ok(self.entry.clone())
    }

    async fn updatable_fields(&self) -> AppResult<Vec<String>> {
        Ok(self.fields.clone())
    }

    async fn write_field(&self, name: &str, value: Value) -> AppResult<()> {
        if self.failing_fields.iter().any(|field| field == name) {
            return Err(AppError::HostWrite(format!("{name} is locked")));
        }
        self.writes
            .lock()
            .expect("writes lock")
            .push((name.to_string(), value));
        Ok(())
    }

    async fn trigger_validation(&self) -> AppResult<()> {
        *self.validations.lock().expect("validations lock") += 1;
        Ok(())
    }

    async fn publish(&self) -> AppResult<()> {
        *self.published.lock().expect("published lock") = true;
        Ok(())
    }
}

#[derive(Default)]
pub struct FakePages {
    pub by_locale: HashMap<String, Vec<PageRecord>>,
    pub fail: bool,
    pub gate: Option<Arc<Notify>>,
    pub calls: Mutex<Vec<Option<String>>>,
}

impl FakePages {
    pub fn with_locale(locale: &str, pages: Vec<PageRecord>) -> Self {
        let mut by_locale = HashMap::new();
        by_locale.insert(locale.to_string(), pages);
        Self {
            by_locale,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<Option<String>> {
        self.calls.lock().expect("calls lock").clone()
    }
}

#[async_trait(?Send)]
impl PageDirectory for FakePages {
    async fn fetch_pages(&self, locale: Option<&str>) -> AppResult<Vec<PageRecord>> {
        self.calls
            .lock()
            .expect("calls lock")
            .push(locale.map(ToString::to_string));
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        if self.fail {
            return Err(AppError::Network("pages unavailable".to_string()));
        }
        Ok(self
            .by_locale
            .get(locale.unwrap_or_default())
            .cloned()
            .unwrap_or_default())
    }
}

#[derive(Default)]
pub struct FakeAssets {
    pub inventory: Vec<Value>,
    pub inventory_fails: bool,
    pub broken_urls: Vec<String>,
    /// Downloads of these urls never complete.
    pub hung_urls: Vec<String>,
    pub download_delays_ms: HashMap<String, u64>,
    pub downloads: Mutex<Vec<String>>,
    pub uploads: Mutex<Vec<FileInfo>>,
}

impl FakeAssets {
    pub fn with_inventory(inventory: Vec<Value>) -> Self {
        Self {
            inventory,
            ..Self::default()
        }
    }

    pub fn downloads(&self) -> Vec<String> {
        self.downloads.lock().expect("downloads lock").clone()
    }

    pub fn uploads(&self) -> Vec<FileInfo> {
        self.uploads.lock().expect("uploads lock").clone()
    }
}

#[async_trait(?Send)]
impl AssetBackend for FakeAssets {
    async fn list_assets(&self) -> AppResult<Vec<Value>> {
        if self.inventory_fails {
            return Err(AppError::ProviderAuth);
        }
        Ok(self.inventory.clone())
    }

    async fn download(&self, url: &str) -> AppResult<Vec<u8>> {
        if self.hung_urls.iter().any(|hung| hung == url) {
            std::future::pending::<()>().await;
        }
        if let Some(delay) = self.download_delays_ms.get(url) {
            tokio::time::sleep(Duration::from_millis(*delay)).await;
        }
        self.downloads
            .lock()
            .expect("downloads lock")
            .push(url.to_string());
        if self.broken_urls.iter().any(|broken| broken == url) {
            return Err(AppError::AssetFetch(format!("{url} answered 404 Not Found")));
        }
        Ok(url.as_bytes().to_vec())
    }

    async fn upload(&self, _bytes: Vec<u8>, info: &FileInfo) -> AppResult<Value> {
        let mut uploads = self.uploads.lock().expect("uploads lock");
        uploads.push(info.clone());
        Ok(json!({
            "id": 1000 + uploads.len(),
            "name": info.name,
            "alternativeText": info.alternative_text,
            "caption": info.caption,
            "url": format!("/uploads/new_{}", uploads.len()),
        }))
    }
}

/// Clipboard that denies every write.
#[derive(Default)]
pub struct ReadOnlyClipboard;

#[async_trait(?Send)]
impl Clipboard for ReadOnlyClipboard {
    async fn read_text(&self) -> AppResult<String> {
        Err(AppError::ClipboardUnavailable("clipboard is read only".to_string()))
    }

    async fn write_text(&self, _text: &str) -> AppResult<()> {
        Err(AppError::ClipboardUnavailable("write permission denied".to_string()))
    }
}

pub fn media(id: i64, name: &str, url: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "alternativeText": format!("{name} alt"),
        "caption": null,
        "width": 640,
        "height": 480,
        "ext": ".png",
        "mime": "image/png",
        "size": 12.5,
        "folder": null,
        "url": url,
        "related": [],
        "updatedBy": null
    })
}

pub fn page(id: i64, title: &str, seo_title: &str) -> PageRecord {
    serde_json::from_value(json!({
        "id": id,
        "title": title,
        "seo": { "title": seo_title },
        "vuid": format!("vuid-{id}"),
        "versionNumber": 1,
        "isVisibleInListView": true,
        "createdAt": "2023-03-01T10:00:00.000Z",
        "updatedAt": "2023-03-02T10:00:00.000Z",
        "publishedAt": "2023-03-02T10:00:00.000Z"
    }))
    .expect("page record")
}

pub fn link(id: i64, page_id: Option<i64>) -> Value {
    json!({
        "id": id,
        "label": "Read more",
        "url": null,
        "target": "_self",
        "page": page_id.map(|page_id| json!({ "id": page_id, "title": "stale" })),
        "icon": null
    })
}

use async_trait::async_trait;
use reqwest::{multipart, StatusCode, Url};
use serde_json::Value;
use tracing::{debug, info};

use crate::core::{
    config::{PortConfig, INVENTORY_PAGE_SIZE},
    errors::{AppError, AppResult},
    types::{FileInfo, PageRecord},
};
use crate::providers::{AssetBackend, PageDirectory};

/// Admin API client for one Strapi environment.
#[derive(Debug, Clone)]
pub struct StrapiClient {
    http: reqwest::Client,
    config: PortConfig,
    token: String,
}

impl StrapiClient {
    pub fn new(config: PortConfig, token: impl Into<String>) -> AppResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|err| AppError::Network(err.to_string()))?;
        Ok(Self {
            http,
            config,
            token: token.into(),
        })
    }

    fn entry_path(uid: &str, id: &str) -> String {
        format!("content-manager/collection-types/{uid}/{id}")
    }

    pub async fn get_entry(&self, uid: &str, id: &str) -> AppResult<Value> {
        let endpoint = self.config.endpoint(&Self::entry_path(uid, id))?;
        let response = self
            .http
            .get(endpoint)
            .bearer_auth(&self.token)
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(AppError::NotFound(format!("entry {uid}/{id}")));
        }
        let response = check_status(response).await?;
        response
            .json()
            .await
            .map_err(|err| AppError::ProviderInvalidResponse(err.to_string()))
    }

    pub async fn update_entry(&self, uid: &str, id: &str, body: &Value) -> AppResult<Value> {
        let endpoint = self.config.endpoint(&Self::entry_path(uid, id))?;
        let response = self
            .http
            .put(endpoint)
            .bearer_auth(&self.token)
            .json(body)
            .send()
            .await?;
        let response = check_status(response).await?;
        response
            .json()
            .await
            .map_err(|err| AppError::ProviderInvalidResponse(err.to_string()))
    }

    pub async fn publish_entry(&self, uid: &str, id: &str) -> AppResult<()> {
        let endpoint = self
            .config
            .endpoint(&format!("{}/actions/publish", Self::entry_path(uid, id)))?;
        let response = self
            .http
            .post(endpoint)
            .bearer_auth(&self.token)
            .send()
            .await?;
        check_status(response).await?;
        Ok(())
    }

    fn resolve_asset_url(&self, raw: &str) -> AppResult<Url> {
        if let Ok(absolute) = Url::parse(raw) {
            return Ok(absolute);
        }
        let origin = self.config.source_origin.as_ref().ok_or_else(|| {
            AppError::AssetFetch(format!("relative asset url {raw} and no source origin configured"))
        })?;
        origin
            .join(raw.trim_start_matches('/'))
            .map_err(|err| AppError::AssetFetch(format!("bad asset url {raw}: {err}")))
    }
}

#[async_trait(?Send)]
impl PageDirectory for StrapiClient {
    async fn fetch_pages(&self, locale: Option<&str>) -> AppResult<Vec<PageRecord>> {
        let mut endpoint = self
            .config
            .endpoint(&format!("content-manager/collection-types/{}", self.config.page_uid))?;
        {
            let mut query = endpoint.query_pairs_mut();
            query
                .append_pair("page", "1")
                .append_pair("pageSize", &INVENTORY_PAGE_SIZE.to_string());
            if let Some(locale) = locale.filter(|locale| !locale.is_empty()) {
                query.append_pair("locale", locale);
            }
        }
        debug!(%endpoint, "fetching pages");
        let response = self
            .http
            .get(endpoint)
            .bearer_auth(&self.token)
            .send()
            .await?;
        let response = check_status(response).await?;
        let body: Value = response
            .json()
            .await
            .map_err(|err| AppError::ProviderInvalidResponse(err.to_string()))?;
        let pages = parse_page_list(body)?;
        info!(count = pages.len(), locale = locale.unwrap_or(""), "found pages");
        Ok(pages)
    }
}

#[async_trait(?Send)]
impl AssetBackend for StrapiClient {
    async fn list_assets(&self) -> AppResult<Vec<Value>> {
        let mut endpoint = self.config.endpoint("upload/files")?;
        endpoint
            .query_pairs_mut()
            .append_pair("page", "1")
            .append_pair("pageSize", &INVENTORY_PAGE_SIZE.to_string());
        let response = self
            .http
            .get(endpoint)
            .bearer_auth(&self.token)
            .send()
            .await?;
        let response = check_status(response).await?;
        let body: Value = response
            .json()
            .await
            .map_err(|err| AppError::ProviderInvalidResponse(err.to_string()))?;
        results_of(body)
    }

    async fn download(&self, url: &str) -> AppResult<Vec<u8>> {
        let target = self.resolve_asset_url(url)?;
        let response = self
            .http
            .get(target)
            .send()
            .await
            .map_err(|err| AppError::AssetFetch(err.to_string()))?;
        if !response.status().is_success() {
            return Err(AppError::AssetFetch(format!(
                "{url} answered {}",
                response.status()
            )));
        }
        let bytes = response
            .bytes()
            .await
            .map_err(|err| AppError::AssetFetch(err.to_string()))?;
        Ok(bytes.to_vec())
    }

    async fn upload(&self, bytes: Vec<u8>, info: &FileInfo) -> AppResult<Value> {
        let endpoint = self.config.endpoint("upload")?;
        let file_name = info.name.as_str().unwrap_or("asset").to_string();
        let file_info = serde_json::to_string(info)
            .map_err(|err| AppError::Internal(err.to_string()))?;
        let form = multipart::Form::new()
            .part("files", multipart::Part::bytes(bytes).file_name(file_name))
            .text("fileInfo", file_info);
        let response = self
            .http
            .post(endpoint)
            .bearer_auth(&self.token)
            .multipart(form)
            .send()
            .await
            .map_err(|err| AppError::AssetUpload(err.to_string()))?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::AssetUpload(format!("status {status} body {body}")));
        }
        let body: Value = response
            .json()
            .await
            .map_err(|err| AppError::AssetUpload(err.to_string()))?;
        body.as_array()
            .and_then(|records| records.first())
            .cloned()
            .ok_or_else(|| AppError::AssetUpload("upload returned no record".to_string()))
    }
}

async fn check_status(response: reqwest::Response) -> AppResult<reqwest::Response> {
    match response.status() {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(AppError::ProviderAuth),
        status if !status.is_success() => {
            let body = response.text().await.unwrap_or_default();
            Err(AppError::ProviderInvalidResponse(format!(
                "status {status} body {body}"
            )))
        }
        _ => Ok(response),
    }
}

/// List endpoints answer either `{ results: [...] }` or a bare array.
pub fn results_of(body: Value) -> AppResult<Vec<Value>> {
    match body {
        Value::Array(items) => Ok(items),
        Value::Object(mut map) => match map.remove("results") {
            Some(Value::Array(items)) => Ok(items),
            _ => Err(AppError::ProviderInvalidResponse(
                "missing results array".to_string(),
            )),
        },
        _ => Err(AppError::ProviderInvalidResponse(
            "expected a list response".to_string(),
        )),
    }
}

pub fn parse_page_list(body: Value) -> AppResult<Vec<PageRecord>> {
    results_of(body)?
        .into_iter()
        .map(|item| {
            serde_json::from_value::<PageRecord>(item)
                .map_err(|err| AppError::ProviderInvalidResponse(format!("page record: {err}")))
        })
        .collect()
}

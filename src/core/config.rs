use std::path::PathBuf;
use std::time::Duration;

use reqwest::Url;

use crate::core::errors::{AppError, AppResult};

pub const DEFAULT_PAGE_UID: &str = "api::page.page";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_STATUS_TIMEOUT_MS: u64 = 8000;
/// Large enough that one request lists the whole inventory.
pub const INVENTORY_PAGE_SIZE: u32 = 10_000;

#[derive(Debug, Clone)]
pub struct PortConfig {
    pub base_url: Url,
    pub source_origin: Option<Url>,
    pub page_uid: String,
    pub request_timeout: Duration,
    pub status_timeout: Duration,
    pub data_dir: PathBuf,
}

impl PortConfig {
    pub fn new(base_url: &str) -> AppResult<Self> {
        Ok(Self {
            base_url: parse_origin(base_url)?,
            source_origin: None,
            page_uid: DEFAULT_PAGE_UID.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            status_timeout: Duration::from_millis(DEFAULT_STATUS_TIMEOUT_MS),
            data_dir: default_data_dir(None)?,
        })
    }

    /// Applies the optional `FORMPORT_*` variables on top of `self`.
    pub fn with_env_overrides(mut self) -> AppResult<Self> {
        if let Ok(origin) = std::env::var("FORMPORT_SOURCE_ORIGIN") {
            self.source_origin = Some(parse_origin(&origin)?);
        }
        if let Ok(uid) = std::env::var("FORMPORT_PAGE_UID") {
            if !uid.trim().is_empty() {
                self.page_uid = uid.trim().to_string();
            }
        }
        if let Some(secs) = env_u64("FORMPORT_TIMEOUT_SECS")? {
            self.request_timeout = Duration::from_secs(secs.max(1));
        }
        if let Some(millis) = env_u64("FORMPORT_STATUS_TIMEOUT_MS")? {
            self.status_timeout = Duration::from_millis(millis);
        }
        if let Ok(dir) = std::env::var("FORMPORT_DATA_DIR") {
            self.data_dir = default_data_dir(Some(PathBuf::from(dir)))?;
        }
        Ok(self)
    }

    pub fn endpoint(&self, path: &str) -> AppResult<Url> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|err| AppError::InvalidInput(format!("bad endpoint {path}: {err}")))
    }

    pub fn clipboard_path(&self) -> PathBuf {
        self.data_dir.join("clipboard.json")
    }
}

fn env_u64(name: &str) -> AppResult<Option<u64>> {
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<u64>()
            .map(Some)
            .map_err(|err| AppError::InvalidInput(format!("{name}: {err}"))),
        Err(_) => Ok(None),
    }
}

/// Parses an origin and makes sure it ends with `/` so relative joins keep
/// any path prefix the admin panel is mounted under.
pub fn parse_origin(raw: &str) -> AppResult<Url> {
    let trimmed = raw.trim();
    let normalized = if trimmed.ends_with('/') {
        trimmed.to_string()
    } else {
        format!("{trimmed}/")
    };
    Url::parse(&normalized).map_err(|err| AppError::InvalidInput(format!("invalid url {raw}: {err}")))
}

pub fn default_data_dir(base: Option<PathBuf>) -> Result<PathBuf, AppError> {
    if let Some(path) = base {
        return Ok(path);
    }
    let mut cwd = std::env::current_dir().map_err(|err| AppError::Io(err.to_string()))?;
    cwd.push(".formport");
    Ok(cwd)
}

pub fn log_filter_from_env() -> String {
    let level = match std::env::var("FORMPORT_LOG")
        .unwrap_or_else(|_| "info".to_string())
        .to_ascii_lowercase()
        .as_str()
    {
        "trace" => "trace",
        "debug" => "debug",
        "warn" => "warn",
        "error" => "error",
        _ => "info",
    };
    if http_debug_enabled() {
        level.to_string()
    } else {
        format!("{level},reqwest=warn,hyper=warn,hyper_util=warn")
    }
}

fn http_debug_enabled() -> bool {
    matches!(
        std::env::var("FORMPORT_HTTP_DEBUG")
            .unwrap_or_default()
            .to_ascii_lowercase()
            .as_str(),
        "1" | "true" | "yes" | "on"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origin_keeps_mount_prefix() {
        let url = parse_origin("https://cms.example.com/admin-api").expect("parse");
        let joined = url.join("upload/files").expect("join");
        assert_eq!(joined.as_str(), "https://cms.example.com/admin-api/upload/files");
    }

    #[test]
    fn rejects_garbage_origin() {
        assert!(matches!(parse_origin("not a url"), Err(AppError::InvalidInput(_))));
    }
}

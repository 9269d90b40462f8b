use std::{
    path::{Path, PathBuf},
    sync::Mutex,
};

use async_trait::async_trait;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

use crate::core::errors::{AppError, AppResult};
use crate::workflow::host::Clipboard;

/// Transfer slot on disk standing in for the system clipboard.
#[derive(Debug, Clone)]
pub struct FileClipboard {
    path: PathBuf,
}

impl FileClipboard {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait(?Send)]
impl Clipboard for FileClipboard {
    async fn read_text(&self) -> AppResult<String> {
        let mut file = tokio::fs::File::open(&self.path).await.map_err(|err| {
            AppError::ClipboardUnavailable(format!("{}: {err}", self.path.display()))
        })?;
        let mut text = String::new();
        file.read_to_string(&mut text)
            .await
            .map_err(|err| AppError::ClipboardUnavailable(err.to_string()))?;
        Ok(text)
    }

    async fn write_text(&self, text: &str) -> AppResult<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let mut file = tokio::fs::File::create(&self.path).await?;
        file.write_all(text.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }
}

/// In-process clipboard; `None` contents behave like denied access.
#[derive(Debug, Default)]
pub struct MemoryClipboard {
    contents: Mutex<Option<String>>,
}

impl MemoryClipboard {
    pub fn new(contents: Option<String>) -> Self {
        Self {
            contents: Mutex::new(contents),
        }
    }

    pub fn contents(&self) -> Option<String> {
        self.contents.lock().ok().and_then(|guard| guard.clone())
    }
}

#[async_trait(?Send)]
impl Clipboard for MemoryClipboard {
    async fn read_text(&self) -> AppResult<String> {
        self.contents()
            .ok_or_else(|| AppError::ClipboardUnavailable("clipboard is empty".to_string()))
    }

    async fn write_text(&self, text: &str) -> AppResult<()> {
        let mut guard = self
            .contents
            .lock()
            .map_err(|_| AppError::Internal("clipboard lock poisoned".to_string()))?;
        *guard = Some(text.to_string());
        Ok(())
    }
}

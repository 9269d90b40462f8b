use serde::ser::SerializeStruct;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("clipboard access denied or unavailable: {0}")]
    ClipboardUnavailable(String),
    #[error("invalid clipboard payload: {0}")]
    InvalidPayload(String),
    #[error(
        "Current locale {destination_locale} does not match source locale {source_locale}. Create a new entry with correct locale."
    )]
    LocaleMismatch {
        source_locale: String,
        destination_locale: String,
    },
    #[error("asset fetch failed: {0}")]
    AssetFetch(String),
    #[error("asset upload failed: {0}")]
    AssetUpload(String),
    #[error("host rejected field write: {0}")]
    HostWrite(String),
    #[error("another export or import is already in progress")]
    Busy,
    #[error("io error: {0}")]
    Io(String),
    #[error("provider auth failed")]
    ProviderAuth,
    #[error("provider timeout")]
    ProviderTimeout,
    #[error("provider invalid response: {0}")]
    ProviderInvalidResponse(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl serde::Serialize for AppError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("AppError", 2)?;
        state.serialize_field("code", self.code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

impl AppError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "INVALID_INPUT",
            Self::NotFound(_) => "NOT_FOUND",
            Self::ClipboardUnavailable(_) => "CLIPBOARD_UNAVAILABLE",
            Self::InvalidPayload(_) => "INVALID_PAYLOAD",
            Self::LocaleMismatch { .. } => "LOCALE_MISMATCH",
            Self::AssetFetch(_) => "ASSET_FETCH_FAILED",
            Self::AssetUpload(_) => "ASSET_UPLOAD_FAILED",
            Self::HostWrite(_) => "HOST_WRITE_FAILED",
            Self::Busy => "BUSY",
            Self::Io(_) => "IO_ERROR",
            Self::ProviderAuth => "PROVIDER_AUTH",
            Self::ProviderTimeout => "PROVIDER_TIMEOUT",
            Self::ProviderInvalidResponse(_) => "PROVIDER_INVALID_RESPONSE",
            Self::Network(_) => "NETWORK_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    pub fn retryable(&self) -> bool {
        matches!(
            self,
            Self::ProviderTimeout | Self::Network(_) | Self::AssetFetch(_) | Self::Busy
        )
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value.to_string())
    }
}

impl From<reqwest::Error> for AppError {
    fn from(value: reqwest::Error) -> Self {
        if value.is_timeout() {
            Self::ProviderTimeout
        } else {
            Self::Network(value.to_string())
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(value: serde_json::Error) -> Self {
        Self::InvalidPayload(value.to_string())
    }
}

pub type AppResult<T> = Result<T, AppError>;

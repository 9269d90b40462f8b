use tracing::info;

use crate::{
    core::errors::{AppError, AppResult},
    security::keyring,
};

pub fn set_token(environment: &str, token: &str) -> AppResult<()> {
    if token.trim().is_empty() {
        return Err(AppError::InvalidInput("token cannot be empty".to_string()));
    }
    keyring::set_environment_token(environment, token)?;
    info!(environment, "token stored");
    Ok(())
}

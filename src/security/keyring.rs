use crate::core::errors::{AppError, AppResult};

const SERVICE: &str = "formport";

fn entry_for_environment(environment: &str) -> AppResult<keyring::Entry> {
    let environment = environment.trim();
    if environment.is_empty() {
        return Err(AppError::InvalidInput("environment name cannot be empty".to_string()));
    }
    keyring::Entry::new(SERVICE, environment).map_err(|err| AppError::Internal(err.to_string()))
}

pub fn set_environment_token(environment: &str, token: &str) -> AppResult<()> {
    if token.trim().is_empty() {
        return Err(AppError::InvalidInput("token cannot be empty".to_string()));
    }
    entry_for_environment(environment)?
        .set_password(token.trim())
        .map_err(|err| AppError::Internal(err.to_string()))
}

pub fn get_environment_token(environment: &str) -> AppResult<String> {
    entry_for_environment(environment)?
        .get_password()
        .map_err(|_err| AppError::ProviderAuth)
}

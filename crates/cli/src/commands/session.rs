//! `login` and `logout`.

use std::io::BufRead;

use secrecy::SecretString;

use cuztory_admin::{AdminConfig, AppError, ValidationError};

/// Persist an admin token to the configured token file.
pub fn login(config: &AdminConfig, token: Option<String>) -> Result<(), AppError> {
    let token = match token {
        Some(token) => token,
        None => {
            tracing::info!("Paste the admin token and press Enter");
            let mut line = String::new();
            std::io::stdin().lock().read_line(&mut line)?;
            line
        }
    };
    let token = token.trim();
    if token.is_empty() {
        return Err(ValidationError::new("Token cannot be empty").into());
    }

    let store = config.token_store();
    store.store(&SecretString::from(token.to_string()))?;
    tracing::info!(path = %store.path().display(), "Admin token saved");
    if config.admin_token.is_some() {
        tracing::warn!("CUZTORY_ADMIN_TOKEN is set and takes precedence over the saved token");
    }
    Ok(())
}

/// Remove the stored token, if any.
pub fn logout(config: &AdminConfig) -> Result<(), AppError> {
    let store = config.token_store();
    if store.clear()? {
        tracing::info!(path = %store.path().display(), "Admin token removed");
    } else {
        tracing::info!("No saved admin token");
    }
    Ok(())
}

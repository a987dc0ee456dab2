//! Admin session and credential providers.
//!
//! A [`Session`] carries the bearer token for one CLI invocation. It is built
//! once from a [`CredentialProvider`] and handed to the API client; nothing
//! reads the token from ambient state.

use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretString};

use crate::error::AppError;

/// Supplies the admin bearer token, if one is available.
pub trait CredentialProvider {
    /// The token to send, or `None` when this provider has nothing.
    fn bearer_token(&self) -> Option<SecretString>;
}

/// A token fixed at construction time (e.g. from `CUZTORY_ADMIN_TOKEN`).
#[derive(Clone)]
pub struct StaticToken(SecretString);

impl StaticToken {
    #[must_use]
    pub const fn new(token: SecretString) -> Self {
        Self(token)
    }
}

impl std::fmt::Debug for StaticToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("StaticToken").field(&"[REDACTED]").finish()
    }
}

impl CredentialProvider for StaticToken {
    fn bearer_token(&self) -> Option<SecretString> {
        non_blank(self.0.expose_secret())
    }
}

/// A token persisted on disk by `cz-admin login`.
#[derive(Debug, Clone)]
pub struct TokenFile {
    path: PathBuf,
}

impl TokenFile {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Persist `token`, creating parent directories as needed.
    ///
    /// On Unix the file is made readable by the owner only.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Io` if the file cannot be written, or
    /// `AppError::Unauthorized` if the token is blank.
    pub fn store(&self, token: &SecretString) -> Result<(), AppError> {
        if token.expose_secret().trim().is_empty() {
            return Err(AppError::Unauthorized("token is empty".to_string()));
        }
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, token.expose_secret().trim())?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&self.path, std::fs::Permissions::from_mode(0o600))?;
        }

        tracing::info!(path = %self.path.display(), "Stored admin token");
        Ok(())
    }

    /// Remove the persisted token. Succeeds if there was none.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Io` if the file exists but cannot be removed.
    pub fn clear(&self) -> Result<bool, AppError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {
                tracing::info!(path = %self.path.display(), "Removed admin token");
                Ok(true)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

impl CredentialProvider for TokenFile {
    fn bearer_token(&self) -> Option<SecretString> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) => non_blank(&contents),
            Err(e) => {
                if e.kind() != std::io::ErrorKind::NotFound {
                    tracing::warn!(path = %self.path.display(), error = %e, "Cannot read token file");
                }
                None
            }
        }
    }
}

/// Tries each provider in order and uses the first token found.
#[derive(Default)]
pub struct ProviderChain {
    providers: Vec<Box<dyn CredentialProvider + Send + Sync>>,
}

impl ProviderChain {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, provider: impl CredentialProvider + Send + Sync + 'static) -> Self {
        self.providers.push(Box::new(provider));
        self
    }
}

impl CredentialProvider for ProviderChain {
    fn bearer_token(&self) -> Option<SecretString> {
        self.providers.iter().find_map(|p| p.bearer_token())
    }
}

/// Request context for one console invocation.
#[derive(Clone)]
pub struct Session {
    token: SecretString,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("token", &"[REDACTED]")
            .finish()
    }
}

impl Session {
    /// Build a session directly from a token.
    #[must_use]
    pub const fn new(token: SecretString) -> Self {
        Self { token }
    }

    /// Consult `provider` once and gate access on the result.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Unauthorized` if no token is available.
    pub fn establish(provider: &dyn CredentialProvider) -> Result<Self, AppError> {
        provider.bearer_token().map(Self::new).ok_or_else(|| {
            AppError::Unauthorized(
                "no admin token found; run `cz-admin login` or set CUZTORY_ADMIN_TOKEN"
                    .to_string(),
            )
        })
    }

    /// The bearer token.
    #[must_use]
    pub const fn token(&self) -> &SecretString {
        &self.token
    }
}

fn non_blank(value: &str) -> Option<SecretString> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| SecretString::from(trimmed.to_string()))
}

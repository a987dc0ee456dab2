//! Subcommand implementations.
//!
//! Each command builds its own client from the configuration; nothing is
//! kept between invocations except the token file.

pub mod catalog;
pub mod orders;
pub mod session;
pub mod settings;

use std::io::Write;

use cuztory_admin::session::Session;
use cuztory_admin::{AdminApiClient, AdminConfig, AppError};

/// Authenticated client for this invocation.
pub fn client(config: &AdminConfig) -> Result<AdminApiClient, AppError> {
    let session = Session::establish(&config.credential_provider())?;
    Ok(AdminApiClient::new(&config.api_url, session)?)
}

/// Run `render` against a locked stdout.
pub fn print(
    render: impl FnOnce(&mut std::io::StdoutLock<'static>) -> std::io::Result<()>,
) -> Result<(), AppError> {
    let mut stdout = std::io::stdout().lock();
    render(&mut stdout)?;
    stdout.flush()?;
    Ok(())
}

//! Console commands.

pub mod auth;
pub mod catalog;
pub mod positions;
pub mod product;

use std::io::Write;
use std::sync::Arc;

use u1r_admin::services::{Level, Notice, Notifier};
use u1r_admin::{AdminConfig, AdminError, CatalogClient, Session, TokenFile};

const CLIENT_FAILED: &str = "Unable to create HTTP client";

/// Shows notices on stderr.
#[derive(Debug, Clone, Copy)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, notice: Notice) {
        let prefix = match notice.level {
            Level::Info => "note",
            Level::Error => "error",
        };
        let _ = writeln!(std::io::stderr(), "{prefix}: {}", notice.message);
    }
}

/// What every command needs.
pub struct Context {
    pub config: AdminConfig,
    pub notifier: Arc<dyn Notifier>,
}

impl Context {
    pub fn new(config: AdminConfig, notifier: Arc<dyn Notifier>) -> Self {
        Self { config, notifier }
    }

    pub fn token_file(&self) -> TokenFile {
        TokenFile::new(&self.config.session_file)
    }

    /// Client carrying the restored admin session.
    pub async fn client(&self) -> Result<CatalogClient, AdminError> {
        let session = Session::restore(self.config.token.clone(), &self.token_file()).await?;
        CatalogClient::new(&self.config, session)
            .map_err(|e| self.fail(e.during(CLIENT_FAILED)))
    }

    /// Client without a session, for logging in.
    pub fn anonymous_client(&self) -> Result<CatalogClient, AdminError> {
        CatalogClient::new(&self.config, Session::anonymous())
            .map_err(|e| self.fail(e.during(CLIENT_FAILED)))
    }

    /// Report and show a failure, then hand it back for propagation.
    pub fn fail(&self, err: AdminError) -> AdminError {
        err.report();
        self.notifier.notify(Notice::error(err.user_message()));
        err
    }
}

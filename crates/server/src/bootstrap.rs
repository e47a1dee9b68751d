use std::sync::Arc;

use axum::Router;
use deadline_core::config::AppConfig;
use deadline_core::{DocumentFetcher, HttpDocumentFetcher, SourceError};
use deadline_slack::{CommandDispatcher, SignatureVerifier};
use thiserror::Error;
use tracing::info;

use crate::routes::{self, CommandState};

pub struct Application {
    pub config: AppConfig,
    pub dispatcher: Arc<CommandDispatcher>,
    pub verifier: Option<Arc<SignatureVerifier>>,
}

impl Application {
    pub fn router(&self) -> Router {
        routes::app(CommandState {
            dispatcher: Arc::clone(&self.dispatcher),
            verifier: self.verifier.clone(),
        })
    }
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("conference source client could not be built: {0}")]
    SourceClient(#[source] SourceError),
}

pub fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        "starting application bootstrap"
    );

    let fetcher: Arc<dyn DocumentFetcher> = Arc::new(
        HttpDocumentFetcher::from_config(&config.source).map_err(BootstrapError::SourceClient)?,
    );
    info!(
        event_name = "system.bootstrap.source_ready",
        correlation_id = "bootstrap",
        base_url = %config.source.base_url,
        timeout_secs = config.source.timeout_secs,
        "conference source client ready"
    );

    let verifier =
        config.slack.signing_secret.clone().map(|secret| Arc::new(SignatureVerifier::new(secret)));
    info!(
        event_name = "system.bootstrap.signature_mode",
        correlation_id = "bootstrap",
        verify_signatures = verifier.is_some(),
        "slack request verification configured"
    );

    Ok(Application { config, dispatcher: Arc::new(CommandDispatcher::new(fetcher)), verifier })
}

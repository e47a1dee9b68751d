use thiserror::Error;

/// Failure to obtain one source document. Recovered by skipping that source.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum SourceError {
    #[error("request to `{url}` failed: {message}")]
    Transport { url: String, message: String },
    #[error("request to `{url}` timed out after {timeout_ms}ms")]
    Timeout { url: String, timeout_ms: u128 },
    #[error("`{url}` returned status {status}")]
    Status { url: String, status: u16 },
    #[error("source `{source_id}` is not a valid deadline document: {message}")]
    Decode { source_id: String, message: String },
    #[error("source `{source_id}` returned an empty document")]
    Empty { source_id: String },
    #[error("http client could not be built: {0}")]
    Client(String),
}

/// Failures surfaced to the requesting user.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum PipelineError {
    #[error("no conference source could be fetched")]
    AllSourcesUnavailable,
    #[error("unexpected failure: {0}")]
    Unexpected(String),
}

impl PipelineError {
    pub fn user_message(&self) -> String {
        match self {
            Self::AllSourcesUnavailable => {
                "Sorry, I could not fetch conference data at the moment.".to_owned()
            }
            Self::Unexpected(diagnostic) => {
                format!("Sorry, something went wrong while looking up deadlines: {diagnostic}")
            }
        }
    }
}

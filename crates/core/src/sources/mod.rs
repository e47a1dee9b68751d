//! Source document retrieval.
//!
//! Every catalog source is fetched in its own task. A failing source only
//! removes itself from the result; the request fails only when nothing at all
//! could be fetched.

pub mod http;

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::task::JoinSet;
use tracing::{debug, warn};

use crate::errors::{PipelineError, SourceError};
use crate::record::RawConferenceRecord;

pub use http::HttpDocumentFetcher;

#[async_trait]
pub trait DocumentFetcher: Send + Sync {
    /// Returns the raw body of the document for `source_id`.
    async fn fetch_document(&self, source_id: &str) -> Result<String, SourceError>;
}

/// Decoded records keyed by source id. Ordering is by id, not by arrival.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ConferenceData {
    sources: BTreeMap<String, Vec<RawConferenceRecord>>,
}

impl ConferenceData {
    pub fn insert(&mut self, source_id: impl Into<String>, records: Vec<RawConferenceRecord>) {
        self.sources.insert(source_id.into(), records);
    }

    pub fn get(&self, source_id: &str) -> Option<&[RawConferenceRecord]> {
        self.sources.get(source_id).map(Vec::as_slice)
    }

    pub fn source_ids(&self) -> impl Iterator<Item = &str> {
        self.sources.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

pub fn decode_document(
    source_id: &str,
    body: &str,
) -> Result<Vec<RawConferenceRecord>, SourceError> {
    if body.trim().is_empty() {
        return Err(SourceError::Empty { source_id: source_id.to_owned() });
    }

    let records = serde_yaml::from_str::<Option<Vec<RawConferenceRecord>>>(body).map_err(
        |error| SourceError::Decode { source_id: source_id.to_owned(), message: error.to_string() },
    )?;

    match records {
        Some(records) if !records.is_empty() => Ok(records),
        _ => Err(SourceError::Empty { source_id: source_id.to_owned() }),
    }
}

/// Fetches and decodes every catalog source concurrently.
pub async fn fetch_all(
    fetcher: Arc<dyn DocumentFetcher>,
    catalog: &[&str],
) -> Result<ConferenceData, PipelineError> {
    let mut tasks = JoinSet::new();
    for source_id in catalog {
        let fetcher = Arc::clone(&fetcher);
        let source_id = (*source_id).to_owned();
        tasks.spawn(async move {
            let outcome = match fetcher.fetch_document(&source_id).await {
                Ok(body) => decode_document(&source_id, &body),
                Err(error) => Err(error),
            };
            (source_id, outcome)
        });
    }

    let mut data = ConferenceData::default();
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((source_id, Ok(records))) => {
                debug!(
                    event_name = "source.fetch.succeeded",
                    source_id = %source_id,
                    record_count = records.len(),
                    "source document decoded"
                );
                data.insert(source_id, records);
            }
            Ok((source_id, Err(error))) => {
                warn!(
                    event_name = "source.fetch.skipped",
                    source_id = %source_id,
                    error = %error,
                    "source skipped"
                );
            }
            Err(error) => {
                warn!(
                    event_name = "source.fetch.aborted",
                    error = %error,
                    "source fetch task aborted"
                );
            }
        }
    }

    if data.is_empty() {
        return Err(PipelineError::AllSourcesUnavailable);
    }

    Ok(data)
}

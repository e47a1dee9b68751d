use std::sync::Arc;

use chrono::{Datelike, Utc};
use deadline_core::{extract, fetch_all, resolve, DocumentFetcher, PipelineError, SOURCE_CATALOG};
use tracing::{info, warn};

use crate::blocks::{self, SlackResponse};

/// Command names that take the conference as an argument rather than naming it.
const GENERIC_COMMANDS: &[&str] = &["deadline", "deadlines"];

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SlashCommandPayload {
    pub command: String,
    pub text: String,
    pub channel_id: String,
    pub user_id: String,
    pub request_id: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DeadlineCommand {
    Lookup { conference_key: String },
    Usage,
}

pub fn parse_deadline_command(command: &str, text: &str) -> DeadlineCommand {
    match extract_conference_key(command, text) {
        Some(conference_key) => DeadlineCommand::Lookup { conference_key },
        None => DeadlineCommand::Usage,
    }
}

/// Finds the conference key in the command text, or in the command name
/// itself for conference-specific commands such as `/iclr`.
pub fn extract_conference_key(command: &str, text: &str) -> Option<String> {
    let mut tokens = text.split_whitespace().peekable();
    if tokens.peek().is_some_and(|token| is_generic_command(token)) {
        tokens.next();
    }

    if let Some(token) = tokens.next() {
        return Some(token.to_lowercase());
    }

    let command = command.trim();
    if is_generic_command(command) {
        return None;
    }

    let key = command.strip_prefix('/').unwrap_or(command).to_lowercase();
    (!key.is_empty()).then_some(key)
}

fn is_generic_command(token: &str) -> bool {
    let name = token.strip_prefix('/').unwrap_or(token).to_lowercase();
    GENERIC_COMMANDS.contains(&name.as_str())
}

/// Runs resolve, fetch, extract and format for each slash command.
///
/// Every path produces a response; failures are rendered as ephemeral
/// messages instead of being returned.
pub struct CommandDispatcher {
    fetcher: Arc<dyn DocumentFetcher>,
    catalog: &'static [&'static str],
    reference_year: Option<i32>,
}

impl CommandDispatcher {
    pub fn new(fetcher: Arc<dyn DocumentFetcher>) -> Self {
        Self { fetcher, catalog: SOURCE_CATALOG, reference_year: None }
    }

    pub fn with_catalog(mut self, catalog: &'static [&'static str]) -> Self {
        self.catalog = catalog;
        self
    }

    /// Pins the year used for filtering instead of reading the clock.
    pub fn with_reference_year(mut self, year: i32) -> Self {
        self.reference_year = Some(year);
        self
    }

    fn current_year(&self) -> i32 {
        self.reference_year.unwrap_or_else(|| Utc::now().year())
    }

    pub async fn dispatch(&self, payload: &SlashCommandPayload) -> SlackResponse {
        info!(
            event_name = "command.deadline.received",
            correlation_id = %payload.request_id,
            command = %payload.command,
            text = %payload.text,
            channel_id = %payload.channel_id,
            user_id = %payload.user_id,
            "slash command received"
        );

        let response = match parse_deadline_command(&payload.command, &payload.text) {
            DeadlineCommand::Usage => blocks::usage_message(),
            DeadlineCommand::Lookup { conference_key } => {
                self.lookup(&conference_key, &payload.request_id).await
            }
        };

        info!(
            event_name = "command.deadline.responded",
            correlation_id = %payload.request_id,
            response_type = ?response.response_type,
            block_count = response.blocks.len(),
            "slash command answered"
        );
        response
    }

    pub async fn lookup(&self, token: &str, correlation_id: &str) -> SlackResponse {
        match self.try_lookup(token, correlation_id).await {
            Ok(response) => response,
            Err(PipelineError::AllSourcesUnavailable) => {
                warn!(
                    event_name = "command.deadline.fetch_failed",
                    correlation_id,
                    token,
                    "no conference source could be fetched"
                );
                blocks::fetch_failure_message()
            }
            Err(error @ PipelineError::Unexpected(_)) => {
                warn!(
                    event_name = "command.deadline.unexpected_failure",
                    correlation_id,
                    error = %error,
                    "deadline lookup failed"
                );
                blocks::unexpected_failure_message(&error.to_string())
            }
        }
    }

    /// Resolves, fetches, extracts and formats, surfacing pipeline failures
    /// instead of rendering them.
    pub async fn try_lookup(
        &self,
        token: &str,
        correlation_id: &str,
    ) -> Result<SlackResponse, PipelineError> {
        let conference = resolve(token);
        let data = fetch_all(Arc::clone(&self.fetcher), self.catalog).await?;

        let deadlines = extract(&conference.display_name, &data, self.current_year());
        info!(
            event_name = "command.deadline.extracted",
            correlation_id,
            conference = %conference.display_name,
            source_count = data.len(),
            deadline_count = deadlines.len(),
            "deadlines extracted"
        );

        Ok(blocks::deadlines_message(&deadlines, &conference.display_name))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use async_trait::async_trait;
    use deadline_core::{PipelineError, SourceError};

    use super::{
        extract_conference_key, parse_deadline_command, CommandDispatcher, DeadlineCommand,
        SlashCommandPayload,
    };
    use crate::blocks::{Block, ResponseType};

    const ICLR_DOCUMENT: &str = r#"
- title: ICLR
  year: 2023
  deadline: '2022-09-28 23:59:59'
- title: ICLR
  year: 2025
  deadline: '2024-10-01 23:59:59'
  link: https://iclr.cc/Conferences/2025
  city: Singapore
  country: Singapore
"#;

    #[derive(Default)]
    struct RecordingFetcher {
        calls: AtomicUsize,
        offline: bool,
    }

    #[async_trait]
    impl deadline_core::DocumentFetcher for RecordingFetcher {
        async fn fetch_document(&self, source_id: &str) -> Result<String, SourceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.offline {
                return Err(SourceError::Transport {
                    url: format!("https://example.test/{source_id}.yml"),
                    message: "connection refused".to_owned(),
                });
            }
            match source_id {
                "iclr" => Ok(ICLR_DOCUMENT.to_owned()),
                "cvpr" => Ok("- title: CVPR\n  year: 2025\n".to_owned()),
                _ => Err(SourceError::Status {
                    url: format!("https://example.test/{source_id}.yml"),
                    status: 404,
                }),
            }
        }
    }

    fn payload(command: &str, text: &str) -> SlashCommandPayload {
        SlashCommandPayload {
            command: command.to_owned(),
            text: text.to_owned(),
            channel_id: "C1".to_owned(),
            user_id: "U1".to_owned(),
            request_id: "req-1".to_owned(),
        }
    }

    fn dispatcher(fetcher: Arc<RecordingFetcher>) -> CommandDispatcher {
        CommandDispatcher::new(fetcher).with_reference_year(2024)
    }

    #[test]
    fn key_comes_from_text_after_generic_prefix() {
        assert_eq!(extract_conference_key("/deadline", "iclr"), Some("iclr".to_owned()));
        assert_eq!(extract_conference_key("/deadline", "ICML extra"), Some("icml".to_owned()));
        assert_eq!(extract_conference_key("/deadline", "deadline xyz123"), Some("xyz123".to_owned()));
        assert_eq!(extract_conference_key("/deadline", "/Deadlines CVPR"), Some("cvpr".to_owned()));
    }

    #[test]
    fn key_falls_back_to_specific_command_name() {
        assert_eq!(extract_conference_key("/iclr", ""), Some("iclr".to_owned()));
        assert_eq!(extract_conference_key("/NeurIPS", "  "), Some("neurips".to_owned()));
        assert_eq!(extract_conference_key("/iclr", "deadline"), Some("iclr".to_owned()));
    }

    #[test]
    fn text_wins_over_specific_command_name() {
        assert_eq!(extract_conference_key("/iclr", "cvpr"), Some("cvpr".to_owned()));
    }

    #[test]
    fn generic_command_without_argument_has_no_key() {
        assert_eq!(extract_conference_key("/deadline", ""), None);
        assert_eq!(extract_conference_key("/deadlines", "deadlines"), None);
        assert_eq!(extract_conference_key("", ""), None);
        assert_eq!(extract_conference_key("/", ""), None);
        assert_eq!(parse_deadline_command("/deadline", "   "), DeadlineCommand::Usage);
    }

    #[tokio::test]
    async fn known_conference_renders_future_deadlines_in_channel() {
        let fetcher = Arc::new(RecordingFetcher::default());
        let response = dispatcher(Arc::clone(&fetcher)).dispatch(&payload("/deadline", "iclr")).await;

        assert_eq!(response.response_type, ResponseType::InChannel);
        let titles: Vec<_> = response
            .blocks
            .iter()
            .filter_map(|block| match block {
                Block::Section { text, .. } if text.text().starts_with("*ICLR") => Some(text.text()),
                _ => None,
            })
            .collect();
        assert_eq!(titles, vec!["*ICLR 2025*"]);
        assert!(!matches!(response.blocks.last(), Some(Block::Divider)));
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), deadline_core::SOURCE_CATALOG.len());
    }

    #[tokio::test]
    async fn all_sources_failing_short_circuits_to_fetch_failure() {
        let fetcher = Arc::new(RecordingFetcher { offline: true, ..RecordingFetcher::default() });
        let response = dispatcher(fetcher).dispatch(&payload("/deadline", "iclr")).await;

        assert_eq!(response.response_type, ResponseType::Ephemeral);
        assert_eq!(
            response.text.as_deref(),
            Some("Sorry, I could not fetch conference data at the moment.")
        );
    }

    #[tokio::test]
    async fn missing_key_returns_usage_without_fetching() {
        let fetcher = Arc::new(RecordingFetcher::default());
        let response = dispatcher(Arc::clone(&fetcher)).dispatch(&payload("/deadline", "")).await;

        assert_eq!(response.response_type, ResponseType::Ephemeral);
        assert!(response.text.as_deref().unwrap_or_default().starts_with("Usage:"));
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn unknown_conference_reports_no_deadlines() {
        let fetcher = Arc::new(RecordingFetcher::default());
        let response = dispatcher(fetcher).dispatch(&payload("/deadline", "deadline xyz123")).await;

        assert_eq!(response.response_type, ResponseType::Ephemeral);
        assert_eq!(
            response.text.as_deref(),
            Some("No deadlines found for xyz123. Try: iclr, nips, cvpr, icml, aaai, acl, emnlp")
        );
    }

    #[tokio::test]
    async fn alias_display_name_is_used_for_lookup_and_header() {
        let fetcher = Arc::new(RecordingFetcher::default());
        let response = dispatcher(fetcher).dispatch(&payload("/cvpr", "")).await;

        assert_eq!(response.response_type, ResponseType::InChannel);
        assert!(matches!(
            response.blocks.first(),
            Some(Block::Header { text, .. }) if text.text() == "CVPR Conference Deadlines"
        ));
    }

    #[tokio::test]
    async fn custom_catalog_limits_fetches() {
        let fetcher = Arc::new(RecordingFetcher::default());
        let response = CommandDispatcher::new(Arc::clone(&fetcher) as Arc<dyn deadline_core::DocumentFetcher>)
            .with_catalog(&["iclr"])
            .with_reference_year(2024)
            .lookup("ICLR", "req-2")
            .await;

        assert_eq!(response.response_type, ResponseType::InChannel);
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn try_lookup_surfaces_unavailable_sources() {
        let fetcher = Arc::new(RecordingFetcher { offline: true, ..RecordingFetcher::default() });
        let result = dispatcher(fetcher).try_lookup("iclr", "req-3").await;

        assert_eq!(result, Err(PipelineError::AllSourcesUnavailable));
    }
}

use std::sync::Arc;

use deadline_core::config::{AppConfig, LoadOptions};
use deadline_core::{DocumentFetcher, HttpDocumentFetcher, PipelineError};
use deadline_slack::blocks::{ActionElement, Block};
use deadline_slack::{CommandDispatcher, SlackResponse};

use super::{CommandResult, EXIT_CONFIG_FAILURE, EXIT_RUNTIME_FAILURE};

pub fn run(conference: &str, json_output: bool) -> CommandResult {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(
                "lookup",
                "config_validation",
                error.to_string(),
                EXIT_CONFIG_FAILURE,
            )
        }
    };

    let fetcher = match HttpDocumentFetcher::from_config(&config.source) {
        Ok(fetcher) => fetcher,
        Err(error) => {
            return CommandResult::failure(
                "lookup",
                "source_client",
                error.to_string(),
                EXIT_RUNTIME_FAILURE,
            )
        }
    };

    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => {
            return CommandResult::failure(
                "lookup",
                "runtime",
                format!("failed to initialize async runtime: {error}"),
                EXIT_RUNTIME_FAILURE,
            )
        }
    };

    let fetcher: Arc<dyn DocumentFetcher> = Arc::new(fetcher);
    let dispatcher = CommandDispatcher::new(fetcher);
    let response = match runtime.block_on(dispatcher.try_lookup(conference, "cli")) {
        Ok(response) => response,
        Err(error) => {
            let error_class = match error {
                PipelineError::AllSourcesUnavailable => "source_unavailable",
                PipelineError::Unexpected(_) => "unexpected",
            };
            return CommandResult::failure(
                "lookup",
                error_class,
                error.user_message(),
                EXIT_RUNTIME_FAILURE,
            )
        }
    };

    let output = if json_output {
        match serde_json::to_string_pretty(&response) {
            Ok(json) => json,
            Err(error) => {
                return CommandResult::failure(
                    "lookup",
                    "serialization",
                    error.to_string(),
                    EXIT_RUNTIME_FAILURE,
                )
            }
        }
    } else {
        render_text(&response)
    };

    CommandResult::raw(0, output)
}

/// Flattens a Slack response into terminal-friendly lines. The top-level
/// text is only printed when there are no blocks to render.
pub fn render_text(response: &SlackResponse) -> String {
    let mut lines = Vec::new();
    if response.blocks.is_empty() {
        lines.extend(response.text.clone());
    }

    for block in &response.blocks {
        match block {
            Block::Header { text, .. } => lines.push(text.text().to_owned()),
            Block::Section { text, .. } => lines.push(text.text().to_owned()),
            Block::Divider => lines.push("---".to_owned()),
            Block::Actions { elements, .. } => {
                for ActionElement::Button(button) in elements {
                    match &button.url {
                        Some(url) => lines.push(format!("{}: {url}", button.text.text())),
                        None => lines.push(button.text.text().to_owned()),
                    }
                }
            }
        }
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use deadline_core::NormalizedDeadline;
    use deadline_slack::blocks::{deadlines_message, usage_message};

    use super::render_text;

    #[test]
    fn ephemeral_response_renders_its_text() {
        let rendered = render_text(&usage_message());
        assert!(rendered.starts_with("Usage: `/deadline <conference>`"));
    }

    #[test]
    fn deadline_card_renders_header_sections_and_link() {
        let deadline = NormalizedDeadline {
            name: "ICLR".to_owned(),
            year: 2030,
            date: "2029-10-01 23:59:59".to_owned(),
            link: "https://iclr.cc".to_owned(),
            ..NormalizedDeadline::default()
        };

        let rendered = render_text(&deadlines_message(&[deadline], "ICLR"));

        assert_eq!(
            rendered,
            "ICLR Conference Deadlines\n---\n*ICLR 2030*\n📄 *Paper:* 2029-10-01 23:59:59\nView Conference: https://iclr.cc"
        );
    }
}

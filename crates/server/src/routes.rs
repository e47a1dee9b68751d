//! Inbound Slack slash-command endpoint.

use std::collections::HashMap;
use std::str::Utf8Error;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use chrono::Utc;
use deadline_slack::blocks::unexpected_failure_message;
use deadline_slack::signature::{SIGNATURE_HEADER, TIMESTAMP_HEADER};
use deadline_slack::{CommandDispatcher, SignatureVerifier, SlashCommandPayload};
use serde_json::json;
use tracing::{error, warn};
use uuid::Uuid;

use crate::health;

pub const COMMAND_PATH: &str = "/slack/command";

#[derive(Clone)]
pub struct CommandState {
    pub dispatcher: Arc<CommandDispatcher>,
    pub verifier: Option<Arc<SignatureVerifier>>,
}

/// Form fields Slack posts for a slash command. Everything else is ignored.
#[derive(Debug)]
struct SlashCommandForm {
    command: String,
    text: String,
    channel_id: String,
    user_id: String,
    trigger_id: String,
}

impl SlashCommandForm {
    fn parse(body: &[u8]) -> Result<Self, Utf8Error> {
        let body = std::str::from_utf8(body)?;
        let mut params: HashMap<String, String> =
            form_urlencoded::parse(body.as_bytes()).into_owned().collect();
        let mut take = |key: &str| params.remove(key).unwrap_or_default();

        Ok(Self {
            command: take("command"),
            text: take("text"),
            channel_id: take("channel_id"),
            user_id: take("user_id"),
            trigger_id: take("trigger_id"),
        })
    }

    fn into_payload(self) -> SlashCommandPayload {
        let request_id = if self.trigger_id.trim().is_empty() {
            Uuid::new_v4().to_string()
        } else {
            self.trigger_id
        };

        SlashCommandPayload {
            command: self.command,
            text: self.text,
            channel_id: self.channel_id,
            user_id: self.user_id,
            request_id,
        }
    }
}

pub fn app(state: CommandState) -> Router {
    Router::new().route(COMMAND_PATH, post(slash_command)).with_state(state).merge(health::router())
}

pub async fn slash_command(
    State(state): State<CommandState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    if let Some(verifier) = &state.verifier {
        let timestamp = header_value(&headers, TIMESTAMP_HEADER);
        let signature = header_value(&headers, SIGNATURE_HEADER);
        if let Err(rejection) = verifier.verify(timestamp, signature, &body, Utc::now().timestamp())
        {
            warn!(
                event_name = "slack.command.signature_rejected",
                correlation_id = "unverified",
                reason = %rejection,
                "rejected slash command with invalid signature"
            );
            return (StatusCode::UNAUTHORIZED, Json(json!({ "error": "invalid request signature" })))
                .into_response();
        }
    }

    let form = match SlashCommandForm::parse(&body) {
        Ok(form) => form,
        Err(decode_error) => {
            warn!(
                event_name = "slack.command.decode_failed",
                correlation_id = "undecoded",
                error = %decode_error,
                "slash command body could not be decoded"
            );
            let diagnostic = format!("malformed command payload: {decode_error}");
            return Json(unexpected_failure_message(&diagnostic)).into_response();
        }
    };

    let payload = form.into_payload();
    let correlation_id = payload.request_id.clone();
    let dispatcher = Arc::clone(&state.dispatcher);

    // Panics inside the pipeline still get an answer for the user.
    let response = match tokio::spawn(async move { dispatcher.dispatch(&payload).await }).await {
        Ok(response) => response,
        Err(join_error) => {
            error!(
                event_name = "slack.command.dispatch_panicked",
                correlation_id = %correlation_id,
                error = %join_error,
                "slash command dispatch aborted"
            );
            unexpected_failure_message(&join_error.to_string())
        }
    };

    Json(response).into_response()
}

fn header_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|value| value.to_str().ok())
}

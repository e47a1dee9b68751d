//! Slack integration for the `/deadline` slash command.
//!
//! - **Slash Commands** (`commands`) - key extraction and the lookup pipeline
//! - **Block Kit** (`blocks`) - message builders and response payloads
//! - **Signing** (`signature`) - `X-Slack-Signature` verification
//!
//! # Architecture
//!
//! ```text
//! /deadline <conference> → CommandDispatcher → resolve → fetch_all → extract
//!                                  ↓
//!                       SlackResponse (Block Kit) ← deadlines_message
//! ```

pub mod blocks;
pub mod commands;
pub mod signature;

pub use blocks::{ResponseType, SlackResponse};
pub use commands::{CommandDispatcher, SlashCommandPayload};
pub use signature::{SignatureError, SignatureVerifier};

use deadline_core::conference::SUGGESTED_KEYS;
use deadline_core::{NormalizedDeadline, PipelineError};
use serde::Serialize;

pub const MAX_RENDERED_DEADLINES: usize = 3;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TextObject {
    #[serde(rename = "plain_text")]
    Plain { text: String },
    Mrkdwn { text: String },
}

impl TextObject {
    pub fn plain(text: impl Into<String>) -> Self {
        Self::Plain { text: text.into() }
    }

    pub fn mrkdwn(text: impl Into<String>) -> Self {
        Self::Mrkdwn { text: text.into() }
    }

    pub fn text(&self) -> &str {
        match self {
            Self::Plain { text } | Self::Mrkdwn { text } => text,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ButtonStyle {
    Primary,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ButtonElement {
    pub action_id: String,
    pub text: TextObject,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<ButtonStyle>,
}

impl ButtonElement {
    pub fn new(action_id: impl Into<String>, label: impl Into<String>) -> Self {
        Self { action_id: action_id.into(), text: TextObject::plain(label), url: None, style: None }
    }

    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn style(mut self, style: ButtonStyle) -> Self {
        self.style = Some(style);
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ActionElement {
    Button(ButtonElement),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    Header { block_id: String, text: TextObject },
    Section { block_id: String, text: TextObject },
    Divider,
    Actions { block_id: String, elements: Vec<ActionElement> },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MessageTemplate {
    pub fallback_text: String,
    pub blocks: Vec<Block>,
}

pub struct MessageBuilder {
    fallback_text: String,
    blocks: Vec<Block>,
}

impl MessageBuilder {
    pub fn new(fallback_text: impl Into<String>) -> Self {
        Self { fallback_text: fallback_text.into(), blocks: Vec::new() }
    }

    pub fn header(mut self, block_id: impl Into<String>, text: impl Into<String>) -> Self {
        self.blocks.push(Block::Header { block_id: block_id.into(), text: TextObject::plain(text) });
        self
    }

    pub fn section<F>(mut self, block_id: impl Into<String>, build: F) -> Self
    where
        F: FnOnce(&mut SectionBuilder),
    {
        let mut builder = SectionBuilder::default();
        build(&mut builder);
        self.blocks.push(Block::Section { block_id: block_id.into(), text: builder.build() });
        self
    }

    pub fn divider(mut self) -> Self {
        self.blocks.push(Block::Divider);
        self
    }

    pub fn actions<F>(mut self, block_id: impl Into<String>, build: F) -> Self
    where
        F: FnOnce(&mut ActionsBuilder),
    {
        let mut builder = ActionsBuilder::default();
        build(&mut builder);
        self.blocks.push(Block::Actions { block_id: block_id.into(), elements: builder.build() });
        self
    }

    pub fn build(self) -> MessageTemplate {
        MessageTemplate { fallback_text: self.fallback_text, blocks: self.blocks }
    }
}

#[derive(Default)]
pub struct SectionBuilder {
    text: Option<TextObject>,
}

impl SectionBuilder {
    pub fn plain(&mut self, text: impl Into<String>) -> &mut Self {
        self.text = Some(TextObject::plain(text));
        self
    }

    pub fn mrkdwn(&mut self, text: impl Into<String>) -> &mut Self {
        self.text = Some(TextObject::mrkdwn(text));
        self
    }

    fn build(self) -> TextObject {
        self.text.unwrap_or_else(|| TextObject::plain(""))
    }
}

#[derive(Default)]
pub struct ActionsBuilder {
    elements: Vec<ActionElement>,
}

impl ActionsBuilder {
    pub fn button(&mut self, button: ButtonElement) -> &mut Self {
        self.elements.push(ActionElement::Button(button));
        self
    }

    fn build(self) -> Vec<ActionElement> {
        self.elements
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseType {
    Ephemeral,
    InChannel,
}

/// Body returned to Slack for a slash command.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SlackResponse {
    pub response_type: ResponseType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub blocks: Vec<Block>,
}

impl SlackResponse {
    pub fn ephemeral(text: impl Into<String>) -> Self {
        Self { response_type: ResponseType::Ephemeral, text: Some(text.into()), blocks: Vec::new() }
    }

    pub fn in_channel(message: MessageTemplate) -> Self {
        Self {
            response_type: ResponseType::InChannel,
            text: Some(message.fallback_text),
            blocks: message.blocks,
        }
    }

    pub fn is_ephemeral(&self) -> bool {
        self.response_type == ResponseType::Ephemeral
    }
}

pub fn no_deadlines_message(conference_name: &str) -> SlackResponse {
    SlackResponse::ephemeral(format!(
        "No deadlines found for {conference_name}. Try: {}",
        SUGGESTED_KEYS.join(", ")
    ))
}

pub fn usage_message() -> SlackResponse {
    SlackResponse::ephemeral(format!(
        "Usage: `/deadline <conference>` (for example `/deadline iclr`). Try: {}",
        SUGGESTED_KEYS.join(", ")
    ))
}

pub fn fetch_failure_message() -> SlackResponse {
    SlackResponse::ephemeral(PipelineError::AllSourcesUnavailable.user_message())
}

pub fn unexpected_failure_message(diagnostic: &str) -> SlackResponse {
    SlackResponse::ephemeral(PipelineError::Unexpected(diagnostic.to_owned()).user_message())
}

/// Renders up to [`MAX_RENDERED_DEADLINES`] deadlines in extraction order.
pub fn deadlines_message(deadlines: &[NormalizedDeadline], conference_name: &str) -> SlackResponse {
    if deadlines.is_empty() {
        return no_deadlines_message(conference_name);
    }

    SlackResponse::in_channel(deadline_card(deadlines, conference_name))
}

fn deadline_card(deadlines: &[NormalizedDeadline], conference_name: &str) -> MessageTemplate {
    let visible = &deadlines[..deadlines.len().min(MAX_RENDERED_DEADLINES)];

    let mut builder = MessageBuilder::new(format!(
        "{} deadline(s) for {conference_name}",
        visible.len()
    ))
    .header("deadline.header.v1", format!("{} Conference Deadlines", conference_name.to_uppercase()))
    .divider();

    for (index, deadline) in visible.iter().enumerate() {
        let entry = index + 1;
        let title = if deadline.name.is_empty() { conference_name } else { deadline.name.as_str() };

        builder = builder.section(format!("deadline.entry.{entry}.title.v1"), |section| {
            section.mrkdwn(format!("*{title} {}*", deadline.year));
        });

        let mut deadline_lines = Vec::new();
        if !deadline.abstract_deadline.is_empty() {
            deadline_lines.push(format!("📝 *Abstract:* {}", deadline.abstract_deadline));
        }
        if !deadline.date.is_empty() {
            deadline_lines.push(format!("📄 *Paper:* {}", deadline.date));
        }
        if !deadline.timezone.is_empty() {
            deadline_lines.push(format!("🕒 *Timezone:* {}", deadline.timezone));
        }
        if !deadline_lines.is_empty() {
            builder = builder.section(format!("deadline.entry.{entry}.dates.v1"), |section| {
                section.mrkdwn(deadline_lines.join("\n"));
            });
        }

        let mut info_lines = Vec::new();
        if !deadline.location.is_empty() {
            info_lines.push(format!("📍 {}", deadline.location));
        }
        if !deadline.venue.is_empty() {
            info_lines.push(format!("🏢 {}", deadline.venue));
        }
        if !info_lines.is_empty() {
            builder = builder.section(format!("deadline.entry.{entry}.info.v1"), |section| {
                section.mrkdwn(info_lines.join("\n"));
            });
        }

        if !deadline.link.is_empty() {
            builder = builder.actions(format!("deadline.entry.{entry}.actions.v1"), |actions| {
                actions.button(
                    ButtonElement::new(
                        format!("view_conference_{}", deadline.year),
                        "View Conference",
                    )
                    .url(deadline.link.clone())
                    .style(ButtonStyle::Primary),
                );
            });
        }

        if entry < visible.len() {
            builder = builder.divider();
        }
    }

    builder.build()
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::markup::{clock_time, escape_for_display};

/// Who wrote a transcript entry. Serialized the way the server stores it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatSender {
    Student,
    Ai,
}

impl std::fmt::Display for ChatSender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChatSender::Student => write!(f, "student"),
            ChatSender::Ai => write!(f, "ai"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub sender: ChatSender,
    pub text: String,
    /// Wall-clock display string, e.g. `14:05`.
    pub timestamp: String,
}

impl ChatMessage {
    pub fn new(sender: ChatSender, text: impl Into<String>, at: DateTime<Utc>) -> Self {
        Self {
            sender,
            text: text.into(),
            timestamp: clock_time(at),
        }
    }
}

/// A transcript entry ready for insertion into the message list.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedEntry {
    pub sender: ChatSender,
    pub label: String,
    pub timestamp: String,
    /// Raw text, for plain-text surfaces only.
    pub text: String,
    /// Escaped markup; safe to insert as-is.
    pub markup: String,
}

/// Render `msg` under the display name `label`. Both the label and the text
/// are escaped; line breaks in the text become `<br>`.
pub fn render_entry(msg: &ChatMessage, label: &str) -> RenderedEntry {
    let body = escape_for_display(&msg.text).replace('\n', "<br>");
    let markup = format!(
        "<div class=\"message {sender}-message\">\
         <div class=\"message-header\"><strong>{label}</strong> <small>{ts}</small></div>\
         <div class=\"message-content\">{body}</div></div>",
        sender = msg.sender,
        label = escape_for_display(label),
        ts = escape_for_display(&msg.timestamp),
    );
    RenderedEntry {
        sender: msg.sender,
        label: label.to_string(),
        timestamp: msg.timestamp.clone(),
        text: msg.text.clone(),
        markup,
    }
}

/// Append-only record of one chat session's turns.
#[derive(Debug, Default, Clone)]
pub struct Transcript {
    entries: Vec<ChatMessage>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, msg: ChatMessage) {
        self.entries.push(msg);
    }

    pub fn entries(&self) -> &[ChatMessage] {
        &self.entries
    }

    pub fn last(&self) -> Option<&ChatMessage> {
        self.entries.last()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

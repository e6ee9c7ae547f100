//! Rendering capabilities handed to the controllers.
//!
//! Controllers never look elements up themselves; they receive one of these
//! traits and drive it. Methods take `&self` because a view is shared between
//! the controller and its background tasks (the quiz timer, for instance),
//! just as page elements are shared between event handlers.

use crate::api::{AnswerFeedback, Destination};
use crate::chat::RenderedEntry;

/// Element ids and classes of the portal's pages.
pub mod ids {
    pub const QUIZ_TIMER: &str = "quiz-timer";
    pub const HINTS_USED: &str = "hints-used";
    pub const QUIZ_FORM: &str = ".quiz-form";
    pub const SUBMIT_BUTTON: &str = ".btn-submit";
    pub const HINT_BUTTON: &str = ".btn-hint";
    pub const FEEDBACK_CONTAINER: &str = "feedback-container";
    pub const FEEDBACK_ALERT: &str = "feedback-alert";
    pub const FEEDBACK_TEXT: &str = "feedback-text";
    pub const HINT_CONTAINER: &str = "hint-container";
    pub const HINT_TEXT: &str = "hint-text";
    pub const CHAT_MESSAGES: &str = "chat-messages";
    pub const MESSAGE_INPUT: &str = "message-input";
    pub const SEND_BUTTON: &str = ".btn-send";
    pub const ALERT_CONTAINER: &str = "alert-container";
}

/// Label of the quiz submit control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitLabel {
    Idle,
    Busy,
}

impl SubmitLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubmitLabel::Idle => "Submit Answer",
            SubmitLabel::Busy => "Submitting...",
        }
    }
}

/// Glyph of the chat send control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendGlyph {
    Idle,
    Busy,
}

impl SendGlyph {
    pub fn as_str(&self) -> &'static str {
        match self {
            SendGlyph::Idle => "➤",
            SendGlyph::Busy => "…",
        }
    }
}

/// One question page.
pub trait QuizView: Send + Sync {
    /// Value of the checked choice, or the free-text answer. Untrimmed.
    fn answer_value(&self) -> Option<String>;
    /// Confidence slider position, if the page has a slider.
    fn confidence(&self) -> Option<f64>;
    fn set_timer_text(&self, text: &str);
    fn set_hint_counter(&self, count: u32);
    /// Enable or disable every control of the quiz form.
    fn set_controls_enabled(&self, enabled: bool);
    fn set_submit_label(&self, label: SubmitLabel);
    /// Fill and reveal the feedback panel, then scroll it into view.
    fn show_feedback(&self, feedback: &AnswerFeedback);
    fn show_hint(&self, hint: &str, level: Option<&str>);
    fn set_hint_enabled(&self, enabled: bool);
    fn navigate(&self, destination: &Destination);
}

/// One chat page.
pub trait ChatView: Send + Sync {
    fn input_text(&self) -> String;
    fn clear_input(&self);
    fn focus_input(&self);
    fn set_input_enabled(&self, enabled: bool);
    fn set_send_enabled(&self, enabled: bool);
    fn set_send_glyph(&self, glyph: SendGlyph);
    fn append_entry(&self, entry: &RenderedEntry);
    fn show_typing(&self);
    fn remove_typing(&self);
}

/// The progress page: a chart canvas plus page navigation.
pub trait ProgressView: Send + Sync {
    /// Draw a Chart.js-style `config` into the canvas with id `canvas_id`.
    fn render_chart(&self, canvas_id: &str, config: &serde_json::Value);
    fn navigate(&self, destination: &Destination);
}

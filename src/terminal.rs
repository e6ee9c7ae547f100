//! Plain-terminal bindings for the view traits, used by the `edu-portal` binary.
//!
//! Input is pushed in by the read loop in `main.rs`; output goes to stdout
//! with `colored` styling. Markup is never printed: terminal surfaces show the
//! raw text of each entry.

use std::sync::Mutex;

use colored::*;
use tokio::sync::broadcast;

use chrono::{DateTime, Utc};

use crate::api::{AnswerFeedback, AttemptSummary, Destination};
use crate::markup::relative_time;
use crate::chat::{ChatSender, RenderedEntry};
use crate::notify::{BannerEvent, Severity};
use crate::view::{ChatView, ProgressView, QuizView, SendGlyph, SubmitLabel};

fn lock<T>(m: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|e| e.into_inner())
}

#[derive(Default)]
struct QuizState {
    answer: Option<String>,
    confidence: Option<f64>,
    timer: String,
    hints_used: u32,
    controls_enabled: bool,
    hint_enabled: bool,
    destination: Option<Destination>,
}

/// Question page rendered as terminal lines.
pub struct TerminalQuizView {
    state: Mutex<QuizState>,
}

impl Default for TerminalQuizView {
    fn default() -> Self {
        Self::new()
    }
}

impl TerminalQuizView {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(QuizState {
                timer: "0:00".to_string(),
                controls_enabled: true,
                hint_enabled: true,
                ..QuizState::default()
            }),
        }
    }

    pub fn set_answer(&self, answer: impl Into<String>) {
        lock(&self.state).answer = Some(answer.into());
    }

    pub fn set_confidence(&self, confidence: f64) {
        lock(&self.state).confidence = Some(confidence);
    }

    /// Prompt line reflecting the timer and hint counter.
    pub fn prompt(&self) -> String {
        let s = lock(&self.state);
        let hint = if s.hint_enabled { ", ? for a hint" } else { "" };
        format!(
            "[{}] hints used: {}{} > ",
            s.timer.bright_cyan(),
            s.hints_used,
            hint
        )
    }

    pub fn destination(&self) -> Option<Destination> {
        lock(&self.state).destination.clone()
    }

    pub fn controls_enabled(&self) -> bool {
        lock(&self.state).controls_enabled
    }
}

impl QuizView for TerminalQuizView {
    fn answer_value(&self) -> Option<String> {
        lock(&self.state).answer.clone()
    }

    fn confidence(&self) -> Option<f64> {
        lock(&self.state).confidence
    }

    fn set_timer_text(&self, text: &str) {
        lock(&self.state).timer = text.to_string();
    }

    fn set_hint_counter(&self, count: u32) {
        lock(&self.state).hints_used = count;
    }

    fn set_controls_enabled(&self, enabled: bool) {
        lock(&self.state).controls_enabled = enabled;
    }

    fn set_submit_label(&self, label: SubmitLabel) {
        if label == SubmitLabel::Busy {
            println!("{}", label.as_str().dimmed());
        }
    }

    fn show_feedback(&self, feedback: &AnswerFeedback) {
        if feedback.correct {
            println!("{}", "Correct!".bright_green().bold());
        } else {
            println!("{}", "Incorrect.".bright_red().bold());
        }
        if let Some(explanation) = &feedback.explanation {
            println!("  {}", explanation);
        }
    }

    fn show_hint(&self, hint: &str, level: Option<&str>) {
        match level {
            Some(level) => println!("{} ({}) {}", "Hint".bright_yellow().bold(), level, hint),
            None => println!("{} {}", "Hint".bright_yellow().bold(), hint),
        }
    }

    fn set_hint_enabled(&self, enabled: bool) {
        lock(&self.state).hint_enabled = enabled;
    }

    fn navigate(&self, destination: &Destination) {
        println!("{} {}", "→".bright_magenta(), destination);
        lock(&self.state).destination = Some(destination.clone());
    }
}

#[derive(Default)]
struct ChatState {
    input: String,
    input_enabled: bool,
    send_enabled: bool,
}

/// Chat page rendered as terminal lines.
pub struct TerminalChatView {
    state: Mutex<ChatState>,
}

impl Default for TerminalChatView {
    fn default() -> Self {
        Self::new()
    }
}

impl TerminalChatView {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(ChatState {
                input: String::new(),
                input_enabled: true,
                send_enabled: true,
            }),
        }
    }

    pub fn set_input(&self, text: impl Into<String>) {
        lock(&self.state).input = text.into();
    }

    pub fn accepts_input(&self) -> bool {
        let s = lock(&self.state);
        s.input_enabled && s.send_enabled
    }
}

impl ChatView for TerminalChatView {
    fn input_text(&self) -> String {
        lock(&self.state).input.clone()
    }

    fn clear_input(&self) {
        lock(&self.state).input.clear();
    }

    fn focus_input(&self) {}

    fn set_input_enabled(&self, enabled: bool) {
        lock(&self.state).input_enabled = enabled;
    }

    fn set_send_enabled(&self, enabled: bool) {
        lock(&self.state).send_enabled = enabled;
    }

    fn set_send_glyph(&self, _glyph: SendGlyph) {}

    fn append_entry(&self, entry: &RenderedEntry) {
        let label = match entry.sender {
            ChatSender::Student => entry.label.bright_blue().bold(),
            ChatSender::Ai => entry.label.bright_green().bold(),
        };
        println!("{} {} {}", entry.timestamp.dimmed(), label, entry.text);
    }

    fn show_typing(&self) {
        println!("{}", "tutor is typing…".dimmed().italic());
    }

    fn remove_typing(&self) {}
}

/// Progress page: prints the chart config instead of drawing it.
#[derive(Default)]
pub struct TerminalProgressView;

impl ProgressView for TerminalProgressView {
    fn render_chart(&self, canvas_id: &str, config: &serde_json::Value) {
        println!("{} #{}", "chart".bright_cyan().bold(), canvas_id);
        match serde_json::to_string_pretty(config) {
            Ok(s) => println!("{s}"),
            Err(e) => eprintln!("cannot render chart config: {e}"),
        }
    }

    fn navigate(&self, destination: &Destination) {
        println!("{} {}", "→".bright_magenta(), destination);
    }
}

/// One history row: title, score and how long ago the attempt finished.
pub fn attempt_line(attempt: &AttemptSummary, now: DateTime<Utc>) -> String {
    let score = match attempt.score {
        Some(s) => format!("{s:.1}%"),
        None => "ungraded".to_string(),
    };
    let when = attempt
        .completed_at_utc()
        .map(|at| relative_time(at, now))
        .unwrap_or_else(|| attempt.completed_at.clone());
    format!("{}  {}  {}", attempt.quiz_title, score, when)
}

fn styled(message: &str, severity: Severity) -> ColoredString {
    match severity {
        Severity::Success => message.bright_green(),
        Severity::Info => message.bright_cyan(),
        Severity::Warning => message.bright_yellow(),
        Severity::Danger => message.bright_red().bold(),
    }
}

/// Print banners as they appear on `events`. Runs until every notifications
/// handle is dropped and returns how many banners were shown.
///
/// Subscribe before anything can notify; events sent earlier are not replayed.
pub async fn print_banners(mut events: broadcast::Receiver<BannerEvent>) -> usize {
    let mut shown = 0;
    loop {
        match events.recv().await {
            Ok(BannerEvent::Shown(b)) => {
                eprintln!("[{}] {}", b.severity, styled(&b.message, b.severity));
                shown += 1;
            }
            Ok(BannerEvent::Dismissed(_)) => {}
            Err(broadcast::error::RecvError::Lagged(n)) => {
                tracing::debug!(skipped = n, "banner printer lagged");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
    shown
}

//! Recording views and a scripted transport shared by the integration tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::sync::oneshot;

use edu_portal_client::api::*;
use edu_portal_client::chat::{ChatSender, RenderedEntry};
use edu_portal_client::error::TransportError;
use edu_portal_client::transport::PortalTransport;
use edu_portal_client::view::{ChatView, ProgressView, QuizView, SendGlyph, SubmitLabel};

fn lock<T>(m: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|e| e.into_inner())
}

pub fn connect_error() -> TransportError {
    TransportError::Connect {
        url: "http://fake".to_string(),
        detail: "connection refused".to_string(),
    }
}

// ---------------------------------------------------------------------------
// Scripted transport
// ---------------------------------------------------------------------------

pub enum Step<T> {
    Now(Result<T, TransportError>),
    Later(oneshot::Receiver<Result<T, TransportError>>),
}

/// Queue of canned responses for one endpoint.
pub struct Script<T> {
    queue: Mutex<VecDeque<Step<T>>>,
    calls: AtomicUsize,
}

impl<T> Default for Script<T> {
    fn default() -> Self {
        Self {
            queue: Mutex::new(VecDeque::new()),
            calls: AtomicUsize::new(0),
        }
    }
}

impl<T> Script<T> {
    pub fn ok(&self, value: T) {
        lock(&self.queue).push_back(Step::Now(Ok(value)));
    }

    pub fn err(&self, e: TransportError) {
        lock(&self.queue).push_back(Step::Now(Err(e)));
    }

    /// Queue a response the test resolves later through the returned sender.
    pub fn later(&self) -> oneshot::Sender<Result<T, TransportError>> {
        let (tx, rx) = oneshot::channel();
        lock(&self.queue).push_back(Step::Later(rx));
        tx
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    async fn next(&self) -> Result<T, TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let step = lock(&self.queue).pop_front();
        match step {
            Some(Step::Now(r)) => r,
            Some(Step::Later(rx)) => rx.await.unwrap_or_else(|_| Err(connect_error())),
            None => Err(connect_error()),
        }
    }
}

#[derive(Default)]
pub struct FakeTransport {
    pub submit: Script<AnswerFeedback>,
    pub hint: Script<HintResponse>,
    pub chat: Script<ChatSendResponse>,
    pub end: Script<ChatEndResponse>,
    pub history: Script<HistoryResponse>,
    pub follow: Script<FollowRecommendationResponse>,
    pub submitted: Mutex<Vec<SubmitAnswerRequest>>,
    pub hint_ids: Mutex<Vec<String>>,
    pub chat_sent: Mutex<Vec<ChatSendRequest>>,
    pub followed: Mutex<Vec<String>>,
}

impl FakeTransport {
    pub fn submitted(&self) -> Vec<SubmitAnswerRequest> {
        lock(&self.submitted).clone()
    }

    pub fn chat_sent(&self) -> Vec<ChatSendRequest> {
        lock(&self.chat_sent).clone()
    }
}

#[async_trait]
impl PortalTransport for FakeTransport {
    async fn submit_answer(&self, req: &SubmitAnswerRequest) -> Result<AnswerFeedback, TransportError> {
        lock(&self.submitted).push(req.clone());
        self.submit.next().await
    }

    async fn fetch_hint(&self, question_id: &str) -> Result<HintResponse, TransportError> {
        lock(&self.hint_ids).push(question_id.to_string());
        self.hint.next().await
    }

    async fn send_chat(&self, req: &ChatSendRequest) -> Result<ChatSendResponse, TransportError> {
        lock(&self.chat_sent).push(req.clone());
        self.chat.next().await
    }

    async fn end_chat(&self, _req: &ChatEndRequest) -> Result<ChatEndResponse, TransportError> {
        self.end.next().await
    }

    async fn fetch_history(&self, _student_id: &str) -> Result<HistoryResponse, TransportError> {
        self.history.next().await
    }

    async fn follow_recommendation(
        &self,
        req: &FollowRecommendationRequest,
    ) -> Result<FollowRecommendationResponse, TransportError> {
        lock(&self.followed).push(req.action.clone());
        self.follow.next().await
    }
}

// ---------------------------------------------------------------------------
// Quiz view
// ---------------------------------------------------------------------------

pub struct RecordingQuizView {
    pub answer: Mutex<Option<String>>,
    pub confidence: Mutex<Option<f64>>,
    pub timer_texts: Mutex<Vec<String>>,
    pub hint_counter: Mutex<u32>,
    pub controls_enabled: Mutex<bool>,
    pub submit_label: Mutex<SubmitLabel>,
    pub feedback: Mutex<Vec<AnswerFeedback>>,
    pub hints: Mutex<Vec<(String, Option<String>)>>,
    pub hint_enabled: Mutex<bool>,
    pub navigations: Mutex<Vec<Destination>>,
    /// Order of feedback/navigation calls.
    pub events: Mutex<Vec<&'static str>>,
}

impl Default for RecordingQuizView {
    fn default() -> Self {
        Self {
            answer: Mutex::new(None),
            confidence: Mutex::new(None),
            timer_texts: Mutex::new(Vec::new()),
            hint_counter: Mutex::new(0),
            controls_enabled: Mutex::new(true),
            submit_label: Mutex::new(SubmitLabel::Idle),
            feedback: Mutex::new(Vec::new()),
            hints: Mutex::new(Vec::new()),
            hint_enabled: Mutex::new(true),
            navigations: Mutex::new(Vec::new()),
            events: Mutex::new(Vec::new()),
        }
    }
}

impl RecordingQuizView {
    pub fn with_answer(answer: &str) -> Self {
        let v = Self::default();
        *lock(&v.answer) = Some(answer.to_string());
        v
    }

    pub fn timer_texts(&self) -> Vec<String> {
        lock(&self.timer_texts).clone()
    }

    pub fn hint_counter(&self) -> u32 {
        *lock(&self.hint_counter)
    }

    pub fn controls_enabled(&self) -> bool {
        *lock(&self.controls_enabled)
    }

    pub fn submit_label(&self) -> SubmitLabel {
        *lock(&self.submit_label)
    }

    pub fn hint_enabled(&self) -> bool {
        *lock(&self.hint_enabled)
    }

    pub fn navigations(&self) -> Vec<Destination> {
        lock(&self.navigations).clone()
    }

    pub fn feedback(&self) -> Vec<AnswerFeedback> {
        lock(&self.feedback).clone()
    }

    pub fn hints(&self) -> Vec<(String, Option<String>)> {
        lock(&self.hints).clone()
    }

    pub fn events(&self) -> Vec<&'static str> {
        lock(&self.events).clone()
    }
}

impl QuizView for RecordingQuizView {
    fn answer_value(&self) -> Option<String> {
        lock(&self.answer).clone()
    }

    fn confidence(&self) -> Option<f64> {
        *lock(&self.confidence)
    }

    fn set_timer_text(&self, text: &str) {
        lock(&self.timer_texts).push(text.to_string());
    }

    fn set_hint_counter(&self, count: u32) {
        *lock(&self.hint_counter) = count;
    }

    fn set_controls_enabled(&self, enabled: bool) {
        *lock(&self.controls_enabled) = enabled;
    }

    fn set_submit_label(&self, label: SubmitLabel) {
        *lock(&self.submit_label) = label;
    }

    fn show_feedback(&self, feedback: &AnswerFeedback) {
        lock(&self.feedback).push(feedback.clone());
        lock(&self.events).push("feedback");
    }

    fn show_hint(&self, hint: &str, level: Option<&str>) {
        lock(&self.hints).push((hint.to_string(), level.map(str::to_string)));
    }

    fn set_hint_enabled(&self, enabled: bool) {
        *lock(&self.hint_enabled) = enabled;
    }

    fn navigate(&self, destination: &Destination) {
        lock(&self.navigations).push(destination.clone());
        lock(&self.events).push("navigate");
    }
}

// ---------------------------------------------------------------------------
// Chat view
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum ChatItem {
    Entry(RenderedEntry),
    Typing,
}

pub struct RecordingChatView {
    pub input: Mutex<String>,
    pub focus_count: AtomicUsize,
    pub input_enabled: Mutex<bool>,
    pub send_enabled: Mutex<bool>,
    pub glyph: Mutex<SendGlyph>,
    pub items: Mutex<Vec<ChatItem>>,
}

impl Default for RecordingChatView {
    fn default() -> Self {
        Self {
            input: Mutex::new(String::new()),
            focus_count: AtomicUsize::new(0),
            input_enabled: Mutex::new(true),
            send_enabled: Mutex::new(true),
            glyph: Mutex::new(SendGlyph::Idle),
            items: Mutex::new(Vec::new()),
        }
    }
}

impl RecordingChatView {
    pub fn type_text(&self, text: &str) {
        *lock(&self.input) = text.to_string();
    }

    pub fn input(&self) -> String {
        lock(&self.input).clone()
    }

    pub fn items(&self) -> Vec<ChatItem> {
        lock(&self.items).clone()
    }

    pub fn entries(&self) -> Vec<RenderedEntry> {
        lock(&self.items)
            .iter()
            .filter_map(|i| match i {
                ChatItem::Entry(e) => Some(e.clone()),
                ChatItem::Typing => None,
            })
            .collect()
    }

    pub fn typing_shown(&self) -> bool {
        lock(&self.items).iter().any(|i| *i == ChatItem::Typing)
    }

    pub fn send_enabled(&self) -> bool {
        *lock(&self.send_enabled)
    }

    pub fn input_enabled(&self) -> bool {
        *lock(&self.input_enabled)
    }

    pub fn glyph(&self) -> SendGlyph {
        *lock(&self.glyph)
    }

    pub fn focus_count(&self) -> usize {
        self.focus_count.load(Ordering::SeqCst)
    }

    pub fn entries_from(&self, sender: ChatSender) -> Vec<RenderedEntry> {
        self.entries().into_iter().filter(|e| e.sender == sender).collect()
    }
}

impl ChatView for RecordingChatView {
    fn input_text(&self) -> String {
        lock(&self.input).clone()
    }

    fn clear_input(&self) {
        lock(&self.input).clear();
    }

    fn focus_input(&self) {
        self.focus_count.fetch_add(1, Ordering::SeqCst);
    }

    fn set_input_enabled(&self, enabled: bool) {
        *lock(&self.input_enabled) = enabled;
    }

    fn set_send_enabled(&self, enabled: bool) {
        *lock(&self.send_enabled) = enabled;
    }

    fn set_send_glyph(&self, glyph: SendGlyph) {
        *lock(&self.glyph) = glyph;
    }

    fn append_entry(&self, entry: &RenderedEntry) {
        lock(&self.items).push(ChatItem::Entry(entry.clone()));
    }

    fn show_typing(&self) {
        lock(&self.items).push(ChatItem::Typing);
    }

    fn remove_typing(&self) {
        lock(&self.items).retain(|i| *i != ChatItem::Typing);
    }
}

// ---------------------------------------------------------------------------
// Progress view
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct RecordingProgressView {
    pub charts: Mutex<Vec<(String, serde_json::Value)>>,
    pub navigations: Mutex<Vec<Destination>>,
}

impl RecordingProgressView {
    pub fn charts(&self) -> Vec<(String, serde_json::Value)> {
        lock(&self.charts).clone()
    }

    pub fn navigations(&self) -> Vec<Destination> {
        lock(&self.navigations).clone()
    }
}

impl ProgressView for RecordingProgressView {
    fn render_chart(&self, canvas_id: &str, config: &serde_json::Value) {
        lock(&self.charts).push((canvas_id.to_string(), config.clone()));
    }

    fn navigate(&self, destination: &Destination) {
        lock(&self.navigations).push(destination.clone());
    }
}

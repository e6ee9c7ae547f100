use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info, warn};

use super::timer::QuizTimer;
use crate::api::{AnswerFeedback, Destination, HintResponse, SubmitAnswerRequest};
use crate::config::QuizSettings;
use crate::error::QuizError;
use crate::notify::{Notifications, Severity};
use crate::transport::{PortalTransport, RequestSeq};
use crate::view::{QuizView, SubmitLabel};

pub const MISSING_ANSWER_WARNING: &str = "Please select or enter an answer before submitting.";
pub const SUBMIT_FAILED_ERROR: &str = "Error submitting answer. Please try again.";
pub const HINT_FAILED_WARNING: &str = "Could not load a hint right now. Please try again.";

/// The question a page displays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizQuestion {
    pub question_id: String,
    /// 1-based position within the quiz.
    pub question_num: u32,
    pub total_questions: u32,
}

/// Result of a successful submission.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmitOutcome {
    pub feedback: AnswerFeedback,
    pub destination: Destination,
}

#[derive(Debug, Clone, PartialEq)]
pub enum HintOutcome {
    Shown(HintResponse),
    /// This question's hint was already revealed; nothing was requested.
    AlreadyUsed,
    /// A newer hint request was issued while this one was in flight.
    Superseded,
}

/// Drives one question's answer-capture-and-submit cycle.
pub struct QuizController {
    question: QuizQuestion,
    view: Arc<dyn QuizView>,
    transport: Arc<dyn PortalTransport>,
    notifications: Notifications,
    timer: QuizTimer,
    hints_used: AtomicU32,
    hint_revealed: AtomicBool,
    hint_seq: RequestSeq,
    submitting: AtomicBool,
    default_confidence: f64,
    redirect_delay: Duration,
}

impl QuizController {
    /// Bind a freshly displayed question page. Starts the elapsed-time display.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn new(
        question: QuizQuestion,
        view: Arc<dyn QuizView>,
        transport: Arc<dyn PortalTransport>,
        notifications: Notifications,
        settings: &QuizSettings,
    ) -> Self {
        let timer = QuizTimer::start(Arc::clone(&view), Duration::from_millis(settings.tick_interval_ms));
        view.set_hint_counter(0);
        Self {
            question,
            view,
            transport,
            notifications,
            timer,
            hints_used: AtomicU32::new(0),
            hint_revealed: AtomicBool::new(false),
            hint_seq: RequestSeq::new(),
            submitting: AtomicBool::new(false),
            default_confidence: settings.default_confidence,
            redirect_delay: Duration::from_millis(settings.redirect_delay_ms),
        }
    }

    /// Seed the hint counter, e.g. when revisiting a question.
    pub fn with_hints_used(self, count: u32) -> Self {
        self.hints_used.store(count, Ordering::SeqCst);
        self.view.set_hint_counter(count);
        self
    }

    pub fn question(&self) -> &QuizQuestion {
        &self.question
    }

    pub fn hints_used(&self) -> u32 {
        self.hints_used.load(Ordering::SeqCst)
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.timer.elapsed_secs()
    }

    /// Capture the answer, send it, show the verdict and move on.
    ///
    /// A blank answer is rejected with a warning before anything is sent.
    /// While a submission is in flight the form is locked and further calls
    /// return [`QuizError::Busy`]. On transport failure the form is unlocked
    /// so the student can resubmit.
    pub async fn submit_answer(&self) -> Result<SubmitOutcome, QuizError> {
        let answer = match self.view.answer_value() {
            Some(v) if !v.trim().is_empty() => v.trim().to_string(),
            _ => {
                warn!(question_id = %self.question.question_id, "submit without an answer");
                self.notifications.notify(MISSING_ANSWER_WARNING, Severity::Warning);
                return Err(QuizError::Validation(MISSING_ANSWER_WARNING.to_string()));
            }
        };

        if self.submitting.swap(true, Ordering::SeqCst) {
            debug!(question_id = %self.question.question_id, "submission already in flight");
            return Err(QuizError::Busy);
        }

        self.view.set_controls_enabled(false);
        self.view.set_submit_label(SubmitLabel::Busy);

        let confidence = self
            .view
            .confidence()
            .filter(|c| c.is_finite())
            .map(|c| c.clamp(0.0, 1.0))
            .unwrap_or(self.default_confidence);

        let req = SubmitAnswerRequest {
            question_id: self.question.question_id.clone(),
            answer,
            response_time: self.timer.elapsed_secs(),
            hints_used: self.hints_used(),
            confidence,
        };
        debug!(
            question_id = %req.question_id,
            response_time = req.response_time,
            hints_used = req.hints_used,
            confidence = req.confidence,
            "submitting answer"
        );

        match self.transport.submit_answer(&req).await {
            Ok(feedback) => {
                self.view.show_feedback(&feedback);
                let destination =
                    Destination::after_question(self.question.question_num, self.question.total_questions);
                if !self.redirect_delay.is_zero() {
                    tokio::time::sleep(self.redirect_delay).await;
                }
                info!(
                    question_id = %req.question_id,
                    correct = feedback.correct,
                    destination = %destination,
                    "answer recorded"
                );
                self.view.navigate(&destination);
                Ok(SubmitOutcome { feedback, destination })
            }
            Err(e) => {
                error!(error = %e, question_id = %req.question_id, "answer submission failed");
                self.notifications.notify(SUBMIT_FAILED_ERROR, Severity::Danger);
                self.view.set_controls_enabled(true);
                self.view.set_submit_label(SubmitLabel::Idle);
                self.submitting.store(false, Ordering::SeqCst);
                Err(e.into())
            }
        }
    }

    /// Fetch and reveal this question's hint. One hint per question: after the
    /// first success the hint control is disabled and later calls do nothing.
    pub async fn request_hint(&self) -> Result<HintOutcome, QuizError> {
        if self.hint_revealed.load(Ordering::SeqCst) {
            return Ok(HintOutcome::AlreadyUsed);
        }

        let ticket = self.hint_seq.issue();
        match self.transport.fetch_hint(&self.question.question_id).await {
            Ok(hint) => {
                if !self.hint_seq.is_current(ticket) {
                    debug!(ticket, "discarding superseded hint response");
                    return Ok(HintOutcome::Superseded);
                }
                if self.hint_revealed.swap(true, Ordering::SeqCst) {
                    return Ok(HintOutcome::AlreadyUsed);
                }
                self.view.show_hint(&hint.hint, hint.hint_level.as_deref());
                let count = self.hints_used.fetch_add(1, Ordering::SeqCst) + 1;
                self.view.set_hint_counter(count);
                self.view.set_hint_enabled(false);
                info!(question_id = %self.question.question_id, hints_used = count, "hint revealed");
                Ok(HintOutcome::Shown(hint))
            }
            Err(e) => {
                if !self.hint_seq.is_current(ticket) {
                    debug!(ticket, error = %e, "discarding superseded hint failure");
                    return Ok(HintOutcome::Superseded);
                }
                warn!(error = %e, question_id = %self.question.question_id, "hint request failed");
                self.notifications.notify(HINT_FAILED_WARNING, Severity::Warning);
                Err(e.into())
            }
        }
    }
}

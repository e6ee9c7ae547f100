//! # Quiz session
//!
//! One [`QuizController`] per displayed question:
//!
//! 1. **Timer**: a [`QuizTimer`] started with the page writes `m:ss` to the
//!    view every tick.
//! 2. **Hint**: [`QuizController::request_hint`] reveals at most one hint and
//!    bumps the controller-owned hint counter.
//! 3. **Submit**: [`QuizController::submit_answer`] validates, locks the form,
//!    posts the answer, renders the verdict and navigates.
//!
//! ```rust,ignore
//! let quiz = QuizController::new(question, view, transport, notifications, &cfg.quiz);
//! quiz.request_hint().await?;
//! let outcome = quiz.submit_answer().await?;
//! ```

pub mod controller;
pub mod timer;

pub use controller::{HintOutcome, QuizController, QuizQuestion, SubmitOutcome};
pub use timer::{format_elapsed, QuizTimer};

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use crate::view::QuizView;

/// Render whole seconds as `m:ss`.
pub fn format_elapsed(secs: u64) -> String {
    format!("{}:{:02}", secs / 60, secs % 60)
}

/// Elapsed-time counter for one question page.
///
/// The start instant is captured once, when the question is displayed, and
/// handed to the tick task by value. The tick runs until the timer is dropped;
/// there is no pause or resume.
pub struct QuizTimer {
    started: Instant,
    ticker: JoinHandle<()>,
}

impl QuizTimer {
    /// Start ticking into `view` every `interval`.
    ///
    /// Must be called from within a Tokio runtime. A zero interval is raised
    /// to one millisecond.
    pub fn start(view: Arc<dyn QuizView>, interval: Duration) -> Self {
        let interval = interval.max(Duration::from_millis(1));
        let started = Instant::now();
        let ticker = tokio::spawn(tick(view, started, interval));
        Self { started, ticker }
    }

    pub fn started_at(&self) -> Instant {
        self.started
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.started.elapsed().as_secs()
    }
}

impl Drop for QuizTimer {
    fn drop(&mut self) {
        self.ticker.abort();
    }
}

async fn tick(view: Arc<dyn QuizView>, started: Instant, interval: Duration) {
    let mut ticker = tokio::time::interval_at(started + interval, interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    loop {
        ticker.tick().await;
        view.set_timer_text(&format_elapsed(started.elapsed().as_secs()));
    }
}

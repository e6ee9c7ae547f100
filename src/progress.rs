//! Progress page: score history chart, trend and recommendation follow-up.

use std::sync::Arc;

use serde_json::json;
use tracing::{error, info, warn};

use crate::api::{AttemptSummary, Destination, FollowRecommendationRequest};
use crate::error::TransportError;
use crate::notify::{Notifications, Severity};
use crate::transport::PortalTransport;
use crate::view::ProgressView;

/// Recommendation actions the server maps to a specific page. Anything else
/// is still sent and lands on the dashboard.
pub const KNOWN_ACTIONS: [&str; 3] = ["take_quiz", "study_material", "get_help"];

pub const HISTORY_FAILED_ERROR: &str = "Could not load your progress history.";
pub const FOLLOW_FAILED_WARNING: &str = "Could not open that recommendation. Please try again.";

/// Mean score of the three newest graded attempts minus the mean of graded
/// attempts four to six. `history` is newest first; ungraded attempts are
/// skipped.
///
/// Zero with fewer than two graded attempts; with fewer than four there is no
/// older window and the trend is zero as well.
pub fn progress_trend(history: &[AttemptSummary]) -> f64 {
    let scores: Vec<f64> = history.iter().filter_map(|a| a.score).collect();
    if scores.len() < 2 {
        return 0.0;
    }
    let recent = mean(scores.iter().take(3).copied());
    let older = if scores.len() > 3 {
        mean(scores.iter().skip(3).take(3).copied())
    } else {
        recent
    };
    recent - older
}

fn mean(scores: impl Iterator<Item = f64>) -> f64 {
    let (sum, n) = scores.fold((0.0, 0usize), |(s, n), x| (s + x, n + 1));
    if n == 0 {
        0.0
    } else {
        sum / n as f64
    }
}

/// Line-chart config of scores, oldest attempt on the left. Ungraded attempts
/// keep their label and leave a `null` gap in the line.
pub fn chart_config(history: &[AttemptSummary]) -> serde_json::Value {
    let labels: Vec<&str> = history.iter().rev().map(|a| a.quiz_title.as_str()).collect();
    let scores: Vec<Option<f64>> = history.iter().rev().map(|a| a.score).collect();
    json!({
        "type": "line",
        "data": {
            "labels": labels,
            "datasets": [{
                "label": "Quiz Score (%)",
                "data": scores,
                "borderColor": "#4e73df",
                "backgroundColor": "rgba(78, 115, 223, 0.1)",
                "fill": true,
                "tension": 0.3
            }]
        },
        "options": {
            "responsive": true,
            "scales": {
                "y": { "beginAtZero": true, "max": 100 }
            }
        }
    })
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProgressReport {
    pub attempts: Vec<AttemptSummary>,
    pub trend: f64,
    pub chart: serde_json::Value,
}

pub struct ProgressController {
    student_id: String,
    canvas_id: String,
    view: Arc<dyn ProgressView>,
    transport: Arc<dyn PortalTransport>,
    notifications: Notifications,
}

impl ProgressController {
    pub fn new(
        student_id: impl Into<String>,
        canvas_id: impl Into<String>,
        view: Arc<dyn ProgressView>,
        transport: Arc<dyn PortalTransport>,
        notifications: Notifications,
    ) -> Self {
        Self {
            student_id: student_id.into(),
            canvas_id: canvas_id.into(),
            view,
            transport,
            notifications,
        }
    }

    /// Fetch the student's completed attempts and draw the score chart.
    pub async fn load(&self) -> Result<ProgressReport, TransportError> {
        let history = match self.transport.fetch_history(&self.student_id).await {
            Ok(h) => h.history,
            Err(e) => {
                error!(error = %e, student_id = %self.student_id, "history request failed");
                self.notifications.notify(HISTORY_FAILED_ERROR, Severity::Danger);
                return Err(e);
            }
        };

        let chart = chart_config(&history);
        self.view.render_chart(&self.canvas_id, &chart);
        let trend = progress_trend(&history);
        info!(student_id = %self.student_id, attempts = history.len(), trend, "progress loaded");

        Ok(ProgressReport {
            attempts: history,
            trend,
            chart,
        })
    }

    /// Ask the server where `action` leads and go there.
    pub async fn follow_recommendation(&self, action: &str) -> Result<Destination, TransportError> {
        if !KNOWN_ACTIONS.contains(&action) {
            warn!(action, "unknown recommendation action, server will pick a default");
        }
        let req = FollowRecommendationRequest {
            action: action.to_string(),
        };
        match self.transport.follow_recommendation(&req).await {
            Ok(resp) => {
                let dest = Destination::Path(resp.redirect);
                self.view.navigate(&dest);
                Ok(dest)
            }
            Err(e) => {
                warn!(error = %e, action, "follow recommendation failed");
                self.notifications.notify(FOLLOW_FAILED_WARNING, Severity::Warning);
                Err(e)
            }
        }
    }
}

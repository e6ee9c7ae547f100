use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

// -- Quiz ----------------------------------------------------------------------

/// Body of `POST /quiz/submit_answer`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmitAnswerRequest {
    pub question_id: String,
    pub answer: String,
    /// Whole seconds since the question was displayed.
    pub response_time: u64,
    pub hints_used: u32,
    pub confidence: f64,
}

/// Server verdict for one submitted answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerFeedback {
    pub correct: bool,
    #[serde(default)]
    pub explanation: Option<String>,
}

/// Body of `GET /quiz/hint/{question_id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HintResponse {
    pub hint: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint_level: Option<String>,
}

// -- Chat ----------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatSendRequest {
    pub message: String,
    pub session_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatSendResponse {
    pub ai_response: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub student_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatEndRequest {
    pub session_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatEndResponse {
    #[serde(default)]
    pub success: bool,
}

// -- Progress ------------------------------------------------------------------

/// One completed quiz attempt as reported by `GET /students/{id}/history`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttemptSummary {
    pub id: i64,
    pub quiz_title: String,
    /// Unset for attempts the server has not graded.
    #[serde(default)]
    pub score: Option<f64>,
    pub completed_at: String,
    #[serde(default)]
    pub predicted_performance: Option<String>,
    #[serde(default)]
    pub confidence_score: Option<f64>,
    #[serde(default)]
    pub recommendations: Vec<serde_json::Value>,
}

impl AttemptSummary {
    /// `completed_at` as a UTC instant. The server sends naive ISO-8601
    /// timestamps in UTC; RFC 3339 with an offset is accepted as well.
    pub fn completed_at_utc(&self) -> Option<DateTime<Utc>> {
        if let Ok(at) = DateTime::parse_from_rfc3339(&self.completed_at) {
            return Some(at.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(&self.completed_at, "%Y-%m-%dT%H:%M:%S%.f")
            .ok()
            .map(|naive| Utc.from_utc_datetime(&naive))
    }
}

/// Attempts are ordered newest first, as the server returns them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryResponse {
    pub history: Vec<AttemptSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FollowRecommendationRequest {
    pub action: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FollowRecommendationResponse {
    pub redirect: String,
}

// -- Navigation ----------------------------------------------------------------

/// Where the page goes after a successful operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    /// `/quiz/complete`
    QuizComplete,
    /// `/quiz/question/{n}`
    Question(u32),
    /// A server-supplied path, e.g. from a followed recommendation.
    Path(String),
}

impl Destination {
    /// Destination after answering question `question_num` of `total_questions`.
    pub fn after_question(question_num: u32, total_questions: u32) -> Self {
        if question_num == total_questions {
            Destination::QuizComplete
        } else {
            Destination::Question(question_num + 1)
        }
    }

    pub fn path(&self) -> String {
        match self {
            Destination::QuizComplete => "/quiz/complete".to_string(),
            Destination::Question(n) => format!("/quiz/question/{n}"),
            Destination::Path(p) => p.clone(),
        }
    }
}

impl std::fmt::Display for Destination {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.path())
    }
}

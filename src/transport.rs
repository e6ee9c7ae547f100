//! HTTP access to the portal's JSON endpoints.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::api::{
    ChatEndRequest, ChatEndResponse, ChatSendRequest, ChatSendResponse,
    FollowRecommendationRequest, FollowRecommendationResponse, HintResponse, HistoryResponse,
    SubmitAnswerRequest, AnswerFeedback,
};
use crate::config::PortalConfig;
use crate::error::TransportError;

/// The portal server as seen by the controllers.
#[async_trait]
pub trait PortalTransport: Send + Sync {
    async fn submit_answer(&self, req: &SubmitAnswerRequest) -> Result<AnswerFeedback, TransportError>;

    async fn fetch_hint(&self, question_id: &str) -> Result<HintResponse, TransportError>;

    async fn send_chat(&self, req: &ChatSendRequest) -> Result<ChatSendResponse, TransportError>;

    async fn end_chat(&self, req: &ChatEndRequest) -> Result<ChatEndResponse, TransportError>;

    async fn fetch_history(&self, student_id: &str) -> Result<HistoryResponse, TransportError>;

    async fn follow_recommendation(
        &self,
        req: &FollowRecommendationRequest,
    ) -> Result<FollowRecommendationResponse, TransportError>;
}

/// Monotonic ticket source for tagging in-flight requests.
///
/// A response is applied only if its ticket is still the latest one issued;
/// anything older has been superseded and is dropped.
#[derive(Debug, Default)]
pub struct RequestSeq {
    latest: AtomicU64,
}

impl RequestSeq {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&self) -> u64 {
        self.latest.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn is_current(&self, ticket: u64) -> bool {
        self.latest.load(Ordering::SeqCst) == ticket
    }
}

/// [`PortalTransport`] over HTTP. Use [`HttpTransportBuilder`] for construction.
pub struct HttpTransport {
    base_url: String,
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn builder(base_url: impl Into<String>) -> HttpTransportBuilder {
        HttpTransportBuilder::new(base_url)
    }

    pub fn from_config(cfg: &PortalConfig) -> Self {
        let mut b = HttpTransportBuilder::new(cfg.base_url.clone()).connect_timeout(cfg.connect_timeout());
        if let Some(t) = cfg.request_timeout() {
            b = b.request_timeout(t);
        }
        b.build()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Base URL with `segments` appended, each percent-encoded as a single
    /// path segment.
    fn segment_url(&self, segments: &[&str]) -> Result<String, TransportError> {
        let invalid = |detail: String| TransportError::Connect {
            url: self.base_url.clone(),
            detail,
        };
        let mut url = reqwest::Url::parse(&self.base_url).map_err(|e| invalid(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| invalid("base URL cannot carry a path".to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url.into())
    }

    async fn get_json<T: DeserializeOwned>(&self, url: String, field: &str) -> Result<T, TransportError> {
        debug!(%url, "GET");
        let resp = self.client.get(&url).send().await.map_err(|e| TransportError::Connect {
            url: url.clone(),
            detail: e.to_string(),
        })?;
        Self::decode(resp, url, field).await
    }

    async fn post_json<B, T>(&self, path: &str, body: &B, field: &str) -> Result<T, TransportError>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        let url = self.url(path);
        debug!(%url, "POST");
        let resp = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| TransportError::Connect {
                url: url.clone(),
                detail: e.to_string(),
            })?;
        Self::decode(resp, url, field).await
    }

    async fn decode<T: DeserializeOwned>(
        resp: reqwest::Response,
        url: String,
        field: &str,
    ) -> Result<T, TransportError> {
        if !resp.status().is_success() {
            return Err(TransportError::Http {
                status: resp.status().as_u16(),
                url,
            });
        }

        let bytes = resp.bytes().await.map_err(|e| TransportError::Json {
            field: "body".into(),
            detail: e.to_string(),
        })?;

        serde_json::from_slice::<T>(&bytes).map_err(|e| TransportError::Json {
            field: field.into(),
            detail: e.to_string(),
        })
    }
}

#[async_trait]
impl PortalTransport for HttpTransport {
    async fn submit_answer(&self, req: &SubmitAnswerRequest) -> Result<AnswerFeedback, TransportError> {
        self.post_json("/quiz/submit_answer", req, "correct").await
    }

    async fn fetch_hint(&self, question_id: &str) -> Result<HintResponse, TransportError> {
        let url = self.segment_url(&["quiz", "hint", question_id])?;
        self.get_json(url, "hint").await
    }

    async fn send_chat(&self, req: &ChatSendRequest) -> Result<ChatSendResponse, TransportError> {
        self.post_json("/chat/send", req, "ai_response").await
    }

    async fn end_chat(&self, req: &ChatEndRequest) -> Result<ChatEndResponse, TransportError> {
        self.post_json("/chat/end", req, "success").await
    }

    async fn fetch_history(&self, student_id: &str) -> Result<HistoryResponse, TransportError> {
        let url = self.segment_url(&["students", student_id, "history"])?;
        self.get_json(url, "history").await
    }

    async fn follow_recommendation(
        &self,
        req: &FollowRecommendationRequest,
    ) -> Result<FollowRecommendationResponse, TransportError> {
        self.post_json("/recommendations/follow", req, "redirect").await
    }
}

/// Builder for [`HttpTransport`].
pub struct HttpTransportBuilder {
    base_url: String,
    connect_timeout: Duration,
    request_timeout: Option<Duration>,
}

impl HttpTransportBuilder {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            connect_timeout: Duration::from_secs(3),
            request_timeout: None,
        }
    }

    /// Override the TCP connect timeout (default 3 s).
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Bound each request. Unset by default.
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    pub fn build(self) -> HttpTransport {
        // The portal tracks the active attempt and login in a cookie session.
        let mut builder = reqwest::Client::builder()
            .connect_timeout(self.connect_timeout)
            .cookie_store(true);
        if let Some(t) = self.request_timeout {
            builder = builder.timeout(t);
        }
        // Client::builder() can fail in extreme environments; fall back to a
        // default client instead of panicking.
        let client = builder.build().unwrap_or_default();

        HttpTransport {
            base_url: self.base_url,
            client,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_strips_trailing_slash() {
        let t = HttpTransport::builder("http://localhost:5000/").build();
        assert_eq!(t.base_url(), "http://localhost:5000");
        assert_eq!(t.url("/chat/send"), "http://localhost:5000/chat/send");
    }

    #[test]
    fn path_parameters_are_single_segments() {
        let t = HttpTransport::builder("http://localhost:5000").build();
        assert_eq!(
            t.segment_url(&["quiz", "hint", "a/b?c"]).unwrap(),
            "http://localhost:5000/quiz/hint/a%2Fb%3Fc"
        );
        assert_eq!(
            t.segment_url(&["students", "42", "history"]).unwrap(),
            "http://localhost:5000/students/42/history"
        );
    }

    #[test]
    fn path_parameters_keep_base_prefix() {
        let t = HttpTransport::builder("https://school.example/portal/").build();
        assert_eq!(
            t.segment_url(&["quiz", "hint", "7"]).unwrap(),
            "https://school.example/portal/quiz/hint/7"
        );
    }

    #[test]
    fn builder_defaults() {
        let b = HttpTransportBuilder::new("http://x");
        assert_eq!(b.connect_timeout, Duration::from_secs(3));
        assert!(b.request_timeout.is_none());
    }

    #[test]
    fn from_config_uses_base_url() {
        let cfg = PortalConfig {
            base_url: "https://portal.example.edu/".into(),
            ..PortalConfig::default()
        };
        let t = HttpTransport::from_config(&cfg);
        assert_eq!(t.base_url(), "https://portal.example.edu");
    }

    #[test]
    fn request_seq_latest_is_current() {
        let seq = RequestSeq::new();
        let a = seq.issue();
        assert!(seq.is_current(a));
        let b = seq.issue();
        assert!(b > a);
        assert!(!seq.is_current(a));
        assert!(seq.is_current(b));
    }

    #[test]
    fn request_seq_starts_at_one() {
        let seq = RequestSeq::new();
        assert!(!seq.is_current(1));
        assert_eq!(seq.issue(), 1);
    }
}

use std::sync::{Arc, Mutex};

use chrono::Utc;
use tracing::{debug, info, warn};

use super::transcript::{render_entry, ChatMessage, ChatSender, Transcript};
use crate::api::{ChatEndRequest, ChatSendRequest};
use crate::config::ChatSettings;
use crate::error::TransportError;
use crate::notify::{Notifications, Severity};
use crate::transport::PortalTransport;
use crate::view::{ChatView, SendGlyph};

pub const END_FAILED_WARNING: &str = "Could not end the chat session. Please try again.";
pub const SESSION_ENDED_INFO: &str = "Chat session ended.";

/// Per-turn state: `Idle → Sending → Idle`, or `Ended` once the session closes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnState {
    Idle,
    Sending,
    Ended,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TurnOutcome {
    /// The tutor replied.
    Delivered(ChatMessage),
    /// The call failed; the fallback apology was shown in the tutor's place.
    Degraded(ChatMessage),
    /// Blank input, a turn already in flight, or an ended session.
    Ignored,
}

/// Drives the one-at-a-time exchange between a student and the tutor service.
pub struct ChatController {
    session_id: String,
    view: Arc<dyn ChatView>,
    transport: Arc<dyn PortalTransport>,
    notifications: Notifications,
    settings: ChatSettings,
    transcript: Mutex<Transcript>,
    state: Mutex<TurnState>,
}

impl ChatController {
    pub fn new(
        session_id: impl Into<String>,
        view: Arc<dyn ChatView>,
        transport: Arc<dyn PortalTransport>,
        notifications: Notifications,
        settings: ChatSettings,
    ) -> Self {
        Self {
            session_id: session_id.into(),
            view,
            transport,
            notifications,
            settings,
            transcript: Mutex::new(Transcript::new()),
            state: Mutex::new(TurnState::Idle),
        }
    }

    /// Render messages already stored for this session, oldest first.
    pub fn with_history(self, history: impl IntoIterator<Item = ChatMessage>) -> Self {
        for msg in history {
            self.append(msg);
        }
        self
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn state(&self) -> TurnState {
        *self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn transcript(&self) -> Vec<ChatMessage> {
        self.transcript
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .entries()
            .to_vec()
    }

    fn label(&self, sender: ChatSender) -> &str {
        match sender {
            ChatSender::Student => &self.settings.student_label,
            ChatSender::Ai => &self.settings.tutor_label,
        }
    }

    fn append(&self, msg: ChatMessage) {
        let entry = render_entry(&msg, self.label(msg.sender));
        self.transcript
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(msg);
        self.view.append_entry(&entry);
    }

    /// Send the input field's text as one turn.
    ///
    /// A failed call is not an error: the tutor's reply is replaced by the
    /// configured fallback message and the conversation carries on.
    pub async fn send_message(&self) -> TurnOutcome {
        let text = self.view.input_text();
        let text = text.trim();
        if text.is_empty() {
            self.view.focus_input();
            return TurnOutcome::Ignored;
        }

        {
            let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
            if *state != TurnState::Idle {
                debug!(state = ?*state, "send ignored");
                return TurnOutcome::Ignored;
            }
            *state = TurnState::Sending;
        }

        self.view.clear_input();
        self.view.set_send_enabled(false);
        self.view.set_send_glyph(SendGlyph::Busy);
        self.append(ChatMessage::new(ChatSender::Student, text, Utc::now()));
        self.view.show_typing();

        let req = ChatSendRequest {
            message: text.to_string(),
            session_id: self.session_id.clone(),
        };
        debug!(session_id = %self.session_id, chars = req.message.len(), "sending chat message");
        let result = self.transport.send_chat(&req).await;

        self.view.remove_typing();
        let outcome = match result {
            Ok(resp) => {
                let reply = ChatMessage::new(ChatSender::Ai, resp.ai_response, Utc::now());
                self.append(reply.clone());
                info!(session_id = %self.session_id, "tutor replied");
                TurnOutcome::Delivered(reply)
            }
            Err(e) => {
                warn!(error = %e, session_id = %self.session_id, "tutor unavailable, showing fallback");
                let reply = ChatMessage::new(ChatSender::Ai, self.settings.fallback_message.clone(), Utc::now());
                self.append(reply.clone());
                TurnOutcome::Degraded(reply)
            }
        };

        let ended = {
            let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
            if *state == TurnState::Sending {
                *state = TurnState::Idle;
            }
            *state == TurnState::Ended
        };
        if !ended {
            self.view.set_send_enabled(true);
            self.view.set_send_glyph(SendGlyph::Idle);
            self.view.focus_input();
        }
        outcome
    }

    /// Close the session on the server and lock the input.
    ///
    /// Returns `Ok(false)` when the server refused; the session then stays open.
    pub async fn end_session(&self) -> Result<bool, TransportError> {
        if self.state() == TurnState::Ended {
            return Ok(true);
        }
        let req = ChatEndRequest {
            session_id: self.session_id.clone(),
        };
        match self.transport.end_chat(&req).await {
            Ok(resp) if resp.success => {
                *self.state.lock().unwrap_or_else(|e| e.into_inner()) = TurnState::Ended;
                self.view.set_input_enabled(false);
                self.view.set_send_enabled(false);
                self.notifications.notify(SESSION_ENDED_INFO, Severity::Info);
                info!(session_id = %self.session_id, "chat session ended");
                Ok(true)
            }
            Ok(_) => {
                warn!(session_id = %self.session_id, "server refused to end chat session");
                self.notifications.notify(END_FAILED_WARNING, Severity::Warning);
                Ok(false)
            }
            Err(e) => {
                warn!(error = %e, session_id = %self.session_id, "ending chat session failed");
                self.notifications.notify(END_FAILED_WARNING, Severity::Warning);
                Err(e)
            }
        }
    }
}

//! Tutor chat: an append-only transcript and a one-turn-at-a-time controller.

pub mod controller;
pub mod transcript;

pub use controller::{ChatController, TurnOutcome, TurnState};
pub use transcript::{render_entry, ChatMessage, ChatSender, RenderedEntry, Transcript};

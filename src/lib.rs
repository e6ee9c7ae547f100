pub mod api;
pub mod chat;
pub mod cli;
pub mod config;
pub mod error;
pub mod markup;
pub mod notify;
pub mod progress;
pub mod quiz;
pub mod terminal;
pub mod transport;
pub mod view;

pub use chat::{ChatController, TurnOutcome};
pub use config::PortalConfig;
pub use error::{ConfigError, QuizError, TransportError};
pub use notify::{Notifications, Severity};
pub use progress::ProgressController;
pub use quiz::{QuizController, QuizQuestion};
pub use transport::{HttpTransport, PortalTransport};

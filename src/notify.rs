//! Toast-style notifications with per-banner auto-dismissal.
//!
//! ## Design
//! - The banner container is created lazily on the first [`Notifications::notify`]
//!   and reused afterwards.
//! - Each banner gets its own dismissal timer; banners never share one.
//! - Front-ends observe changes through a `tokio::sync::broadcast` channel.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::broadcast;
use uuid::Uuid;

/// Banner styling, mirroring the alert classes the portal's pages use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    Success,
    Info,
    Warning,
    Danger,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Success => write!(f, "success"),
            Severity::Info => write!(f, "info"),
            Severity::Warning => write!(f, "warning"),
            Severity::Danger => write!(f, "danger"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Banner {
    pub id: Uuid,
    pub message: String,
    pub severity: Severity,
}

#[derive(Debug, Clone, PartialEq)]
pub enum BannerEvent {
    Shown(Banner),
    Dismissed(Uuid),
}

#[derive(Default)]
struct Container {
    /// `None` until the first banner is shown.
    banners: Option<Vec<Banner>>,
}

/// Cheaply cloneable handle to the page's notification container.
#[derive(Clone)]
pub struct Notifications {
    container: Arc<Mutex<Container>>,
    dismiss_after: Duration,
    events: broadcast::Sender<BannerEvent>,
}

impl Notifications {
    pub fn new(dismiss_after: Duration) -> Self {
        let (events, _) = broadcast::channel(64);
        Self {
            container: Arc::new(Mutex::new(Container::default())),
            dismiss_after,
            events,
        }
    }

    pub fn dismiss_after(&self) -> Duration {
        self.dismiss_after
    }

    /// Show a banner and schedule its removal.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn notify(&self, message: impl Into<String>, severity: Severity) -> Uuid {
        let banner = Banner {
            id: Uuid::new_v4(),
            message: message.into(),
            severity,
        };
        let id = banner.id;

        {
            let mut c = self.container.lock().unwrap_or_else(|e| e.into_inner());
            c.banners.get_or_insert_with(Vec::new).push(banner.clone());
        }
        tracing::debug!(%id, %severity, message = %banner.message, "notification shown");
        let _ = self.events.send(BannerEvent::Shown(banner));

        let handle = self.clone();
        let delay = self.dismiss_after;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            handle.dismiss(id);
        });

        id
    }

    /// Remove a banner now. Returns `false` if it was already gone.
    pub fn dismiss(&self, id: Uuid) -> bool {
        let removed = {
            let mut c = self.container.lock().unwrap_or_else(|e| e.into_inner());
            match c.banners.as_mut() {
                Some(list) => {
                    let before = list.len();
                    list.retain(|b| b.id != id);
                    list.len() != before
                }
                None => false,
            }
        };
        if removed {
            let _ = self.events.send(BannerEvent::Dismissed(id));
        }
        removed
    }

    /// Banners currently on screen, in insertion order.
    pub fn visible(&self) -> Vec<Banner> {
        let c = self.container.lock().unwrap_or_else(|e| e.into_inner());
        c.banners.clone().unwrap_or_default()
    }

    pub fn container_exists(&self) -> bool {
        let c = self.container.lock().unwrap_or_else(|e| e.into_inner());
        c.banners.is_some()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<BannerEvent> {
        self.events.subscribe()
    }
}

//! Portal client configuration: TOML file, then environment, then CLI flags.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Environment variable that overrides [`PortalConfig::base_url`].
pub const BASE_URL_ENV: &str = "EDU_PORTAL_BASE_URL";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuizSettings {
    /// Period of the elapsed-time display tick.
    pub tick_interval_ms: u64,
    /// Confidence submitted when the view has no slider.
    pub default_confidence: f64,
    /// Pause between rendering feedback and navigating away. Zero keeps the
    /// immediate redirect.
    pub redirect_delay_ms: u64,
}

impl Default for QuizSettings {
    fn default() -> Self {
        Self {
            tick_interval_ms: 1000,
            default_confidence: 0.5,
            redirect_delay_ms: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatSettings {
    pub tutor_label: String,
    pub student_label: String,
    /// Reply shown in place of the tutor's answer when a turn fails.
    pub fallback_message: String,
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            tutor_label: "AI Tutor".to_string(),
            student_label: "You".to_string(),
            fallback_message:
                "Sorry, I'm having trouble connecting right now. Please try again.".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationSettings {
    pub dismiss_after_ms: u64,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self { dismiss_after_ms: 5000 }
    }
}

/// Top-level client configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PortalConfig {
    /// Base URL of the portal server (e.g. `http://127.0.0.1:5000`).
    pub base_url: String,
    /// TCP connection timeout.
    pub connect_timeout_secs: u64,
    /// Per-request timeout. Zero means none: a hung call stays busy until the
    /// transport itself errors.
    pub request_timeout_secs: u64,
    pub quiz: QuizSettings,
    pub chat: ChatSettings,
    pub notifications: NotificationSettings,
}

impl Default for PortalConfig {
    /// - base_url: `http://127.0.0.1:5000`
    /// - connect_timeout: 3 s
    /// - request_timeout: none
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5000".to_string(),
            connect_timeout_secs: 3,
            request_timeout_secs: 0,
            quiz: QuizSettings::default(),
            chat: ChatSettings::default(),
            notifications: NotificationSettings::default(),
        }
    }
}

impl PortalConfig {
    /// Parse a TOML document. Missing keys take their defaults.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let cfg: PortalConfig = toml::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load from `path` when given, otherwise start from defaults; then apply
    /// the [`BASE_URL_ENV`] override.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut cfg = match path {
            Some(p) => {
                let text = std::fs::read_to_string(p).map_err(|source| ConfigError::Io {
                    path: p.display().to_string(),
                    source,
                })?;
                toml::from_str(&text)?
            }
            None => PortalConfig::default(),
        };
        if let Ok(url) = std::env::var(BASE_URL_ENV) {
            if !url.trim().is_empty() {
                cfg.base_url = url;
            }
        }
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = self.base_url.trim();
        if url.is_empty() {
            return Err(ConfigError::Invalid("base_url is empty".into()));
        }
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::Invalid(format!(
                "base_url must start with http:// or https://, got {url}"
            )));
        }
        if !(0.0..=1.0).contains(&self.quiz.default_confidence) {
            return Err(ConfigError::Invalid(format!(
                "quiz.default_confidence must be within [0, 1], got {}",
                self.quiz.default_confidence
            )));
        }
        if self.quiz.tick_interval_ms == 0 {
            return Err(ConfigError::Invalid("quiz.tick_interval_ms must be > 0".into()));
        }
        Ok(())
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        (self.request_timeout_secs > 0).then(|| Duration::from_secs(self.request_timeout_secs))
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.quiz.tick_interval_ms)
    }

    pub fn redirect_delay(&self) -> Duration {
        Duration::from_millis(self.quiz.redirect_delay_ms)
    }

    pub fn dismiss_after(&self) -> Duration {
        Duration::from_millis(self.notifications.dismiss_after_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_config_is_valid() {
        let cfg = PortalConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.tick_interval(), Duration::from_secs(1));
        assert_eq!(cfg.dismiss_after(), Duration::from_secs(5));
        assert_eq!(cfg.redirect_delay(), Duration::ZERO);
        assert!(cfg.request_timeout().is_none());
        assert_eq!(cfg.chat.tutor_label, "AI Tutor");
    }

    #[test]
    fn empty_toml_yields_defaults() {
        let cfg = PortalConfig::from_toml_str("").unwrap();
        assert_eq!(cfg, PortalConfig::default());
    }

    #[test]
    fn partial_toml_overrides_only_given_keys() {
        let cfg = PortalConfig::from_toml_str(
            r#"
            base_url = "https://portal.example.edu"
            request_timeout_secs = 20

            [quiz]
            redirect_delay_ms = 1500
            "#,
        )
        .unwrap();
        assert_eq!(cfg.base_url, "https://portal.example.edu");
        assert_eq!(cfg.request_timeout(), Some(Duration::from_secs(20)));
        assert_eq!(cfg.quiz.redirect_delay_ms, 1500);
        assert_eq!(cfg.quiz.tick_interval_ms, 1000);
        assert_eq!(cfg.notifications.dismiss_after_ms, 5000);
    }

    #[test]
    fn rejects_confidence_out_of_range() {
        let err = PortalConfig::from_toml_str("[quiz]\ndefault_confidence = 1.5\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)), "{err}");
    }

    #[test]
    fn rejects_zero_tick() {
        let err = PortalConfig::from_toml_str("[quiz]\ntick_interval_ms = 0\n").unwrap_err();
        assert!(err.to_string().contains("tick_interval_ms"));
    }

    #[test]
    fn rejects_non_http_base_url() {
        let err = PortalConfig::from_toml_str("base_url = \"ftp://x\"\n").unwrap_err();
        assert!(err.to_string().contains("http://"));
    }

    #[test]
    fn rejects_malformed_toml() {
        let err = PortalConfig::from_toml_str("base_url = ").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn load_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[chat]\ntutor_label = \"Tutor Bot\"").unwrap();
        let cfg = PortalConfig::load(Some(file.path())).unwrap();
        assert_eq!(cfg.chat.tutor_label, "Tutor Bot");
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let err = PortalConfig::load(Some(Path::new("/nonexistent/edu-portal.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}

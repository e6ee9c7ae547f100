//! Display helpers shared by the quiz and chat controllers.

use chrono::{DateTime, Utc};

const MINUTE_MS: i64 = 60_000;
const HOUR_MS: i64 = 3_600_000;
const DAY_MS: i64 = 86_400_000;

/// Neutralize markup-significant characters so `text` renders literally when
/// interpolated into markup.
///
/// Every user- or service-supplied string must pass through here before it
/// becomes part of a transcript entry.
pub fn escape_for_display(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

/// Bucket `past` relative to `now`.
///
/// Instants in the future count as "just now".
pub fn relative_time(past: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let diff = (now - past).num_milliseconds();
    if diff < MINUTE_MS {
        "just now".to_string()
    } else if diff < HOUR_MS {
        format!("{} minutes ago", diff / MINUTE_MS)
    } else if diff < DAY_MS {
        format!("{} hours ago", diff / HOUR_MS)
    } else {
        format!("{} days ago", diff / DAY_MS)
    }
}

/// Wall-clock display string for a transcript entry, e.g. `14:05`.
pub fn clock_time(at: DateTime<Utc>) -> String {
    at.format("%H:%M").to_string()
}

//! Command helper utilities

use std::time::SystemTime;

/// Render a cache timestamp relative to `now`
pub fn format_age(time: SystemTime, now: SystemTime) -> String {
    if time == SystemTime::UNIX_EPOCH {
        return "never".to_string();
    }
    let Ok(elapsed) = now.duration_since(time) else {
        return "in the future".to_string();
    };
    match elapsed.as_secs() {
        s if s < 60 => "just now".to_string(),
        s if s < 3_600 => format!("{}m ago", s / 60),
        s if s < 86_400 => format!("{}h ago", s / 3_600),
        s => format!("{}d ago", s / 86_400),
    }
}

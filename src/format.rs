use chrono::{DateTime, Utc};

const BYTE_UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

/// Formats a byte count with 1024-based units and at most one decimal ("1.5 MB").
pub fn format_bytes(bytes: u64) -> String {
    if bytes == 0 {
        return "0 B".to_string();
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < BYTE_UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let mut rounded = (value * 10.0).round() / 10.0;
    if rounded >= 1024.0 && unit < BYTE_UNITS.len() - 1 {
        rounded = ((rounded / 1024.0) * 10.0).round() / 10.0;
        unit += 1;
    }

    if rounded.fract() == 0.0 {
        format!("{} {}", rounded as u64, BYTE_UNITS[unit])
    } else {
        format!("{:.1} {}", rounded, BYTE_UNITS[unit])
    }
}

pub fn format_relative_time(when: DateTime<Utc>) -> String {
    format_relative_time_at(when, Utc::now())
}

pub fn format_relative_time_at(when: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let duration = now.signed_duration_since(when);
    if duration.num_seconds() < 60 {
        "just now".to_string()
    } else if duration.num_minutes() < 60 {
        format!("{} min ago", duration.num_minutes())
    } else if duration.num_hours() < 24 {
        format!("{} h ago", duration.num_hours())
    } else {
        format!("{} d ago", duration.num_days())
    }
}

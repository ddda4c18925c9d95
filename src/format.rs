// Display formatting shared by the views
use crate::models::BookingStatus;
use chrono::{DateTime, NaiveDateTime};

pub const UNKNOWN: &str = "Unknown";
pub const NOT_AVAILABLE: &str = "N/A";
pub const INVALID_DATE: &str = "Invalid date";

const NAIVE_FORMATS: [&str; 6] = [
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

// Groups the integer part with commas and keeps at most three fraction digits,
// trailing zeros trimmed: 1000000 -> "1,000,000", 1234.5 -> "1,234.5"
pub fn group_thousands(amount: f64) -> String {
    if !amount.is_finite() {
        return NOT_AVAILABLE.to_string();
    }

    let rounded = format!("{:.3}", amount.abs());
    let (int_part, frac_part) = rounded.split_once('.').unwrap_or((rounded.as_str(), ""));
    let frac_part = frac_part.trim_end_matches('0');

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let negative = amount < 0.0 && (int_part != "0" || !frac_part.is_empty());
    let sign = if negative { "-" } else { "" };
    if frac_part.is_empty() {
        format!("{}{}", sign, grouped)
    } else {
        format!("{}{}.{}", sign, grouped, frac_part)
    }
}

pub fn rupiah(amount: f64) -> String {
    format!("Rp {}", group_thousands(amount))
}

pub fn rupiah_or_na(amount: Option<f64>) -> String {
    amount
        .filter(|a| a.is_finite())
        .map_or_else(|| NOT_AVAILABLE.to_string(), rupiah)
}

// "Jun 1, 2025, 10:30 AM" in the timestamp's own offset
pub fn date_time(text: &str) -> String {
    let text = text.trim();
    if text.is_empty() {
        return NOT_AVAILABLE.to_string();
    }

    let parsed = DateTime::parse_from_rfc3339(text)
        .map(|dt| dt.naive_local())
        .ok()
        .or_else(|| {
            NAIVE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        });

    match parsed {
        Some(dt) => dt.format("%b %-d, %Y, %I:%M %p").to_string(),
        None => INVALID_DATE.to_string(),
    }
}

pub fn status_badge(status: BookingStatus) -> &'static str {
    status.label()
}

pub fn or_unknown(value: Option<&str>) -> &str {
    match value {
        Some(v) if !v.is_empty() => v,
        _ => UNKNOWN,
    }
}

pub fn or_na(value: Option<&str>) -> &str {
    match value {
        Some(v) if !v.is_empty() => v,
        _ => NOT_AVAILABLE,
    }
}

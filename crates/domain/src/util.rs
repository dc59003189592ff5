use std::time::{SystemTime, UNIX_EPOCH};

use time::macros::format_description;
use time::{Date, OffsetDateTime, PrimitiveDateTime, format_description::well_known::Rfc3339};

pub fn now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as i64
}

/// Coerces a free-form date value to its calendar date.
///
/// Blank input and input that fails every known format yield `None`; a value
/// carrying a time component is truncated to its date portion.
pub fn coerce_calendar_date(raw: &str) -> Option<Date> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(date) = Date::parse(trimmed, format_description!("[year]-[month]-[day]")) {
        return Some(date);
    }
    if let Ok(value) = OffsetDateTime::parse(trimmed, &Rfc3339) {
        return Some(value.date());
    }
    if let Ok(value) = PrimitiveDateTime::parse(
        trimmed,
        format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]"),
    ) {
        return Some(value.date());
    }
    if let Ok(value) = PrimitiveDateTime::parse(
        trimmed,
        format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"),
    ) {
        return Some(value.date());
    }
    None
}

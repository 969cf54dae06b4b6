//! Reservation field validators.
//!
//! Pure predicates plus normalizing parsers. Dates must be real calendar
//! dates no earlier than today; times are accepted in 24-hour `HH:MM` or
//! 12-hour `h[:mm] am/pm` form and always normalized to `HH:MM`.

use std::sync::LazyLock;

use chrono::{Local, NaiveDate};
use regex::Regex;

/// Smallest accepted party size.
pub const MIN_GUESTS: u32 = 1;
/// Largest accepted party size.
pub const MAX_GUESTS: u32 = 20;
/// Longest accepted reservation name, in characters.
pub const MAX_NAME_CHARS: usize = 100;

static DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("Invalid date regex"));

static TIME_24H_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([01]?\d|2[0-3]):([0-5]\d)$").expect("Invalid 24h time regex")
});

static TIME_12H_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(0?[1-9]|1[0-2])(?::([0-5]\d))?\s?(am|pm)$").expect("Invalid 12h time regex")
});

/// Today's date in the server's local timezone.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Parse a `YYYY-MM-DD` date that is not before `today`.
pub fn parse_date(input: &str, today: NaiveDate) -> Option<NaiveDate> {
    let value = input.trim();
    if !DATE_RE.is_match(value) {
        return None;
    }
    let date = NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()?;
    (date >= today).then_some(date)
}

/// True iff `input` is a well-formed, real, non-past calendar date.
pub fn is_valid_date(input: &str) -> bool {
    parse_date(input, today()).is_some()
}

/// Parse a time of day, returning it normalized to 24-hour `HH:MM`.
pub fn parse_time(input: &str) -> Option<String> {
    let value = input.trim();

    if let Some(caps) = TIME_24H_RE.captures(value) {
        let hour: u32 = caps[1].parse().ok()?;
        return Some(format!("{:02}:{}", hour, &caps[2]));
    }

    let caps = TIME_12H_RE.captures(value)?;
    let hour: u32 = caps[1].parse().ok()?;
    let minute = caps.get(2).map_or("00", |m| m.as_str());
    let pm = caps[3].eq_ignore_ascii_case("pm");
    let hour = match (hour, pm) {
        (12, false) => 0,
        (12, true) => 12,
        (h, false) => h,
        (h, true) => h + 12,
    };
    Some(format!("{:02}:{}", hour, minute))
}

/// True iff `input` is a valid 24-hour or 12-hour time of day.
pub fn is_valid_time(input: &str) -> bool {
    parse_time(input).is_some()
}

/// True iff `n` is an integer in `[MIN_GUESTS, MAX_GUESTS]`.
pub fn is_valid_guests(n: f64) -> bool {
    n.is_finite() && n.fract() == 0.0 && n >= MIN_GUESTS as f64 && n <= MAX_GUESTS as f64
}

/// Parse a party size typed by a user (`"4"`, `" 12 "`).
///
/// Fractions, negatives and anything non-numeric are rejected.
pub fn parse_guests(input: &str) -> Option<u32> {
    let n: f64 = input.trim().parse().ok()?;
    is_valid_guests(n).then_some(n as u32)
}

/// Trim a reservation name and check its length.
pub fn parse_name(input: &str) -> Option<String> {
    let name = input.trim();
    let chars = name.chars().count();
    (chars > 0 && chars <= MAX_NAME_CHARS).then(|| name.to_string())
}

/// True iff `input` is a usable reservation name.
pub fn is_valid_name(input: &str) -> bool {
    parse_name(input).is_some()
}

/// Peak time-range formatting: `"12-14"` / `"12:30-14:00"` into spoken
/// hour phrases, plus start-hour extraction for rule evaluation.
///
/// All functions are fail-soft. Anything that does not parse comes back as
/// the normalized input text (or `None` for the numeric extraction).
use crate::core::normalize::normalize;

/// Characters accepted between the start and end of a range.
pub const RANGE_SEPARATORS: &[char] = &['-', '~', '〜', '～', '－', '–'];
const MINUTE_SEPARATORS: &[char] = &[':', '：'];

const HOUR_SUFFIX: &str = "時";
const MINUTE_SUFFIX: &str = "分";
const RANGE_CONNECTIVE: &str = "から";

/// A parsed `H[:MM]` clock token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockToken {
    pub hour: u32,
    pub minute: u32,
}

impl ClockToken {
    /// Parse either a bare hour (`"12"`) or `HOUR:MINUTE` (`"12:30"`).
    pub fn parse(token: &str) -> Option<ClockToken> {
        let token = token.trim();
        match token.split_once(MINUTE_SEPARATORS) {
            Some((h, m)) => Some(ClockToken {
                hour: parse_number(h)?,
                minute: parse_number(m)?,
            }),
            None => Some(ClockToken {
                hour: parse_number(token)?,
                minute: 0,
            }),
        }
    }

    /// `"12時"` on the hour, `"12時30分"` otherwise.
    pub fn phrase(&self) -> String {
        if self.minute == 0 {
            format!("{}{}", self.hour, HOUR_SUFFIX)
        } else {
            format!("{}{}{}{}", self.hour, HOUR_SUFFIX, self.minute, MINUTE_SUFFIX)
        }
    }
}

fn parse_number(s: &str) -> Option<u32> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    s.parse().ok()
}

fn split_range(raw: &str) -> Option<(String, String)> {
    let range = normalize(raw);
    let (start, end) = range.split_once(RANGE_SEPARATORS)?;
    Some((start.trim().to_string(), end.trim().to_string()))
}

/// `"12-14"` → `"12時から14時"`, `"12:30-14:00"` → `"12時30分から14時"`.
///
/// Text with no separator, or with a token that is not a number, is
/// returned normalized but otherwise unchanged.
pub fn format_range(raw: &str) -> String {
    let Some((start, end)) = split_range(raw) else {
        return normalize(raw);
    };
    match (ClockToken::parse(&start), ClockToken::parse(&end)) {
        (Some(s), Some(e)) => format!("{}{}{}", s.phrase(), RANGE_CONNECTIVE, e.phrase()),
        _ => normalize(raw),
    }
}

/// Only the start of the range, for phrasing like "from X onward".
pub fn format_start(raw: &str) -> String {
    let Some((start, _)) = split_range(raw) else {
        return normalize(raw);
    };
    match ClockToken::parse(&start) {
        Some(token) => token.phrase(),
        None => normalize(raw),
    }
}

/// Leading hour of the range. A range without a separator is read as a
/// single start token. Only the hour digits matter, so `"12:xx-14"` still
/// starts at 12.
pub fn parse_start_hour(raw: &str) -> Option<u32> {
    let range = normalize(raw);
    let start = match range.split_once(RANGE_SEPARATORS) {
        Some((start, _)) => start,
        None => range.as_str(),
    };
    let hour = match start.split_once(MINUTE_SEPARATORS) {
        Some((hour, _)) => hour,
        None => start,
    };
    let hour = hour.trim();
    let digits = hour
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map_or(hour, |(end, _)| &hour[..end]);
    parse_number(digits)
}

//! Server-side reformatting of string values.
//!
//! The configuration API rewrites some values into a canonical spelling
//! (`60 s` may come back as `1 m`). A [`Format`] tells the response mapper
//! which rewrites are harmless.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

static DURATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(\d+(?:\.\d+)?)\s*([A-Za-z]+)\s*$").expect("duration regex is valid")
});

/// Textual format of a string attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Format {
    /// Compared byte for byte
    #[default]
    Plain,
    /// `<number> <unit>` duration
    Duration,
    /// Enumerated value the server may re-case
    CaseInsensitive,
}

impl Format {
    /// True when `a` and `b` name the same value under this format
    pub fn equivalent(&self, a: &str, b: &str) -> bool {
        match self {
            Format::Plain => a == b,
            Format::CaseInsensitive => a.eq_ignore_ascii_case(b),
            Format::Duration => match (parse_duration_millis(a), parse_duration_millis(b)) {
                (Some(x), Some(y)) => x == y,
                _ => a == b,
            },
        }
    }
}

/// Parse a duration in the server's syntax into milliseconds
pub fn parse_duration_millis(input: &str) -> Option<u64> {
    let caps = DURATION_RE.captures(input)?;
    let amount: f64 = caps.get(1)?.as_str().parse().ok()?;
    let factor = unit_millis(caps.get(2)?.as_str())?;
    let millis = amount * factor as f64;
    if !millis.is_finite() || millis < 0.0 {
        return None;
    }
    Some(millis.round() as u64)
}

fn unit_millis(unit: &str) -> Option<u64> {
    let factor = match unit.to_ascii_lowercase().as_str() {
        "ms" | "millisecond" | "milliseconds" => 1,
        "s" | "sec" | "secs" | "second" | "seconds" => 1_000,
        "m" | "min" | "mins" | "minute" | "minutes" => 60_000,
        "h" | "hr" | "hrs" | "hour" | "hours" => 3_600_000,
        "d" | "day" | "days" => 86_400_000,
        "w" | "week" | "weeks" => 604_800_000,
        _ => return None,
    };
    Some(factor)
}

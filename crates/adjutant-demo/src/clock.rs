//! Time zone handling and formatting for the `now` app.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, FixedOffset, Local, Utc};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown time zone {0}")]
pub struct UnknownTimezone(pub String);

/// A zone the clock can report in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Timezone {
    #[default]
    Utc,
    Local,
    Fixed(FixedOffset),
}

impl FromStr for Timezone {
    type Err = UnknownTimezone;

    /// Accepts `UTC`, `Local`, or an offset such as `+02:00` / `-0530`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "UTC" | "utc" | "Z" => Ok(Timezone::Utc),
            "Local" | "local" => Ok(Timezone::Local),
            other => parse_offset(other)
                .map(Timezone::Fixed)
                .ok_or_else(|| UnknownTimezone(other.to_string())),
        }
    }
}

impl fmt::Display for Timezone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Timezone::Utc => f.write_str("UTC"),
            Timezone::Local => f.write_str("Local"),
            Timezone::Fixed(offset) => write!(f, "{}", offset),
        }
    }
}

fn parse_offset(s: &str) -> Option<FixedOffset> {
    let (sign, rest) = match s.as_bytes().first()? {
        b'+' => (1, &s[1..]),
        b'-' => (-1, &s[1..]),
        _ => return None,
    };

    let digits = match rest.len() {
        4 => rest.to_string(),
        5 if rest.as_bytes()[2] == b':' => format!("{}{}", &rest[..2], &rest[3..]),
        _ => return None,
    };
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let hours: i32 = digits[..2].parse().ok()?;
    let minutes: i32 = digits[2..].parse().ok()?;
    if hours > 23 || minutes > 59 {
        return None;
    }

    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

/// `HH:MM`, or `HH:MM:SS` with `seconds`.
pub fn format_time(now: DateTime<Utc>, zone: Timezone, seconds: bool) -> String {
    let format = if seconds { "%H:%M:%S" } else { "%H:%M" };
    format_in(now, zone, format)
}

/// `MM-DD`, or `MM-DD-YYYY` with `year`.
pub fn format_date(now: DateTime<Utc>, zone: Timezone, year: bool) -> String {
    let format = if year { "%m-%d-%Y" } else { "%m-%d" };
    format_in(now, zone, format)
}

fn format_in(now: DateTime<Utc>, zone: Timezone, format: &str) -> String {
    match zone {
        Timezone::Utc => now.format(format).to_string(),
        Timezone::Local => now.with_timezone(&Local).format(format).to_string(),
        Timezone::Fixed(offset) => now.with_timezone(&offset).format(format).to_string(),
    }
}

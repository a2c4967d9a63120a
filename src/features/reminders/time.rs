//! Fire time parsing and display helpers

use chrono::{DateTime, Local, NaiveDateTime, TimeZone};

use super::error::{ReminderError, Result};

/// The only accepted input format, interpreted in the process's local clock
pub const TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Human-readable form of [`TIME_FORMAT`] for prompts
pub const TIME_FORMAT_HINT: &str = "YYYY-MM-DD HH:mm";

/// Parse user input as a local fire time
///
/// The input must match the format exactly (zero-padded fields, no seconds,
/// nothing trailing). Local times that are ambiguous or skipped by a DST
/// transition are rejected.
pub fn parse_fire_time(input: &str) -> Result<DateTime<Local>> {
    let input = input.trim();
    let parse_error = || ReminderError::TimeParseError {
        input: input.to_string(),
    };

    let naive = NaiveDateTime::parse_from_str(input, TIME_FORMAT).map_err(|_| parse_error())?;

    // chrono tolerates unpadded numbers, the format does not
    if naive.format(TIME_FORMAT).to_string() != input {
        return Err(parse_error());
    }

    Local
        .from_local_datetime(&naive)
        .single()
        .ok_or_else(parse_error)
}

/// Format a fire time the same way users type it
pub fn format_fire_time(time: &DateTime<Local>) -> String {
    time.format(TIME_FORMAT).to_string()
}

/// Format a duration in seconds into a human-readable string
pub fn format_duration(seconds: i64) -> String {
    let seconds = seconds.max(0);
    if seconds < 60 {
        format!("{} second{}", seconds, plural(seconds))
    } else if seconds < 3600 {
        let mins = seconds / 60;
        format!("{} minute{}", mins, plural(mins))
    } else if seconds < 86400 {
        let hours = seconds / 3600;
        let mins = (seconds % 3600) / 60;
        if mins > 0 {
            format!("{} hour{} {} minute{}", hours, plural(hours), mins, plural(mins))
        } else {
            format!("{} hour{}", hours, plural(hours))
        }
    } else {
        let days = seconds / 86400;
        let hours = (seconds % 86400) / 3600;
        if hours > 0 {
            format!("{} day{} {} hour{}", days, plural(days), hours, plural(hours))
        } else {
            format!("{} day{}", days, plural(days))
        }
    }
}

fn plural(n: i64) -> &'static str {
    if n == 1 {
        ""
    } else {
        "s"
    }
}

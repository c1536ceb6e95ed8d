// Schedule expression validation and next-occurrence calculation
//
// The launcher validates the configured cron expression before handing it to
// the scheduler process, so a typo surfaces at startup instead of inside the
// scheduler's own parser. The crontab file always receives the operator's
// original text; normalization below exists only for validation and preview.

use crate::errors::ScheduleError;
use chrono::{DateTime, Utc};
use cron::Schedule as CronSchedule;
use std::str::FromStr;

/// Number of fields in a standard cron expression (minute through day-of-week).
const STANDARD_FIELDS: usize = 5;

/// Normalize a schedule expression into the form the parser accepts.
///
/// Accepted inputs:
/// - `@`-descriptors (`@hourly`, `@daily`, ...), passed through as-is
/// - five-field expressions, prefixed with a `0` seconds field
/// - six- or seven-field expressions (seconds and optional year), as-is
///
/// The parser numbers days of week 1-7, while five-field crontabs allow `0`
/// for Sunday; a whole-field `0` in the day-of-week position is rewritten to
/// `7` so such expressions still validate.
pub fn normalize_expression(expression: &str) -> Result<String, ScheduleError> {
    let trimmed = expression.trim();

    if trimmed.starts_with('@') {
        return Ok(trimmed.to_string());
    }

    let mut fields: Vec<&str> = trimmed.split_whitespace().collect();
    match fields.len() {
        STANDARD_FIELDS => {
            if fields[4] == "0" {
                fields[4] = "7";
            }
            Ok(format!("0 {}", fields.join(" ")))
        }
        6 | 7 => Ok(fields.join(" ")),
        n => Err(ScheduleError::InvalidFieldCount {
            expression: expression.to_string(),
            fields: n,
        }),
    }
}

/// Parse and validate a cron expression.
pub fn parse_cron_expression(expression: &str) -> Result<CronSchedule, ScheduleError> {
    let normalized = normalize_expression(expression)?;

    CronSchedule::from_str(&normalized).map_err(|e| ScheduleError::InvalidCronExpression {
        expression: expression.to_string(),
        reason: e.to_string(),
    })
}

/// Validate a schedule expression without keeping the parsed form.
pub fn validate_expression(expression: &str) -> Result<(), ScheduleError> {
    parse_cron_expression(expression).map(|_| ())
}

/// Calculate the next `count` occurrences of the expression in UTC.
///
/// Used for the startup log line; the scheduler process is the authority on
/// when the job actually fires.
pub fn upcoming(expression: &str, count: usize) -> Result<Vec<DateTime<Utc>>, ScheduleError> {
    let schedule = parse_cron_expression(expression)?;
    Ok(schedule.upcoming(Utc).take(count).collect())
}

/// Calculate the single next occurrence of the expression in UTC.
pub fn next_occurrence(expression: &str) -> Result<DateTime<Utc>, ScheduleError> {
    upcoming(expression, 1)?
        .into_iter()
        .next()
        .ok_or_else(|| ScheduleError::NoNextExecution(expression.to_string()))
}

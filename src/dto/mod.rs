use std::time::SystemTime;
use time::{OffsetDateTime, format_description::well_known::Rfc3339, macros::format_description};

pub mod auth;
pub mod game;
pub mod health;
pub mod insights;
pub mod mental;
pub mod validation;

fn format_system_time(time: SystemTime) -> String {
    OffsetDateTime::from(time)
        .format(&Rfc3339)
        .unwrap_or_else(|_| "invalid-timestamp".into())
}

/// Calendar day (`YYYY-MM-DD`, UTC) of a timestamp.
fn format_day(time: SystemTime) -> String {
    OffsetDateTime::from(time)
        .format(format_description!("[year]-[month]-[day]"))
        .unwrap_or_else(|_| "invalid-date".into())
}

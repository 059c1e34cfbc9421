//! Field-level validation of raw game and mental state payloads.
//!
//! Payloads are inspected as raw JSON objects rather than typed structs so type mismatches
//! (`"goals": "two"`) surface as field errors instead of generic deserialization failures.
//! Validation is fail-fast: the first failing field is reported.

use std::time::SystemTime;

use serde_json::{Map, Value};
use thiserror::Error;
use time::{Date, OffsetDateTime, format_description::well_known::Rfc3339, macros::format_description};
use validator::ValidationError;

use crate::dao::models::{GamePatch, GameResult, HomeAway, MentalStatePatch};

/// Raw JSON object received from a client.
pub type FieldBag = Map<String, Value>;

/// Maximum number of characters accepted in mental state notes.
pub const MAX_NOTES_LENGTH: usize = 500;

const MISSING_GAME_FIELDS: &str = "Date, opponent, location, and result are required";
const MISSING_MENTAL_FIELDS: &str = "All mental state fields except notes are required";

/// Whether a payload creates a record (required fields enforced) or patches one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationMode {
    Create,
    Patch,
}

/// First validation failure found in a payload.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{}", self.message())]
pub struct FieldError {
    /// Wire name of the offending field (`"payload"` when several are missing).
    pub field: &'static str,
    pub error: ValidationError,
}

impl FieldError {
    fn new(field: &'static str, error: ValidationError) -> Self {
        Self { field, error }
    }

    /// Human readable message returned to clients.
    pub fn message(&self) -> String {
        self.error
            .message
            .as_ref()
            .map(|message| message.to_string())
            .unwrap_or_else(|| self.error.code.to_string())
    }
}

/// Fully validated payload for a new game; optional statistics default to zero.
#[derive(Debug, Clone, PartialEq)]
pub struct NewGame {
    pub date: SystemTime,
    pub opponent: String,
    pub home_away: HomeAway,
    pub result: GameResult,
    pub goals: u32,
    pub assists: u32,
    pub shots: u32,
    pub plus_minus: i32,
    pub ice_time: f64,
}

/// Fully validated payload for a new (or replacing) mental state.
#[derive(Debug, Clone, PartialEq)]
pub struct NewMentalState {
    pub confidence: u8,
    pub sleep_hours: f64,
    pub sleep_quality: u8,
    pub stress_level: u8,
    pub physical_energy: u8,
    pub notes: Option<String>,
}

fn invalid(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(message.into());
    err
}

/// Look up a field, treating `null` as absent.
fn provided<'a>(input: &'a FieldBag, field: &str) -> Option<&'a Value> {
    input.get(field).filter(|value| !value.is_null())
}

/// Whether a required text field is absent, `null` or an empty string.
fn is_blank(input: &FieldBag, field: &str) -> bool {
    match input.get(field) {
        None | Some(Value::Null) => true,
        Some(Value::String(text)) => text.is_empty(),
        Some(_) => false,
    }
}

fn whole_number(value: &Value) -> Option<i64> {
    value.as_i64().or_else(|| {
        value
            .as_f64()
            .filter(|number| number.is_finite() && number.fract() == 0.0)
            .filter(|number| *number >= i64::MIN as f64 && *number <= i64::MAX as f64)
            .map(|number| number as i64)
    })
}

fn count(value: &Value, code: &'static str, message: &'static str) -> Result<u32, ValidationError> {
    whole_number(value)
        .and_then(|number| u32::try_from(number).ok())
        .ok_or_else(|| invalid(code, message))
}

fn plus_minus(value: &Value) -> Result<i32, ValidationError> {
    whole_number(value)
        .and_then(|number| i32::try_from(number).ok())
        .ok_or_else(|| invalid("plus_minus_type", "Plus/Minus must be a number"))
}

fn ice_time(value: &Value) -> Result<f64, ValidationError> {
    value
        .as_f64()
        .filter(|minutes| minutes.is_finite() && *minutes >= 0.0)
        .ok_or_else(|| invalid("ice_time_range", "Ice time must be a non-negative number"))
}

fn home_away(value: &Value) -> Result<HomeAway, ValidationError> {
    value
        .as_str()
        .and_then(HomeAway::parse)
        .ok_or_else(|| invalid("home_away_enum", "Location must be 'home' or 'away'"))
}

fn game_result(value: &Value) -> Result<GameResult, ValidationError> {
    value
        .as_str()
        .and_then(GameResult::parse)
        .ok_or_else(|| invalid("result_enum", "Result must be 'win' or 'loss'"))
}

fn opponent(value: &Value) -> Result<String, ValidationError> {
    value
        .as_str()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_owned)
        .ok_or_else(|| invalid("opponent_empty", "Opponent must be a non-empty string"))
}

/// Parse a game date given either as `YYYY-MM-DD` (UTC midnight) or RFC 3339.
fn parse_game_date(raw: &str) -> Option<OffsetDateTime> {
    if let Ok(date) = Date::parse(raw, format_description!("[year]-[month]-[day]")) {
        return Some(date.midnight().assume_utc());
    }
    OffsetDateTime::parse(raw, &Rfc3339).ok()
}

fn game_date(value: &Value, now: OffsetDateTime) -> Result<SystemTime, ValidationError> {
    let date = value
        .as_str()
        .and_then(parse_game_date)
        .ok_or_else(|| invalid("date_format", "Invalid date format"))?;

    if date > now {
        return Err(invalid("date_future", "Game date cannot be in the future"));
    }
    Ok(date.into())
}

/// Score on the 1–10 scale shared by confidence, sleep quality, stress and energy.
fn score(value: &Value, code: &'static str, message: &'static str) -> Result<u8, ValidationError> {
    whole_number(value)
        .filter(|number| (1..=10).contains(number))
        .and_then(|number| u8::try_from(number).ok())
        .ok_or_else(|| invalid(code, message))
}

fn sleep_hours(value: &Value) -> Result<f64, ValidationError> {
    value
        .as_f64()
        .filter(|hours| (0.0..=24.0).contains(hours))
        .ok_or_else(|| invalid("sleep_hours_range", "Sleep hours must be between 0 and 24"))
}

/// `None` clears the notes; empty text is stored as no notes.
fn notes(value: &Value) -> Result<Option<String>, ValidationError> {
    match value {
        Value::Null => Ok(None),
        Value::String(text) if text.is_empty() => Ok(None),
        Value::String(text) if text.chars().count() > MAX_NOTES_LENGTH => Err(invalid(
            "notes_length",
            "Notes must be 500 characters or less",
        )),
        Value::String(text) => Ok(Some(text.clone())),
        _ => Err(invalid("notes_type", "Notes must be a string")),
    }
}

/// Validate and map the `field` entry of `input`; absent and `null` fields are skipped.
fn check<T>(
    input: &FieldBag,
    field: &'static str,
    parse: impl FnOnce(&Value) -> Result<T, ValidationError>,
) -> Result<Option<T>, FieldError> {
    provided(input, field)
        .map(|value| parse(value).map_err(|err| FieldError::new(field, err)))
        .transpose()
}

/// Validate a game payload.
///
/// In [`ValidationMode::Create`] `date`, `opponent`, `homeAway` and `result` are required.
/// In [`ValidationMode::Patch`] only supplied fields are checked; `null` counts as not
/// supplied.
pub fn validate_game_fields(input: &FieldBag, mode: ValidationMode) -> Result<GamePatch, FieldError> {
    if mode == ValidationMode::Create
        && ["date", "opponent", "homeAway", "result"]
            .iter()
            .any(|field| is_blank(input, field))
    {
        return Err(FieldError::new(
            "payload",
            invalid("required", MISSING_GAME_FIELDS),
        ));
    }

    let now = OffsetDateTime::now_utc();

    let home_away = check(input, "homeAway", home_away)?;
    let result = check(input, "result", game_result)?;
    let goals = check(input, "goals", |value| {
        count(value, "goals_range", "Goals must be a non-negative number")
    })?;
    let assists = check(input, "assists", |value| {
        count(value, "assists_range", "Assists must be a non-negative number")
    })?;
    let shots = check(input, "shots", |value| {
        count(value, "shots_range", "Shots must be a non-negative number")
    })?;
    let plus_minus = check(input, "plusMinus", plus_minus)?;
    let ice_time = check(input, "iceTime", ice_time)?;
    let opponent = check(input, "opponent", opponent)?;
    let date = check(input, "date", |value| game_date(value, now))?;

    Ok(GamePatch {
        date,
        opponent,
        home_away,
        result,
        goals,
        assists,
        shots,
        plus_minus,
        ice_time,
    })
}

/// Validate a creation payload and apply the zero defaults for omitted statistics.
pub fn validate_new_game(input: &FieldBag) -> Result<NewGame, FieldError> {
    let patch = validate_game_fields(input, ValidationMode::Create)?;
    let (Some(date), Some(opponent), Some(home_away), Some(result)) =
        (patch.date, patch.opponent, patch.home_away, patch.result)
    else {
        return Err(FieldError::new(
            "payload",
            invalid("required", MISSING_GAME_FIELDS),
        ));
    };

    Ok(NewGame {
        date,
        opponent,
        home_away,
        result,
        goals: patch.goals.unwrap_or(0),
        assists: patch.assists.unwrap_or(0),
        shots: patch.shots.unwrap_or(0),
        plus_minus: patch.plus_minus.unwrap_or(0),
        ice_time: patch.ice_time.unwrap_or(0.0),
    })
}

/// Validate a mental state payload.
///
/// In [`ValidationMode::Create`] the five numeric fields are required and `null` counts as
/// missing. `notes` is always optional; in a patch `null` clears it.
pub fn validate_mental_state_fields(
    input: &FieldBag,
    mode: ValidationMode,
) -> Result<MentalStatePatch, FieldError> {
    const REQUIRED: [&str; 5] = [
        "confidence",
        "sleepHours",
        "sleepQuality",
        "stressLevel",
        "physicalEnergy",
    ];

    if mode == ValidationMode::Create
        && REQUIRED
            .iter()
            .any(|field| provided(input, field).is_none())
    {
        return Err(FieldError::new(
            "payload",
            invalid("required", MISSING_MENTAL_FIELDS),
        ));
    }

    let confidence = check(input, "confidence", |value| {
        score(value, "confidence_range", "Confidence must be between 1 and 10")
    })?;
    let sleep_hours = check(input, "sleepHours", sleep_hours)?;
    let sleep_quality = check(input, "sleepQuality", |value| {
        score(value, "sleep_quality_range", "Sleep quality must be between 1 and 10")
    })?;
    let stress_level = check(input, "stressLevel", |value| {
        score(value, "stress_level_range", "Stress level must be between 1 and 10")
    })?;
    let physical_energy = check(input, "physicalEnergy", |value| {
        score(value, "physical_energy_range", "Physical energy must be between 1 and 10")
    })?;
    let notes = input
        .get("notes")
        .map(|value| notes(value).map_err(|err| FieldError::new("notes", err)))
        .transpose()?;

    Ok(MentalStatePatch {
        confidence,
        sleep_hours,
        sleep_quality,
        stress_level,
        physical_energy,
        notes,
    })
}

/// Validate a complete mental state used for creation or full replacement.
pub fn validate_new_mental_state(input: &FieldBag) -> Result<NewMentalState, FieldError> {
    let patch = validate_mental_state_fields(input, ValidationMode::Create)?;
    let (
        Some(confidence),
        Some(sleep_hours),
        Some(sleep_quality),
        Some(stress_level),
        Some(physical_energy),
    ) = (
        patch.confidence,
        patch.sleep_hours,
        patch.sleep_quality,
        patch.stress_level,
        patch.physical_energy,
    )
    else {
        return Err(FieldError::new(
            "payload",
            invalid("required", MISSING_MENTAL_FIELDS),
        ));
    };

    Ok(NewMentalState {
        confidence,
        sleep_hours,
        sleep_quality,
        stress_level,
        physical_energy,
        notes: patch.notes.flatten(),
    })
}

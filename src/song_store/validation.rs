//! Field-level validation applied before any song is written.
//!
//! Checks run in a fixed order: required fields, then the release date, then
//! the link. The first failing check is reported.

use chrono::NaiveDate;
use reqwest::Url;
use thiserror::Error;

use super::models::NewSong;

const RELEASE_DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("field '{field}' is required but was empty")]
    EmptyField { field: &'static str },

    #[error("invalid release_date '{0}', expected YYYY-MM-DD")]
    InvalidReleaseDate(String),

    #[error("invalid URL format in link '{0}'")]
    InvalidLink(String),
}

impl ValidationError {
    /// Name of the field that failed validation.
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::EmptyField { field } => field,
            ValidationError::InvalidReleaseDate(_) => "release_date",
            ValidationError::InvalidLink(_) => "link",
        }
    }
}

pub type ValidationResult<T> = Result<T, ValidationError>;

pub fn validate_song(song: &NewSong) -> ValidationResult<()> {
    if song.group_name.is_empty() {
        return Err(ValidationError::EmptyField {
            field: "group_name",
        });
    }
    if song.song_name.is_empty() {
        return Err(ValidationError::EmptyField { field: "song_name" });
    }
    validate_release_date(&song.release_date)?;
    validate_link(&song.link)
}

/// Accepts exactly `YYYY-MM-DD` naming a real calendar day.
pub fn validate_release_date(value: &str) -> ValidationResult<()> {
    let bytes = value.as_bytes();
    let well_formed = bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        });
    if !well_formed || NaiveDate::parse_from_str(value, RELEASE_DATE_FORMAT).is_err() {
        return Err(ValidationError::InvalidReleaseDate(value.to_string()));
    }
    Ok(())
}

/// Accepts an absolute URI (`https://...`, `mailto:...`) or an absolute
/// path reference (`/lyrics/42`). Spaces are allowed inside the path but not
/// around the value or in the host.
pub fn validate_link(value: &str) -> ValidationResult<()> {
    let invalid = || ValidationError::InvalidLink(value.to_string());

    if value.is_empty() || value.trim() != value || value.chars().any(|c| c.is_ascii_control()) {
        return Err(invalid());
    }

    if value.starts_with('/') {
        // Resolve against a placeholder origin so path syntax gets checked too.
        let base = Url::parse("http://localhost/").map_err(|_| invalid())?;
        base.join(value).map_err(|_| invalid())?;
        return Ok(());
    }

    Url::parse(value).map(|_| ()).map_err(|_| invalid())
}

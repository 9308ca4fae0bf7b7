//! Simple key formats.
//!
//! Dates are stored as `yyyy/mm/dd` and numbers as two-digit strings, so
//! that the engine's ordinal key order is also chronological and numeric
//! order.

use encore_foundation::key::PATH_SEPARATOR;
use encore_foundation::{EntityType, Error, Result};

use crate::types::{CREDIT, EVENT, NEWSLETTER, PIECE, SET};

/// How a type's simple key is written.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyFormat {
    /// Free text.
    Name,
    /// A calendar date, `yyyy/mm/dd`.
    Date,
    /// A number from 1 to [`MAX_NUMBER`], zero-padded to two digits.
    Number,
}

/// Largest set, piece or credit number. Keys are two digits wide.
pub const MAX_NUMBER: u32 = 99;

/// The key format of an archive type.
#[must_use]
pub fn format_of(ty: EntityType) -> KeyFormat {
    if ty == EVENT || ty == NEWSLETTER {
        KeyFormat::Date
    } else if ty == SET || ty == PIECE || ty == CREDIT {
        KeyFormat::Number
    } else {
        KeyFormat::Name
    }
}

/// Normalizes user input into the stored simple key for a type.
///
/// Names are trimmed, dates are validated and numbers are zero-padded.
///
/// # Errors
///
/// Returns a `Command` error if a date or number is malformed, or if a name
/// contains the path separator.
pub fn normalize(ty: EntityType, input: &str) -> Result<String> {
    match format_of(ty) {
        KeyFormat::Name if input.contains(PATH_SEPARATOR) => Err(Error::command(format!(
            "'{input}' is not a valid {ty} name: '{PATH_SEPARATOR}' separates key paths"
        ))),
        KeyFormat::Name => Ok(input.trim().to_string()),
        KeyFormat::Date => date_key(input),
        KeyFormat::Number => parse_number(input).map(number_key),
    }
}

/// Formats a number as a two-digit key (`1` becomes `01`).
#[must_use]
pub fn number_key(n: u32) -> String {
    format!("{n:02}")
}

/// Parses a number key such as `1` or `01`.
///
/// # Errors
///
/// Returns a `Command` error for anything but an integer from 1 to
/// [`MAX_NUMBER`].
pub fn parse_number(input: &str) -> Result<u32> {
    match input.trim().parse::<u32>() {
        Ok(n) if (1..=MAX_NUMBER).contains(&n) => Ok(n),
        _ => Err(Error::command(format!(
            "'{input}' is not a valid number: expected 1 to {MAX_NUMBER}"
        ))),
    }
}

/// Validates a date and returns it as `yyyy/mm/dd`.
///
/// `-` is accepted as a separator in place of `/`.
///
/// # Errors
///
/// Returns a `Command` error if the input is not a real calendar date.
pub fn date_key(input: &str) -> Result<String> {
    let invalid = || Error::command(format!("'{input}' is not a valid date: expected yyyy/mm/dd"));

    let parts: Vec<&str> = input.trim().split(['/', '-']).collect();
    let [year, month, day] = parts.as_slice() else {
        return Err(invalid());
    };
    if year.len() != 4 || month.len() > 2 || day.len() > 2 {
        return Err(invalid());
    }
    let year: u32 = year.parse().map_err(|_| invalid())?;
    let month: u32 = month.parse().map_err(|_| invalid())?;
    let day: u32 = day.parse().map_err(|_| invalid())?;
    if !(1..=12).contains(&month) || day == 0 || day > days_in_month(year, month) {
        return Err(invalid());
    }
    Ok(format!("{year:04}/{month:02}/{day:02}"))
}

fn days_in_month(year: u32, month: u32) -> u32 {
    match month {
        2 if year % 4 == 0 && (year % 100 != 0 || year % 400 == 0) => 29,
        2 => 28,
        4 | 6 | 9 | 11 => 30,
        _ => 31,
    }
}

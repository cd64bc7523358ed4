// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Translation of vendor readings into canonical attributes.
//!
//! Each backend has its own canonicalizer:
//!
//! - [`eds`]: field records of the EDS `details.xml` document
//! - [`owfs`]: per-path text values read from owserver
//!
//! Both share the numeric rules defined here: temperatures are converted to
//! Celsius and rounded to one decimal, humidity and humidex are rounded to
//! whole numbers.

pub mod eds;
pub mod owfs;

use crate::error::ParseError;

/// Lowest temperature accepted as a valid reading, in Celsius.
pub const MIN_TEMPERATURE: f64 = -100.0;
/// Highest temperature accepted as a valid reading, in Celsius.
pub const MAX_TEMPERATURE: f64 = 100.0;

const TEMPERATURE_PRECISION: i32 = 1;
const HUMIDITY_PRECISION: i32 = 0;

/// Temperature scale reported with a reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TemperatureUnit {
    /// Degrees Celsius.
    #[default]
    Celsius,
    /// Degrees Fahrenheit.
    Fahrenheit,
}

impl TemperatureUnit {
    /// Interprets a vendor unit tag. Anything unrecognized is Celsius.
    #[must_use]
    pub fn from_tag(tag: Option<&str>) -> Self {
        match tag.map(str::trim) {
            Some("Fahrenheit" | "Farenheight" | "F") => Self::Fahrenheit,
            _ => Self::Celsius,
        }
    }
}

/// Rounds to `precision` decimal places, halves toward positive infinity.
#[must_use]
pub fn round_to(value: f64, precision: i32) -> f64 {
    let factor = 10f64.powi(precision);
    (value * factor + 0.5).floor() / factor
}

/// Parses vendor numeric text.
///
/// # Errors
///
/// Returns [`ParseError::InvalidValue`] when the text is not a number.
pub fn parse_number(field: &str, text: &str) -> Result<f64, ParseError> {
    let value: f64 = text.trim().parse().map_err(|e: std::num::ParseFloatError| {
        ParseError::InvalidValue {
            field: field.to_string(),
            message: format!("{text:?}: {e}"),
        }
    })?;
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ParseError::InvalidValue {
            field: field.to_string(),
            message: format!("{text:?} is not finite"),
        })
    }
}

/// Canonical temperature in Celsius, one decimal place.
///
/// # Errors
///
/// Returns an error if the text is not numeric or the converted value lies
/// outside [`MIN_TEMPERATURE`]..=[`MAX_TEMPERATURE`].
pub fn temperature(field: &str, text: &str, unit: TemperatureUnit) -> Result<f64, ParseError> {
    let raw = parse_number(field, text)?;
    let celsius = match unit {
        TemperatureUnit::Celsius => raw,
        TemperatureUnit::Fahrenheit => (raw - 32.0) * 5.0 / 9.0,
    };
    let value = round_to(celsius, TEMPERATURE_PRECISION);
    if (MIN_TEMPERATURE..=MAX_TEMPERATURE).contains(&value) {
        Ok(value)
    } else {
        Err(ParseError::InvalidValue {
            field: field.to_string(),
            message: format!("{value} C is out of range"),
        })
    }
}

/// Canonical humidity or humidex, rounded to a whole number.
///
/// # Errors
///
/// Returns an error if the text is not numeric.
pub fn humidity(field: &str, text: &str) -> Result<f64, ParseError> {
    parse_number(field, text).map(|v| round_to(v, HUMIDITY_PRECISION))
}

// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Canonicalizer for owserver values.
//!
//! owserver returns each property as right-aligned text, e.g. `"     21.4375"`.
//! Which canonical attribute a value belongs to is known from the path that
//! was read, so translation works one value at a time.

use crate::error::ParseError;
use crate::state::StateChange;
use crate::types::{Attribute, RelayControl, relay_state_from_code};

use super::TemperatureUnit;

/// Strips everything but digits, `.` and `-`.
#[must_use]
pub fn numeric_text(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect()
}

/// Translates the value read for `attribute` into a canonical change.
///
/// owserver is queried with Celsius as its temperature scale.
///
/// # Errors
///
/// Returns an error if the value cannot be parsed for the attribute, or if
/// the attribute is not something owserver can report.
pub fn canonicalize(attribute: Attribute, raw: &str) -> Result<StateChange, ParseError> {
    let text = numeric_text(raw);
    let field = attribute.as_str();

    match attribute {
        Attribute::Temperature => {
            super::temperature(field, &text, TemperatureUnit::Celsius).map(StateChange::Temperature)
        }
        Attribute::Humidity => super::humidity(field, &text).map(StateChange::Humidity),
        Attribute::Humidex => super::humidity(field, &text).map(StateChange::Humidex),
        Attribute::RelayControl => RelayControl::from_code(&text)
            .map(StateChange::RelayControl)
            .ok_or_else(|| invalid(field, raw)),
        Attribute::RelayState => relay_state_from_code(&text)
            .map(StateChange::RelayState)
            .ok_or_else(|| invalid(field, raw)),
        Attribute::AlarmState => relay_state_from_code(&text)
            .map(StateChange::AlarmState)
            .ok_or_else(|| invalid(field, raw)),
        Attribute::Threshold => text
            .parse::<i32>()
            .map(StateChange::Threshold)
            .map_err(|_| invalid(field, raw)),
        Attribute::CurrentState
        | Attribute::TargetState
        | Attribute::Active
        | Attribute::IndicatorControl => Err(ParseError::UnexpectedFormat(format!(
            "{attribute} is not read from owserver"
        ))),
    }
}

fn invalid(field: &str, raw: &str) -> ParseError {
    ParseError::InvalidValue {
        field: field.to_string(),
        message: format!("unrecognized value {raw:?}"),
    }
}

// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Canonicalizer for EDS OW-Server device records.
//!
//! A device record in `details.xml` is a flat list of named fields, some of
//! which carry a `Units` attribute:
//!
//! ```xml
//! <owd_EDS0065>
//!   <Name>EDS0065</Name>
//!   <ROMId>7E0000001C3C5D28</ROMId>
//!   <Temperature Units="Centigrade">21.4375</Temperature>
//!   <Humidity Units="PercentRelativeHumidity">45.62</Humidity>
//!   <RelayFunction>0</RelayFunction>
//!   <HumidityLowAlarmState>1</HumidityLowAlarmState>
//! </owd_EDS0065>
//! ```
//!
//! Fields without a mapping rule are dropped.

use crate::state::{CanonicalReading, StateChange};
use crate::types::{Attribute, RelayControl, relay_state_from_code};

use super::TemperatureUnit;

/// Field carrying the device ROM id.
pub const ROM_ID_FIELD: &str = "ROMId";

/// Fields that each report one alarm category.
pub const ALARM_FIELDS: [&str; 8] = [
    "TemperatureHighAlarmState",
    "TemperatureLowAlarmState",
    "HumidityHighAlarmState",
    "HumidityLowAlarmState",
    "HumidexHighAlarmState",
    "HumidexLowAlarmState",
    "DewPointHighAlarmState",
    "DewPointLowAlarmState",
];

/// One named field of a device record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VendorField<'a> {
    /// Element name.
    pub name: &'a str,
    /// Element text.
    pub text: &'a str,
    /// Value of the `Units` attribute, if any.
    pub units: Option<&'a str>,
}

impl<'a> VendorField<'a> {
    /// Creates a field without a unit tag.
    #[must_use]
    pub fn new(name: &'a str, text: &'a str) -> Self {
        Self {
            name,
            text,
            units: None,
        }
    }

    /// Sets the unit tag.
    #[must_use]
    pub fn with_units(mut self, units: &'a str) -> Self {
        self.units = Some(units);
        self
    }
}

/// Returns the EDS field a canonical attribute is written to.
#[must_use]
pub fn backend_field(attribute: Attribute) -> Option<&'static str> {
    match attribute {
        Attribute::RelayControl => Some("RelayFunction"),
        Attribute::Threshold => Some("HumidityLowAlarmValue"),
        Attribute::IndicatorControl => Some("LEDFunction"),
        _ => None,
    }
}

/// Translates the fields of one device record into a canonical reading.
///
/// Values that fail to parse are dropped and logged; the rest of the record
/// is still used.
pub fn canonicalize<'a>(fields: impl IntoIterator<Item = VendorField<'a>>) -> CanonicalReading {
    let mut reading = CanonicalReading::new();

    for field in fields {
        match field.name {
            "Temperature" => {
                let unit = TemperatureUnit::from_tag(field.units);
                match super::temperature(field.name, field.text, unit) {
                    Ok(v) => reading.set(StateChange::Temperature(v)),
                    Err(e) => tracing::warn!(error = %e, "Dropping temperature"),
                }
            }
            "Humidity" => match super::humidity(field.name, field.text) {
                Ok(v) => reading.set(StateChange::Humidity(v)),
                Err(e) => tracing::warn!(error = %e, "Dropping humidity"),
            },
            "Humidex" => match super::humidity(field.name, field.text) {
                Ok(v) => reading.set(StateChange::Humidex(v)),
                Err(e) => tracing::warn!(error = %e, "Dropping humidex"),
            },
            "RelayFunction" => match RelayControl::from_code(field.text) {
                Some(c) => reading.set(StateChange::RelayControl(c)),
                None => tracing::warn!(code = field.text, "Unknown relay function code"),
            },
            "RelayState" => match relay_state_from_code(field.text) {
                Some(b) => reading.set(StateChange::RelayState(b)),
                None => tracing::warn!(code = field.text, "Unknown relay state code"),
            },
            "HumidityLowAlarmValue" => match field.text.trim().parse::<i32>() {
                Ok(t) => reading.set(StateChange::Threshold(t)),
                Err(e) => tracing::warn!(text = field.text, error = %e, "Dropping threshold"),
            },
            name if ALARM_FIELDS.contains(&name) => {
                reading.merge_alarm(field.text.trim() == "1");
            }
            _ => {}
        }
    }

    reading
}

// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Canonical attribute names and values.
//!
//! Every backend is translated into this vocabulary before anything else in
//! the library sees it, so callers never deal with vendor field names.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValueError;

use super::{CurrentHumidifierState, RelayControl, TargetHumidifierState};

/// A canonical or derived device attribute.
///
/// The first seven variants are read from backends. `CurrentState`,
/// `TargetState` and `Active` are derived by the reconciler for humidistats.
/// `IndicatorControl` is write-only and only ever reaches a backend as the
/// secondary write of an `active` change.
///
/// # Examples
///
/// ```
/// use owbridge::types::Attribute;
///
/// let attr: Attribute = "relayControl".parse().unwrap();
/// assert_eq!(attr, Attribute::RelayControl);
/// assert_eq!(attr.as_str(), "relayControl");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Attribute {
    /// Temperature in degrees Celsius.
    Temperature,
    /// Relative humidity, 0-100.
    Humidity,
    /// Humidex, 0-100.
    Humidex,
    /// Relay function selected on the device.
    RelayControl,
    /// Whether the relay is energized.
    RelayState,
    /// Whether any alarm category is set.
    AlarmState,
    /// Humidity alarm threshold.
    Threshold,
    /// Derived humidifier state.
    CurrentState,
    /// Derived humidifier target mode.
    TargetState,
    /// Derived humidifier activity.
    Active,
    /// Indicator LED function (write-only).
    IndicatorControl,
}

impl Attribute {
    /// Plain sensor attributes. These are cleared, not zero-filled, when a
    /// poll carries no data for them.
    pub const SENSORS: [Self; 3] = [Self::Temperature, Self::Humidity, Self::Humidex];

    /// Returns the canonical attribute name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Temperature => "temperature",
            Self::Humidity => "humidity",
            Self::Humidex => "humidex",
            Self::RelayControl => "relayControl",
            Self::RelayState => "relayState",
            Self::AlarmState => "alarmState",
            Self::Threshold => "threshold",
            Self::CurrentState => "currentState",
            Self::TargetState => "targetState",
            Self::Active => "active",
            Self::IndicatorControl => "indicatorControl",
        }
    }

    /// Returns `true` for plain sensor attributes.
    #[must_use]
    pub fn is_sensor(&self) -> bool {
        Self::SENSORS.contains(self)
    }

    /// Returns `true` for attributes the reconciler derives itself.
    #[must_use]
    pub const fn is_derived(&self) -> bool {
        matches!(self, Self::CurrentState | Self::TargetState | Self::Active)
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Attribute {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "temperature" => Ok(Self::Temperature),
            "humidity" => Ok(Self::Humidity),
            "humidex" => Ok(Self::Humidex),
            "relayControl" => Ok(Self::RelayControl),
            "relayState" => Ok(Self::RelayState),
            "alarmState" => Ok(Self::AlarmState),
            "threshold" => Ok(Self::Threshold),
            "currentState" => Ok(Self::CurrentState),
            "targetState" => Ok(Self::TargetState),
            "active" => Ok(Self::Active),
            "indicatorControl" => Ok(Self::IndicatorControl),
            _ => Err(ValueError::UnknownAttribute(s.to_string())),
        }
    }
}

/// A value crossing the accessory boundary.
///
/// Readings and state use typed fields internally; this enum is the loosely
/// typed form handed to and received from the accessory layer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    /// Boolean value (`relayState`, `alarmState`, `active`).
    Bool(bool),
    /// Integer value (`threshold`, `currentState`, `targetState`).
    Int(i32),
    /// Floating point value (`temperature`, `humidity`, `humidex`).
    Float(f64),
    /// Relay function (`relayControl`, `indicatorControl`).
    Control(RelayControl),
}

impl AttributeValue {
    /// Returns the boolean value, if this is one.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the integer value, if this is one.
    #[must_use]
    pub fn as_int(&self) -> Option<i32> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns the numeric value of `Float` or `Int`.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(v) => Some(*v),
            Self::Int(i) => Some(f64::from(*i)),
            _ => None,
        }
    }

    /// Returns the relay function, if this is one.
    #[must_use]
    pub fn as_control(&self) -> Option<RelayControl> {
        match self {
            Self::Control(c) => Some(*c),
            _ => None,
        }
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Control(c) => write!(f, "{c}"),
        }
    }
}

impl From<bool> for AttributeValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i32> for AttributeValue {
    fn from(value: i32) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for AttributeValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<RelayControl> for AttributeValue {
    fn from(value: RelayControl) -> Self {
        Self::Control(value)
    }
}

impl From<CurrentHumidifierState> for AttributeValue {
    fn from(value: CurrentHumidifierState) -> Self {
        Self::Int(i32::from(value.code()))
    }
}

impl From<TargetHumidifierState> for AttributeValue {
    fn from(value: TargetHumidifierState) -> Self {
        Self::Int(i32::from(value.code()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attribute_name_round_trip() {
        for attr in [
            Attribute::Temperature,
            Attribute::RelayControl,
            Attribute::TargetState,
            Attribute::IndicatorControl,
        ] {
            assert_eq!(attr.as_str().parse::<Attribute>().unwrap(), attr);
        }
    }

    #[test]
    fn unknown_attribute_is_rejected() {
        let err = "pressure".parse::<Attribute>().unwrap_err();
        assert_eq!(err, ValueError::UnknownAttribute("pressure".to_string()));
    }

    #[test]
    fn sensor_and_derived_classification() {
        assert!(Attribute::Humidex.is_sensor());
        assert!(!Attribute::Threshold.is_sensor());
        assert!(Attribute::Active.is_derived());
        assert!(!Attribute::RelayState.is_derived());
    }

    #[test]
    fn humidifier_states_convert_to_codes() {
        assert_eq!(
            AttributeValue::from(CurrentHumidifierState::Humidifying),
            AttributeValue::Int(3)
        );
        assert_eq!(
            AttributeValue::from(TargetHumidifierState::HumidifyOnly),
            AttributeValue::Int(2)
        );
    }

    #[test]
    fn value_accessors() {
        assert_eq!(AttributeValue::Int(40).as_f64(), Some(40.0));
        assert_eq!(AttributeValue::Bool(true).as_int(), None);
        assert_eq!(
            AttributeValue::Control(RelayControl::Off).as_control(),
            Some(RelayControl::Off)
        );
    }
}

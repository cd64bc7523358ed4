// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Canonical readings produced by backend adapters.

use std::collections::HashMap;

use crate::types::{Attribute, DeviceAddress, RelayControl};

use super::StateChange;

/// Readings for every device returned by one poll, keyed by address.
pub type Readings = HashMap<DeviceAddress, CanonicalReading>;

/// Canonical attributes read from one device in one poll.
///
/// Every field is optional: an absent attribute means the backend had no
/// data for it, which is not the same as zero.
///
/// # Examples
///
/// ```
/// use owbridge::state::{CanonicalReading, StateChange};
/// use owbridge::types::Attribute;
///
/// let reading = CanonicalReading::new()
///     .with(StateChange::Temperature(21.4))
///     .with(StateChange::Humidity(48.0));
///
/// assert!(reading.contains(Attribute::Humidity));
/// assert!(!reading.contains(Attribute::Humidex));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CanonicalReading {
    temperature: Option<f64>,
    humidity: Option<f64>,
    humidex: Option<f64>,
    relay_control: Option<RelayControl>,
    relay_state: Option<bool>,
    alarm_state: Option<bool>,
    threshold: Option<i32>,
}

impl CanonicalReading {
    /// Creates an empty reading.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the reading with a value set.
    #[must_use]
    pub fn with(mut self, change: StateChange) -> Self {
        self.set(change);
        self
    }

    /// Sets a canonical value. Derived attributes are ignored.
    pub fn set(&mut self, change: StateChange) {
        match change {
            StateChange::Temperature(v) => self.temperature = Some(v),
            StateChange::Humidity(v) => self.humidity = Some(v),
            StateChange::Humidex(v) => self.humidex = Some(v),
            StateChange::RelayControl(c) => self.relay_control = Some(c),
            StateChange::RelayState(b) => self.relay_state = Some(b),
            StateChange::AlarmState(b) => self.alarm_state = Some(b),
            StateChange::Threshold(t) => self.threshold = Some(t),
            StateChange::CurrentState(_) | StateChange::TargetState(_) | StateChange::Active(_) => {}
        }
    }

    /// Folds one alarm category into `alarmState`.
    ///
    /// A set flag always wins; a clear flag only establishes `false` when no
    /// category has been seen yet.
    pub fn merge_alarm(&mut self, set: bool) {
        self.alarm_state = Some(self.alarm_state.unwrap_or(false) || set);
    }

    /// Returns the value of an attribute as a change, if present.
    #[must_use]
    pub fn get(&self, attribute: Attribute) -> Option<StateChange> {
        match attribute {
            Attribute::Temperature => self.temperature.map(StateChange::Temperature),
            Attribute::Humidity => self.humidity.map(StateChange::Humidity),
            Attribute::Humidex => self.humidex.map(StateChange::Humidex),
            Attribute::RelayControl => self.relay_control.map(StateChange::RelayControl),
            Attribute::RelayState => self.relay_state.map(StateChange::RelayState),
            Attribute::AlarmState => self.alarm_state.map(StateChange::AlarmState),
            Attribute::Threshold => self.threshold.map(StateChange::Threshold),
            Attribute::CurrentState
            | Attribute::TargetState
            | Attribute::Active
            | Attribute::IndicatorControl => None,
        }
    }

    /// Returns `true` if the attribute is present.
    #[must_use]
    pub fn contains(&self, attribute: Attribute) -> bool {
        self.get(attribute).is_some()
    }

    /// Returns `true` if no attribute is present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Temperature in degrees Celsius.
    #[must_use]
    pub fn temperature(&self) -> Option<f64> {
        self.temperature
    }

    /// Relative humidity.
    #[must_use]
    pub fn humidity(&self) -> Option<f64> {
        self.humidity
    }

    /// Humidex.
    #[must_use]
    pub fn humidex(&self) -> Option<f64> {
        self.humidex
    }

    /// Relay function.
    #[must_use]
    pub fn relay_control(&self) -> Option<RelayControl> {
        self.relay_control
    }

    /// Relay energized.
    #[must_use]
    pub fn relay_state(&self) -> Option<bool> {
        self.relay_state
    }

    /// Any alarm set.
    #[must_use]
    pub fn alarm_state(&self) -> Option<bool> {
        self.alarm_state
    }

    /// Humidity alarm threshold.
    #[must_use]
    pub fn threshold(&self) -> Option<i32> {
        self.threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_reading_is_empty() {
        let reading = CanonicalReading::new();
        assert!(reading.is_empty());
        assert!(reading.get(Attribute::Temperature).is_none());
    }

    #[test]
    fn derived_attributes_are_never_part_of_a_reading() {
        let reading = CanonicalReading::new().with(StateChange::Active(true));
        assert!(reading.is_empty());
        assert!(!reading.contains(Attribute::Active));
    }

    #[test]
    fn alarm_true_sticks() {
        let mut reading = CanonicalReading::new();
        reading.merge_alarm(false);
        assert_eq!(reading.alarm_state(), Some(false));

        reading.merge_alarm(true);
        reading.merge_alarm(false);
        assert_eq!(reading.alarm_state(), Some(true));
    }

    #[test]
    fn get_returns_typed_change() {
        let reading = CanonicalReading::new().with(StateChange::Threshold(35));
        assert_eq!(
            reading.get(Attribute::Threshold),
            Some(StateChange::Threshold(35))
        );
    }
}

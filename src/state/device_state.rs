// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device state tracking.

use serde::Serialize;

use crate::types::{
    Attribute, AttributeValue, CurrentHumidifierState, RelayControl, TargetHumidifierState,
};

use super::StateChange;

/// Last published state of a device.
///
/// All fields are optional: an attribute is either present with the value
/// last published for it, or absent because it was never established or was
/// cleared by a poll without data.
///
/// # Examples
///
/// ```
/// use owbridge::state::{DeviceState, StateChange};
/// use owbridge::types::Attribute;
///
/// let mut state = DeviceState::new();
/// state.apply(&StateChange::Temperature(20.5));
/// assert_eq!(state.temperature(), Some(20.5));
///
/// state.clear(Attribute::Temperature);
/// assert!(state.temperature().is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DeviceState {
    temperature: Option<f64>,
    humidity: Option<f64>,
    humidex: Option<f64>,
    relay_control: Option<RelayControl>,
    relay_state: Option<bool>,
    alarm_state: Option<bool>,
    threshold: Option<i32>,
    current_state: Option<CurrentHumidifierState>,
    target_state: Option<TargetHumidifierState>,
    active: Option<bool>,
}

impl DeviceState {
    /// Creates a new empty device state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
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

    /// Derived humidifier state.
    #[must_use]
    pub fn current_state(&self) -> Option<CurrentHumidifierState> {
        self.current_state
    }

    /// Derived target mode.
    #[must_use]
    pub fn target_state(&self) -> Option<TargetHumidifierState> {
        self.target_state
    }

    /// Derived activity.
    #[must_use]
    pub fn active(&self) -> Option<bool> {
        self.active
    }

    /// Returns the published value of an attribute.
    #[must_use]
    pub fn get(&self, attribute: Attribute) -> Option<AttributeValue> {
        match attribute {
            Attribute::Temperature => self.temperature.map(AttributeValue::Float),
            Attribute::Humidity => self.humidity.map(AttributeValue::Float),
            Attribute::Humidex => self.humidex.map(AttributeValue::Float),
            Attribute::RelayControl => self.relay_control.map(AttributeValue::Control),
            Attribute::RelayState => self.relay_state.map(AttributeValue::Bool),
            Attribute::AlarmState => self.alarm_state.map(AttributeValue::Bool),
            Attribute::Threshold => self.threshold.map(AttributeValue::Int),
            Attribute::CurrentState => self.current_state.map(Into::into),
            Attribute::TargetState => self.target_state.map(Into::into),
            Attribute::Active => self.active.map(AttributeValue::Bool),
            Attribute::IndicatorControl => None,
        }
    }

    /// Returns `true` if the attribute has a value.
    #[must_use]
    pub fn contains(&self, attribute: Attribute) -> bool {
        self.get(attribute).is_some()
    }

    /// Applies a state change and returns whether the state actually changed.
    ///
    /// An attribute that was never set always counts as changed.
    pub fn apply(&mut self, change: &StateChange) -> bool {
        fn update<T: PartialEq + Copy>(slot: &mut Option<T>, value: T) -> bool {
            if *slot == Some(value) {
                false
            } else {
                *slot = Some(value);
                true
            }
        }

        match *change {
            StateChange::Temperature(v) => update(&mut self.temperature, v),
            StateChange::Humidity(v) => update(&mut self.humidity, v),
            StateChange::Humidex(v) => update(&mut self.humidex, v),
            StateChange::RelayControl(c) => update(&mut self.relay_control, c),
            StateChange::RelayState(b) => update(&mut self.relay_state, b),
            StateChange::AlarmState(b) => update(&mut self.alarm_state, b),
            StateChange::Threshold(t) => update(&mut self.threshold, t),
            StateChange::CurrentState(s) => update(&mut self.current_state, s),
            StateChange::TargetState(s) => update(&mut self.target_state, s),
            StateChange::Active(b) => update(&mut self.active, b),
        }
    }

    /// Removes an attribute. Returns `true` if it had a value.
    pub fn clear(&mut self, attribute: Attribute) -> bool {
        match attribute {
            Attribute::Temperature => self.temperature.take().is_some(),
            Attribute::Humidity => self.humidity.take().is_some(),
            Attribute::Humidex => self.humidex.take().is_some(),
            Attribute::RelayControl => self.relay_control.take().is_some(),
            Attribute::RelayState => self.relay_state.take().is_some(),
            Attribute::AlarmState => self.alarm_state.take().is_some(),
            Attribute::Threshold => self.threshold.take().is_some(),
            Attribute::CurrentState => self.current_state.take().is_some(),
            Attribute::TargetState => self.target_state.take().is_some(),
            Attribute::Active => self.active.take().is_some(),
            Attribute::IndicatorControl => false,
        }
    }
}

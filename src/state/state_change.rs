// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! State change representation.
//!
//! A [`StateChange`] is one typed attribute value. Readings are staged as
//! changes, applied to a [`DeviceState`](super::DeviceState), and the ones
//! that actually changed something are collected into a [`ChangeSet`].
//!
//! # Examples
//!
//! ```
//! use owbridge::state::{DeviceState, StateChange};
//!
//! let mut state = DeviceState::new();
//!
//! // Apply returns true if state actually changed
//! assert!(state.apply(&StateChange::Humidity(45.0)));
//!
//! // Applying same change again returns false
//! assert!(!state.apply(&StateChange::Humidity(45.0)));
//! ```

use serde::Serialize;

use crate::types::{
    Attribute, AttributeValue, CurrentHumidifierState, RelayControl, TargetHumidifierState,
};

/// A single typed attribute value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "attribute", content = "value", rename_all = "camelCase")]
pub enum StateChange {
    /// Temperature in degrees Celsius.
    Temperature(f64),
    /// Relative humidity.
    Humidity(f64),
    /// Humidex.
    Humidex(f64),
    /// Relay function.
    RelayControl(RelayControl),
    /// Relay energized.
    RelayState(bool),
    /// Any alarm set.
    AlarmState(bool),
    /// Humidity alarm threshold.
    Threshold(i32),
    /// Derived humidifier state.
    CurrentState(CurrentHumidifierState),
    /// Derived target mode.
    TargetState(TargetHumidifierState),
    /// Derived activity.
    Active(bool),
}

impl StateChange {
    /// Returns the attribute this change sets.
    #[must_use]
    pub const fn attribute(&self) -> Attribute {
        match self {
            Self::Temperature(_) => Attribute::Temperature,
            Self::Humidity(_) => Attribute::Humidity,
            Self::Humidex(_) => Attribute::Humidex,
            Self::RelayControl(_) => Attribute::RelayControl,
            Self::RelayState(_) => Attribute::RelayState,
            Self::AlarmState(_) => Attribute::AlarmState,
            Self::Threshold(_) => Attribute::Threshold,
            Self::CurrentState(_) => Attribute::CurrentState,
            Self::TargetState(_) => Attribute::TargetState,
            Self::Active(_) => Attribute::Active,
        }
    }

    /// Returns the value in its accessory-boundary form.
    #[must_use]
    pub fn value(&self) -> AttributeValue {
        match *self {
            Self::Temperature(v) | Self::Humidity(v) | Self::Humidex(v) => AttributeValue::Float(v),
            Self::RelayControl(c) => AttributeValue::Control(c),
            Self::RelayState(b) | Self::AlarmState(b) | Self::Active(b) => AttributeValue::Bool(b),
            Self::Threshold(t) => AttributeValue::Int(t),
            Self::CurrentState(s) => s.into(),
            Self::TargetState(s) => s.into(),
        }
    }
}

/// Attributes whose value changed in one reconciliation pass, in staging order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ChangeSet(Vec<StateChange>);

impl ChangeSet {
    /// Creates an empty change set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, change: StateChange) {
        self.0.push(change);
    }

    /// Returns `true` if nothing changed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the number of changed attributes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns the change for an attribute, if it changed.
    #[must_use]
    pub fn get(&self, attribute: Attribute) -> Option<&StateChange> {
        self.0.iter().find(|c| c.attribute() == attribute)
    }

    /// Returns `true` if the attribute changed.
    #[must_use]
    pub fn contains(&self, attribute: Attribute) -> bool {
        self.get(attribute).is_some()
    }

    /// Iterates over the changes.
    pub fn iter(&self) -> std::slice::Iter<'_, StateChange> {
        self.0.iter()
    }
}

impl IntoIterator for ChangeSet {
    type Item = StateChange;
    type IntoIter = std::vec::IntoIter<StateChange>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a ChangeSet {
    type Item = &'a StateChange;
    type IntoIter = std::slice::Iter<'a, StateChange>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Humidistat state derivation.

use crate::state::{CanonicalReading, StateChange};
use crate::types::{CurrentHumidifierState, RelayControl};

/// Derives `currentState` and `active` from the relay inputs of a reading.
///
/// Returns `None` when `relayControl` is not in the reading. A missing
/// `relayState` or `alarmState` counts as `false`.
///
/// | relay control | active | humidifying when |
/// |---------------|--------|------------------|
/// | off           | false  | never            |
/// | auto, auto on | true   | alarm set        |
/// | manual        | true   | relay energized  |
#[must_use]
pub fn derive(reading: &CanonicalReading) -> Option<[StateChange; 2]> {
    let control = reading.relay_control()?;

    let (current, active) = match control {
        RelayControl::Off => (CurrentHumidifierState::Idle, false),
        c if c.is_auto() => (
            CurrentHumidifierState::from(reading.alarm_state().unwrap_or(false)),
            true,
        ),
        _ => (
            CurrentHumidifierState::from(reading.relay_state().unwrap_or(false)),
            true,
        ),
    };

    Some([StateChange::CurrentState(current), StateChange::Active(active)])
}

/// Changes staged when the threshold input is missing.
#[must_use]
pub fn inactive() -> [StateChange; 2] {
    [
        StateChange::CurrentState(CurrentHumidifierState::Idle),
        StateChange::Active(false),
    ]
}

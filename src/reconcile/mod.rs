// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Reconciliation of canonical readings into device state.
//!
//! Each poll, every registered device's reading is compared against the
//! inputs its type declares:
//!
//! 1. Present inputs are staged.
//! 2. Missing inputs flag a problem. Missing sensor values are removed from
//!    the state so stale data is not reported; a missing threshold forces
//!    the humidistat idle and inactive.
//! 3. For humidistats with a threshold, `currentState` and `active` are
//!    derived from the relay inputs, and `targetState` is established once.
//! 4. Staged values that differ from the current state are applied and
//!    returned as a [`ChangeSet`].

pub mod humidistat;

use crate::manager::DeviceKind;
use crate::state::{CanonicalReading, ChangeSet, DeviceState, StateChange};
use crate::types::{Attribute, TargetHumidifierState};

/// Result of reconciling one device for one poll.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Reconciliation {
    /// Attributes whose value changed.
    pub changes: ChangeSet,
    /// Sensor attributes removed because the reading had no data for them.
    pub cleared: Vec<Attribute>,
    /// An expected input was missing from the reading.
    pub problem: bool,
}

impl Reconciliation {
    /// Returns `true` if nothing changed and nothing was cleared.
    #[must_use]
    pub fn is_unchanged(&self) -> bool {
        self.changes.is_empty() && self.cleared.is_empty()
    }

    /// Returns `true` if this outcome is logged at normal verbosity.
    ///
    /// A problem is always reported. In quiet mode an outcome without a
    /// problem is reported only when something changed.
    #[must_use]
    pub fn is_reportable(&self, quiet: bool) -> bool {
        self.problem || !quiet || !self.is_unchanged()
    }
}

/// Staged changes, one per attribute; restaging an attribute replaces it.
#[derive(Debug, Default)]
struct Staging(Vec<StateChange>);

impl Staging {
    fn stage(&mut self, change: StateChange) {
        let attribute = change.attribute();
        match self.0.iter_mut().find(|c| c.attribute() == attribute) {
            Some(slot) => *slot = change,
            None => self.0.push(change),
        }
    }
}

/// Reconciles a reading into `state`.
///
/// The state is updated in place. Reconciling the same reading twice in a
/// row yields no changes the second time.
///
/// # Examples
///
/// ```
/// use owbridge::manager::DeviceKind;
/// use owbridge::reconcile::reconcile;
/// use owbridge::state::{CanonicalReading, DeviceState, StateChange};
///
/// let mut state = DeviceState::new();
/// let reading = CanonicalReading::new().with(StateChange::Temperature(21.5));
///
/// let first = reconcile(DeviceKind::Ds18b20, &mut state, &reading);
/// assert_eq!(first.changes.len(), 1);
///
/// let second = reconcile(DeviceKind::Ds18b20, &mut state, &reading);
/// assert!(second.changes.is_empty());
/// ```
pub fn reconcile(
    kind: DeviceKind,
    state: &mut DeviceState,
    reading: &CanonicalReading,
) -> Reconciliation {
    let mut staged = Staging::default();
    let mut outcome = Reconciliation::default();

    for &input in kind.inputs() {
        if let Some(change) = reading.get(input) {
            staged.stage(change);
            continue;
        }

        outcome.problem = true;
        if input.is_sensor() {
            if state.clear(input) {
                outcome.cleared.push(input);
            }
        } else if input == Attribute::Threshold {
            for change in humidistat::inactive() {
                staged.stage(change);
            }
        }
    }

    if kind.is_humidistat() && reading.contains(Attribute::Threshold) {
        if let Some(derived) = humidistat::derive(reading) {
            for change in derived {
                staged.stage(change);
            }
        }
        if state.target_state().is_none() {
            staged.stage(StateChange::TargetState(TargetHumidifierState::HumidifyOnly));
        }
    }

    for change in staged.0 {
        if state.apply(&change) {
            outcome.changes.push(change);
        }
    }

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CurrentHumidifierState, RelayControl};

    fn humidistat_reading(control: RelayControl) -> CanonicalReading {
        CanonicalReading::new()
            .with(StateChange::Temperature(21.4))
            .with(StateChange::Humidity(46.0))
            .with(StateChange::Humidex(25.0))
            .with(StateChange::RelayControl(control))
            .with(StateChange::RelayState(false))
            .with(StateChange::AlarmState(true))
            .with(StateChange::Threshold(40))
    }

    #[test]
    fn quiet_mode_reports_problems_and_changes_only() {
        let problem = Reconciliation {
            problem: true,
            ..Reconciliation::default()
        };
        assert!(problem.is_reportable(true));

        let mut changed = Reconciliation::default();
        changed.changes.push(StateChange::Temperature(20.0));
        assert!(changed.is_reportable(true));

        let cleared = Reconciliation {
            cleared: vec![Attribute::Humidity],
            ..Reconciliation::default()
        };
        assert!(cleared.is_reportable(true));

        let idle = Reconciliation::default();
        assert!(!idle.is_reportable(true));
        assert!(idle.is_reportable(false));
    }

    #[test]
    fn second_pass_is_empty() {
        let mut state = DeviceState::new();
        let reading = humidistat_reading(RelayControl::AutoOn);

        let first = reconcile(DeviceKind::Eds0065Humidistat, &mut state, &reading);
        assert!(!first.problem);
        assert_eq!(first.changes.len(), 10);

        let second = reconcile(DeviceKind::Eds0065Humidistat, &mut state, &reading);
        assert!(second.changes.is_empty());
        assert!(second.is_unchanged());
    }

    #[test]
    fn missing_humidity_is_cleared_and_flagged() {
        let mut state = DeviceState::new();
        let full = CanonicalReading::new()
            .with(StateChange::Temperature(20.0))
            .with(StateChange::Humidity(50.0));
        reconcile(DeviceKind::Eds0065, &mut state, &full);
        assert_eq!(state.humidity(), Some(50.0));

        let partial = CanonicalReading::new().with(StateChange::Temperature(20.0));
        let outcome = reconcile(DeviceKind::Eds0065, &mut state, &partial);

        assert!(outcome.problem);
        assert_eq!(outcome.cleared, vec![Attribute::Humidity]);
        assert!(outcome.changes.is_empty());
        assert!(state.humidity().is_none());
        assert_eq!(state.temperature(), Some(20.0));
    }

    #[test]
    fn missing_input_never_seen_is_flagged_not_cleared() {
        let mut state = DeviceState::new();
        let outcome = reconcile(DeviceKind::Ds18b20, &mut state, &CanonicalReading::new());
        assert!(outcome.problem);
        assert!(outcome.cleared.is_empty());
        assert!(outcome.changes.is_empty());
    }

    #[test]
    fn extra_attributes_are_ignored() {
        let mut state = DeviceState::new();
        let reading = CanonicalReading::new()
            .with(StateChange::Temperature(20.0))
            .with(StateChange::Humidity(50.0));
        let outcome = reconcile(DeviceKind::Ds18b20, &mut state, &reading);
        assert!(!outcome.problem);
        assert!(state.humidity().is_none());
    }

    #[test]
    fn auto_on_with_alarm_is_humidifying() {
        let mut state = DeviceState::new();
        let outcome = reconcile(
            DeviceKind::Eds0065Humidistat,
            &mut state,
            &humidistat_reading(RelayControl::AutoOn),
        );

        assert_eq!(state.current_state(), Some(CurrentHumidifierState::Humidifying));
        assert_eq!(state.active(), Some(true));
        assert_eq!(
            state.target_state(),
            Some(TargetHumidifierState::HumidifyOnly)
        );
        assert!(outcome.changes.contains(Attribute::TargetState));
    }

    #[test]
    fn off_is_idle_and_inactive() {
        let mut state = DeviceState::new();
        reconcile(
            DeviceKind::Eds0065Humidistat,
            &mut state,
            &humidistat_reading(RelayControl::Off),
        );
        assert_eq!(state.current_state(), Some(CurrentHumidifierState::Idle));
        assert_eq!(state.active(), Some(false));
    }

    #[test]
    fn switching_off_reports_only_derived_changes() {
        let mut state = DeviceState::new();
        reconcile(
            DeviceKind::Eds0065Humidistat,
            &mut state,
            &humidistat_reading(RelayControl::AutoOn),
        );
        let outcome = reconcile(
            DeviceKind::Eds0065Humidistat,
            &mut state,
            &humidistat_reading(RelayControl::Off),
        );

        let attributes: Vec<_> = outcome.changes.iter().map(StateChange::attribute).collect();
        assert_eq!(
            attributes,
            vec![Attribute::RelayControl, Attribute::CurrentState, Attribute::Active]
        );
    }

    #[test]
    fn missing_threshold_forces_inactive() {
        let mut state = DeviceState::new();
        reconcile(
            DeviceKind::Eds0065Humidistat,
            &mut state,
            &humidistat_reading(RelayControl::AutoOn),
        );

        let reading = CanonicalReading::new()
            .with(StateChange::Temperature(21.4))
            .with(StateChange::Humidity(46.0))
            .with(StateChange::Humidex(25.0))
            .with(StateChange::RelayControl(RelayControl::AutoOn))
            .with(StateChange::RelayState(false))
            .with(StateChange::AlarmState(true));
        let outcome = reconcile(DeviceKind::Eds0065Humidistat, &mut state, &reading);

        assert!(outcome.problem);
        assert_eq!(state.current_state(), Some(CurrentHumidifierState::Idle));
        assert_eq!(state.active(), Some(false));
        // Threshold is not a sensor value; the last one stays.
        assert_eq!(state.threshold(), Some(40));
    }

    #[test]
    fn target_state_is_staged_once() {
        let mut state = DeviceState::new();
        let first = reconcile(
            DeviceKind::Eds0065Humidistat,
            &mut state,
            &humidistat_reading(RelayControl::Manual),
        );
        assert!(first.changes.contains(Attribute::TargetState));

        let second = reconcile(
            DeviceKind::Eds0065Humidistat,
            &mut state,
            &humidistat_reading(RelayControl::Auto),
        );
        assert!(!second.changes.contains(Attribute::TargetState));
    }

    #[test]
    fn missing_relay_control_skips_derivation() {
        let mut state = DeviceState::new();
        let reading = CanonicalReading::new()
            .with(StateChange::Temperature(21.4))
            .with(StateChange::Threshold(40))
            .with(StateChange::AlarmState(true));
        let outcome = reconcile(DeviceKind::Eds0065Humidistat, &mut state, &reading);

        assert!(outcome.problem);
        assert!(state.current_state().is_none());
        assert!(state.active().is_none());
        assert_eq!(
            state.target_state(),
            Some(TargetHumidifierState::HumidifyOnly)
        );
    }

    #[test]
    fn plain_sensors_never_get_derived_state() {
        let mut state = DeviceState::new();
        let reading = humidistat_reading(RelayControl::AutoOn);
        reconcile(DeviceKind::Eds0065, &mut state, &reading);
        assert!(state.active().is_none());
        assert!(state.relay_control().is_none());
    }
}

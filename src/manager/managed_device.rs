// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Internal device wrapper for the bridge.

use tokio::sync::watch;

use crate::reconcile::{self, Reconciliation};
use crate::state::{CanonicalReading, DeviceState, StateChange};

use super::device_config::DeviceDescriptor;

/// Internal representation of a registered device.
pub(crate) struct ManagedDevice {
    /// Device configuration.
    pub descriptor: DeviceDescriptor,
    /// Current device state.
    pub state: DeviceState,
    /// Watch channel sender for state updates.
    pub state_tx: watch::Sender<DeviceState>,
}

impl ManagedDevice {
    /// Creates a device with an empty state.
    pub fn new(descriptor: DeviceDescriptor) -> Self {
        let state = DeviceState::new();
        let (state_tx, _) = watch::channel(state.clone());

        Self {
            descriptor,
            state,
            state_tx,
        }
    }

    /// Creates a watch receiver for state updates.
    pub fn watch_state(&self) -> watch::Receiver<DeviceState> {
        self.state_tx.subscribe()
    }

    /// Reconciles a reading and notifies watchers if anything moved.
    pub fn reconcile(&mut self, reading: &CanonicalReading) -> Reconciliation {
        let outcome = reconcile::reconcile(self.descriptor.kind(), &mut self.state, reading);
        if !outcome.is_unchanged() {
            self.notify();
        }
        outcome
    }

    /// Applies a single change. Returns `true` if the state changed.
    pub fn apply_state_change(&mut self, change: &StateChange) -> bool {
        let changed = self.state.apply(change);
        if changed {
            self.notify();
        }
        changed
    }

    fn notify(&self) {
        self.state_tx.send_replace(self.state.clone());
    }
}

impl std::fmt::Debug for ManagedDevice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ManagedDevice")
            .field("descriptor", &self.descriptor)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manager::DeviceKind;

    #[test]
    fn reconcile_notifies_watchers() {
        let mut device = ManagedDevice::new(DeviceDescriptor::new("28.0001", DeviceKind::Ds18b20));
        let mut rx = device.watch_state();

        let reading = CanonicalReading::new().with(StateChange::Temperature(19.5));
        let outcome = device.reconcile(&reading);

        assert_eq!(outcome.changes.len(), 1);
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().temperature(), Some(19.5));

        device.reconcile(&reading);
        assert!(!rx.has_changed().unwrap());
    }

    #[test]
    fn unchanged_apply_does_not_notify() {
        let mut device = ManagedDevice::new(DeviceDescriptor::new("28.0001", DeviceKind::Ds18b20));
        assert!(device.apply_state_change(&StateChange::Active(true)));

        let rx = device.watch_state();
        assert!(!device.apply_state_change(&StateChange::Active(true)));
        assert!(!rx.has_changed().unwrap());
    }
}

// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The bridge between a backend adapter and the accessory layer.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{Mutex, RwLock, broadcast, watch};

use crate::access::DeviceHandle;
use crate::error::{Error, Result};
use crate::event::{DeviceEvent, EventBus};
use crate::history::{HistoryRecord, HistorySink};
use crate::protocol::{Adapter, Backend};
use crate::state::{CanonicalReading, DeviceState, StateChange};
use crate::types::{
    Attribute, AttributeValue, DeviceAddress, RelayControl, TargetHumidifierState,
};

use super::device_config::DeviceDescriptor;
use super::managed_device::ManagedDevice;

/// Result of a call to [`Bridge::poll_once`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// The poll ran.
    Completed {
        /// Number of devices reconciled.
        devices: usize,
        /// Number of attributes that changed or were cleared.
        changes: usize,
        /// Number of devices with a missing input.
        problems: usize,
    },
    /// Another poll was in flight; this one did nothing.
    Skipped,
}

/// Owns the registered devices and their state, polls the backend and
/// routes writes to it.
///
/// Cloning a bridge is cheap; clones share devices, state and the event bus.
///
/// # Examples
///
/// ```no_run
/// use owbridge::manager::{Bridge, DeviceDescriptor, DeviceKind};
/// use owbridge::protocol::EdsAdapter;
/// use owbridge::types::Attribute;
///
/// #[tokio::main]
/// async fn main() -> owbridge::Result<()> {
///     let bridge = Bridge::new(EdsAdapter::new("192.168.1.40")?);
///     bridge
///         .register(DeviceDescriptor::new("5F0000000A7B1C28", DeviceKind::Ds18b20))
///         .await;
///
///     bridge.poll_once().await?;
///     let temp = bridge
///         .get_attribute(&"5F0000000A7B1C28".into(), Attribute::Temperature)
///         .await?;
///     println!("{temp}");
///     Ok(())
/// }
/// ```
pub struct Bridge<A = Backend> {
    adapter: Arc<A>,
    devices: Arc<RwLock<HashMap<DeviceAddress, ManagedDevice>>>,
    event_bus: EventBus,
    history: Option<Arc<dyn HistorySink>>,
    quiet: bool,
    poll_gate: Arc<Mutex<()>>,
}

impl<A: Adapter> Bridge<A> {
    /// Creates a bridge with no devices.
    #[must_use]
    pub fn new(adapter: A) -> Self {
        Self {
            adapter: Arc::new(adapter),
            devices: Arc::new(RwLock::new(HashMap::new())),
            event_bus: EventBus::new(),
            history: None,
            quiet: false,
            poll_gate: Arc::new(Mutex::new(())),
        }
    }

    /// Sets the sink receiving history records.
    #[must_use]
    pub fn with_history(mut self, sink: Arc<dyn HistorySink>) -> Self {
        self.history = Some(sink);
        self
    }

    /// In quiet mode, polls without changes or problems are logged at debug
    /// level only.
    #[must_use]
    pub fn with_quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    /// Returns the adapter.
    #[must_use]
    pub fn adapter(&self) -> &A {
        &self.adapter
    }

    // =========================================================================
    // Subscription
    // =========================================================================

    /// Subscribes to device events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<DeviceEvent> {
        self.event_bus.subscribe()
    }

    // =========================================================================
    // Device Management
    // =========================================================================

    /// Registers a device.
    ///
    /// Registering an address twice replaces the first descriptor and resets
    /// the device state.
    pub async fn register(&self, descriptor: DeviceDescriptor) {
        let address = descriptor.address().clone();
        tracing::debug!(
            address = %address,
            kind = %descriptor.kind(),
            name = descriptor.display_name(),
            "Registering device"
        );

        self.devices
            .write()
            .await
            .insert(address.clone(), ManagedDevice::new(descriptor));

        self.event_bus.publish(DeviceEvent::device_added(address));
    }

    /// Returns the registered devices.
    pub async fn devices(&self) -> Vec<DeviceDescriptor> {
        self.devices
            .read()
            .await
            .values()
            .map(|d| d.descriptor.clone())
            .collect()
    }

    /// Returns the number of registered devices.
    pub async fn device_count(&self) -> usize {
        self.devices.read().await.len()
    }

    /// Returns a handle to one device for the accessory layer.
    #[must_use]
    pub fn handle(&self, address: impl Into<DeviceAddress>) -> DeviceHandle<A> {
        DeviceHandle::new(self.clone(), address.into())
    }

    async fn descriptor(&self, address: &DeviceAddress) -> Result<DeviceDescriptor> {
        self.devices
            .read()
            .await
            .get(address)
            .map(|d| d.descriptor.clone())
            .ok_or_else(|| Error::DeviceNotFound(address.clone()))
    }

    // =========================================================================
    // State Management
    // =========================================================================

    /// Returns the current state of a device.
    pub async fn state(&self, address: &DeviceAddress) -> Option<DeviceState> {
        self.devices
            .read()
            .await
            .get(address)
            .map(|d| d.state.clone())
    }

    /// Creates a watch receiver for a device's state.
    pub async fn watch_device(&self, address: &DeviceAddress) -> Option<watch::Receiver<DeviceState>> {
        self.devices
            .read()
            .await
            .get(address)
            .map(ManagedDevice::watch_state)
    }

    /// Returns the current value of an attribute.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DeviceNotFound`] for an unknown address and
    /// [`Error::NotAvailable`] if the attribute has no value.
    pub async fn get_attribute(
        &self,
        address: &DeviceAddress,
        attribute: Attribute,
    ) -> Result<AttributeValue> {
        let devices = self.devices.read().await;
        let device = devices
            .get(address)
            .ok_or_else(|| Error::DeviceNotFound(address.clone()))?;

        device.state.get(attribute).ok_or_else(|| Error::NotAvailable {
            address: address.clone(),
            attribute,
        })
    }

    // =========================================================================
    // Polling
    // =========================================================================

    /// Reads all devices from the backend and reconciles their state.
    ///
    /// If another poll is still running, returns [`PollOutcome::Skipped`]
    /// without touching the backend.
    ///
    /// # Errors
    ///
    /// Returns the adapter error if the backend read failed as a whole. No
    /// device state is changed in that case and a
    /// [`DeviceEvent::PollFailed`] is published.
    pub async fn poll_once(&self) -> Result<PollOutcome> {
        let Ok(_gate) = self.poll_gate.try_lock() else {
            tracing::debug!("Poll already in progress, skipping");
            return Ok(PollOutcome::Skipped);
        };

        let descriptors = self.devices().await;
        let readings = match self.adapter.read(&descriptors).await {
            Ok(readings) => readings,
            Err(e) => {
                tracing::warn!(error = %e, "Poll failed");
                self.event_bus.publish(DeviceEvent::poll_failed(e.to_string()));
                return Err(e);
            }
        };

        let time = Utc::now();
        let empty = CanonicalReading::new();
        let mut events = Vec::new();
        let mut records = Vec::new();
        let mut reconciled = 0;
        let mut changes = 0;
        let mut problems = 0;

        {
            let mut devices = self.devices.write().await;
            for descriptor in &descriptors {
                let Some(device) = devices.get_mut(descriptor.address()) else {
                    continue;
                };
                let reading = readings.get(descriptor.address()).unwrap_or(&empty);
                let outcome = device.reconcile(reading);
                let address = descriptor.address();

                reconciled += 1;
                changes += outcome.changes.len() + outcome.cleared.len();
                if outcome.problem {
                    problems += 1;
                }

                if outcome.is_reportable(self.quiet) {
                    tracing::info!(
                        address = %address,
                        name = descriptor.display_name(),
                        changes = ?outcome.changes,
                        cleared = ?outcome.cleared,
                        problem = outcome.problem,
                        "Device polled"
                    );
                } else {
                    tracing::debug!(address = %address, "Device polled, no changes");
                }

                for attribute in outcome.cleared {
                    events.push(DeviceEvent::attribute_cleared(address.clone(), attribute));
                }
                for change in outcome.changes {
                    events.push(DeviceEvent::attribute_changed(
                        address.clone(),
                        change,
                        device.state.clone(),
                    ));
                }

                if descriptor.kind().logger().is_some() {
                    records.push((
                        address.clone(),
                        HistoryRecord::new(time, device.state.temperature(), device.state.humidity()),
                    ));
                }
            }
        }

        self.event_bus.publish_all(events);
        if let Some(history) = &self.history {
            for (address, record) in records {
                history.add_entry(&address, record);
            }
        }

        Ok(PollOutcome::Completed {
            devices: reconciled,
            changes,
            problems,
        })
    }

    // =========================================================================
    // Write Router
    // =========================================================================

    /// Handles a write request from the accessory layer.
    ///
    /// - `active`: writes the relay function (auto when on, off when off),
    ///   records the new activity, then copies the same code to the
    ///   indicator LED. The LED write is best effort.
    /// - `targetState`: only humidify-only (2) is accepted.
    /// - Any other attribute, or `active`/`targetState` on a device that is
    ///   not a humidistat, is read-only and the write is ignored.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DeviceNotFound`] for an unknown address,
    /// [`Error::UnsupportedOperation`] for a value `active` or `targetState`
    /// cannot take, and the adapter error if the relay write fails.
    pub async fn set_attribute(
        &self,
        address: &DeviceAddress,
        attribute: Attribute,
        value: AttributeValue,
    ) -> Result<()> {
        let descriptor = self.descriptor(address).await?;
        let humidistat = descriptor.kind().is_humidistat();

        match attribute {
            Attribute::Active if humidistat => {
                let on = value.as_bool().ok_or_else(|| {
                    Error::UnsupportedOperation(format!("active cannot be set to {value}"))
                })?;
                let control = if on { RelayControl::Auto } else { RelayControl::Off };

                self.adapter
                    .write(&descriptor, Attribute::RelayControl, control.into())
                    .await?;
                tracing::info!(address = %address, control = %control, "Relay function set");
                self.apply_state_change(address, StateChange::Active(on)).await;

                if let Err(e) = self
                    .adapter
                    .write(&descriptor, Attribute::IndicatorControl, control.into())
                    .await
                {
                    tracing::warn!(address = %address, error = %e, "Failed to set LED function");
                }
                Ok(())
            }
            Attribute::TargetState if humidistat => {
                let target = value
                    .as_int()
                    .ok_or_else(|| {
                        Error::UnsupportedOperation(format!("targetState cannot be set to {value}"))
                    })
                    .and_then(|code| {
                        TargetHumidifierState::try_from(code)
                            .map_err(|e| Error::UnsupportedOperation(e.to_string()))
                    })?;
                self.apply_state_change(address, StateChange::TargetState(target))
                    .await;
                Ok(())
            }
            _ => {
                tracing::debug!(
                    address = %address,
                    attribute = %attribute,
                    value = %value,
                    "Ignoring write to read-only attribute"
                );
                Ok(())
            }
        }
    }

    /// Applies a state change and publishes an event.
    async fn apply_state_change(&self, address: &DeviceAddress, change: StateChange) {
        let mut devices = self.devices.write().await;

        if let Some(device) = devices.get_mut(address)
            && device.apply_state_change(&change)
        {
            let event = DeviceEvent::attribute_changed(address.clone(), change, device.state.clone());
            drop(devices);
            self.event_bus.publish(event);
        }
    }
}

impl<A> Clone for Bridge<A> {
    fn clone(&self) -> Self {
        Self {
            adapter: Arc::clone(&self.adapter),
            devices: Arc::clone(&self.devices),
            event_bus: self.event_bus.clone(),
            history: self.history.clone(),
            quiet: self.quiet,
            poll_gate: Arc::clone(&self.poll_gate),
        }
    }
}

impl<A> std::fmt::Debug for Bridge<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bridge")
            .field("event_bus", &self.event_bus)
            .field("quiet", &self.quiet)
            .field("history", &self.history.is_some())
            .finish_non_exhaustive()
    }
}

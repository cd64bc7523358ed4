// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device event types.

use crate::state::{DeviceState, StateChange};
use crate::types::{Attribute, DeviceAddress};

/// Events emitted by the bridge.
///
/// # Examples
///
/// ```
/// use owbridge::event::DeviceEvent;
/// use owbridge::state::{DeviceState, StateChange};
/// use owbridge::types::{Attribute, DeviceAddress};
///
/// let address = DeviceAddress::new("28.0001");
/// let event = DeviceEvent::attribute_changed(
///     address.clone(),
///     StateChange::Temperature(21.5),
///     DeviceState::new(),
/// );
/// assert_eq!(event.attribute(), Some(Attribute::Temperature));
/// assert_eq!(event.address(), Some(&address));
/// ```
#[derive(Debug, Clone)]
pub enum DeviceEvent {
    /// A device was registered with the bridge.
    DeviceAdded {
        /// Address of the device.
        address: DeviceAddress,
    },

    /// An attribute took a new value during a poll or a write.
    AttributeChanged {
        /// Address of the device.
        address: DeviceAddress,
        /// The new value.
        change: StateChange,
        /// The complete state after the change.
        new_state: DeviceState,
    },

    /// A sensor attribute was removed because the backend had no data for it.
    AttributeCleared {
        /// Address of the device.
        address: DeviceAddress,
        /// The cleared attribute.
        attribute: Attribute,
    },

    /// A poll failed as a whole; no state was changed.
    PollFailed {
        /// Description of the failure.
        error: String,
    },
}

impl DeviceEvent {
    /// Returns the device address, if the event concerns one device.
    #[must_use]
    pub fn address(&self) -> Option<&DeviceAddress> {
        match self {
            Self::DeviceAdded { address }
            | Self::AttributeChanged { address, .. }
            | Self::AttributeCleared { address, .. } => Some(address),
            Self::PollFailed { .. } => None,
        }
    }

    /// Returns the attribute the event is about, if any.
    #[must_use]
    pub fn attribute(&self) -> Option<Attribute> {
        match self {
            Self::AttributeChanged { change, .. } => Some(change.attribute()),
            Self::AttributeCleared { attribute, .. } => Some(*attribute),
            Self::DeviceAdded { .. } | Self::PollFailed { .. } => None,
        }
    }

    /// Returns `true` for attribute changes and clears.
    #[must_use]
    pub fn is_state_change(&self) -> bool {
        matches!(
            self,
            Self::AttributeChanged { .. } | Self::AttributeCleared { .. }
        )
    }

    /// Creates a device added event.
    #[must_use]
    pub fn device_added(address: DeviceAddress) -> Self {
        Self::DeviceAdded { address }
    }

    /// Creates an attribute changed event.
    #[must_use]
    pub fn attribute_changed(
        address: DeviceAddress,
        change: StateChange,
        new_state: DeviceState,
    ) -> Self {
        Self::AttributeChanged {
            address,
            change,
            new_state,
        }
    }

    /// Creates an attribute cleared event.
    #[must_use]
    pub fn attribute_cleared(address: DeviceAddress, attribute: Attribute) -> Self {
        Self::AttributeCleared { address, attribute }
    }

    /// Creates a poll failed event.
    #[must_use]
    pub fn poll_failed(error: impl Into<String>) -> Self {
        Self::PollFailed {
            error: error.into(),
        }
    }
}

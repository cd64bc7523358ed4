// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Event system for device state changes.
//!
//! The bridge publishes a [`DeviceEvent`] for every attribute that changes
//! or is cleared during a poll, and for every poll that fails. The
//! [`EventBus`] uses tokio's broadcast channel so any number of accessory
//! layers can subscribe.
//!
//! # Examples
//!
//! ```
//! use owbridge::event::{DeviceEvent, EventBus};
//! use owbridge::types::DeviceAddress;
//!
//! let bus = EventBus::new();
//! let mut rx = bus.subscribe();
//!
//! bus.publish(DeviceEvent::device_added(DeviceAddress::new("28.0001")));
//! ```

mod device_event;
mod event_bus;

pub use device_event::DeviceEvent;
pub use event_bus::EventBus;

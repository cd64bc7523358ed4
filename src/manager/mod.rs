// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device registry, polling and write routing.
//!
//! The [`Bridge`] is the central component. It provides:
//!
//! - **Device registry**: the configured [`DeviceDescriptor`]s, keyed by address
//! - **Polling**: [`Bridge::poll_once`] reads the backend and reconciles every
//!   device; [`PollScheduler`] runs it on a timer
//! - **State tracking**: state can be queried, watched per device, or followed
//!   through the event bus
//! - **Write routing**: [`Bridge::set_attribute`] turns accessory requests
//!   into backend writes
//!
//! # Examples
//!
//! ```no_run
//! use owbridge::event::DeviceEvent;
//! use owbridge::manager::{Bridge, DeviceDescriptor, DeviceKind, PollScheduler};
//! use owbridge::protocol::OwfsConfig;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() {
//!     let bridge = Bridge::new(OwfsConfig::new("localhost").into_adapter());
//!     bridge
//!         .register(DeviceDescriptor::new("28.5D3C1C000000", DeviceKind::Ds18b20))
//!         .await;
//!
//!     let mut events = bridge.subscribe();
//!     let scheduler = PollScheduler::spawn(bridge.clone(), Duration::from_secs(60));
//!
//!     while let Ok(event) = events.recv().await {
//!         if let DeviceEvent::AttributeChanged { address, change, .. } = event {
//!             println!("{address}: {change:?}");
//!         }
//!     }
//!     scheduler.stop().await;
//! }
//! ```

mod bridge;
mod device_config;
mod managed_device;
mod scheduler;

pub use bridge::{Bridge, PollOutcome};
pub use device_config::{DeviceDescriptor, DeviceEntry, DeviceKind, LoggerKind};
pub use scheduler::PollScheduler;

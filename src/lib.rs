// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `owbridge` - bridges 1-Wire sensor servers to home-automation accessories.
//!
//! The library periodically polls a 1-Wire server, turns the vendor readings
//! into a canonical set of attributes, tracks per-device state, and tells
//! the accessory layer what changed. Writes from the accessory layer are
//! routed back to the server.
//!
//! # Supported Servers
//!
//! - **EDS OW-Server** (`eds` feature): the whole bus in one `details.xml`
//!   document over HTTP
//! - **OWFS owserver** (`owfs` feature): one request per device property over
//!   the owserver TCP protocol
//!
//! # Supported Devices
//!
//! - DS18B20 temperature sensors
//! - DS2438 with an HIH humidity sensor
//! - EDS0065 temperature and humidity modules
//! - EDS0065 used as a humidistat driving a humidifier from its relay
//!
//! # Quick Start
//!
//! ```no_run
//! use owbridge::config::BridgeConfig;
//! use owbridge::manager::PollScheduler;
//! use owbridge::types::{Attribute, DeviceAddress};
//!
//! #[tokio::main]
//! async fn main() -> owbridge::Result<()> {
//!     let config = BridgeConfig::from_json(
//!         r#"{
//!             "server": "EDS",
//!             "host": "192.168.1.40",
//!             "devices": [
//!                 { "name": "Garage", "address": "5F0000000A7B1C28", "type": "DS18B20" }
//!             ]
//!         }"#,
//!     )
//!     .expect("valid configuration");
//!
//!     let interval = config.poll_interval();
//!     let bridge = config.into_bridge().await?;
//!     let scheduler = PollScheduler::spawn(bridge.clone(), interval);
//!
//!     let garage = DeviceAddress::new("5F0000000A7B1C28");
//!     if let Ok(temp) = bridge.get_attribute(&garage, Attribute::Temperature).await {
//!         println!("Garage: {temp} C");
//!     }
//!
//!     scheduler.stop().await;
//!     Ok(())
//! }
//! ```
//!
//! ## Humidistat Control
//!
//! ```no_run
//! use owbridge::access::AttributeAccess;
//! use owbridge::manager::{Bridge, DeviceDescriptor, DeviceKind};
//! use owbridge::protocol::EdsAdapter;
//! use owbridge::types::Attribute;
//!
//! #[tokio::main]
//! async fn main() -> owbridge::Result<()> {
//!     let bridge = Bridge::new(EdsAdapter::new("192.168.1.40")?);
//!     bridge
//!         .register(DeviceDescriptor::new("7E0000001C3C5D28", DeviceKind::Eds0065Humidistat))
//!         .await;
//!
//!     let humidistat = bridge.handle("7E0000001C3C5D28");
//!     humidistat.set_attribute(Attribute::Active, false.into()).await?;
//!     Ok(())
//! }
//! ```

#[cfg(not(any(feature = "eds", feature = "owfs")))]
compile_error!("at least one backend feature must be enabled: `eds` or `owfs`");

pub mod access;
pub mod canonical;
pub mod config;
pub mod error;
pub mod event;
pub mod history;
pub mod manager;
pub mod protocol;
pub mod reconcile;
pub mod state;
pub mod types;

pub use access::{AttributeAccess, DeviceHandle};
pub use config::{BackendKind, BridgeConfig};
pub use error::{Error, FetchError, ParseError, Result, ValueError, WriteError};
pub use event::{DeviceEvent, EventBus};
pub use history::{HistoryRecord, HistorySink, MemoryHistory};
pub use manager::{Bridge, DeviceDescriptor, DeviceKind, PollOutcome, PollScheduler};
pub use protocol::{Adapter, Backend};
pub use state::{CanonicalReading, ChangeSet, DeviceState, StateChange};
pub use types::{Attribute, AttributeValue, DeviceAddress, RelayControl};

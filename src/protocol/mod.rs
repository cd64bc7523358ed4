// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Backend adapters for 1-Wire servers.
//!
//! An [`Adapter`] has two capabilities: read the current values of a list
//! of devices, and write one attribute of one device. Two backends are
//! provided:
//!
//! - [`EdsAdapter`]: EDS OW-Server, one HTTP request per poll returning an
//!   XML document for the whole bus
//! - [`OwfsAdapter`]: OWFS owserver, one TCP request per device property
//!
//! [`Backend`] is the closed set of both, chosen once from configuration.

#[cfg(feature = "eds")]
mod eds;
#[cfg(feature = "owfs")]
mod owfs;
#[cfg(feature = "owfs")]
mod owserver;
#[cfg(feature = "eds")]
pub mod xml;

#[cfg(feature = "eds")]
pub use eds::{DETAILS_ROOT, DEVICE_PREFIX, EdsAdapter, EdsConfig, parse_details};
#[cfg(feature = "owfs")]
pub use owfs::{OwfsAdapter, OwfsConfig};
#[cfg(feature = "owfs")]
pub use owserver::{HEADER_LEN, Header, OwserverClient};

use std::future::Future;

use crate::error::Result;
use crate::manager::DeviceDescriptor;
use crate::state::Readings;
use crate::types::{Attribute, AttributeValue};

/// Read and write access to a 1-Wire server.
///
/// Futures returned by adapters are `Send` so a bridge can be polled from a
/// spawned task.
pub trait Adapter: Send + Sync {
    /// Reads all inputs of the given devices.
    ///
    /// Devices the server has nothing for may be absent from the result or
    /// present with an empty reading.
    ///
    /// # Errors
    ///
    /// Returns an error if the poll as a whole failed. No partial result is
    /// returned in that case.
    fn read(&self, devices: &[DeviceDescriptor]) -> impl Future<Output = Result<Readings>> + Send;

    /// Writes one attribute of one device.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedAttribute`](crate::Error::UnsupportedAttribute)
    /// if the backend has no field for the attribute, or a write error if the
    /// server did not accept it.
    fn write(
        &self,
        device: &DeviceDescriptor,
        attribute: Attribute,
        value: AttributeValue,
    ) -> impl Future<Output = Result<()>> + Send;
}

/// Text sent to a backend for a value.
pub(crate) fn wire_value(value: &AttributeValue) -> String {
    match value {
        AttributeValue::Bool(b) => if *b { "1" } else { "0" }.to_string(),
        AttributeValue::Int(i) => i.to_string(),
        AttributeValue::Float(f) => f.to_string(),
        AttributeValue::Control(c) => c.code().to_string(),
    }
}

/// The configured backend.
#[derive(Debug, Clone)]
pub enum Backend {
    /// EDS OW-Server.
    #[cfg(feature = "eds")]
    Eds(EdsAdapter),
    /// OWFS owserver.
    #[cfg(feature = "owfs")]
    Owfs(OwfsAdapter),
}

impl Backend {
    /// Short backend name for logs.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            #[cfg(feature = "eds")]
            Self::Eds(_) => "EDS",
            #[cfg(feature = "owfs")]
            Self::Owfs(_) => "OWFS",
        }
    }
}

#[cfg(feature = "eds")]
impl From<EdsAdapter> for Backend {
    fn from(adapter: EdsAdapter) -> Self {
        Self::Eds(adapter)
    }
}

#[cfg(feature = "owfs")]
impl From<OwfsAdapter> for Backend {
    fn from(adapter: OwfsAdapter) -> Self {
        Self::Owfs(adapter)
    }
}

impl Adapter for Backend {
    async fn read(&self, devices: &[DeviceDescriptor]) -> Result<Readings> {
        match self {
            #[cfg(feature = "eds")]
            Self::Eds(adapter) => adapter.read(devices).await,
            #[cfg(feature = "owfs")]
            Self::Owfs(adapter) => adapter.read(devices).await,
        }
    }

    async fn write(
        &self,
        device: &DeviceDescriptor,
        attribute: Attribute,
        value: AttributeValue,
    ) -> Result<()> {
        match self {
            #[cfg(feature = "eds")]
            Self::Eds(adapter) => adapter.write(device, attribute, value).await,
            #[cfg(feature = "owfs")]
            Self::Owfs(adapter) => adapter.write(device, attribute, value).await,
        }
    }
}

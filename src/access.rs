// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Per-device attribute access for the accessory layer.
//!
//! An accessory framework only needs two operations on a device: read an
//! attribute and set one. [`AttributeAccess`] is that interface;
//! [`DeviceHandle`] implements it on top of a [`Bridge`].

use std::future::Future;

use crate::error::Result;
use crate::manager::Bridge;
use crate::protocol::{Adapter, Backend};
use crate::types::{Attribute, AttributeValue, DeviceAddress};

/// Get and set attributes of one device.
pub trait AttributeAccess: Send + Sync {
    /// Returns the current value of an attribute.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotAvailable`](crate::Error::NotAvailable) if the
    /// attribute was never established or was cleared by a poll without data.
    fn get_attribute(
        &self,
        attribute: Attribute,
    ) -> impl Future<Output = Result<AttributeValue>> + Send;

    /// Requests a new value for an attribute.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is rejected or the backend write fails.
    fn set_attribute(
        &self,
        attribute: Attribute,
        value: AttributeValue,
    ) -> impl Future<Output = Result<()>> + Send;
}

/// A handle to one registered device.
///
/// # Examples
///
/// ```no_run
/// use owbridge::access::AttributeAccess;
/// use owbridge::manager::{Bridge, DeviceDescriptor, DeviceKind};
/// use owbridge::protocol::EdsAdapter;
/// use owbridge::types::Attribute;
///
/// # async fn example() -> owbridge::Result<()> {
/// let bridge = Bridge::new(EdsAdapter::new("192.168.1.40")?);
/// bridge
///     .register(DeviceDescriptor::new("7E0000001C3C5D28", DeviceKind::Eds0065Humidistat))
///     .await;
///
/// let humidistat = bridge.handle("7E0000001C3C5D28");
/// humidistat.set_attribute(Attribute::Active, true.into()).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct DeviceHandle<A = Backend> {
    bridge: Bridge<A>,
    address: DeviceAddress,
}

impl<A> DeviceHandle<A> {
    pub(crate) fn new(bridge: Bridge<A>, address: DeviceAddress) -> Self {
        Self { bridge, address }
    }

    /// Returns the device address.
    #[must_use]
    pub fn address(&self) -> &DeviceAddress {
        &self.address
    }
}

impl<A> Clone for DeviceHandle<A> {
    fn clone(&self) -> Self {
        Self {
            bridge: self.bridge.clone(),
            address: self.address.clone(),
        }
    }
}

impl<A: Adapter> AttributeAccess for DeviceHandle<A> {
    async fn get_attribute(&self, attribute: Attribute) -> Result<AttributeValue> {
        self.bridge.get_attribute(&self.address, attribute).await
    }

    async fn set_attribute(&self, attribute: Attribute, value: AttributeValue) -> Result<()> {
        self.bridge
            .set_attribute(&self.address, attribute, value)
            .await
    }
}

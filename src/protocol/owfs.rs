// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! OWFS owserver backend.
//!
//! owserver exposes each device property as a separate path, so a poll
//! issues one read per (device, attribute) pair. The reads run
//! concurrently; a pair that fails is logged and left out of the result
//! while the other pairs still complete.

use std::time::Duration;

use tokio::task::JoinSet;

use crate::canonical::owfs as canonical;
use crate::error::{Error, FetchError, Result, WriteError};
use crate::manager::DeviceDescriptor;
use crate::state::{CanonicalReading, Readings, StateChange};
use crate::types::{Attribute, AttributeValue, DeviceAddress};

use super::owserver::OwserverClient;
use super::{Adapter, wire_value};

/// Connection parameters for an owserver.
///
/// # Examples
///
/// ```
/// use owbridge::protocol::OwfsConfig;
///
/// let config = OwfsConfig::new("pi.local");
/// assert_eq!(config.port(), 4304);
/// ```
#[derive(Debug, Clone)]
pub struct OwfsConfig {
    host: String,
    port: u16,
    timeout: Duration,
}

impl OwfsConfig {
    /// Default owserver port.
    pub const DEFAULT_PORT: u16 = 4304;
    /// Default request timeout.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Creates a configuration for the specified host.
    #[must_use]
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: Self::DEFAULT_PORT,
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }

    /// Sets a custom port.
    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Sets the per-request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns the host.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Returns the port.
    #[must_use]
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Returns the timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Creates an adapter from this configuration.
    #[must_use]
    pub fn into_adapter(self) -> OwfsAdapter {
        OwfsAdapter::new(OwserverClient::new(self.host, self.port, self.timeout))
    }
}

/// Adapter for an OWFS owserver.
#[derive(Debug, Clone)]
pub struct OwfsAdapter {
    client: OwserverClient,
}

impl OwfsAdapter {
    /// Creates an adapter around a client.
    #[must_use]
    pub fn new(client: OwserverClient) -> Self {
        Self { client }
    }

    /// Returns the underlying client.
    #[must_use]
    pub fn client(&self) -> &OwserverClient {
        &self.client
    }
}

fn property_path(address: &DeviceAddress, field: &str) -> String {
    format!("/{}/{field}", address.as_str())
}

async fn read_pair(
    client: OwserverClient,
    address: DeviceAddress,
    attribute: Attribute,
    path: String,
) -> (DeviceAddress, std::result::Result<StateChange, Error>) {
    let result = match client.read(&path).await {
        Ok(raw) => canonical::canonicalize(attribute, &raw).map_err(Error::from),
        Err(e) => Err(Error::from(e)),
    };
    if let Err(e) = &result {
        tracing::warn!(path = %path, error = %e, "OWFS server failed to read");
    }
    (address, result)
}

impl Adapter for OwfsAdapter {
    async fn read(&self, devices: &[DeviceDescriptor]) -> Result<Readings> {
        let mut readings = Readings::new();
        let mut reads = JoinSet::new();

        for device in devices {
            readings.insert(device.address().clone(), CanonicalReading::new());
            for &attribute in device.kind().inputs() {
                let Some(field) = device.kind().owfs_field(attribute) else {
                    continue;
                };
                reads.spawn(read_pair(
                    self.client.clone(),
                    device.address().clone(),
                    attribute,
                    property_path(device.address(), field),
                ));
            }
        }

        let mut failed = 0usize;
        while let Some(joined) = reads.join_next().await {
            match joined {
                Ok((address, Ok(change))) => {
                    if let Some(reading) = readings.get_mut(&address) {
                        reading.set(change);
                    }
                }
                Ok((_, Err(_))) => failed += 1,
                Err(e) => {
                    failed += 1;
                    tracing::warn!(error = %e, "OWFS read task failed");
                }
            }
        }

        tracing::debug!(
            server = %self.client.address(),
            devices = devices.len(),
            failed,
            "Completed OWFS poll"
        );
        Ok(readings)
    }

    async fn write(
        &self,
        device: &DeviceDescriptor,
        attribute: Attribute,
        value: AttributeValue,
    ) -> Result<()> {
        let field = device
            .kind()
            .owfs_field(attribute)
            .ok_or(Error::UnsupportedAttribute(attribute))?;
        let path = property_path(device.address(), field);

        self.client
            .write(&path, &wire_value(&value))
            .await
            .map_err(|e| match e {
                FetchError::Owserver { code, path } => WriteError::Rejected { code, path },
                other => WriteError::Transport(other),
            })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manager::DeviceKind;

    #[test]
    fn paths_are_relative_to_device() {
        assert_eq!(
            property_path(&DeviceAddress::new("26.A1B2C3000000"), "HIH4000/humidity"),
            "/26.A1B2C3000000/HIH4000/humidity"
        );
    }

    #[test]
    fn config_defaults() {
        let config = OwfsConfig::new("localhost");
        assert_eq!(config.port(), OwfsConfig::DEFAULT_PORT);
        assert_eq!(config.timeout(), Duration::from_secs(10));
        let adapter = config.with_port(4305).into_adapter();
        assert_eq!(adapter.client().address(), "localhost:4305");
    }

    #[tokio::test]
    async fn unsupported_write_is_rejected_before_io() {
        let adapter = OwfsConfig::new("127.0.0.1").with_port(1).into_adapter();
        let device = DeviceDescriptor::new("28.0001", DeviceKind::Ds18b20);
        let err = adapter
            .write(&device, Attribute::RelayControl, AttributeValue::Int(0))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::UnsupportedAttribute(Attribute::RelayControl)));
    }
}

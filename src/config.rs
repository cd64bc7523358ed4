// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Bridge configuration.
//!
//! ```json
//! {
//!   "server": "EDS",
//!   "host": "192.168.1.40",
//!   "update_interval": 5,
//!   "quiet": true,
//!   "devices": [
//!     { "name": "Garage", "address": "5F0000000A7B1C28", "type": "DS18B20" },
//!     { "name": "Cellar", "address": "7E0000001C3C5D28", "type": "EDS0065-Humidistat" }
//!   ]
//! }
//! ```

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;

use crate::error::{Error, ValueError};
use crate::manager::{Bridge, DeviceDescriptor, DeviceEntry};
use crate::protocol::Backend;

/// Backend server type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub enum BackendKind {
    /// EDS OW-Server over HTTP.
    #[default]
    Eds,
    /// OWFS owserver over TCP.
    Owfs,
}

impl BackendKind {
    /// Default port for the backend.
    #[must_use]
    pub const fn default_port(&self) -> u16 {
        match self {
            Self::Eds => 80,
            Self::Owfs => 4304,
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Eds => "EDS",
            Self::Owfs => "OWFS",
        })
    }
}

impl FromStr for BackendKind {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "EDS" => Ok(Self::Eds),
            "OWFS" => Ok(Self::Owfs),
            _ => Err(ValueError::UnknownServer(s.to_string())),
        }
    }
}

impl TryFrom<String> for BackendKind {
    type Error = ValueError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_update_interval() -> u64 {
    1
}

fn default_timeout_secs() -> u64 {
    10
}

/// Bridge configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct BridgeConfig {
    /// Backend server type.
    #[serde(default)]
    pub server: BackendKind,
    /// Server host name or address.
    #[serde(default = "default_host")]
    pub host: String,
    /// Server port; defaults per backend.
    #[serde(default)]
    pub port: Option<u16>,
    /// Poll interval in minutes.
    #[serde(default = "default_update_interval")]
    pub update_interval: u64,
    /// Log unchanged polls at debug level only.
    #[serde(default)]
    pub quiet: bool,
    /// Backend request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Devices to bridge.
    #[serde(default)]
    pub devices: Vec<DeviceEntry>,
}

impl BridgeConfig {
    /// Parses a configuration from JSON.
    ///
    /// # Errors
    ///
    /// Returns error if the JSON is malformed or names an unknown server.
    ///
    /// # Examples
    ///
    /// ```
    /// use owbridge::config::{BackendKind, BridgeConfig};
    ///
    /// let config = BridgeConfig::from_json(r#"{ "server": "OWFS" }"#).unwrap();
    /// assert_eq!(config.server, BackendKind::Owfs);
    /// assert_eq!(config.port(), 4304);
    /// assert_eq!(config.host, "localhost");
    /// ```
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Effective server port.
    #[must_use]
    pub fn port(&self) -> u16 {
        self.port.unwrap_or_else(|| self.server.default_port())
    }

    /// Poll interval.
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.update_interval.max(1) * 60)
    }

    /// Backend request timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Device descriptors for the configured devices.
    ///
    /// Entries with an unknown type are skipped with a warning.
    #[must_use]
    pub fn descriptors(&self) -> Vec<DeviceDescriptor> {
        self.devices
            .iter()
            .filter_map(|entry| match DeviceDescriptor::try_from(entry) {
                Ok(descriptor) => Some(descriptor),
                Err(e) => {
                    tracing::warn!(
                        address = %entry.address,
                        error = %e,
                        "Skipping device with unknown type"
                    );
                    None
                }
            })
            .collect()
    }

    /// Creates the configured backend.
    ///
    /// # Errors
    ///
    /// Returns error if the backend is not compiled in or its client cannot
    /// be created.
    pub fn backend(&self) -> Result<Backend, Error> {
        match self.server {
            #[cfg(feature = "eds")]
            BackendKind::Eds => Ok(crate::protocol::EdsConfig::new(self.host.as_str())
                .with_port(self.port())
                .with_timeout(self.timeout())
                .into_adapter()?
                .into()),
            #[cfg(feature = "owfs")]
            BackendKind::Owfs => Ok(crate::protocol::OwfsConfig::new(self.host.as_str())
                .with_port(self.port())
                .with_timeout(self.timeout())
                .into_adapter()
                .into()),
            #[allow(unreachable_patterns)]
            other => Err(Error::UnsupportedOperation(format!(
                "{other} backend is not enabled"
            ))),
        }
    }

    /// Creates a bridge with the configured backend and devices.
    ///
    /// # Errors
    ///
    /// Same as [`backend`](Self::backend).
    pub async fn into_bridge(self) -> Result<Bridge, Error> {
        let backend = self.backend()?;
        tracing::info!(
            server = backend.name(),
            host = %self.host,
            port = self.port(),
            "Initialized 1-Wire server"
        );

        let bridge = Bridge::new(backend).with_quiet(self.quiet);
        for descriptor in self.descriptors() {
            bridge.register(descriptor).await;
        }
        Ok(bridge)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manager::DeviceKind;

    #[test]
    fn defaults() {
        let config = BridgeConfig::from_json("{}").unwrap();
        assert_eq!(config.server, BackendKind::Eds);
        assert_eq!(config.host, "localhost");
        assert_eq!(config.port(), 80);
        assert_eq!(config.poll_interval(), Duration::from_secs(60));
        assert_eq!(config.timeout(), Duration::from_secs(10));
        assert!(!config.quiet);
        assert!(config.devices.is_empty());
    }

    #[test]
    fn explicit_values() {
        let config = BridgeConfig::from_json(
            r#"{
                "server": "owfs",
                "host": "pi.local",
                "port": 4305,
                "update_interval": 5,
                "quiet": true,
                "timeout_secs": 3
            }"#,
        )
        .unwrap();
        assert_eq!(config.server, BackendKind::Owfs);
        assert_eq!(config.port(), 4305);
        assert_eq!(config.poll_interval(), Duration::from_secs(300));
        assert_eq!(config.timeout(), Duration::from_secs(3));
        assert!(config.quiet);
    }

    #[test]
    fn unknown_server_is_an_error() {
        let err = BridgeConfig::from_json(r#"{ "server": "SNMP" }"#).unwrap_err();
        assert!(err.to_string().contains("unknown server type"));
    }

    #[test]
    fn unknown_device_types_are_skipped() {
        let config = BridgeConfig::from_json(
            r#"{ "devices": [
                { "name": "Garage", "address": "28.0001", "type": "DS18B20" },
                { "address": "29.0001", "type": "DS2408" },
                { "address": "7E.0001", "type": "EDS0065-Humidistat" }
            ] }"#,
        )
        .unwrap();

        let descriptors = config.descriptors();
        assert_eq!(descriptors.len(), 2);
        assert_eq!(descriptors[0].display_name(), "Garage");
        assert_eq!(descriptors[1].kind(), DeviceKind::Eds0065Humidistat);
    }

    #[cfg(feature = "owfs")]
    #[tokio::test]
    async fn into_bridge_registers_known_devices() {
        let config = BridgeConfig::from_json(
            r#"{ "server": "OWFS", "devices": [
                { "address": "28.0001", "type": "DS18B20" },
                { "address": "3A.0001", "type": "DS2413" }
            ] }"#,
        )
        .unwrap();

        let bridge = config.into_bridge().await.unwrap();
        assert_eq!(bridge.device_count().await, 1);
        assert_eq!(bridge.adapter().name(), "OWFS");
    }
}

// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device descriptors and the catalog of supported device types.

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use crate::error::ValueError;
use crate::types::{Attribute, DeviceAddress};

/// History logger profile a device type feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoggerKind {
    /// Temperature and humidity history.
    Weather,
}

/// Supported 1-Wire device types.
///
/// The type decides which canonical attributes a device is expected to
/// report (its inputs), whether humidistat state is derived for it, whether
/// it feeds a history logger, and where its values live on owserver.
///
/// # Examples
///
/// ```
/// use owbridge::manager::DeviceKind;
/// use owbridge::types::Attribute;
///
/// let kind: DeviceKind = "EDS0065".parse().unwrap();
/// assert!(kind.inputs().contains(&Attribute::Humidity));
/// assert!(!kind.is_humidistat());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceKind {
    /// DS18B20 temperature sensor.
    Ds18b20,
    /// DS2438 battery monitor with an HIH humidity sensor.
    Ds2438,
    /// EDS0065 temperature and humidity module.
    Eds0065,
    /// EDS0065 used as a humidistat driving a humidifier from its relay.
    Eds0065Humidistat,
}

impl DeviceKind {
    /// Returns the configuration name of the type.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Ds18b20 => "DS18B20",
            Self::Ds2438 => "DS2438",
            Self::Eds0065 => "EDS0065",
            Self::Eds0065Humidistat => "EDS0065-Humidistat",
        }
    }

    /// Canonical attributes the device is expected to report.
    #[must_use]
    pub const fn inputs(&self) -> &'static [Attribute] {
        match self {
            Self::Ds18b20 => &[Attribute::Temperature],
            Self::Ds2438 | Self::Eds0065 => &[Attribute::Temperature, Attribute::Humidity],
            Self::Eds0065Humidistat => &[
                Attribute::Temperature,
                Attribute::Humidity,
                Attribute::Humidex,
                Attribute::RelayControl,
                Attribute::RelayState,
                Attribute::AlarmState,
                Attribute::Threshold,
            ],
        }
    }

    /// Returns `true` if humidistat state is derived for this type.
    #[must_use]
    pub const fn is_humidistat(&self) -> bool {
        matches!(self, Self::Eds0065Humidistat)
    }

    /// History logger the type feeds, if any.
    #[must_use]
    pub const fn logger(&self) -> Option<LoggerKind> {
        match self {
            Self::Ds18b20 | Self::Ds2438 | Self::Eds0065 => Some(LoggerKind::Weather),
            Self::Eds0065Humidistat => None,
        }
    }

    /// owserver property holding an attribute, relative to the device directory.
    #[must_use]
    pub const fn owfs_field(&self, attribute: Attribute) -> Option<&'static str> {
        match (self, attribute) {
            (Self::Ds18b20 | Self::Ds2438, Attribute::Temperature) => Some("temperature"),
            (Self::Ds2438, Attribute::Humidity) => Some("HIH4000/humidity"),
            (Self::Eds0065 | Self::Eds0065Humidistat, Attribute::Temperature) => {
                Some("EDS0065/temperature")
            }
            (Self::Eds0065 | Self::Eds0065Humidistat, Attribute::Humidity) => {
                Some("EDS0065/humidity")
            }
            (Self::Eds0065Humidistat, Attribute::Humidex) => Some("EDS0065/humidex"),
            (Self::Eds0065Humidistat, Attribute::RelayState) => Some("EDS0065/relay_state"),
            (Self::Eds0065Humidistat, Attribute::RelayControl) => {
                Some("EDS0065/relay_function")
            }
            (Self::Eds0065Humidistat, Attribute::IndicatorControl) => {
                Some("EDS0065/LED/function")
            }
            _ => None,
        }
    }
}

impl fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeviceKind {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "DS18B20" => Ok(Self::Ds18b20),
            "DS2438" => Ok(Self::Ds2438),
            "EDS0065" => Ok(Self::Eds0065),
            "EDS0065-HUMIDISTAT" => Ok(Self::Eds0065Humidistat),
            _ => Err(ValueError::UnknownDeviceType(s.to_string())),
        }
    }
}

/// A device as supplied by configuration.
///
/// # Examples
///
/// ```
/// use owbridge::manager::{DeviceDescriptor, DeviceKind};
///
/// let device = DeviceDescriptor::new("28.5D3C1C000000", DeviceKind::Ds18b20)
///     .with_name("Garage");
/// assert_eq!(device.display_name(), "Garage");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceDescriptor {
    address: DeviceAddress,
    kind: DeviceKind,
    name: Option<String>,
}

impl DeviceDescriptor {
    /// Creates a descriptor.
    #[must_use]
    pub fn new(address: impl Into<DeviceAddress>, kind: DeviceKind) -> Self {
        Self {
            address: address.into(),
            kind,
            name: None,
        }
    }

    /// Sets a display name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Returns the device address.
    #[must_use]
    pub fn address(&self) -> &DeviceAddress {
        &self.address
    }

    /// Returns the device type.
    #[must_use]
    pub fn kind(&self) -> DeviceKind {
        self.kind
    }

    /// Returns the name if set, otherwise the address.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(self.address.as_str())
    }
}

/// Device entry as it appears in configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DeviceEntry {
    /// Display name.
    #[serde(default)]
    pub name: Option<String>,
    /// Backend address.
    pub address: String,
    /// Declared type name.
    #[serde(rename = "type")]
    pub kind: String,
}

impl TryFrom<&DeviceEntry> for DeviceDescriptor {
    type Error = ValueError;

    fn try_from(entry: &DeviceEntry) -> Result<Self, Self::Error> {
        let kind = entry.kind.parse()?;
        let descriptor = Self::new(entry.address.as_str(), kind);
        Ok(match &entry.name {
            Some(name) => descriptor.with_name(name.clone()),
            None => descriptor,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_type_names() {
        assert_eq!("ds18b20".parse::<DeviceKind>().unwrap(), DeviceKind::Ds18b20);
        assert_eq!(
            "EDS0065-Humidistat".parse::<DeviceKind>().unwrap(),
            DeviceKind::Eds0065Humidistat
        );
        assert_eq!(
            "DS2408".parse::<DeviceKind>().unwrap_err(),
            ValueError::UnknownDeviceType("DS2408".to_string())
        );
    }

    #[test]
    fn humidistat_declares_control_inputs() {
        let inputs = DeviceKind::Eds0065Humidistat.inputs();
        assert!(inputs.contains(&Attribute::Threshold));
        assert!(inputs.contains(&Attribute::AlarmState));
        assert!(DeviceKind::Eds0065Humidistat.logger().is_none());
    }

    #[test]
    fn owfs_fields() {
        assert_eq!(
            DeviceKind::Ds2438.owfs_field(Attribute::Humidity),
            Some("HIH4000/humidity")
        );
        assert_eq!(DeviceKind::Ds18b20.owfs_field(Attribute::Humidity), None);
        assert_eq!(
            DeviceKind::Eds0065Humidistat.owfs_field(Attribute::Threshold),
            None
        );
    }

    #[test]
    fn descriptor_from_entry() {
        let entry = DeviceEntry {
            name: Some("Cellar".to_string()),
            address: "26.A1B2C3000000".to_string(),
            kind: "DS2438".to_string(),
        };
        let device = DeviceDescriptor::try_from(&entry).unwrap();
        assert_eq!(device.kind(), DeviceKind::Ds2438);
        assert_eq!(device.display_name(), "Cellar");
        assert_eq!(device.address().as_str(), "26.A1B2C3000000");
    }

    #[test]
    fn display_name_falls_back_to_address() {
        let device = DeviceDescriptor::new("28.0001", DeviceKind::Ds18b20);
        assert_eq!(device.display_name(), "28.0001");
    }
}

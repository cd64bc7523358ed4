// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! EDS OW-Server backend.
//!
//! The server publishes every device on its bus in one XML document,
//! `/details.xml`, so a poll is a single request. Writes go to
//! `/devices.htm` with the device ROM id, the field name and the value as
//! query parameters.

use std::time::Duration;

use reqwest::Client;

use crate::canonical::eds::{self as canonical, ROM_ID_FIELD, VendorField};
use crate::error::{Error, FetchError, ParseError, Result, WriteError};
use crate::manager::DeviceDescriptor;
use crate::state::Readings;
use crate::types::{Attribute, AttributeValue, DeviceAddress};

use super::{Adapter, wire_value};

/// Root element of the details document.
pub const DETAILS_ROOT: &str = "Devices-Detail-Response";
/// Prefix of per-device elements in the details document.
pub const DEVICE_PREFIX: &str = "owd_";

// ============================================================================
// EdsConfig
// ============================================================================

/// Connection parameters for an EDS OW-Server.
///
/// # Examples
///
/// ```
/// use owbridge::protocol::EdsConfig;
/// use std::time::Duration;
///
/// let config = EdsConfig::new("192.168.1.40")
///     .with_port(8080)
///     .with_timeout(Duration::from_secs(5));
/// assert_eq!(config.base_url(), "http://192.168.1.40:8080");
/// ```
#[derive(Debug, Clone)]
pub struct EdsConfig {
    host: String,
    port: u16,
    timeout: Duration,
}

impl EdsConfig {
    /// Default HTTP port.
    pub const DEFAULT_PORT: u16 = 80;
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

    /// Sets the request timeout.
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

    /// Builds the base URL from this configuration.
    #[must_use]
    pub fn base_url(&self) -> String {
        if self.port == Self::DEFAULT_PORT {
            format!("http://{}", self.host)
        } else {
            format!("http://{}:{}", self.host, self.port)
        }
    }

    /// Creates an adapter from this configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be created.
    pub fn into_adapter(self) -> std::result::Result<EdsAdapter, FetchError> {
        EdsAdapter::with_timeout(self.base_url(), self.timeout)
    }
}

// ============================================================================
// EdsAdapter
// ============================================================================

/// Adapter for an EDS OW-Server.
///
/// # Examples
///
/// ```no_run
/// use owbridge::manager::{DeviceDescriptor, DeviceKind};
/// use owbridge::protocol::{Adapter, EdsAdapter};
///
/// # async fn example() -> owbridge::Result<()> {
/// let adapter = EdsAdapter::new("192.168.1.40")?;
/// let devices = [DeviceDescriptor::new("5F0000000A7B1C28", DeviceKind::Ds18b20)];
/// let readings = adapter.read(&devices).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct EdsAdapter {
    base_url: String,
    client: Client,
    timeout: Duration,
}

impl EdsAdapter {
    /// Creates an adapter for the specified host or base URL.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be created.
    pub fn new(host: impl Into<String>) -> std::result::Result<Self, FetchError> {
        Self::with_timeout(host, EdsConfig::DEFAULT_TIMEOUT)
    }

    /// Creates an adapter with a custom request timeout.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be created.
    pub fn with_timeout(
        host: impl Into<String>,
        timeout: Duration,
    ) -> std::result::Result<Self, FetchError> {
        let host = host.into();
        if host.trim().is_empty() {
            return Err(FetchError::InvalidAddress("host is required".to_string()));
        }
        let base_url = if host.starts_with("http://") || host.starts_with("https://") {
            host.trim_end_matches('/').to_string()
        } else {
            format!("http://{host}")
        };

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(FetchError::Http)?;

        Ok(Self {
            base_url,
            client,
            timeout,
        })
    }

    /// Returns the base URL of the server.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn details_url(&self) -> String {
        format!("{}/details.xml", self.base_url)
    }

    fn write_url(&self, address: &DeviceAddress, field: &str, value: &str) -> String {
        format!(
            "{}/devices.htm?rom={}&variable={}&value={}",
            self.base_url,
            urlencoding::encode(address.as_str()),
            urlencoding::encode(field),
            urlencoding::encode(value)
        )
    }

    fn transport_error(&self, error: reqwest::Error) -> FetchError {
        if error.is_timeout() {
            FetchError::Timeout(u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX))
        } else {
            FetchError::Http(error)
        }
    }

    /// Fetches the raw details document.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] on transport failure or a non-success status.
    pub async fn fetch_details(&self) -> std::result::Result<String, FetchError> {
        let url = self.details_url();
        tracing::debug!(url = %url, "Pulling EDS details");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        if !response.status().is_success() {
            return Err(FetchError::Status(response.status().as_u16()));
        }

        response.text().await.map_err(|e| self.transport_error(e))
    }

    async fn write_field(
        &self,
        address: &DeviceAddress,
        field: &str,
        value: &str,
    ) -> std::result::Result<(), WriteError> {
        let url = self.write_url(address, field, value);
        tracing::debug!(url = %url, "Sending EDS write");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| WriteError::Transport(self.transport_error(e)))?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(WriteError::Status(response.status().as_u16()))
        }
    }
}

/// Parses a details document into readings for the requested devices.
///
/// Devices on the bus that were not requested are ignored; requested
/// devices missing from the document get no entry.
///
/// # Errors
///
/// Returns [`ParseError`] if the document is malformed, has an unexpected
/// root, or contains a device record without a ROM id. No partial result is
/// returned.
pub fn parse_details(
    document: &str,
    devices: &[DeviceDescriptor],
) -> std::result::Result<Readings, ParseError> {
    let root = super::xml::parse(document)?;
    if root.name() != DETAILS_ROOT {
        return Err(ParseError::UnexpectedFormat(format!(
            "expected <{DETAILS_ROOT}>, found <{}>",
            root.name()
        )));
    }

    let mut readings = Readings::new();
    for record in root
        .children()
        .iter()
        .filter(|n| n.name().starts_with(DEVICE_PREFIX))
    {
        let rom_id = record
            .child(ROM_ID_FIELD)
            .map(super::xml::XmlNode::text)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| ParseError::MissingField(format!("{}/{ROM_ID_FIELD}", record.name())))?;

        // ROM ids are hex; configured addresses may use either case.
        let Some(device) = devices
            .iter()
            .find(|d| d.address().as_str().eq_ignore_ascii_case(rom_id))
        else {
            continue;
        };

        let fields = record.children().iter().map(|field| VendorField {
            name: field.name(),
            text: field.text(),
            units: field.attribute("Units"),
        });
        readings.insert(device.address().clone(), canonical::canonicalize(fields));
    }

    Ok(readings)
}

impl Adapter for EdsAdapter {
    async fn read(&self, devices: &[DeviceDescriptor]) -> Result<Readings> {
        let document = self.fetch_details().await.inspect_err(|e| {
            tracing::warn!(server = %self.base_url, error = %e, "Failed to get update from EDS server");
        })?;
        let readings = parse_details(&document, devices)?;
        tracing::debug!(devices = readings.len(), "Parsed EDS details");
        Ok(readings)
    }

    async fn write(
        &self,
        device: &DeviceDescriptor,
        attribute: Attribute,
        value: AttributeValue,
    ) -> Result<()> {
        let field =
            canonical::backend_field(attribute).ok_or(Error::UnsupportedAttribute(attribute))?;
        self.write_field(device.address(), field, &wire_value(&value))
            .await
            .map_err(Error::from)
    }
}

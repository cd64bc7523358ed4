// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the `owbridge` library.
//!
//! Backend failures are split by direction: [`FetchError`] for reaching a
//! backend, [`ParseError`] for payloads that cannot be understood, and
//! [`WriteError`] for rejected or failed writes. The top-level [`Error`]
//! adds the conditions raised by the write router and the accessory
//! interface.

use thiserror::Error;

use crate::types::{Attribute, DeviceAddress};

/// The main error type for this library.
#[derive(Debug, Error)]
pub enum Error {
    /// A backend could not be reached.
    #[error("fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// A backend payload could not be parsed.
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// A backend write failed.
    #[error("write error: {0}")]
    Write(#[from] WriteError),

    /// A value failed validation.
    #[error("value error: {0}")]
    Value(#[from] ValueError),

    /// The attribute has no equivalent on the active backend.
    #[error("attribute {0} is not supported by this backend")]
    UnsupportedAttribute(Attribute),

    /// The requested control state is not supported by the device.
    #[error("unsupported operation: {0}")]
    UnsupportedOperation(String),

    /// The attribute was never established or was cleared by a "no data" poll.
    #[error("no {attribute} available for {address}")]
    NotAvailable {
        /// Device the attribute was requested for.
        address: DeviceAddress,
        /// The attribute that has no value.
        attribute: Attribute,
    },

    /// No device with this address is registered.
    #[error("device {0} not found")]
    DeviceNotFound(DeviceAddress),
}

/// Errors reaching a backend.
#[derive(Debug, Error)]
pub enum FetchError {
    /// HTTP request failed.
    #[cfg(feature = "eds")]
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Socket I/O failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The backend answered with a non-success status.
    #[error("server returned HTTP {0}")]
    Status(u16),

    /// owserver returned a negative status for a path.
    #[error("owserver error {code} for {path}")]
    Owserver {
        /// Negated owserver return value (an errno).
        code: i32,
        /// The path that was requested.
        path: String,
    },

    /// Request timed out.
    #[error("request timed out after {0} ms")]
    Timeout(u64),

    /// Invalid backend address or URL.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// A message exceeded what the owserver framing can carry.
    #[error("message too large: {0}")]
    TooLarge(String),
}

/// Errors related to parsing backend payloads.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The XML document is malformed.
    #[cfg(feature = "eds")]
    #[error("XML parse error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// Expected element or field is missing.
    #[error("missing field in response: {0}")]
    MissingField(String),

    /// Unexpected payload structure.
    #[error("unexpected response format: {0}")]
    UnexpectedFormat(String),

    /// Failed to parse a specific value.
    #[error("failed to parse {field}: {message}")]
    InvalidValue {
        /// The field that failed to parse.
        field: String,
        /// Description of the parsing failure.
        message: String,
    },
}

/// Errors writing to a backend.
#[derive(Debug, Error)]
pub enum WriteError {
    /// The write could not be delivered.
    #[error("transport failed: {0}")]
    Transport(#[from] FetchError),

    /// The backend answered with a non-success HTTP status.
    #[error("server rejected write with HTTP {0}")]
    Status(u16),

    /// owserver rejected the write.
    #[error("owserver rejected write to {path} with error {code}")]
    Rejected {
        /// Negated owserver return value.
        code: i32,
        /// The path that was written.
        path: String,
    },
}

/// Errors related to value validation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValueError {
    /// Unknown canonical attribute name.
    #[error("unknown attribute: {0}")]
    UnknownAttribute(String),

    /// Unknown relay function name or code.
    #[error("invalid relay control: {0}")]
    InvalidRelayControl(String),

    /// Target humidifier state other than humidify-only.
    #[error("target state {0} is not supported")]
    UnsupportedTargetState(i32),

    /// Unknown device type in configuration.
    #[error("unknown device type: {0}")]
    UnknownDeviceType(String),

    /// Unknown backend name in configuration.
    #[error("unknown server type: {0}")]
    UnknownServer(String),
}

/// A specialized Result type for this library.
pub type Result<T> = std::result::Result<T, Error>;

// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! History records for devices that feed a logger.
//!
//! After every successful poll, each device whose type declares a logger
//! produces one [`HistoryRecord`], handed to the configured
//! [`HistorySink`].

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;

use crate::types::DeviceAddress;

/// One timestamped history entry.
///
/// Serializes with `time` as Unix seconds and the `temp`/`humidity` keys
/// history viewers expect:
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use owbridge::history::HistoryRecord;
///
/// let time = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
/// let record = HistoryRecord::new(time, Some(21.5), None);
/// assert_eq!(
///     serde_json::to_string(&record).unwrap(),
///     r#"{"time":1700000000,"temp":21.5}"#
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryRecord {
    /// When the poll completed.
    #[serde(with = "chrono::serde::ts_seconds")]
    pub time: DateTime<Utc>,
    /// Temperature in degrees Celsius, if the device has one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temp: Option<f64>,
    /// Relative humidity, if the device has one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub humidity: Option<f64>,
}

impl HistoryRecord {
    /// Creates a record.
    #[must_use]
    pub fn new(time: DateTime<Utc>, temp: Option<f64>, humidity: Option<f64>) -> Self {
        Self {
            time,
            temp,
            humidity,
        }
    }
}

/// Receives history records.
pub trait HistorySink: Send + Sync {
    /// Stores one record for a device.
    fn add_entry(&self, address: &DeviceAddress, record: HistoryRecord);
}

/// Keeps every record in memory, per device.
#[derive(Debug, Default)]
pub struct MemoryHistory {
    entries: Mutex<HashMap<DeviceAddress, Vec<HistoryRecord>>>,
}

impl MemoryHistory {
    /// Creates an empty history.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the records stored for a device, oldest first.
    #[must_use]
    pub fn entries(&self, address: &DeviceAddress) -> Vec<HistoryRecord> {
        self.entries.lock().get(address).cloned().unwrap_or_default()
    }

    /// Returns the total number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().values().map(Vec::len).sum()
    }

    /// Returns `true` if no record was stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl HistorySink for MemoryHistory {
    fn add_entry(&self, address: &DeviceAddress, record: HistoryRecord) {
        self.entries
            .lock()
            .entry(address.clone())
            .or_default()
            .push(record);
    }
}

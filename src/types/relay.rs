// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Relay function type for EDS humidity modules.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValueError;

/// Function the on-board relay of a humidity module is configured for.
///
/// The backend reports this as a numeric code. `Auto` and `AutoOn` both let
/// the module drive the relay from its alarm, `Manual` follows the relay
/// state set by the user and `Off` forces the relay off.
///
/// # Examples
///
/// ```
/// use owbridge::types::RelayControl;
///
/// assert_eq!(RelayControl::from_code("1"), Some(RelayControl::AutoOn));
/// assert_eq!(RelayControl::AutoOn.as_str(), "auto on");
/// assert_eq!(RelayControl::Off.code(), "3");
/// assert!(RelayControl::AutoOn.is_auto());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RelayControl {
    /// Relay driven by the module's alarm.
    #[serde(rename = "auto")]
    Auto,
    /// Relay driven by the alarm, energized at start.
    #[serde(rename = "auto on")]
    AutoOn,
    /// Relay follows the manually set state.
    #[serde(rename = "manual")]
    Manual,
    /// Relay forced off.
    #[serde(rename = "off")]
    Off,
}

impl RelayControl {
    /// Returns the canonical name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::AutoOn => "auto on",
            Self::Manual => "manual",
            Self::Off => "off",
        }
    }

    /// Returns the vendor code written to the backend.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Auto => "0",
            Self::AutoOn => "1",
            Self::Manual => "2",
            Self::Off => "3",
        }
    }

    /// Looks up a vendor code.
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim() {
            "0" => Some(Self::Auto),
            "1" => Some(Self::AutoOn),
            "2" => Some(Self::Manual),
            "3" => Some(Self::Off),
            _ => None,
        }
    }

    /// Returns `true` when the relay is alarm driven (name begins with `auto`).
    #[must_use]
    pub fn is_auto(&self) -> bool {
        self.as_str().starts_with("auto")
    }
}

impl fmt::Display for RelayControl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RelayControl {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "auto on" | "auto-on" | "autoon" => Ok(Self::AutoOn),
            "manual" => Ok(Self::Manual),
            "off" => Ok(Self::Off),
            other => Self::from_code(other)
                .ok_or_else(|| ValueError::InvalidRelayControl(s.to_string())),
        }
    }
}

/// Maps a vendor relay state code to a boolean.
#[must_use]
pub fn relay_state_from_code(code: &str) -> Option<bool> {
    match code.trim() {
        "0" => Some(false),
        "1" => Some(true),
        _ => None,
    }
}

// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Derived humidifier states.

use serde::{Deserialize, Serialize};

use crate::error::ValueError;

/// Current humidifier state as published to the accessory layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CurrentHumidifierState {
    /// Not humidifying.
    Idle,
    /// Relay energized, humidifying.
    Humidifying,
}

impl CurrentHumidifierState {
    /// Returns the numeric code.
    #[must_use]
    pub const fn code(&self) -> u8 {
        match self {
            Self::Idle => 1,
            Self::Humidifying => 3,
        }
    }
}

impl From<bool> for CurrentHumidifierState {
    fn from(humidifying: bool) -> Self {
        if humidifying {
            Self::Humidifying
        } else {
            Self::Idle
        }
    }
}

/// Target humidifier mode.
///
/// Humidity modules here can only humidify, so there is a single mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TargetHumidifierState {
    /// Humidify only.
    HumidifyOnly,
}

impl TargetHumidifierState {
    /// Returns the numeric code.
    #[must_use]
    pub const fn code(&self) -> u8 {
        match self {
            Self::HumidifyOnly => 2,
        }
    }
}

impl TryFrom<i32> for TargetHumidifierState {
    type Error = ValueError;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        match code {
            2 => Ok(Self::HumidifyOnly),
            other => Err(ValueError::UnsupportedTargetState(other)),
        }
    }
}

// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Value types shared across the library.
//!
//! - [`Attribute`] / [`AttributeValue`]: the canonical attribute vocabulary
//! - [`RelayControl`]: relay function codes of humidity modules
//! - [`CurrentHumidifierState`] / [`TargetHumidifierState`]: derived humidistat states
//! - [`DeviceAddress`]: 1-Wire device identifier

mod address;
mod attribute;
mod humidistat;
mod relay;

pub use address::DeviceAddress;
pub use attribute::{Attribute, AttributeValue};
pub use humidistat::{CurrentHumidifierState, TargetHumidifierState};
pub use relay::{RelayControl, relay_state_from_code};

// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device state management types.
//!
//! - [`CanonicalReading`]: what one poll returned for one device
//! - [`DeviceState`]: what was last published for a device
//! - [`StateChange`]: a single typed attribute value
//! - [`ChangeSet`]: the changes one reconciliation pass produced
//!
//! # Examples
//!
//! ```
//! use owbridge::state::{DeviceState, StateChange};
//!
//! let mut state = DeviceState::new();
//! let change = StateChange::Temperature(19.5);
//! state.apply(&change);
//!
//! assert_eq!(state.temperature(), Some(19.5));
//! ```

mod device_state;
mod reading;
mod state_change;

pub use device_state::DeviceState;
pub use reading::{CanonicalReading, Readings};
pub use state_change::{ChangeSet, StateChange};

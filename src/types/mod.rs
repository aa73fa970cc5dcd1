// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Value types for EAP device control.
//!
//! # Types
//!
//! - [`LedState`] - On/Off state of the front LED
//! - [`LoginOutcome`] - Result of a full login sequence

mod led;
mod login;

pub use led::LedState;
pub use login::LoginOutcome;

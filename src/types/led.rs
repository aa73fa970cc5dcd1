// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Front-LED state type.

use std::fmt;
use std::str::FromStr;

use crate::error::ParseError;

/// State of the device's front LED.
///
/// The EAP web interface represents the LED state as the literal
/// strings `"on"` and `"off"`, both in the write request body and in
/// the echoed response.
///
/// # Examples
///
/// ```
/// use eapr_lib::types::LedState;
///
/// assert_eq!(LedState::On.as_str(), "on");
/// assert_eq!(LedState::from(false), LedState::Off);
/// assert_eq!("on".parse::<LedState>().unwrap(), LedState::On);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LedState {
    /// LED is off.
    Off,
    /// LED is on.
    On,
}

impl LedState {
    /// Returns the wire representation used by the device.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::On => "on",
        }
    }

    /// Returns true if the LED is on.
    #[must_use]
    pub const fn is_on(&self) -> bool {
        matches!(self, Self::On)
    }
}

impl fmt::Display for LedState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for LedState {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "on" => Ok(Self::On),
            "off" => Ok(Self::Off),
            _ => Err(ParseError::UnexpectedValue {
                field: "enable".to_string(),
                value: s.to_string(),
            }),
        }
    }
}

impl From<bool> for LedState {
    fn from(value: bool) -> Self {
        if value { Self::On } else { Self::Off }
    }
}

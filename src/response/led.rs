// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! LED control response parsing.

use serde::Deserialize;

use crate::error::ParseError;
use crate::types::LedState;

/// Response from the LED control resource (`POST /data/ledctrl.json`).
///
/// Both the read and the write operation answer with the same shape:
///
/// ```json
/// {"error": 0, "data": {"enable": "on"}}
/// ```
///
/// The `data` object goes missing when the session cookie has been
/// invalidated server-side; the device still answers 2xx in that case,
/// so the absent field is the only authentication-failure signal.
///
/// For writes, `data.enable` carries the state the device actually
/// applied, which may differ from the state that was requested.
#[derive(Debug, Clone, Deserialize)]
pub struct LedControlResponse {
    #[serde(default)]
    error: Option<i64>,
    #[serde(default)]
    data: Option<LedData>,
}

#[derive(Debug, Clone, Deserialize)]
struct LedData {
    enable: String,
}

impl LedControlResponse {
    /// Returns the device-reported LED state.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::MissingField`] if the `data` object is
    /// absent (stale or unprivileged session) and
    /// [`ParseError::UnexpectedValue`] if `enable` is neither `"on"`
    /// nor `"off"`.
    pub fn led_state(&self) -> Result<LedState, ParseError> {
        let data = self
            .data
            .as_ref()
            .ok_or_else(|| ParseError::MissingField("data".to_string()))?;
        data.enable.parse()
    }

    /// Returns the raw error code if the device sent one.
    #[must_use]
    pub const fn error_code(&self) -> Option<i64> {
        self.error
    }
}

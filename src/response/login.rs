// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Login status response parsing.

use serde::Deserialize;

/// Response from the login status probe (`POST /data/login.json`).
///
/// The device answers `{"error": 0}` when the current session cookie is
/// already privileged and a non-zero error code otherwise.
///
/// # Examples
///
/// ```
/// use eapr_lib::response::LoginStatusResponse;
///
/// let response: LoginStatusResponse = serde_json::from_str(r#"{"error": 0}"#).unwrap();
/// assert!(response.is_authenticated());
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct LoginStatusResponse {
    error: i64,
}

impl LoginStatusResponse {
    /// Returns true if the current session is already privileged.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.error == 0
    }

    /// Returns the raw error code.
    #[must_use]
    pub const fn error_code(&self) -> i64 {
        self.error
    }
}

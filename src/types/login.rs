// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Login sequence outcome.

use std::fmt;

/// Outcome of a full login sequence.
///
/// The public accessory contract collapses this into a single boolean
/// (see [`SessionClient::login`](crate::SessionClient::login)), but the
/// distinction is kept so failures stay diagnosable: an unreachable
/// device, rejected credentials, and a skipped login look identical as
/// booleans and very different in the logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginOutcome {
    /// The session cookie was already privileged; no credentialed POST
    /// was issued.
    AlreadyAuthenticated,
    /// The credentialed POST was accepted by the device.
    LoggedIn,
    /// The credentialed POST completed with a non-success status.
    Rejected {
        /// The HTTP status the device answered with.
        status: u16,
    },
    /// No session cookie could be obtained; nothing further was tried.
    NotConnected,
}

impl LoginOutcome {
    /// Returns true if the session is privileged after this outcome.
    #[must_use]
    pub const fn is_logged_in(&self) -> bool {
        matches!(self, Self::AlreadyAuthenticated | Self::LoggedIn)
    }
}

impl fmt::Display for LoginOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadyAuthenticated => write!(f, "already authenticated"),
            Self::LoggedIn => write!(f, "logged in"),
            Self::Rejected { status } => write!(f, "rejected with HTTP {status}"),
            Self::NotConnected => write!(f, "not connected"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn logged_in_outcomes() {
        assert!(LoginOutcome::AlreadyAuthenticated.is_logged_in());
        assert!(LoginOutcome::LoggedIn.is_logged_in());
        assert!(!LoginOutcome::Rejected { status: 403 }.is_logged_in());
        assert!(!LoginOutcome::NotConnected.is_logged_in());
    }

    #[test]
    fn display_includes_status() {
        let outcome = LoginOutcome::Rejected { status: 401 };
        assert_eq!(outcome.to_string(), "rejected with HTTP 401");
    }
}

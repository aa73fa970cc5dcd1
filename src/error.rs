// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the `EapR` library.
//!
//! This module provides the error hierarchy for failures across the
//! library: transport problems, session/login failures, and response
//! parsing. The boolean accessory facade collapses all of these to
//! `false`/offline; the typed API keeps them distinguishable.

use thiserror::Error;

use crate::types::LoginOutcome;

/// The main error type for this library.
#[derive(Debug, Error)]
pub enum Error {
    /// Error occurred during HTTP communication.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Error occurred in the session/login lifecycle.
    #[error("session error: {0}")]
    Session(#[from] SessionError),

    /// Error occurred while parsing a device response.
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),
}

/// Errors related to HTTP transport.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// The HTTP request itself failed (DNS, connect, timeout).
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The device answered with a non-success status.
    #[error("request failed with HTTP {status}")]
    RequestFailed {
        /// The HTTP status code returned by the device.
        status: u16,
    },
}

/// Errors related to the session cookie and login lifecycle.
#[derive(Debug, Error)]
pub enum SessionError {
    /// No session cookie could be obtained from the device.
    #[error("not connected: no session cookie")]
    NotConnected,

    /// The login sequence completed without a privileged session.
    #[error("login failed: {0}")]
    LoginFailed(LoginOutcome),
}

/// Errors related to parsing device JSON responses.
///
/// A stale session cookie does not produce an explicit 401 on this
/// device; it shows up as a 2xx reply with the expected field absent,
/// which is why [`ParseError::MissingField`] doubles as the
/// authentication-failure signature.
#[derive(Debug, Error)]
pub enum ParseError {
    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// Expected field is missing from the response.
    #[error("missing field in response: {0}")]
    MissingField(String),

    /// A field was present but held an unexpected value.
    #[error("unexpected value for {field}: {value}")]
    UnexpectedValue {
        /// The field that failed to parse.
        field: String,
        /// The offending value.
        value: String,
    },
}

/// A specialized Result type for this library.
pub type Result<T> = std::result::Result<T, Error>;

// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Configuration for an EAP device.

use std::time::Duration;

use reqwest::Client;

use crate::error::ProtocolError;
use crate::session::SessionClient;

/// Configuration for a TP-Link EAP device.
///
/// Holds the device address and web-interface credentials. The
/// plaintext password is kept only until the configuration is turned
/// into a [`SessionClient`]; at that point it is digested once into the
/// uppercase-hex MD5 form the login form expects and dropped.
///
/// # Examples
///
/// ```
/// use eapr_lib::EapConfig;
/// use std::time::Duration;
///
/// // Simple configuration
/// let config = EapConfig::new("192.168.1.2", "admin", "secret");
///
/// // With all options
/// let config = EapConfig::new("192.168.1.2", "admin", "secret")
///     .with_port(8080)
///     .with_timeout(Duration::from_secs(5));
/// ```
#[derive(Debug, Clone)]
pub struct EapConfig {
    host: String,
    port: u16,
    username: String,
    password: String,
    timeout: Duration,
}

impl EapConfig {
    /// Default HTTP port of the web interface.
    pub const DEFAULT_PORT: u16 = 80;
    /// Default request timeout.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Creates a new configuration for the specified device.
    ///
    /// # Arguments
    ///
    /// * `host` - The hostname or IP address of the EAP
    /// * `username` - Web-interface username
    /// * `password` - Web-interface password, in plaintext
    #[must_use]
    pub fn new(
        host: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            port: Self::DEFAULT_PORT,
            username: username.into(),
            password: password.into(),
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }

    /// Sets a custom port.
    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Sets the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns the host.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Returns the port.
    #[must_use]
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Returns the username.
    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Returns the timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Builds the base URL from this configuration.
    ///
    /// The web interface is plain HTTP; the stock firmware offers no
    /// TLS endpoint.
    #[must_use]
    pub fn base_url(&self) -> String {
        if self.port == Self::DEFAULT_PORT {
            format!("http://{}", self.host)
        } else {
            format!("http://{}:{}", self.host, self.port)
        }
    }

    /// Creates a [`SessionClient`] from this configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be created.
    pub fn into_session(self) -> Result<SessionClient, ProtocolError> {
        let base_url = self.base_url();

        let client = Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(ProtocolError::Http)?;

        Ok(SessionClient::new(
            base_url,
            client,
            self.username,
            &self.password,
        ))
    }
}

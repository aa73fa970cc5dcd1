// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! High-level operations on an EAP device.
//!
//! Every privileged operation independently re-runs the full
//! connect+login sequence through
//! [`SessionClient::with_session`](crate::SessionClient::with_session).
//! The device's session lifetime is unknown and assumed short, so each
//! operation pays the cost of re-authenticating rather than risking a
//! stale-cookie failure mid-operation.
//!
//! Each operation comes in two forms: a typed `Result` method that
//! preserves the failure kind, and a boolean facade implementing the
//! accessory contract (never errors, always resolves to a bool).

use crate::config::EapConfig;
use crate::error::{Error, ProtocolError, Result};
use crate::response::LedControlResponse;
use crate::session::SessionClient;
use crate::types::LedState;

/// Path of the LED control resource.
const LED_CONTROL_PATH: &str = "/data/ledctrl.json";
/// Path of the unauthenticated reachability probe.
const REBOOT_STATE_PATH: &str = "/data/rebootState.json";
/// Path of the reboot trigger resource.
const CONFIG_REBOOT_PATH: &str = "/data/configReboot.json";

/// A TP-Link EAP access point controlled through its web interface.
///
/// # Examples
///
/// ```no_run
/// use eapr_lib::{EapConfig, EapDevice};
///
/// # async fn example() -> eapr_lib::Result<()> {
/// let device = EapDevice::from_config(EapConfig::new("192.168.1.2", "admin", "secret"))?;
///
/// if device.is_online().await {
///     device.set_led_enabled(false).await;
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct EapDevice {
    session: SessionClient,
}

impl EapDevice {
    /// Creates a device from an existing session client.
    #[must_use]
    pub fn new(session: SessionClient) -> Self {
        Self { session }
    }

    /// Creates a device from a configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be created.
    pub fn from_config(config: EapConfig) -> Result<Self> {
        Ok(Self::new(config.into_session()?))
    }

    /// Returns the underlying session client.
    #[must_use]
    pub fn session(&self) -> &SessionClient {
        &self.session
    }

    // ========== Online probe ==========

    /// Probes device reachability via the reboot-state resource.
    ///
    /// This is an unauthenticated probe; it never runs the login
    /// sequence.
    ///
    /// # Errors
    ///
    /// Returns error on transport failure or non-2xx status.
    pub async fn probe_online(&self) -> Result<()> {
        self.session.get(REBOOT_STATE_PATH).await.map(|_| ())
    }

    /// Returns true if the device answered the reachability probe.
    ///
    /// Any failure, including connection refusal while the device is
    /// rebooting, reads as offline.
    pub async fn is_online(&self) -> bool {
        match self.probe_online().await {
            Ok(()) => true,
            Err(err) => {
                tracing::debug!(error = %err, "online probe failed");
                false
            }
        }
    }

    // ========== Front LED ==========

    /// Reads the device-reported front-LED state.
    ///
    /// # Errors
    ///
    /// Returns a session error when login fails, a protocol error when
    /// the read request fails, or a parse error when the response lacks
    /// the expected field (the stale-cookie signature).
    pub async fn fetch_led_state(&self) -> Result<LedState> {
        self.session
            .with_session(async |session: &SessionClient| {
                let response = session.post_form(LED_CONTROL_PATH, "operation=read").await?;
                let parsed: LedControlResponse =
                    response.json().await.map_err(ProtocolError::Http)?;
                parsed.led_state().map_err(Error::Parse)
            })
            .await
    }

    /// Returns true if the front LED is on; false on any failure.
    pub async fn led_enabled(&self) -> bool {
        match self.fetch_led_state().await {
            Ok(state) => state.is_on(),
            Err(err) => {
                log_led_failure("LED read", &err);
                false
            }
        }
    }

    /// Writes the front-LED state and returns what the device applied.
    ///
    /// The returned state is re-read from the write response, not
    /// echoed from the request: a write can be accepted but not applied
    /// exactly as requested, and the device is authoritative.
    ///
    /// # Errors
    ///
    /// Same failure kinds as [`fetch_led_state`](Self::fetch_led_state).
    pub async fn write_led_state(&self, target: LedState) -> Result<LedState> {
        self.session
            .with_session(async |session: &SessionClient| {
                let body = format!("operation=write&enable={}", target.as_str());
                let response = session.post_form(LED_CONTROL_PATH, &body).await?;
                let parsed: LedControlResponse =
                    response.json().await.map_err(ProtocolError::Http)?;
                parsed.led_state().map_err(Error::Parse)
            })
            .await
    }

    /// Sets the front LED and returns the device-reported result state.
    ///
    /// Returns false on any failure. Callers must not assume the result
    /// equals the requested value.
    pub async fn set_led_enabled(&self, enabled: bool) -> bool {
        match self.write_led_state(LedState::from(enabled)).await {
            Ok(state) => state.is_on(),
            Err(err) => {
                log_led_failure("LED write", &err);
                false
            }
        }
    }

    // ========== Reboot ==========

    /// Requests a device reboot.
    ///
    /// Success means the device accepted the request, not that it has
    /// rebooted; recovery is observed separately via
    /// [`is_online`](Self::is_online).
    ///
    /// # Errors
    ///
    /// Returns a session error when login fails or a protocol error
    /// when the trigger request fails.
    pub async fn send_reboot_request(&self) -> Result<()> {
        self.session
            .with_session(async |session: &SessionClient| {
                session.get(CONFIG_REBOOT_PATH).await.map(|_| ())
            })
            .await
    }

    /// Requests a reboot, collapsed to the boolean contract.
    pub async fn request_reboot(&self) -> bool {
        match self.send_reboot_request().await {
            Ok(()) => true,
            Err(err) => {
                tracing::debug!(error = %err, "reboot request failed");
                false
            }
        }
    }
}

/// Logs an LED operation failure with its distinct cause.
fn log_led_failure(op: &str, err: &Error) {
    match err {
        Error::Session(err) => {
            tracing::debug!(error = %err, "{op} failed: no privileged session");
        }
        Error::Parse(err) => {
            tracing::debug!(error = %err, "{op} failed: malformed response");
        }
        Error::Protocol(err) => {
            tracing::debug!(error = %err, "{op} failed: request error");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn device_from_config() {
        let device =
            EapDevice::from_config(EapConfig::new("192.168.1.2", "admin", "secret")).unwrap();
        assert_eq!(device.session().base_url(), "http://192.168.1.2");
    }
}

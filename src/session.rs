// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Session and login lifecycle for the EAP web interface.
//!
//! The web interface authenticates with a session cookie issued on
//! first contact and upgraded to a privileged session by a credentialed
//! form POST. The device never states a cookie lifetime, so this client
//! treats sessions as disposable: [`SessionClient::with_session`] runs
//! the full connect+login sequence before every privileged operation
//! instead of reusing cookie state across calls.

use std::fmt;

use md5::{Digest, Md5};
use parking_lot::RwLock;
use reqwest::{Client, RequestBuilder, StatusCode, header};

use crate::error::{Error, ProtocolError, Result, SessionError};
use crate::response::LoginStatusResponse;
use crate::types::LoginOutcome;

/// Path of the login status probe.
const LOGIN_STATUS_PATH: &str = "/data/login.json";

/// Marker header the web interface requires on all form requests.
const XHR_MARKER: (&str, &str) = ("X-Requested-With", "XMLHttpRequest");

/// Session client for one EAP device.
///
/// Owns the device's base URL, the login credentials (password kept
/// only as the uppercase-hex MD5 digest the login form expects), and
/// the single mutable session cookie. The cookie is a single-writer
/// resource: the last completed [`connect`](Self::connect) wins.
///
/// # Examples
///
/// ```no_run
/// use eapr_lib::EapConfig;
///
/// # async fn example() -> eapr_lib::Result<()> {
/// let session = EapConfig::new("192.168.1.2", "admin", "secret").into_session()?;
/// if session.login().await {
///     // session cookie is privileged until the device expires it
/// }
/// # Ok(())
/// # }
/// ```
pub struct SessionClient {
    base_url: String,
    client: Client,
    username: String,
    password_hash: String,
    cookie: RwLock<Option<String>>,
}

impl SessionClient {
    /// Creates a new session client.
    ///
    /// The password digest is computed here, exactly once; the
    /// plaintext is not retained.
    #[must_use]
    pub fn new(
        base_url: String,
        client: Client,
        username: impl Into<String>,
        password: &str,
    ) -> Self {
        let password_hash = hex::encode_upper(Md5::digest(password.as_bytes()));

        Self {
            base_url,
            client,
            username: username.into(),
            password_hash,
            cookie: RwLock::new(None),
        }
    }

    /// Returns the base URL of the device.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns the current session cookie, if any.
    ///
    /// A present cookie does not guarantee server-side validity; the
    /// device may have expired it independently. Validity is only
    /// discovered by the next request's success or failure.
    #[must_use]
    pub fn session_cookie(&self) -> Option<String> {
        self.cookie.read().clone()
    }

    /// Contacts the device root to obtain a fresh session cookie.
    ///
    /// On success the first `Set-Cookie` directive's `name=value` pair
    /// is stored, with attributes (path, expiry, flags) discarded. On
    /// any transport or non-2xx failure the cookie is cleared and the
    /// error is swallowed here: callers observe failure only through
    /// the absent cookie.
    pub async fn connect(&self) {
        match self.acquire_cookie().await {
            Ok(cookie) => {
                tracing::debug!(url = %self.base_url, "session cookie acquired");
                *self.cookie.write() = Some(cookie);
            }
            Err(err) => {
                tracing::debug!(url = %self.base_url, error = %err, "connect failed, clearing session cookie");
                *self.cookie.write() = None;
            }
        }
    }

    async fn acquire_cookie(&self) -> Result<String> {
        let response = self
            .client
            .get(&self.base_url)
            .send()
            .await
            .map_err(ProtocolError::Http)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProtocolError::RequestFailed {
                status: status.as_u16(),
            }
            .into());
        }

        response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|value| value.to_str().ok())
            .and_then(cookie_pair)
            .ok_or(Error::Session(SessionError::NotConnected))
    }

    /// Probes whether the current session cookie is already privileged.
    ///
    /// POSTs a read-only status query; the device answers
    /// `{"error": 0}` when no credentialed login is necessary.
    ///
    /// # Errors
    ///
    /// Returns error on transport failure, non-2xx status, or an
    /// unparseable body. [`try_login`](Self::try_login) treats any of
    /// these as "login must be attempted", not as fatal.
    pub async fn query_login_status(&self) -> Result<bool> {
        let response = self.post_form(LOGIN_STATUS_PATH, "operation=read").await?;
        let status: LoginStatusResponse = response
            .json()
            .await
            .map_err(ProtocolError::Http)?;
        Ok(status.is_authenticated())
    }

    /// Runs the full login sequence, preserving the outcome kind.
    ///
    /// Connects for a fresh cookie, short-circuits to
    /// [`LoginOutcome::NotConnected`] if none was issued, skips the
    /// credentialed POST when the status probe reports the session is
    /// already privileged, and otherwise submits the credentialed form.
    ///
    /// # Errors
    ///
    /// Returns error only when the credentialed POST itself fails at
    /// the transport level; every other failure is an outcome variant.
    pub async fn try_login(&self) -> Result<LoginOutcome> {
        self.connect().await;
        if self.session_cookie().is_none() {
            return Ok(LoginOutcome::NotConnected);
        }

        match self.query_login_status().await {
            Ok(true) => {
                tracing::debug!("session already privileged, skipping credentialed login");
                return Ok(LoginOutcome::AlreadyAuthenticated);
            }
            Ok(false) => {}
            Err(err) => {
                tracing::debug!(error = %err, "login status probe failed, attempting credentialed login");
            }
        }

        let status = self.post_credentials().await?;
        if status.is_success() {
            tracing::debug!("credentialed login accepted");
            Ok(LoginOutcome::LoggedIn)
        } else {
            Ok(LoginOutcome::Rejected {
                status: status.as_u16(),
            })
        }
    }

    /// Runs the full login sequence, collapsed to the boolean contract.
    ///
    /// Never returns an error: any failure path resolves to `false`,
    /// with the specific cause logged. In particular this returns
    /// `false` whenever no cookie was obtained, regardless of
    /// credential correctness.
    pub async fn login(&self) -> bool {
        match self.try_login().await {
            Ok(outcome) => {
                if !outcome.is_logged_in() {
                    tracing::debug!(%outcome, "login did not produce a privileged session");
                }
                outcome.is_logged_in()
            }
            Err(err) => {
                tracing::debug!(error = %err, "login attempt failed");
                false
            }
        }
    }

    /// Runs `op` inside a freshly authenticated session.
    ///
    /// Performs the full connect+login sequence first, so no cookie
    /// state is reused across calls; two operations issued back-to-back
    /// are fully independent.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NotConnected`] when no cookie was
    /// obtained, [`SessionError::LoginFailed`] when the device rejected
    /// the credentials, or whatever `op` itself fails with.
    pub async fn with_session<T, F>(&self, op: F) -> Result<T>
    where
        F: AsyncFnOnce(&SessionClient) -> Result<T>,
    {
        match self.try_login().await? {
            outcome if outcome.is_logged_in() => op(self).await,
            LoginOutcome::NotConnected => Err(SessionError::NotConnected.into()),
            outcome => Err(SessionError::LoginFailed(outcome).into()),
        }
    }

    /// Issues an authenticated GET against a device path.
    ///
    /// Attaches the current cookie (when present) and the standard
    /// header set the web interface requires.
    ///
    /// # Errors
    ///
    /// Returns error on transport failure or non-2xx status.
    pub async fn get(&self, path: &str) -> Result<reqwest::Response> {
        let url = format!("{}{path}", self.base_url);
        tracing::debug!(url = %url, "sending GET");

        let response = self
            .apply_headers(self.client.get(&url))
            .send()
            .await
            .map_err(ProtocolError::Http)?;

        into_success(response)
    }

    /// Issues an authenticated form-encoded POST against a device path.
    ///
    /// # Errors
    ///
    /// Returns error on transport failure or non-2xx status.
    pub async fn post_form(&self, path: &str, body: &str) -> Result<reqwest::Response> {
        let url = format!("{}{path}", self.base_url);
        tracing::debug!(url = %url, body = %body, "sending form POST");

        let response = self
            .apply_headers(self.client.post(&url))
            .body(body.to_string())
            .send()
            .await
            .map_err(ProtocolError::Http)?;

        into_success(response)
    }

    /// Submits the credentialed login form to the device root.
    ///
    /// Unlike the generic primitives, a non-2xx reply is returned as a
    /// status rather than an error, so the caller can distinguish
    /// "rejected" from "unreachable".
    async fn post_credentials(&self) -> Result<StatusCode> {
        let body = format!(
            "username={}&password={}",
            urlencoding::encode(&self.username),
            self.password_hash
        );

        let response = self
            .apply_headers(self.client.post(&self.base_url))
            .body(body)
            .send()
            .await
            .map_err(ProtocolError::Http)?;

        Ok(response.status())
    }

    /// Attaches the cookie and the header set the device insists on:
    /// same-origin `Referer`/`Origin`, the XHR marker, and a
    /// url-encoded content type.
    fn apply_headers(&self, request: RequestBuilder) -> RequestBuilder {
        let request = request
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .header(header::REFERER, format!("{}/", self.base_url))
            .header(header::ORIGIN, self.base_url.clone())
            .header(XHR_MARKER.0, XHR_MARKER.1);

        match self.session_cookie() {
            Some(cookie) => request.header(header::COOKIE, cookie),
            None => request,
        }
    }
}

impl fmt::Debug for SessionClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionClient")
            .field("base_url", &self.base_url)
            .field("username", &self.username)
            .field("connected", &self.cookie.read().is_some())
            .finish_non_exhaustive()
    }
}

/// Extracts the `name=value` pair from a raw `Set-Cookie` value,
/// dropping attributes after the first `;`.
fn cookie_pair(raw: &str) -> Option<String> {
    let pair = raw.split(';').next().unwrap_or(raw).trim();
    if pair.is_empty() {
        None
    } else {
        Some(pair.to_string())
    }
}

/// Maps a non-2xx response to [`ProtocolError::RequestFailed`].
fn into_success(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(ProtocolError::RequestFailed {
            status: status.as_u16(),
        }
        .into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EapConfig;

    #[test]
    fn password_hash_is_uppercase_md5() {
        let session = EapConfig::new("192.168.1.2", "admin", "password")
            .into_session()
            .unwrap();
        assert_eq!(
            session.password_hash,
            "5F4DCC3B5AA765D61D8327DEB882CF99"
        );
    }

    #[test]
    fn new_session_has_no_cookie() {
        let session = EapConfig::new("192.168.1.2", "admin", "secret")
            .into_session()
            .unwrap();
        assert!(session.session_cookie().is_none());
    }

    #[test]
    fn cookie_pair_strips_attributes() {
        let raw = "COOKIE=deadbeef; path=/; HttpOnly";
        assert_eq!(cookie_pair(raw).unwrap(), "COOKIE=deadbeef");
    }

    #[test]
    fn cookie_pair_without_attributes() {
        assert_eq!(cookie_pair("COOKIE=deadbeef").unwrap(), "COOKIE=deadbeef");
    }

    #[test]
    fn cookie_pair_rejects_empty() {
        assert!(cookie_pair("").is_none());
        assert!(cookie_pair("; path=/").is_none());
    }

    #[test]
    fn debug_does_not_leak_password_hash() {
        let session = EapConfig::new("192.168.1.2", "admin", "secret")
            .into_session()
            .unwrap();
        let rendered = format!("{session:?}");
        assert!(!rendered.contains(&session.password_hash));
    }
}

// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `EapR` Lib - A Rust library to control TP-Link EAP access points.
//!
//! This library drives an EAP's web administration interface: it
//! acquires and upgrades the session cookie the interface hands out,
//! and builds a small set of device operations on top.
//!
//! # Supported Features
//!
//! - **Session lifecycle**: cookie acquisition, hashed-password login,
//!   opportunistic skip when the session is already privileged
//! - **Status queries**: reachability probe, front-LED state
//! - **LED control**: read and write the front LED, reporting the state
//!   the device actually applied
//! - **Reboot**: trigger a reboot and poll for recovery with observable
//!   power/rebooting signals
//!
//! The web interface has no formal API contract and no stated session
//! lifetime, so every privileged operation re-authenticates from
//! scratch; see [`SessionClient::with_session`].
//!
//! # Quick Start
//!
//! ## Query and control the front LED
//!
//! ```no_run
//! use eapr_lib::{EapConfig, EapDevice};
//!
//! #[tokio::main]
//! async fn main() -> eapr_lib::Result<()> {
//!     let device = EapDevice::from_config(
//!         EapConfig::new("192.168.1.2", "admin", "secret"),
//!     )?;
//!
//!     if device.is_online().await {
//!         let led_on = device.led_enabled().await;
//!         // the device reports the state it applied, which may differ
//!         // from the one requested
//!         let applied = device.set_led_enabled(!led_on).await;
//!         println!("LED is now {}", if applied { "on" } else { "off" });
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Reboot with recovery polling
//!
//! ```no_run
//! use std::sync::Arc;
//! use eapr_lib::{EapConfig, EapDevice, RebootController, RebootPolicy, RebootRequest};
//!
//! #[tokio::main]
//! async fn main() -> eapr_lib::Result<()> {
//!     let device = Arc::new(EapDevice::from_config(
//!         EapConfig::new("192.168.1.2", "admin", "secret"),
//!     )?);
//!
//!     let controller = RebootController::new(
//!         Arc::clone(&device),
//!         RebootPolicy::default().with_max_polls(60),
//!     );
//!
//!     let mut outcome = controller.watch_outcome();
//!     if controller.trigger().await == RebootRequest::Started {
//!         outcome.wait_for(Option::is_some).await.ok();
//!         println!("reboot finished: {:?}", controller.last_outcome());
//!     }
//!
//!     Ok(())
//! }
//! ```

mod config;
mod device;
pub mod error;
mod reboot;
pub mod response;
mod session;
pub mod types;

pub use config::EapConfig;
pub use device::EapDevice;
pub use error::{Error, ParseError, ProtocolError, Result, SessionError};
pub use reboot::{RebootController, RebootOutcome, RebootPhase, RebootPolicy, RebootRequest};
pub use session::SessionClient;
pub use types::{LedState, LoginOutcome};

// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Reboot request and recovery polling.
//!
//! A reboot request transitions the controller into a bounded polling
//! loop: the device stops answering while it restarts, and the only way
//! to detect recovery is to probe reachability until it answers again.
//!
//! State machine: `Idle → Requesting → Rebooting → Idle` on the success
//! path, `Requesting → Idle` when the device rejects the request. The
//! externally observable signals (`power`, `rebooting`, final outcome)
//! are published on [`watch`] channels so observers always see complete
//! values at transition points, never partial updates.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::device::EapDevice;

/// Polling behavior for reboot recovery.
///
/// # Examples
///
/// ```
/// use eapr_lib::RebootPolicy;
/// use std::time::Duration;
///
/// // Reference behavior: poll every 4 s until the device answers
/// let policy = RebootPolicy::default();
///
/// // Bounded variant
/// let policy = RebootPolicy::default()
///     .with_poll_interval(Duration::from_secs(2))
///     .with_max_polls(30);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RebootPolicy {
    /// Interval between reachability probes.
    pub poll_interval: Duration,
    /// Maximum number of probes before giving up with
    /// [`RebootOutcome::TimedOut`]. `None` polls until recovery, which
    /// matches the device's documented behavior of taking arbitrarily
    /// long to come back.
    pub max_polls: Option<u32>,
    /// Delay before re-asserting the rebooting signal to an observer
    /// that triggered while a cycle was already in flight.
    pub resignal_delay: Duration,
}

impl RebootPolicy {
    /// Default interval between reachability probes.
    pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(4);
    /// Default re-assert delay for re-entrant triggers.
    pub const DEFAULT_RESIGNAL_DELAY: Duration = Duration::from_secs(2);

    /// Sets the poll interval.
    #[must_use]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Bounds the number of probes.
    #[must_use]
    pub fn with_max_polls(mut self, max_polls: u32) -> Self {
        self.max_polls = Some(max_polls);
        self
    }

    /// Sets the re-assert delay.
    #[must_use]
    pub fn with_resignal_delay(mut self, delay: Duration) -> Self {
        self.resignal_delay = delay;
        self
    }
}

impl Default for RebootPolicy {
    fn default() -> Self {
        Self {
            poll_interval: Self::DEFAULT_POLL_INTERVAL,
            max_polls: None,
            resignal_delay: Self::DEFAULT_RESIGNAL_DELAY,
        }
    }
}

/// Phase of the reboot state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RebootPhase {
    /// No reboot cycle in flight.
    Idle,
    /// Reboot request sent, acceptance not yet known.
    Requesting,
    /// Request accepted; polling for recovery.
    Rebooting,
}

impl RebootPhase {
    /// Returns true if no cycle is in flight.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }
}

/// Immediate result of [`RebootController::trigger`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RebootRequest {
    /// Request accepted; the recovery poll loop is running.
    Started,
    /// The device rejected the request; no poll loop was started.
    Rejected,
    /// A cycle was already in flight; no new reboot was issued.
    AlreadyInProgress,
}

/// Final outcome of a reboot cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RebootOutcome {
    /// The device was observed online again.
    Recovered,
    /// The device rejected the reboot request.
    Rejected,
    /// The configured poll bound was exceeded before recovery.
    TimedOut,
    /// The cycle was cancelled before recovery.
    Cancelled,
}

/// Drives reboot requests and the recovery poll loop for one device.
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use eapr_lib::{EapConfig, EapDevice, RebootController, RebootPolicy, RebootRequest};
///
/// # async fn example() -> eapr_lib::Result<()> {
/// let device = Arc::new(EapDevice::from_config(
///     EapConfig::new("192.168.1.2", "admin", "secret"),
/// )?);
/// let controller = RebootController::new(device, RebootPolicy::default());
///
/// let mut outcome = controller.watch_outcome();
/// if controller.trigger().await == RebootRequest::Started {
///     // resolves once the device is observed online again
///     outcome.wait_for(Option::is_some).await.ok();
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct RebootController {
    device: Arc<EapDevice>,
    policy: RebootPolicy,
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    phase: Mutex<RebootPhase>,
    cancel: Mutex<CancellationToken>,
    power_tx: watch::Sender<bool>,
    rebooting_tx: watch::Sender<bool>,
    outcome_tx: watch::Sender<Option<RebootOutcome>>,
}

impl RebootController {
    /// Creates a controller for the given device.
    #[must_use]
    pub fn new(device: Arc<EapDevice>, policy: RebootPolicy) -> Self {
        let (power_tx, _) = watch::channel(true);
        let (rebooting_tx, _) = watch::channel(false);
        let (outcome_tx, _) = watch::channel(None);

        Self {
            device,
            policy,
            inner: Arc::new(Inner {
                phase: Mutex::new(RebootPhase::Idle),
                cancel: Mutex::new(CancellationToken::new()),
                power_tx,
                rebooting_tx,
                outcome_tx,
            }),
        }
    }

    /// Requests a reboot and starts the recovery poll loop.
    ///
    /// If a cycle is already in flight, no new reboot is issued; the
    /// current rebooting signal is re-asserted to observers after the
    /// policy's resignal delay and `AlreadyInProgress` is returned.
    ///
    /// Entering the cycle forces the power signal to `false`: the
    /// device's real state is indeterminate from the moment the request
    /// is sent.
    pub async fn trigger(&self) -> RebootRequest {
        {
            let mut phase = self.inner.phase.lock();
            if !phase.is_idle() {
                drop(phase);
                self.resignal();
                return RebootRequest::AlreadyInProgress;
            }
            *phase = RebootPhase::Requesting;
        }

        self.inner.outcome_tx.send_replace(None);
        self.inner.rebooting_tx.send_replace(true);
        self.inner.power_tx.send_replace(false);

        if !self.device.request_reboot().await {
            tracing::warn!("reboot request rejected by device");
            self.inner.power_tx.send_replace(true);
            self.inner.finish(RebootOutcome::Rejected);
            return RebootRequest::Rejected;
        }

        *self.inner.phase.lock() = RebootPhase::Rebooting;
        let token = CancellationToken::new();
        *self.inner.cancel.lock() = token.clone();

        let device = Arc::clone(&self.device);
        let inner = Arc::clone(&self.inner);
        let policy = self.policy;
        tokio::spawn(async move {
            Inner::poll_until_recovered(&inner, &device, policy, &token).await;
        });

        RebootRequest::Started
    }

    /// Cancels the recovery poll loop.
    ///
    /// Idempotent: cancelling an already-cancelled or already-finished
    /// cycle is a no-op. A cancelled cycle resolves
    /// [`RebootOutcome::Cancelled`].
    pub fn cancel(&self) {
        self.inner.cancel.lock().cancel();
    }

    /// Returns the current phase.
    #[must_use]
    pub fn phase(&self) -> RebootPhase {
        *self.inner.phase.lock()
    }

    /// Returns the current rebooting signal.
    #[must_use]
    pub fn is_rebooting(&self) -> bool {
        *self.inner.rebooting_tx.borrow()
    }

    /// Returns the current power signal.
    #[must_use]
    pub fn power_signal(&self) -> bool {
        *self.inner.power_tx.borrow()
    }

    /// Returns the outcome of the last completed cycle, if any.
    #[must_use]
    pub fn last_outcome(&self) -> Option<RebootOutcome> {
        *self.inner.outcome_tx.borrow()
    }

    /// Subscribes to the power signal.
    #[must_use]
    pub fn watch_power(&self) -> watch::Receiver<bool> {
        self.inner.power_tx.subscribe()
    }

    /// Subscribes to the rebooting signal.
    #[must_use]
    pub fn watch_rebooting(&self) -> watch::Receiver<bool> {
        self.inner.rebooting_tx.subscribe()
    }

    /// Subscribes to cycle outcomes. The value resets to `None` when a
    /// new cycle starts.
    #[must_use]
    pub fn watch_outcome(&self) -> watch::Receiver<Option<RebootOutcome>> {
        self.inner.outcome_tx.subscribe()
    }

    /// Reports the externally observable power state.
    ///
    /// While a cycle is in flight this is pinned `false` without
    /// probing the device; otherwise it reflects a live reachability
    /// probe.
    pub async fn power_state(&self) -> bool {
        if self.is_rebooting() {
            return false;
        }
        let online = self.device.is_online().await;
        self.inner.power_tx.send_replace(online);
        online
    }

    /// Re-asserts the current rebooting signal after a short delay, so
    /// a just-arrived observer sees it even though no transition
    /// happened.
    fn resignal(&self) {
        let inner = Arc::clone(&self.inner);
        let delay = self.policy.resignal_delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let current = *inner.rebooting_tx.borrow();
            inner.rebooting_tx.send_replace(current);
        });
    }
}

impl Inner {
    /// Recovery poll loop. Runs until the device answers, the poll
    /// bound trips, or the cycle is cancelled. The cancellation check
    /// after the probe keeps a cancelled tick from transitioning state.
    async fn poll_until_recovered(
        inner: &Arc<Self>,
        device: &Arc<EapDevice>,
        policy: RebootPolicy,
        token: &CancellationToken,
    ) {
        let mut polls: u32 = 0;
        loop {
            tokio::select! {
                () = token.cancelled() => {
                    tracing::debug!("reboot poll cancelled");
                    inner.finish(RebootOutcome::Cancelled);
                    return;
                }
                () = tokio::time::sleep(policy.poll_interval) => {}
            }

            let online = device.is_online().await;
            polls += 1;
            tracing::debug!(online, polls, "reboot poll tick");

            if token.is_cancelled() {
                inner.finish(RebootOutcome::Cancelled);
                return;
            }

            inner.rebooting_tx.send_replace(!online);

            if online {
                // Exactly one exit from Rebooting; no tick after this.
                token.cancel();
                inner.power_tx.send_replace(true);
                inner.finish(RebootOutcome::Recovered);
                tracing::debug!(polls, "device recovered from reboot");
                return;
            }

            if policy.max_polls.is_some_and(|max| polls >= max) {
                tracing::warn!(polls, "device did not recover within the poll bound");
                inner.finish(RebootOutcome::TimedOut);
                return;
            }
        }
    }

    /// Returns the state machine to `Idle` and publishes the outcome.
    fn finish(&self, outcome: RebootOutcome) {
        *self.phase.lock() = RebootPhase::Idle;
        self.rebooting_tx.send_replace(false);
        self.outcome_tx.send_replace(Some(outcome));
    }
}

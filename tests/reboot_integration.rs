// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Integration tests for the reboot controller using wiremock.
//!
//! The poll interval is shrunk to milliseconds so recovery cycles run
//! in test time; the state transitions are the same as at the default
//! 4-second cadence.

use std::sync::Arc;
use std::time::Duration;

use eapr_lib::{
    EapConfig, EapDevice, RebootController, RebootOutcome, RebootPolicy, RebootRequest,
};
use wiremock::matchers::{body_string, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const POLL_INTERVAL: Duration = Duration::from_millis(20);
const OUTCOME_TIMEOUT: Duration = Duration::from_secs(5);

fn controller_for(mock_server: &MockServer, policy: RebootPolicy) -> RebootController {
    let address = mock_server.address();
    let device = Arc::new(
        EapDevice::from_config(
            EapConfig::new(address.ip().to_string(), "admin", "secret").with_port(address.port()),
        )
        .unwrap(),
    );
    RebootController::new(device, policy)
}

fn test_policy() -> RebootPolicy {
    RebootPolicy::default()
        .with_poll_interval(POLL_INTERVAL)
        .with_resignal_delay(Duration::from_millis(10))
}

/// Mounts an authenticated session (cookie + already-privileged probe)
/// and an accepting reboot trigger.
async fn mount_accepted_reboot(mock_server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).insert_header("Set-Cookie", "COOKIE=abc123"))
        .mount(mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/data/login.json"))
        .and(body_string("operation=read"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "error": 0 })))
        .mount(mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/data/configReboot.json"))
        .respond_with(ResponseTemplate::new(200))
        .mount(mock_server)
        .await;
}

/// Mounts an online probe that fails `failures` times, then succeeds.
async fn mount_recovery_after(mock_server: &MockServer, failures: u64) {
    if failures > 0 {
        Mock::given(method("GET"))
            .and(path("/data/rebootState.json"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(failures)
            .mount(mock_server)
            .await;
    }
    Mock::given(method("GET"))
        .and(path("/data/rebootState.json"))
        .respond_with(ResponseTemplate::new(200))
        .mount(mock_server)
        .await;
}

async fn wait_for_outcome(controller: &RebootController) -> RebootOutcome {
    let mut outcome = controller.watch_outcome();
    let guard = tokio::time::timeout(OUTCOME_TIMEOUT, outcome.wait_for(Option::is_some))
        .await
        .expect("reboot cycle did not resolve in time")
        .expect("outcome channel closed");
    let resolved: Option<RebootOutcome> = *guard;
    resolved.expect("outcome should be set")
}

async fn probe_count(mock_server: &MockServer) -> usize {
    mock_server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|request| request.url.path() == "/data/rebootState.json")
        .count()
}

#[tokio::test]
async fn recovery_on_third_poll() {
    let mock_server = MockServer::start().await;
    mount_accepted_reboot(&mock_server).await;
    mount_recovery_after(&mock_server, 2).await;

    let controller = controller_for(&mock_server, test_policy());

    assert_eq!(controller.trigger().await, RebootRequest::Started);
    assert!(controller.is_rebooting());
    assert!(!controller.power_signal());

    assert_eq!(wait_for_outcome(&controller).await, RebootOutcome::Recovered);
    assert!(controller.phase().is_idle());
    assert!(!controller.is_rebooting());
    assert!(controller.power_signal());

    // Exactly three probes: offline, offline, online.
    assert_eq!(probe_count(&mock_server).await, 3);

    // The timer must not fire again after the transition out of
    // Rebooting.
    tokio::time::sleep(POLL_INTERVAL * 5).await;
    assert_eq!(probe_count(&mock_server).await, 3);
}

#[tokio::test]
async fn rejected_request_never_starts_the_poll_timer() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).insert_header("Set-Cookie", "COOKIE=abc123"))
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/data/login.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "error": 0 })))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/data/configReboot.json"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/data/rebootState.json"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let controller = controller_for(&mock_server, test_policy());

    assert_eq!(controller.trigger().await, RebootRequest::Rejected);
    assert!(controller.phase().is_idle());
    assert!(!controller.is_rebooting());
    assert!(controller.power_signal());
    assert_eq!(controller.last_outcome(), Some(RebootOutcome::Rejected));

    // Give a would-be timer room to misfire before the expect(0)
    // verification runs on drop.
    tokio::time::sleep(POLL_INTERVAL * 3).await;
}

#[tokio::test]
async fn reentrant_trigger_issues_no_second_reboot() {
    let mock_server = MockServer::start().await;
    mount_accepted_reboot(&mock_server).await;
    // The device never recovers in this scenario.
    Mock::given(method("GET"))
        .and(path("/data/rebootState.json"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let controller = controller_for(&mock_server, test_policy());

    assert_eq!(controller.trigger().await, RebootRequest::Started);
    assert_eq!(controller.trigger().await, RebootRequest::AlreadyInProgress);

    let reboot_requests = mock_server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|request| request.url.path() == "/data/configReboot.json")
        .count();
    assert_eq!(reboot_requests, 1);

    controller.cancel();
    assert_eq!(wait_for_outcome(&controller).await, RebootOutcome::Cancelled);
    assert!(!controller.is_rebooting());
}

#[tokio::test]
async fn poll_bound_resolves_timed_out() {
    let mock_server = MockServer::start().await;
    mount_accepted_reboot(&mock_server).await;
    Mock::given(method("GET"))
        .and(path("/data/rebootState.json"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let controller = controller_for(&mock_server, test_policy().with_max_polls(2));

    assert_eq!(controller.trigger().await, RebootRequest::Started);
    assert_eq!(wait_for_outcome(&controller).await, RebootOutcome::TimedOut);

    assert!(controller.phase().is_idle());
    assert!(!controller.is_rebooting());
    // The device was never observed online; the power signal stays
    // pessimistic.
    assert!(!controller.power_signal());
    assert_eq!(probe_count(&mock_server).await, 2);
}

#[tokio::test]
async fn cancel_after_recovery_is_a_noop() {
    let mock_server = MockServer::start().await;
    mount_accepted_reboot(&mock_server).await;
    mount_recovery_after(&mock_server, 0).await;

    let controller = controller_for(&mock_server, test_policy());

    assert_eq!(controller.trigger().await, RebootRequest::Started);
    assert_eq!(wait_for_outcome(&controller).await, RebootOutcome::Recovered);

    controller.cancel();
    controller.cancel();

    assert_eq!(controller.last_outcome(), Some(RebootOutcome::Recovered));
    assert!(controller.phase().is_idle());
    assert!(controller.power_signal());
}

#[tokio::test]
async fn rebooting_signal_follows_poll_results() {
    let mock_server = MockServer::start().await;
    mount_accepted_reboot(&mock_server).await;
    mount_recovery_after(&mock_server, 1).await;

    let controller = controller_for(&mock_server, test_policy());
    let mut rebooting = controller.watch_rebooting();

    assert_eq!(controller.trigger().await, RebootRequest::Started);
    // Forced true at trigger time.
    assert!(*rebooting.borrow_and_update());

    assert_eq!(wait_for_outcome(&controller).await, RebootOutcome::Recovered);
    assert!(!*rebooting.borrow_and_update());
}

#[tokio::test]
async fn power_state_is_pinned_false_while_rebooting() {
    let mock_server = MockServer::start().await;
    mount_accepted_reboot(&mock_server).await;
    Mock::given(method("GET"))
        .and(path("/data/rebootState.json"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    // A long interval keeps the poll loop quiet while the pinned read
    // is observed.
    let controller = controller_for(
        &mock_server,
        test_policy().with_poll_interval(Duration::from_secs(30)),
    );
    assert_eq!(controller.trigger().await, RebootRequest::Started);

    let probes_before = probe_count(&mock_server).await;
    assert!(!controller.power_state().await);
    // The pinned read must not have issued its own probe.
    assert_eq!(probe_count(&mock_server).await, probes_before);

    controller.cancel();
}

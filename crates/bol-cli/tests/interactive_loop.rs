//! Interactive loop behavior against a scripted portal.
//!
//! Covers selection resolution, thread rendering, recovery from bad input
//! and failed fetches, strict mode and cancellation.

mod common;

use bol_cli::catalog::NotificationCatalog;
use bol_cli::controller::{InputEvent, LoopController, LoopOutcome, LoopState};
use bol_cli::credentials::Credentials;
use bol_cli::error::PortalError;
use bol_cli::portal::PortalEndpoints;
use bol_cli::render::Style;
use bol_cli::session::Session;
use bol_cli::types::ProfileSummary;
use common::*;

const LISTING: [&str; 3] = [
    "[1] Quiz 1 at 01 Mar 2019",
    "[2] Assignment 2 at 02 Mar 2019",
    "[3] Final Exam at 03 Mar 2019",
];

/// Log a session in and load its catalog the way the bootstrap does.
async fn logged_in(
    transport: MockTransport,
) -> (Session<MockTransport>, ProfileSummary, NotificationCatalog) {
    let mut session = Session::new(transport, PortalEndpoints::binus());
    let creds = Credentials::new("budi@binus.ac.id", "secret").unwrap();
    let profile = session.login(&creds).await.unwrap();
    let catalog = NotificationCatalog::load(session.notifications().await.unwrap());
    (session, profile, catalog)
}

fn listing_count(sink: &RecordingSink) -> usize {
    sink.count(LISTING[0])
}

// ── Happy path ──

#[tokio::test]
async fn test_select_thread_renders_body_and_relists_same_catalog() {
    let (mock, handle) = MockTransport::portal();
    let mock = mock.with_thread(THREAD_2_URL, thread_page("Hello World"));
    let (mut session, profile, catalog) = logged_in(mock).await;
    let before = catalog.clone();

    let mut controller = LoopController::new(profile, catalog);
    let mut input = ScriptedInput::lines(&["2"]);
    let mut sink = RecordingSink::default();

    let outcome = controller.run(&mut session, &mut input, &mut sink).await;
    assert!(matches!(outcome, LoopOutcome::Done));
    assert_eq!(controller.state(), LoopState::Done);

    assert_eq!(sink.count("Hello World"), 1);
    let body_at = sink.texts().iter().position(|t| *t == "Hello World").unwrap();
    let relisted = sink.texts()[body_at..]
        .iter()
        .position(|t| *t == LISTING[0])
        .is_some();
    assert!(relisted, "catalog is listed again after the thread");
    for line in LISTING {
        assert_eq!(sink.count(line), 2);
    }

    // Notifications were fetched once, before the loop started.
    assert_eq!(
        handle.calls(),
        vec![
            "login".to_string(),
            "notifications".to_string(),
            format!("thread {THREAD_2_URL}"),
        ]
    );
    assert_eq!(controller.catalog(), &before);
    assert_eq!(controller.stats().threads_shown, 1);
    session.close().await.unwrap();
}

#[tokio::test]
async fn test_greeting_is_rendered_once() {
    let (mock, _handle) = MockTransport::portal();
    let mock = mock.with_thread(THREAD_2_URL, thread_page("x"));
    let (mut session, profile, catalog) = logged_in(mock).await;

    let mut controller = LoopController::new(profile, catalog);
    let mut input = ScriptedInput::lines(&["2", "2"]);
    let mut sink = RecordingSink::default();
    controller.run(&mut session, &mut input, &mut sink).await;

    assert_eq!(sink.count("Welcome to BOL (Binus Online) CLI."), 1);
    assert_eq!(
        sink.count("Hello BUDI SANTOSO, you have 3 unread notifications"),
        1
    );
    assert_eq!(sink.lines[0].1, Style::Highlight);
    session.close().await.unwrap();
}

// ── Invalid selections ──

#[tokio::test]
async fn test_invalid_selections_relist_without_refetch() {
    let (mock, handle) = MockTransport::portal();
    let (mut session, profile, catalog) = logged_in(mock).await;

    let mut controller = LoopController::new(profile, catalog);
    let mut input = ScriptedInput::lines(&["0", "4", "abc", "", "-1"]);
    let mut sink = RecordingSink::default();

    let outcome = controller.run(&mut session, &mut input, &mut sink).await;
    assert!(matches!(outcome, LoopOutcome::Done));
    assert_eq!(sink.count("Invalid options."), 5);
    assert_eq!(sink.errors().len(), 5);
    // Initial listing plus one after each invalid choice.
    assert_eq!(listing_count(&sink), 6);
    assert_eq!(controller.stats().invalid_selections, 5);
    assert_eq!(handle.calls(), vec!["login", "notifications"]);
    session.close().await.unwrap();
}

#[tokio::test]
async fn test_empty_catalog_does_not_crash() {
    let (mock, handle) = MockTransport::new(profile_page("Budi", 0), notifications_page(&[]));
    let (mut session, profile, catalog) = logged_in(mock).await;
    assert!(catalog.is_empty());

    let mut controller = LoopController::new(profile, catalog);
    let mut input = ScriptedInput::lines(&["1"]);
    let mut sink = RecordingSink::default();

    let outcome = controller.run(&mut session, &mut input, &mut sink).await;
    assert!(matches!(outcome, LoopOutcome::Done));
    assert!(sink.contains("Hello Budi, you have 0 unread notification"));
    assert_eq!(sink.count("No unread notifications."), 2);
    assert!(sink.contains("Invalid options."));
    assert_eq!(handle.network_calls(), 2);
    session.close().await.unwrap();
}

// ── Failed fetches ──

#[tokio::test]
async fn test_missing_thread_body_is_recoverable() {
    let (mock, _handle) = MockTransport::portal();
    // No page registered for thread 2: the mock serves a page without a body.
    let mock = mock.with_thread(
        "https://ol.binus.ac.id/Forum/Thread?id=1",
        thread_page("First thread"),
    );
    let (mut session, profile, catalog) = logged_in(mock).await;

    let mut controller = LoopController::new(profile, catalog);
    let mut input = ScriptedInput::lines(&["2", "1"]);
    let mut sink = RecordingSink::default();

    let outcome = controller.run(&mut session, &mut input, &mut sink).await;
    assert!(matches!(outcome, LoopOutcome::Done));
    assert_eq!(sink.errors(), vec!["Could not read the page."]);
    assert!(!sink.texts().iter().any(|t| t.contains("MainContent")));
    assert!(sink.contains("First thread"));
    session.close().await.unwrap();
}

#[tokio::test]
async fn test_transport_failure_returns_to_menu() {
    let (mock, handle) = MockTransport::portal();
    let mock = mock
        .with_broken_thread(THREAD_2_URL, "connection reset")
        .with_thread(
            "https://ol.binus.ac.id/Forum/Thread?id=3",
            thread_page("Exam on Monday"),
        );
    let (mut session, profile, catalog) = logged_in(mock).await;

    let mut controller = LoopController::new(profile, catalog);
    let mut input = ScriptedInput::lines(&["2", "3"]);
    let mut sink = RecordingSink::default();

    let outcome = controller.run(&mut session, &mut input, &mut sink).await;
    assert!(matches!(outcome, LoopOutcome::Done));
    assert_eq!(
        sink.errors(),
        vec!["Connection to the portal failed: connection reset"]
    );
    assert!(sink.contains("Exam on Monday"));
    assert_eq!(handle.network_calls(), 4);
    session.close().await.unwrap();
}

#[tokio::test]
async fn test_repeated_transport_failures_are_fatal() {
    let (mock, handle) = MockTransport::portal();
    let mock = mock.with_broken_thread(THREAD_2_URL, "timed out");
    let (mut session, profile, catalog) = logged_in(mock).await;

    let mut controller = LoopController::new(profile, catalog).max_transport_failures(2);
    let mut input = ScriptedInput::lines(&["2", "2", "2"]);
    let mut sink = RecordingSink::default();

    let outcome = controller.run(&mut session, &mut input, &mut sink).await;
    assert!(matches!(outcome, LoopOutcome::Fatal(PortalError::Transport(_))));
    assert_eq!(controller.state(), LoopState::Fatal);
    // First failure is shown, second ends the loop before the third prompt.
    assert_eq!(sink.errors().len(), 1);
    assert_eq!(input.prompts, 2);
    assert_eq!(handle.network_calls(), 4);
    session.close().await.unwrap();
}

#[tokio::test]
async fn test_successful_fetch_resets_failure_streak() {
    let (mock, _handle) = MockTransport::portal();
    let mock = mock
        .with_broken_thread(THREAD_2_URL, "timed out")
        .with_thread(
            "https://ol.binus.ac.id/Forum/Thread?id=1",
            thread_page("ok"),
        );
    let (mut session, profile, catalog) = logged_in(mock).await;

    let mut controller = LoopController::new(profile, catalog).max_transport_failures(2);
    let mut input = ScriptedInput::lines(&["2", "1", "2", "1"]);
    let mut sink = RecordingSink::default();

    let outcome = controller.run(&mut session, &mut input, &mut sink).await;
    assert!(matches!(outcome, LoopOutcome::Done));
    assert_eq!(sink.errors().len(), 2);
    assert_eq!(sink.count("ok"), 2);
    session.close().await.unwrap();
}

// ── Strict mode ──

#[tokio::test]
async fn test_strict_mode_aborts_on_invalid_selection() {
    let (mock, _handle) = MockTransport::portal();
    let (mut session, profile, catalog) = logged_in(mock).await;

    let mut controller = LoopController::new(profile, catalog).strict(true);
    let mut input = ScriptedInput::lines(&["9", "1"]);
    let mut sink = RecordingSink::default();

    let outcome = controller.run(&mut session, &mut input, &mut sink).await;
    assert!(matches!(outcome, LoopOutcome::Fatal(PortalError::Selection(_))));
    assert_eq!(input.prompts, 1);
    assert_eq!(listing_count(&sink), 1);
    session.close().await.unwrap();
}

#[tokio::test]
async fn test_strict_mode_aborts_on_missing_body() {
    let (mock, _handle) = MockTransport::portal();
    let (mut session, profile, catalog) = logged_in(mock).await;

    let mut controller = LoopController::new(profile, catalog).strict(true);
    let mut input = ScriptedInput::lines(&["1"]);
    let mut sink = RecordingSink::default();

    let outcome = controller.run(&mut session, &mut input, &mut sink).await;
    assert!(matches!(outcome, LoopOutcome::Fatal(PortalError::Extraction(_))));
    session.close().await.unwrap();
}

// ── Leaving the loop ──

#[tokio::test]
async fn test_end_of_input_finishes_loop() {
    let (mock, handle) = MockTransport::portal();
    let (mut session, profile, catalog) = logged_in(mock).await;

    let mut controller = LoopController::new(profile, catalog);
    let mut input = ScriptedInput::new(vec![InputEvent::Closed]);
    let mut sink = RecordingSink::default();

    let outcome = controller.run(&mut session, &mut input, &mut sink).await;
    assert!(matches!(outcome, LoopOutcome::Done));
    // The loop itself never releases the session.
    assert_eq!(handle.releases(), 0);
    session.close().await.unwrap();
    assert_eq!(handle.releases(), 1);
}

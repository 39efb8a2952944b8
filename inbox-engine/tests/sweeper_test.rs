//! Integration tests for [`inbox_engine::ScheduledSweeper`].

mod common;

use std::sync::Arc;

use chrono::{Duration, Utc};
use common::{memory_store, route, seed_thread, seed_user, Behaviour, MockTransport};
use inbox_core::{Channel, MessageStatus, UserRole};
use inbox_engine::{
    DispatchEngine, ScheduledSweeper, SendRequest, SweepReport, CLAIM_LEASE_SECS, SWEEP_BATCH_LIMIT,
};
use storage::NewMessage;

fn scheduled(thread_id: &str, at: chrono::DateTime<Utc>) -> SendRequest {
    SendRequest {
        thread_id: thread_id.to_string(),
        channel: Channel::Sms,
        content: "Reminder: appointment tomorrow".to_string(),
        to: "+15557654321".to_string(),
        scheduled_at: Some(at),
    }
}

/// **Test: due messages are sent, finalised and never picked up again.**
///
/// **Setup:** Two messages scheduled one hour out, one scheduled a day out.
/// **Action:** Sweep at +2h, then sweep again at +3h.
/// **Expected:** First sweep sends two; second sweep finds nothing; the later one stays SCHEDULED.
#[tokio::test]
async fn test_sweep_sends_due_and_is_idempotent() {
    let store = memory_store().await;
    let now = Utc::now();
    let thread = seed_thread(&store, "+15557654321", now).await;
    let editor = seed_user(&store, "editor", UserRole::Editor).await;
    let transport = MockTransport::new(Behaviour::Accept);
    let engine = DispatchEngine::new(store.clone(), route(transport.clone()));
    let sweeper = ScheduledSweeper::new(store.clone(), route(transport.clone()));

    let a = engine.dispatch_at(scheduled(&thread.id, now + Duration::hours(1)), &editor, now).await.unwrap();
    let b = engine.dispatch_at(scheduled(&thread.id, now + Duration::hours(1)), &editor, now).await.unwrap();
    let later = engine.dispatch_at(scheduled(&thread.id, now + Duration::days(1)), &editor, now).await.unwrap();

    let sweep_at = now + Duration::hours(2);
    let report = sweeper.sweep(sweep_at).await.unwrap();
    assert_eq!(
        report,
        SweepReport {
            processed: 2,
            succeeded: 2,
            failed: 0
        }
    );
    assert_eq!(transport.calls(), 2);

    for id in [&a.id, &b.id] {
        let m = store.messages.find_by_id(id).await.unwrap().unwrap();
        assert_eq!(m.status, MessageStatus::Sent);
        assert!(m.external_id.is_some());
        assert_eq!(m.sent_at, Some(sweep_at));
    }
    let pending = store.messages.find_by_id(&later.id).await.unwrap().unwrap();
    assert_eq!(pending.status, MessageStatus::Scheduled);

    let thread_after = store.threads.find_by_id(&thread.id).await.unwrap().unwrap();
    assert_eq!(thread_after.last_activity, sweep_at);

    let again = sweeper.sweep(now + Duration::hours(3)).await.unwrap();
    assert_eq!(again, SweepReport::default());
    assert_eq!(transport.calls(), 2);
}

/// **Test: failures are counted and do not stop the rest of the batch.**
#[tokio::test]
async fn test_sweep_continues_past_failures() {
    let store = memory_store().await;
    let now = Utc::now();
    let thread = seed_thread(&store, "+15557654321", now).await;
    let editor = seed_user(&store, "editor", UserRole::Editor).await;

    // An EMAIL row can only exist if written directly; dispatch refuses it.
    let email = NewMessage::outbound(
        &thread.id,
        &editor.id,
        Channel::Email,
        "hello",
        "inbox@example.com",
        "someone@example.com",
        MessageStatus::Scheduled,
    )
    .created_at(now)
    .scheduled_for(now - Duration::minutes(10));
    store.messages.insert(&email).await.unwrap();

    let transport = MockTransport::new(Behaviour::Accept);
    let engine = DispatchEngine::new(store.clone(), route(transport.clone()));
    let ok = engine
        .dispatch_at(scheduled(&thread.id, now + Duration::minutes(1)), &editor, now)
        .await
        .unwrap();

    let sweeper = ScheduledSweeper::new(store.clone(), route(transport.clone()));
    let report = sweeper.sweep(now + Duration::minutes(5)).await.unwrap();

    assert_eq!(report.processed, 2);
    assert_eq!(report.succeeded, 1);
    assert_eq!(report.failed, 1);
    assert_eq!(transport.calls(), 1);

    let failed = store.messages.find_by_id(&email.id).await.unwrap().unwrap();
    assert_eq!(failed.status, MessageStatus::Failed);
    let sent = store.messages.find_by_id(&ok.id).await.unwrap().unwrap();
    assert_eq!(sent.status, MessageStatus::Sent);
}

/// **Test: a transport rejection marks the message FAILED without touching the thread.**
#[tokio::test]
async fn test_sweep_transport_failure() {
    let store = memory_store().await;
    let now = Utc::now();
    let thread = seed_thread(&store, "+15557654321", now).await;
    let editor = seed_user(&store, "editor", UserRole::Editor).await;
    let transport = MockTransport::new(Behaviour::Accept);
    let engine = DispatchEngine::new(store.clone(), route(transport.clone()));
    let m = engine
        .dispatch_at(scheduled(&thread.id, now + Duration::minutes(1)), &editor, now)
        .await
        .unwrap();

    transport.set_behaviour(Behaviour::Reject);
    let sweeper = ScheduledSweeper::new(store.clone(), route(transport.clone()));
    let report = sweeper.sweep(now + Duration::minutes(2)).await.unwrap();

    assert_eq!(report.failed, 1);
    let failed = store.messages.find_by_id(&m.id).await.unwrap().unwrap();
    assert_eq!(failed.status, MessageStatus::Failed);
    assert!(failed.sent_at.is_none());
    let thread_after = store.threads.find_by_id(&thread.id).await.unwrap().unwrap();
    assert_eq!(thread_after.last_activity, now);
}

/// **Test: a message claimed elsewhere is skipped and not counted.**
#[tokio::test]
async fn test_sweep_skips_claimed() {
    let store = memory_store().await;
    let now = Utc::now();
    let thread = seed_thread(&store, "+15557654321", now).await;
    let editor = seed_user(&store, "editor", UserRole::Editor).await;
    let transport = MockTransport::new(Behaviour::Accept);
    let engine = DispatchEngine::new(store.clone(), route(transport.clone()));
    let m = engine
        .dispatch_at(scheduled(&thread.id, now + Duration::minutes(1)), &editor, now)
        .await
        .unwrap();

    assert!(store.messages.claim_scheduled(&m.id, now).await.unwrap());

    let sweeper = ScheduledSweeper::new(store.clone(), route(transport.clone()));
    let report = sweeper.sweep(now + Duration::minutes(2)).await.unwrap();
    assert_eq!(report, SweepReport::default());
    assert_eq!(transport.calls(), 0);
}

/// **Test: a claim abandoned past the lease is failed, never resent.**
///
/// **Setup:** A due message claimed by a sweep that never finished.
/// **Action:** Sweep inside the lease, then sweep after it expires.
/// **Expected:** The first sweep leaves it PENDING; the second marks it FAILED; no transport call.
#[tokio::test]
async fn test_sweep_fails_abandoned_claim_after_lease() {
    let store = memory_store().await;
    let now = Utc::now();
    let thread = seed_thread(&store, "+15557654321", now).await;
    let editor = seed_user(&store, "editor", UserRole::Editor).await;
    let transport = MockTransport::new(Behaviour::Accept);
    let engine = DispatchEngine::new(store.clone(), route(transport.clone()));
    let m = engine
        .dispatch_at(scheduled(&thread.id, now + Duration::minutes(1)), &editor, now)
        .await
        .unwrap();
    let claimed_at = now + Duration::minutes(2);
    assert!(store.messages.claim_scheduled(&m.id, claimed_at).await.unwrap());

    let sweeper = ScheduledSweeper::new(store.clone(), route(transport.clone()));
    sweeper.sweep(claimed_at + Duration::seconds(CLAIM_LEASE_SECS - 60)).await.unwrap();
    let held = store.messages.find_by_id(&m.id).await.unwrap().unwrap();
    assert_eq!(held.status, MessageStatus::Pending);

    let report = sweeper.sweep(claimed_at + Duration::seconds(CLAIM_LEASE_SECS + 60)).await.unwrap();
    assert_eq!(report, SweepReport::default());
    let expired = store.messages.find_by_id(&m.id).await.unwrap().unwrap();
    assert_eq!(expired.status, MessageStatus::Failed);
    assert_eq!(transport.calls(), 0);
}

/// **Test: one sweep handles at most the batch limit.**
#[tokio::test]
async fn test_sweep_batch_limit() {
    let store = memory_store().await;
    let now = Utc::now();
    let thread = seed_thread(&store, "+15557654321", now).await;
    let editor = seed_user(&store, "editor", UserRole::Editor).await;
    let transport = MockTransport::new(Behaviour::Accept);
    let engine = DispatchEngine::new(store.clone(), route(transport.clone()));

    let total = SWEEP_BATCH_LIMIT as usize + 5;
    for _ in 0..total {
        engine
            .dispatch_at(scheduled(&thread.id, now + Duration::minutes(1)), &editor, now)
            .await
            .unwrap();
    }

    let sweeper = ScheduledSweeper::new(store.clone(), route(transport.clone()));
    let first = sweeper.sweep(now + Duration::minutes(2)).await.unwrap();
    assert_eq!(first.processed, SWEEP_BATCH_LIMIT as usize);
    let second = sweeper.sweep(now + Duration::minutes(3)).await.unwrap();
    assert_eq!(second.processed, 5);
    assert_eq!(transport.calls(), total);
}

/// **Test: the periodic runner sweeps without being asked.**
#[tokio::test]
async fn test_spawn_periodic_runs_sweeps() {
    let store = memory_store().await;
    let now = Utc::now();
    let thread = seed_thread(&store, "+15557654321", now).await;
    let editor = seed_user(&store, "editor", UserRole::Editor).await;
    let transport = MockTransport::new(Behaviour::Accept);
    let engine = DispatchEngine::new(store.clone(), route(transport.clone()));
    let m = engine
        .dispatch_at(
            scheduled(&thread.id, now - Duration::seconds(30)),
            &editor,
            now - Duration::minutes(1),
        )
        .await
        .unwrap();
    assert_eq!(m.status, MessageStatus::Scheduled);

    let sweeper = Arc::new(ScheduledSweeper::new(store.clone(), route(transport.clone())));
    let handle = sweeper.spawn_periodic(std::time::Duration::from_millis(20));
    tokio::time::sleep(std::time::Duration::from_millis(200)).await;
    handle.abort();

    let sent = store.messages.find_by_id(&m.id).await.unwrap().unwrap();
    assert_eq!(sent.status, MessageStatus::Sent);
    assert_eq!(transport.calls(), 1);
}

//! Integration tests for [`analytics::AnalyticsAggregator`] over an in-memory store.

use analytics::{AnalyticsAggregator, TimeRange};
use chrono::{Duration, Utc};
use inbox_core::{Channel, MessageStatus, User, UserRole};
use storage::{NewMessage, Repository, Store};

async fn seeded() -> (Store, String) {
    let store = Store::connect("sqlite::memory:")
        .await
        .expect("Failed to create store");
    let now = Utc::now();
    let agent = User {
        id: "agent".to_string(),
        email: "agent@example.com".to_string(),
        first_name: "Ada".to_string(),
        last_name: "Agent".to_string(),
        role: UserRole::Editor,
        email_verified: true,
        image: None,
        created_at: now,
        updated_at: now,
    };
    store.users.save(&agent).await.unwrap();
    let (contact, _) = store.contacts.get_or_create_by_phone("+15550101", now).await.unwrap();
    let (thread, _) = store.threads.get_or_create_for_contact(&contact.id, now).await.unwrap();
    (store, thread.id)
}

/// **Test: only messages inside the window are counted; replies carry their user.**
#[tokio::test]
async fn test_aggregate_window() {
    let (store, thread_id) = seeded().await;
    let now = Utc::now();

    let old = NewMessage::inbound(&thread_id, Channel::Sms, MessageStatus::Sent, "old", "+15550101", "+1", "SMold")
        .created_at(now - Duration::days(40));
    store.messages.insert_inbound(&old, now - Duration::days(40)).await.unwrap();

    let asked = now - Duration::hours(2);
    let question = NewMessage::inbound(&thread_id, Channel::Sms, MessageStatus::Sent, "price?", "+15550101", "+1", "SMq")
        .created_at(asked);
    store.messages.insert_inbound(&question, asked).await.unwrap();

    let answered = asked + Duration::minutes(12);
    let answer = NewMessage::outbound(&thread_id, "agent", Channel::Sms, "$10", "+1", "+15550101", MessageStatus::Delivered)
        .created_at(answered)
        .sent(Some("SMa".to_string()), answered);
    store.messages.insert_and_touch_thread(&answer, answered).await.unwrap();

    let aggregator = AnalyticsAggregator::new(store.clone());

    let month = aggregator.aggregate(TimeRange::Last30Days.window_start(now), now).await.unwrap();
    assert_eq!(month.overview.total_messages, 2);
    assert_eq!(month.overview.average_response_time, 12.0);
    assert_eq!(month.overview.success_rate, 100.0);
    assert_eq!(month.charts.responses_by_user.len(), 1);
    assert_eq!(month.charts.responses_by_user[0].user_name, "Ada Agent");
    assert_eq!(month.charts.responses_by_user[0].email, "agent@example.com");

    let all = aggregator.aggregate(TimeRange::AllTime.window_start(now), now).await.unwrap();
    assert_eq!(all.overview.total_messages, 3);
    assert_eq!(
        all.charts.hourly_activity.iter().map(|h| h.count).sum::<usize>(),
        3
    );

    let recent = aggregator.report(TimeRange::Last7Days).await.unwrap();
    assert_eq!(recent.overview.total_conversations, 1);
}

//! Integration tests for [`storage::Store`].
//!
//! Covers find-or-create of contacts and threads, inbox listing, notes visibility and user roles
//! using an in-memory SQLite database.

use chrono::{Duration, Utc};
use inbox_core::{Channel, MessageStatus, Note, User, UserRole};
use storage::{NewMessage, Repository, Store};

async fn memory_store() -> Store {
    Store::connect("sqlite::memory:")
        .await
        .expect("Failed to create store")
}

fn user(id: &str, email: &str, first: &str, role: UserRole) -> User {
    let now = Utc::now();
    User {
        id: id.to_string(),
        email: email.to_string(),
        first_name: first.to_string(),
        last_name: "Tester".to_string(),
        role,
        email_verified: false,
        image: None,
        created_at: now,
        updated_at: now,
    }
}

/// **Test: the same phone twice yields one contact and one thread.**
///
/// **Setup:** Empty in-memory DB.
/// **Action:** `get_or_create_by_phone` and `get_or_create_for_contact` twice each.
/// **Expected:** Same ids both times; only the first call reports creation.
#[tokio::test]
async fn test_get_or_create_is_idempotent() {
    let store = memory_store().await;
    let now = Utc::now();

    let (c1, created1) = store.contacts.get_or_create_by_phone("+15550001", now).await.unwrap();
    let (c2, created2) = store.contacts.get_or_create_by_phone("+15550001", now).await.unwrap();
    assert!(created1);
    assert!(!created2);
    assert_eq!(c1.id, c2.id);

    let (t1, tcreated1) = store.threads.get_or_create_for_contact(&c1.id, now).await.unwrap();
    let (t2, tcreated2) = store.threads.get_or_create_for_contact(&c1.id, now).await.unwrap();
    assert!(tcreated1);
    assert!(!tcreated2);
    assert_eq!(t1.id, t2.id);
    assert_eq!(t1.unread_count, 0);
}

/// **Test: concurrent first contact from one number converges on a single row (file-backed DB).**
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_get_or_create_concurrent() {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite://{}/inbox.db", dir.path().display());
    let store = Store::connect(&url).await.unwrap();
    let now = Utc::now();

    let mut handles = Vec::new();
    for _ in 0..8 {
        let store = store.clone();
        handles.push(tokio::spawn(async move {
            store.contacts.get_or_create_by_phone("+15550009", now).await
        }));
    }
    let mut ids = Vec::new();
    for h in handles {
        let (contact, _) = h.await.unwrap().unwrap();
        ids.push(contact.id);
    }
    ids.dedup();
    assert_eq!(ids.len(), 1);
}

/// **Test: inbox listing is ordered by last activity and carries the latest message.**
#[tokio::test]
async fn test_list_summaries_orders_and_attaches_latest() {
    let store = memory_store().await;
    let t0 = Utc::now() - Duration::hours(2);

    let (a, _) = store.contacts.get_or_create_by_phone("+1000", t0).await.unwrap();
    let (b, _) = store.contacts.get_or_create_by_phone("+2000", t0).await.unwrap();
    let (ta, _) = store.threads.get_or_create_for_contact(&a.id, t0).await.unwrap();
    let (tb, _) = store
        .threads
        .get_or_create_for_contact(&b.id, t0 + Duration::minutes(30))
        .await
        .unwrap();

    let first = NewMessage::inbound(&ta.id, Channel::Sms, MessageStatus::Sent, "old", "+1000", "+1", "SM-a1")
        .created_at(t0 + Duration::minutes(1));
    let second = NewMessage::inbound(&ta.id, Channel::Sms, MessageStatus::Sent, "new", "+1000", "+1", "SM-a2")
        .created_at(t0 + Duration::minutes(2));
    store.messages.insert_inbound(&first, t0 + Duration::minutes(1)).await.unwrap();
    store.messages.insert_inbound(&second, t0 + Duration::minutes(2)).await.unwrap();

    let summaries = store.threads.list_summaries().await.unwrap();
    assert_eq!(summaries.len(), 2);
    assert_eq!(summaries[0].thread.id, tb.id);
    assert!(summaries[0].latest_message.is_none());
    assert_eq!(summaries[1].thread.id, ta.id);
    assert_eq!(summaries[1].contact.phone.as_deref(), Some("+1000"));
    assert_eq!(summaries[1].latest_message.as_ref().unwrap().content, "new");
    assert_eq!(summaries[1].thread.unread_count, 2);
}

/// **Test: mark_read resets unread and stats reflect it.**
#[tokio::test]
async fn test_mark_read_and_stats() {
    let store = memory_store().await;
    let now = Utc::now();
    let (c, _) = store.contacts.get_or_create_by_phone("+3000", now).await.unwrap();
    let (t, _) = store.threads.get_or_create_for_contact(&c.id, now).await.unwrap();
    for i in 0..3 {
        let m = NewMessage::inbound(&t.id, Channel::Sms, MessageStatus::Sent, "x", "+3000", "+1", &format!("SM-{}", i));
        store.messages.insert_inbound(&m, now).await.unwrap();
    }

    let stats = store.inbox_stats().await.unwrap();
    assert_eq!(stats.total_messages, 3);
    assert_eq!(stats.total_unread, 3);

    assert!(store.threads.mark_read(&t.id).await.unwrap());
    let stats = store.inbox_stats().await.unwrap();
    assert_eq!(stats.total_unread, 0);
}

/// **Test: private notes are only listed for their author.**
#[tokio::test]
async fn test_notes_visibility() {
    let store = memory_store().await;
    let now = Utc::now();
    store.users.save(&user("u1", "a@x.io", "Ann", UserRole::Editor)).await.unwrap();
    store.users.save(&user("u2", "b@x.io", "Bob", UserRole::Viewer)).await.unwrap();
    let (c, _) = store.contacts.get_or_create_by_phone("+4000", now).await.unwrap();

    let public = Note {
        id: "n1".to_string(),
        contact_id: c.id.clone(),
        user_id: "u1".to_string(),
        content: "public".to_string(),
        is_public: true,
        created_at: now,
        updated_at: now,
    };
    let private = Note {
        id: "n2".to_string(),
        content: "private".to_string(),
        is_public: false,
        created_at: now + Duration::seconds(1),
        updated_at: now + Duration::seconds(1),
        ..public.clone()
    };
    store.notes.save(&public).await.unwrap();
    store.notes.save(&private).await.unwrap();

    let for_author = store.notes.list_visible_for_contact(&c.id, "u1").await.unwrap();
    assert_eq!(for_author.len(), 2);
    assert_eq!(for_author[0].note.id, "n2");
    assert_eq!(for_author[0].user.first_name, "Ann");

    let for_other = store.notes.list_visible_for_contact(&c.id, "u2").await.unwrap();
    assert_eq!(for_other.len(), 1);
    assert_eq!(for_other[0].note.id, "n1");

    assert!(store.notes.delete("n1").await.unwrap());
    assert!(store.notes.find_by_id("n1").await.unwrap().is_none());
}

/// **Test: update_role persists and unknown users yield None; duplicate email is rejected.**
#[tokio::test]
async fn test_user_roles_and_uniqueness() {
    let store = memory_store().await;
    store.users.save(&user("u1", "a@x.io", "Ann", UserRole::Viewer)).await.unwrap();

    let updated = store.users.update_role("u1", UserRole::Admin, Utc::now()).await.unwrap();
    assert_eq!(updated.unwrap().role, UserRole::Admin);
    assert!(store.users.update_role("nope", UserRole::Admin, Utc::now()).await.unwrap().is_none());

    let dup = store.users.save(&user("u2", "a@x.io", "Other", UserRole::Viewer)).await;
    assert!(matches!(dup, Err(storage::StorageError::AlreadyExists(_))));

    let directory = store.users.list_directory().await.unwrap();
    assert_eq!(directory.len(), 1);
    assert_eq!(directory[0].email, "a@x.io");
}

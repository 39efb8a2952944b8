//! Integration tests for the inbox, note and user services.

mod common;

use chrono::{Duration, Utc};
use common::{memory_store, seed_thread, seed_user};
use inbox_core::UserRole;
use inbox_engine::{
    EngineError, InboxService, NewUserRequest, NoteChanges, NoteService, UserService,
    WebhookIngestor, WebhookPayload,
};

fn inbound(sid: &str, from: &str) -> WebhookPayload {
    WebhookPayload {
        message_sid: Some(sid.to_string()),
        from: Some(from.to_string()),
        to: Some("+15550000000".to_string()),
        body: Some("hello".to_string()),
        message_status: None,
        num_media: None,
    }
}

/// **Test: reading a thread returns history oldest first and clears unread.**
#[tokio::test]
async fn test_read_thread_clears_unread() {
    let store = memory_store().await;
    let ingestor = WebhookIngestor::new(store.clone());
    let inbox = InboxService::new(store.clone());
    let now = Utc::now();

    ingestor.ingest_at(inbound("SM1", "+15551230001"), now).await.unwrap();
    ingestor
        .ingest_at(inbound("SM2", "+15551230001"), now + Duration::seconds(5))
        .await
        .unwrap();

    let threads = inbox.list_threads().await.unwrap();
    assert_eq!(threads.len(), 1);
    assert_eq!(threads[0].thread.unread_count, 2);
    let latest = threads[0].latest_message.as_ref().unwrap();
    assert_eq!(latest.external_id.as_deref(), Some("SM2"));

    let thread_id = threads[0].thread.id.clone();
    let history = inbox.read_thread(&thread_id).await.unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].message.external_id.as_deref(), Some("SM1"));
    assert!(history[0].user.is_none());

    let detail = inbox.get_thread(&thread_id).await.unwrap();
    assert_eq!(detail.thread.unread_count, 0);
    assert_eq!(detail.contact.phone.as_deref(), Some("+15551230001"));

    let stats = inbox.dashboard_stats().await.unwrap();
    assert_eq!(stats.total_messages, 2);
    assert_eq!(stats.total_unread, 0);
}

#[tokio::test]
async fn test_missing_thread_is_not_found() {
    let store = memory_store().await;
    let inbox = InboxService::new(store);
    assert!(matches!(inbox.get_thread("nope").await, Err(EngineError::NotFound(_))));
    assert!(matches!(inbox.read_thread("nope").await, Err(EngineError::NotFound(_))));
}

/// **Test: opening a thread by phone reuses the contact an inbound message created.**
#[tokio::test]
async fn test_open_thread_reuses_contact() {
    let store = memory_store().await;
    let inbox = InboxService::new(store.clone());
    let editor = seed_user(&store, "editor", UserRole::Editor).await;
    let viewer = seed_user(&store, "viewer", UserRole::Viewer).await;
    let existing = seed_thread(&store, "+15551230002", Utc::now()).await;

    let opened = inbox.open_thread("15551230002", &editor).await.unwrap();
    assert_eq!(opened.thread.id, existing.id);

    let fresh = inbox.open_thread("+15551239999", &editor).await.unwrap();
    assert_ne!(fresh.thread.id, existing.id);
    assert_eq!(fresh.contact.phone.as_deref(), Some("+15551239999"));

    assert!(matches!(
        inbox.open_thread("+15551238888", &viewer).await,
        Err(EngineError::Forbidden(_))
    ));
    assert!(store.contacts.find_by_phone("+15551238888").await.unwrap().is_none());
}

/// **Test: private notes are only listed for their author; only authors may edit or delete.**
#[tokio::test]
async fn test_note_visibility_and_ownership() {
    let store = memory_store().await;
    let notes = NoteService::new(store.clone());
    let alice = seed_user(&store, "alice", UserRole::Editor).await;
    let bob = seed_user(&store, "bob", UserRole::Viewer).await;
    let thread = seed_thread(&store, "+15551230003", Utc::now()).await;
    let contact_id = thread.contact_id.clone();

    let public = notes
        .create(&contact_id, &alice, "  VIP customer  ", None)
        .await
        .unwrap();
    assert_eq!(public.note.content, "VIP customer");
    assert!(public.note.is_public);
    let private = notes
        .create(&contact_id, &alice, "owes us a call", Some(false))
        .await
        .unwrap();

    assert_eq!(notes.list(&contact_id, &alice).await.unwrap().len(), 2);
    let for_bob = notes.list(&contact_id, &bob).await.unwrap();
    assert_eq!(for_bob.len(), 1);
    assert_eq!(for_bob[0].note.id, public.note.id);
    assert_eq!(for_bob[0].user.id, "alice");

    let err = notes
        .update(
            &private.note.id,
            &bob,
            NoteChanges {
                content: Some("hacked".to_string()),
                is_public: None,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(ref m) if m == "You can only edit your own notes"));
    assert!(matches!(
        notes.delete(&private.note.id, &bob).await,
        Err(EngineError::Forbidden(_))
    ));

    let updated = notes
        .update(
            &private.note.id,
            &alice,
            NoteChanges {
                content: None,
                is_public: Some(true),
            },
        )
        .await
        .unwrap();
    assert!(updated.note.is_public);
    assert_eq!(updated.note.content, "owes us a call");
    assert_eq!(notes.list(&contact_id, &bob).await.unwrap().len(), 2);

    notes.delete(&public.note.id, &alice).await.unwrap();
    assert!(matches!(
        notes.delete(&public.note.id, &alice).await,
        Err(EngineError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_note_validation() {
    let store = memory_store().await;
    let notes = NoteService::new(store.clone());
    let alice = seed_user(&store, "alice", UserRole::Editor).await;
    let thread = seed_thread(&store, "+15551230004", Utc::now()).await;

    assert!(matches!(
        notes.create(&thread.contact_id, &alice, "   ", None).await,
        Err(EngineError::Validation(_))
    ));
    assert!(matches!(
        notes.create("no-contact", &alice, "hi", None).await,
        Err(EngineError::NotFound(ref m)) if m == "Contact not found"
    ));
}

/// **Test: identity resolution and admin user management.**
#[tokio::test]
async fn test_user_admin_flow() {
    let store = memory_store().await;
    let users = UserService::new(store.clone());
    let admin = seed_user(&store, "admin", UserRole::Admin).await;
    let editor = seed_user(&store, "editor", UserRole::Editor).await;

    assert!(matches!(users.authenticate(None).await, Err(EngineError::Unauthorized)));
    assert!(matches!(users.authenticate(Some("ghost")).await, Err(EngineError::Unauthorized)));
    assert_eq!(users.authenticate(Some("admin")).await.unwrap().id, "admin");

    let request = NewUserRequest {
        email: "new@example.com".to_string(),
        first_name: "New".to_string(),
        last_name: "Person".to_string(),
        role: "VIEWER".to_string(),
    };
    assert!(matches!(
        users.create_user(&editor, request.clone()).await,
        Err(EngineError::Forbidden(_))
    ));
    let created = users.create_user(&admin, request.clone()).await.unwrap();
    assert_eq!(created.role, UserRole::Viewer);
    assert!(!created.email_verified);
    assert!(matches!(
        users.create_user(&admin, request).await,
        Err(EngineError::Validation(ref m)) if m == "User already exists"
    ));

    let updated = users.update_role(&admin, &created.id, "EDITOR").await.unwrap();
    assert_eq!(updated.role, UserRole::Editor);
    assert!(matches!(
        users.update_role(&admin, &created.id, "OWNER").await,
        Err(EngineError::Validation(ref m)) if m == "Invalid role"
    ));
    assert!(matches!(
        users.update_role(&admin, "ghost", "ADMIN").await,
        Err(EngineError::NotFound(_))
    ));

    assert_eq!(users.list_all(&admin).await.unwrap().len(), 3);
    assert!(users.list_all(&editor).await.is_err());
    let directory = users.directory().await.unwrap();
    let names: Vec<_> = directory.iter().map(|u| u.first_name.as_str()).collect();
    assert_eq!(names, vec!["New", "admin", "editor"]);
}

//! Shared fixtures for engine integration tests: a counting transport and seeded users/threads.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use inbox_core::{
    MessagingTransport, OutboundRequest, SenderNumbers, Thread, TransportError, TransportReceipt,
    TransportResult, User, UserRole,
};
use inbox_engine::OutboundRoute;
use storage::{Repository, Store};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Behaviour {
    Accept,
    Reject,
    Hang,
}

/// Records every request and answers according to its behaviour.
pub struct MockTransport {
    behaviour: Mutex<Behaviour>,
    calls: AtomicUsize,
    requests: Mutex<Vec<OutboundRequest>>,
}

impl MockTransport {
    pub fn new(behaviour: Behaviour) -> Arc<Self> {
        Arc::new(Self {
            behaviour: Mutex::new(behaviour),
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn set_behaviour(&self, behaviour: Behaviour) {
        *self.behaviour.lock().unwrap() = behaviour;
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<OutboundRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl MessagingTransport for MockTransport {
    async fn send(&self, request: &OutboundRequest) -> TransportResult<TransportReceipt> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        self.requests.lock().unwrap().push(request.clone());
        let behaviour = *self.behaviour.lock().unwrap();
        match behaviour {
            Behaviour::Accept => Ok(TransportReceipt {
                external_id: format!("SM{:04}", n),
                status: "queued".to_string(),
            }),
            Behaviour::Reject => Err(TransportError::Rejected {
                status: 400,
                message: "The 'To' number is not a valid phone number.".to_string(),
            }),
            Behaviour::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Err(TransportError::Request("unreachable".to_string()))
            }
        }
    }
}

pub const SMS_NUMBER: &str = "+15550000000";
pub const WHATSAPP_NUMBER: &str = "+15550000001";

pub fn route(transport: Arc<MockTransport>) -> OutboundRoute {
    OutboundRoute::new(
        transport,
        SenderNumbers::new(SMS_NUMBER, Some(WHATSAPP_NUMBER.to_string())),
    )
}

pub async fn memory_store() -> Store {
    Store::connect("sqlite::memory:")
        .await
        .expect("Failed to create store")
}

pub async fn seed_user(store: &Store, id: &str, role: UserRole) -> User {
    let now = Utc::now();
    let user = User {
        id: id.to_string(),
        email: format!("{}@example.com", id),
        first_name: id.to_string(),
        last_name: "Tester".to_string(),
        role,
        email_verified: true,
        image: None,
        created_at: now,
        updated_at: now,
    };
    store.users.save(&user).await.expect("Failed to save user");
    user
}

pub async fn seed_thread(store: &Store, phone: &str, at: DateTime<Utc>) -> Thread {
    let (contact, _) = store
        .contacts
        .get_or_create_by_phone(phone, at)
        .await
        .expect("Failed to create contact");
    let (thread, _) = store
        .threads
        .get_or_create_for_contact(&contact.id, at)
        .await
        .expect("Failed to create thread");
    thread
}

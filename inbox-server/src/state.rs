use std::sync::Arc;

use analytics::AnalyticsAggregator;
use inbox_engine::{
    DispatchEngine, InboxService, NoteService, OutboundRoute, ScheduledSweeper, UserService,
    WebhookIngestor,
};
use presence::PresenceTracker;
use storage::Store;

/// Shared by every handler. Services are cheap clones over one store.
#[derive(Clone)]
pub struct AppState {
    pub dispatch: DispatchEngine,
    pub sweeper: Arc<ScheduledSweeper>,
    pub ingestor: WebhookIngestor,
    pub inbox: InboxService,
    pub notes: NoteService,
    pub users: UserService,
    pub analytics: AnalyticsAggregator,
    pub presence: PresenceTracker,
    pub cron_secret: Option<Arc<str>>,
}

impl AppState {
    pub fn new(
        store: Store,
        route: OutboundRoute,
        presence: PresenceTracker,
        cron_secret: Option<String>,
    ) -> Self {
        Self {
            dispatch: DispatchEngine::new(store.clone(), route.clone()),
            sweeper: Arc::new(ScheduledSweeper::new(store.clone(), route)),
            ingestor: WebhookIngestor::new(store.clone()),
            inbox: InboxService::new(store.clone()),
            notes: NoteService::new(store.clone()),
            users: UserService::new(store.clone()),
            analytics: AnalyticsAggregator::new(store),
            presence,
            cron_secret: cron_secret.map(Arc::from),
        }
    }
}

//! HTTP routes. Every path except the webhook and the sweep trigger requires an `x-user-id` caller.

pub mod inbox;
pub mod messages;
pub mod notes;
pub mod users;

use axum::routing::{get, patch, post};
use axum::Router;

use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/messages/send", post(messages::send_message))
        .route("/api/messages/process-scheduled", post(messages::process_scheduled))
        .route("/api/webhooks/twilio", post(messages::twilio_webhook))
        .route("/api/threads", get(inbox::list_threads).post(inbox::open_thread))
        .route("/api/threads/{id}", get(inbox::get_thread))
        .route("/api/threads/{id}/messages", get(inbox::thread_messages))
        .route("/api/dashboard/stats", get(inbox::dashboard_stats))
        .route("/api/analytics", get(inbox::analytics))
        .route(
            "/api/contacts/{id}/notes",
            get(notes::list_notes).post(notes::create_note),
        )
        .route(
            "/api/notes/{id}",
            patch(notes::update_note).delete(notes::delete_note),
        )
        .route(
            "/api/notes/{id}/presence",
            get(notes::list_presence).post(notes::announce_presence),
        )
        .route("/api/user", get(users::current_user))
        .route("/api/users", get(users::directory))
        .route("/api/admin/users", get(users::list_all).post(users::create_user))
        .route("/api/admin/users/{id}", patch(users::update_role))
        .with_state(state)
}

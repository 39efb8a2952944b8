use analytics::{AnalyticsReport, TimeRange};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::response::Json;
use inbox_core::{MessageWithUser, ThreadSummary, ThreadWithContact};
use serde::{Deserialize, Serialize};
use storage::InboxStats;

use crate::error::ApiError;
use crate::identity::CurrentUser;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ThreadsResponse {
    pub threads: Vec<ThreadSummary>,
}

#[derive(Debug, Serialize)]
pub struct ThreadResponse {
    pub thread: ThreadWithContact,
}

#[derive(Debug, Serialize)]
pub struct MessagesResponse {
    pub messages: Vec<MessageWithUser>,
}

#[derive(Debug, Default, Deserialize)]
pub struct OpenThreadBody {
    #[serde(default)]
    pub phone: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct AnalyticsQuery {
    pub range: Option<String>,
}

pub async fn list_threads(
    State(state): State<AppState>,
    _user: CurrentUser,
) -> Result<Json<ThreadsResponse>, ApiError> {
    let threads = state.inbox.list_threads().await?;
    Ok(Json(ThreadsResponse { threads }))
}

pub async fn open_thread(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    body: Result<Json<OpenThreadBody>, JsonRejection>,
) -> Result<Json<ThreadResponse>, ApiError> {
    let Json(body) = body?;
    let thread = state.inbox.open_thread(&body.phone, &user).await?;
    Ok(Json(ThreadResponse { thread }))
}

pub async fn get_thread(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<ThreadResponse>, ApiError> {
    let thread = state.inbox.get_thread(&id).await?;
    Ok(Json(ThreadResponse { thread }))
}

/// Lists a thread's messages and marks it read.
pub async fn thread_messages(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<MessagesResponse>, ApiError> {
    let messages = state.inbox.read_thread(&id).await?;
    Ok(Json(MessagesResponse { messages }))
}

pub async fn dashboard_stats(
    State(state): State<AppState>,
    _user: CurrentUser,
) -> Result<Json<InboxStats>, ApiError> {
    Ok(Json(state.inbox.dashboard_stats().await?))
}

pub async fn analytics(
    State(state): State<AppState>,
    _user: CurrentUser,
    Query(query): Query<AnalyticsQuery>,
) -> Result<Json<AnalyticsReport>, ApiError> {
    let range = TimeRange::parse(query.range.as_deref());
    Ok(Json(state.analytics.report(range).await?))
}

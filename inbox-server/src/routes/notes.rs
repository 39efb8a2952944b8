//! Contact notes and who is editing them.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use inbox_core::NoteWithAuthor;
use inbox_engine::NoteChanges;
use presence::Editor;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::identity::CurrentUser;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct NotesResponse {
    pub notes: Vec<NoteWithAuthor>,
}

#[derive(Debug, Serialize)]
pub struct NoteResponse {
    pub note: NoteWithAuthor,
}

#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateNoteBody {
    #[serde(default)]
    pub content: String,
    pub is_public: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresenceBody {
    #[serde(default)]
    pub is_active: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PresenceResponse {
    pub active_users: Vec<Editor>,
}

pub async fn list_notes(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(contact_id): Path<String>,
) -> Result<Json<NotesResponse>, ApiError> {
    let notes = state.notes.list(&contact_id, &user).await?;
    Ok(Json(NotesResponse { notes }))
}

pub async fn create_note(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(contact_id): Path<String>,
    body: Result<Json<CreateNoteBody>, JsonRejection>,
) -> Result<(StatusCode, Json<NoteResponse>), ApiError> {
    let Json(body) = body?;
    let note = state
        .notes
        .create(&contact_id, &user, &body.content, body.is_public)
        .await?;
    Ok((StatusCode::CREATED, Json(NoteResponse { note })))
}

pub async fn update_note(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(note_id): Path<String>,
    body: Result<Json<NoteChanges>, JsonRejection>,
) -> Result<Json<NoteResponse>, ApiError> {
    let Json(changes) = body?;
    let note = state.notes.update(&note_id, &user, changes).await?;
    Ok(Json(NoteResponse { note }))
}

pub async fn delete_note(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(note_id): Path<String>,
) -> Result<Json<SuccessResponse>, ApiError> {
    state.notes.delete(&note_id, &user).await?;
    Ok(Json(SuccessResponse { success: true }))
}

/// Starts or stops the caller's edit session; answers with every active editor, caller included.
pub async fn announce_presence(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(note_id): Path<String>,
    body: Result<Json<PresenceBody>, JsonRejection>,
) -> Result<Json<PresenceResponse>, ApiError> {
    let Json(body) = body?;
    if body.is_active {
        let name = user.display_name();
        let name = if name.trim().is_empty() { "Unknown".to_string() } else { name };
        state.presence.touch(&note_id, &user.id, &name).await;
    } else {
        state.presence.leave(&note_id, &user.id).await;
    }
    let active_users = state.presence.editors(&note_id, None).await;
    Ok(Json(PresenceResponse { active_users }))
}

pub async fn list_presence(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(note_id): Path<String>,
) -> Json<PresenceResponse> {
    let active_users = state.presence.editors(&note_id, Some(&user.id)).await;
    Json(PresenceResponse { active_users })
}

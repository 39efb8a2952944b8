//! User identity resolution, directory and admin management.

use chrono::Utc;
use inbox_core::{User, UserRole, UserSummary};
use serde::{Deserialize, Serialize};
use storage::{Repository, StorageError, Store};
use tracing::{info, warn};
use uuid::Uuid;

use crate::access::require_admin;
use crate::error::{EngineError, Result};

/// Admin request to create an account.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUserRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub role: String,
}

#[derive(Clone)]
pub struct UserService {
    store: Store,
}

impl UserService {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// Resolves a verified identity to its user. Absent or unknown ids are unauthorized.
    pub async fn authenticate(&self, user_id: Option<&str>) -> Result<User> {
        let user_id = match user_id.map(str::trim) {
            Some(id) if !id.is_empty() => id,
            _ => return Err(EngineError::Unauthorized),
        };
        match self.store.users.find_by_id(user_id).await? {
            Some(user) => Ok(user),
            None => {
                warn!(user_id = %user_id, "Unknown user id presented");
                Err(EngineError::Unauthorized)
            }
        }
    }

    pub async fn directory(&self) -> Result<Vec<UserSummary>> {
        Ok(self.store.users.list_directory().await?)
    }

    /// Every account, newest first. Admin only.
    pub async fn list_all(&self, admin: &User) -> Result<Vec<User>> {
        require_admin(admin)?;
        Ok(self.store.users.find_all().await?)
    }

    pub async fn create_user(&self, admin: &User, request: NewUserRequest) -> Result<User> {
        require_admin(admin)?;

        let email = request.email.trim();
        let first_name = request.first_name.trim();
        let last_name = request.last_name.trim();
        if email.is_empty()
            || first_name.is_empty()
            || last_name.is_empty()
            || request.role.trim().is_empty()
        {
            return Err(EngineError::Validation("Missing required fields".to_string()));
        }
        let role = parse_role(&request.role)?;

        if self.store.users.find_by_email(email).await?.is_some() {
            return Err(already_exists());
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4().to_string(),
            email: email.to_string(),
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            role,
            email_verified: false,
            image: None,
            created_at: now,
            updated_at: now,
        };

        match self.store.users.save(&user).await {
            Ok(()) => {}
            Err(StorageError::AlreadyExists(_)) => return Err(already_exists()),
            Err(e) => return Err(e.into()),
        }
        info!(user_id = %user.id, created_by = %admin.id, role = %role, "User created");
        Ok(user)
    }

    pub async fn update_role(&self, admin: &User, user_id: &str, role: &str) -> Result<User> {
        require_admin(admin)?;
        let role = parse_role(role)?;
        self.store
            .users
            .update_role(user_id, role, Utc::now())
            .await?
            .ok_or_else(|| EngineError::NotFound("User not found".to_string()))
    }
}

fn parse_role(role: &str) -> Result<UserRole> {
    role.trim()
        .parse()
        .map_err(|_| EngineError::Validation("Invalid role".to_string()))
}

fn already_exists() -> EngineError {
    EngineError::Validation("User already exists".to_string())
}

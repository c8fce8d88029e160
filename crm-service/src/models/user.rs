//! User and profile models - local mirrors of identity-provider principals.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Local mirror of an identity-provider principal, created on registration.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub user_id: Uuid,
    pub external_id: String,
    pub email: String,
    pub full_name: String,
    pub created_utc: DateTime<Utc>,
}

impl User {
    pub fn new(external_id: String, email: String, full_name: String) -> Self {
        Self {
            user_id: Uuid::new_v4(),
            external_id,
            email,
            full_name,
            created_utc: Utc::now(),
        }
    }
}

/// Display-facing identity layered over a user, 1:1 within an organization
/// context. Activity records are attributed to profiles, not users.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Profile {
    pub profile_id: Uuid,
    pub user_id: Uuid,
    pub display_name: String,
    pub email: String,
    pub avatar_url: Option<String>,
    pub created_utc: DateTime<Utc>,
}

impl Profile {
    pub fn new(user_id: Uuid, display_name: String, email: String) -> Self {
        Self {
            profile_id: Uuid::new_v4(),
            user_id,
            display_name,
            email,
            avatar_url: None,
            created_utc: Utc::now(),
        }
    }
}

//! Client model - a tenant's customer record.

use anyhow::anyhow;
use chrono::{DateTime, Utc};
use crm_core::error::AppError;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// Client lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClientStatus {
    Active,
    Archived,
}

impl ClientStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClientStatus::Active => "active",
            ClientStatus::Archived => "archived",
        }
    }

    pub fn from_code(code: &str) -> Option<ClientStatus> {
        match code {
            "active" => Some(ClientStatus::Active),
            "archived" => Some(ClientStatus::Archived),
            _ => None,
        }
    }

    /// Allowed state transitions: archive and restore, nothing else.
    pub fn can_transition(&self, to: ClientStatus) -> bool {
        matches!(
            (self, to),
            (ClientStatus::Active, ClientStatus::Archived)
                | (ClientStatus::Archived, ClientStatus::Active)
        )
    }
}

/// Client entity (organization-scoped).
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Client {
    pub client_id: Uuid,
    pub organization_id: Uuid,
    pub client_name: String,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub status_code: String,
    pub created_utc: DateTime<Utc>,
    pub updated_utc: DateTime<Utc>,
}

impl Client {
    pub fn new(
        organization_id: Uuid,
        client_name: String,
        contact_email: Option<String>,
        contact_phone: Option<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            client_id: Uuid::new_v4(),
            organization_id,
            client_name,
            contact_email,
            contact_phone,
            status_code: ClientStatus::Active.as_str().to_string(),
            created_utc: now,
            updated_utc: now,
        }
    }

    pub fn status(&self) -> Result<ClientStatus, AppError> {
        ClientStatus::from_code(&self.status_code).ok_or_else(|| {
            AppError::CorruptRecord(anyhow!(
                "client {} has unknown status code {:?}",
                self.client_id,
                self.status_code
            ))
        })
    }
}

/// Request to create a client.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateClientRequest {
    #[validate(length(min = 1, max = 200))]
    pub client_name: String,
    #[validate(email)]
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
}

/// Partial update; status never changes through this path.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateClientRequest {
    #[validate(length(min = 1, max = 200))]
    pub client_name: Option<String>,
    #[validate(email)]
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
}

/// Client response for API.
#[derive(Debug, Serialize)]
pub struct ClientResponse {
    pub client_id: Uuid,
    pub client_name: String,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub status: String,
    pub created_utc: DateTime<Utc>,
    pub updated_utc: DateTime<Utc>,
}

impl From<Client> for ClientResponse {
    fn from(c: Client) -> Self {
        Self {
            client_id: c.client_id,
            client_name: c.client_name,
            contact_email: c.contact_email,
            contact_phone: c.contact_phone,
            status: c.status_code,
            created_utc: c.created_utc,
            updated_utc: c.updated_utc,
        }
    }
}

//! Offer model - tenant-scoped business documents with an explicit status
//! state machine shared with templates.

use anyhow::anyhow;
use chrono::{DateTime, Utc};
use crm_core::error::AppError;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// Document lifecycle states for offers and templates.
///
/// Draft -> Published via publish; Published -> Draft only via the explicit
/// unpublish operation; either may be archived. Archived is terminal. The
/// generic update path never touches status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentStatus {
    Draft,
    Published,
    Archived,
}

impl DocumentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentStatus::Draft => "draft",
            DocumentStatus::Published => "published",
            DocumentStatus::Archived => "archived",
        }
    }

    pub fn from_code(code: &str) -> Option<DocumentStatus> {
        match code {
            "draft" => Some(DocumentStatus::Draft),
            "published" => Some(DocumentStatus::Published),
            "archived" => Some(DocumentStatus::Archived),
            _ => None,
        }
    }

    /// The fixed allowed-transition table.
    pub fn can_transition(&self, to: DocumentStatus) -> bool {
        matches!(
            (self, to),
            (DocumentStatus::Draft, DocumentStatus::Published)
                | (DocumentStatus::Published, DocumentStatus::Draft)
                | (DocumentStatus::Draft, DocumentStatus::Archived)
                | (DocumentStatus::Published, DocumentStatus::Archived)
        )
    }
}

/// Offer entity (organization-scoped). `client_id`, when present, must
/// reference a client in the same organization.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Offer {
    pub offer_id: Uuid,
    pub organization_id: Uuid,
    pub client_id: Option<Uuid>,
    pub title: String,
    pub amount_cents: Option<i64>,
    pub status_code: String,
    pub version_num: i32,
    pub created_utc: DateTime<Utc>,
    pub updated_utc: DateTime<Utc>,
}

impl Offer {
    pub fn new(
        organization_id: Uuid,
        title: String,
        client_id: Option<Uuid>,
        amount_cents: Option<i64>,
    ) -> Self {
        let now = Utc::now();
        Self {
            offer_id: Uuid::new_v4(),
            organization_id,
            client_id,
            title,
            amount_cents,
            status_code: DocumentStatus::Draft.as_str().to_string(),
            version_num: 1,
            created_utc: now,
            updated_utc: now,
        }
    }

    pub fn status(&self) -> Result<DocumentStatus, AppError> {
        DocumentStatus::from_code(&self.status_code).ok_or_else(|| {
            AppError::CorruptRecord(anyhow!(
                "offer {} has unknown status code {:?}",
                self.offer_id,
                self.status_code
            ))
        })
    }
}

/// Request to create an offer (always starts as a draft).
#[derive(Debug, Deserialize, Validate)]
pub struct CreateOfferRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    pub client_id: Option<Uuid>,
    #[validate(range(min = 0))]
    pub amount_cents: Option<i64>,
}

/// Partial update; bumps the version, never changes status.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateOfferRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    pub client_id: Option<Uuid>,
    #[validate(range(min = 0))]
    pub amount_cents: Option<i64>,
}

/// Offer response for API.
#[derive(Debug, Serialize)]
pub struct OfferResponse {
    pub offer_id: Uuid,
    pub client_id: Option<Uuid>,
    pub title: String,
    pub amount_cents: Option<i64>,
    pub status: String,
    pub version: i32,
    pub created_utc: DateTime<Utc>,
    pub updated_utc: DateTime<Utc>,
}

impl From<Offer> for OfferResponse {
    fn from(o: Offer) -> Self {
        Self {
            offer_id: o.offer_id,
            client_id: o.client_id,
            title: o.title,
            amount_cents: o.amount_cents,
            status: o.status_code,
            version: o.version_num,
            created_utc: o.created_utc,
            updated_utc: o.updated_utc,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draft_publishes_and_published_unpublishes() {
        assert!(DocumentStatus::Draft.can_transition(DocumentStatus::Published));
        assert!(DocumentStatus::Published.can_transition(DocumentStatus::Draft));
    }

    #[test]
    fn both_live_states_archive() {
        assert!(DocumentStatus::Draft.can_transition(DocumentStatus::Archived));
        assert!(DocumentStatus::Published.can_transition(DocumentStatus::Archived));
    }

    #[test]
    fn archived_is_terminal() {
        assert!(!DocumentStatus::Archived.can_transition(DocumentStatus::Draft));
        assert!(!DocumentStatus::Archived.can_transition(DocumentStatus::Published));
        assert!(!DocumentStatus::Archived.can_transition(DocumentStatus::Archived));
    }

    #[test]
    fn self_transitions_are_rejected() {
        assert!(!DocumentStatus::Draft.can_transition(DocumentStatus::Draft));
        assert!(!DocumentStatus::Published.can_transition(DocumentStatus::Published));
    }

    #[test]
    fn unknown_status_code_is_a_corrupt_record() {
        let mut offer = Offer::new(Uuid::new_v4(), "Quote".to_string(), None, None);
        offer.status_code = "pending".to_string();
        assert!(matches!(offer.status(), Err(AppError::CorruptRecord(_))));
    }
}

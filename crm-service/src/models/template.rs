//! Template model - tenant-scoped document templates sharing the offer
//! status state machine.

use anyhow::anyhow;
use chrono::{DateTime, Utc};
use crm_core::error::AppError;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use super::offer::DocumentStatus;

/// Template entity (organization-scoped).
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Template {
    pub template_id: Uuid,
    pub organization_id: Uuid,
    pub template_name: String,
    pub body: String,
    pub status_code: String,
    pub version_num: i32,
    pub created_utc: DateTime<Utc>,
    pub updated_utc: DateTime<Utc>,
}

impl Template {
    pub fn new(organization_id: Uuid, template_name: String, body: String) -> Self {
        let now = Utc::now();
        Self {
            template_id: Uuid::new_v4(),
            organization_id,
            template_name,
            body,
            status_code: DocumentStatus::Draft.as_str().to_string(),
            version_num: 1,
            created_utc: now,
            updated_utc: now,
        }
    }

    pub fn status(&self) -> Result<DocumentStatus, AppError> {
        DocumentStatus::from_code(&self.status_code).ok_or_else(|| {
            AppError::CorruptRecord(anyhow!(
                "template {} has unknown status code {:?}",
                self.template_id,
                self.status_code
            ))
        })
    }
}

/// Request to create a template (always starts as a draft).
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTemplateRequest {
    #[validate(length(min = 1, max = 200))]
    pub template_name: String,
    pub body: String,
}

/// Partial update; bumps the version, never changes status.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateTemplateRequest {
    #[validate(length(min = 1, max = 200))]
    pub template_name: Option<String>,
    pub body: Option<String>,
}

/// Template response for API.
#[derive(Debug, Serialize)]
pub struct TemplateResponse {
    pub template_id: Uuid,
    pub template_name: String,
    pub body: String,
    pub status: String,
    pub version: i32,
    pub created_utc: DateTime<Utc>,
    pub updated_utc: DateTime<Utc>,
}

impl From<Template> for TemplateResponse {
    fn from(t: Template) -> Self {
        Self {
            template_id: t.template_id,
            template_name: t.template_name,
            body: t.body,
            status: t.status_code,
            version: t.version_num,
            created_utc: t.created_utc,
            updated_utc: t.updated_utc,
        }
    }
}

//! Organization model - the tenant and unit of data isolation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A tenant. Every scoped entity carries this row's id.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Organization {
    pub organization_id: Uuid,
    pub org_slug: String,
    pub org_name: String,
    pub logo_url: Option<String>,
    pub brand_color: Option<String>,
    pub created_utc: DateTime<Utc>,
}

impl Organization {
    pub fn new(org_slug: String, org_name: String) -> Self {
        Self {
            organization_id: Uuid::new_v4(),
            org_slug,
            org_name,
            logo_url: None,
            brand_color: None,
            created_utc: Utc::now(),
        }
    }
}

/// An organization joined with the caller's membership row, as returned by
/// the organization resolver. Ordered by membership creation time.
#[derive(Debug, Clone, FromRow)]
pub struct OrganizationWithRole {
    pub organization_id: Uuid,
    pub org_slug: String,
    pub org_name: String,
    pub logo_url: Option<String>,
    pub brand_color: Option<String>,
    pub role_code: String,
    pub status_code: String,
    pub membership_created_utc: DateTime<Utc>,
}

/// Organization listing entry for API responses.
#[derive(Debug, Serialize)]
pub struct OrganizationSummary {
    pub organization_id: Uuid,
    pub org_slug: String,
    pub org_name: String,
    pub logo_url: Option<String>,
    pub brand_color: Option<String>,
    pub role: String,
    pub status: String,
}

impl From<OrganizationWithRole> for OrganizationSummary {
    fn from(o: OrganizationWithRole) -> Self {
        Self {
            organization_id: o.organization_id,
            org_slug: o.org_slug,
            org_name: o.org_name,
            logo_url: o.logo_url,
            brand_color: o.brand_color,
            role: o.role_code,
            status: o.status_code,
        }
    }
}

//! Membership model - the join record granting a user a role within an
//! organization, with a lifecycle status. Never hard-deleted.

use anyhow::anyhow;
use chrono::{DateTime, Utc};
use crm_core::error::AppError;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// Closed role enumeration. Privilege order is owner > admin > member, but
/// authorization checks never widen implicitly - callers enumerate every
/// role they accept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Owner,
    Admin,
    Member,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Owner => "owner",
            Role::Admin => "admin",
            Role::Member => "member",
        }
    }

    /// Parse a stored role code. Returns None for unknown strings; the
    /// data-access boundary turns that into a CorruptRecord error.
    pub fn from_code(code: &str) -> Option<Role> {
        match code {
            "owner" => Some(Role::Owner),
            "admin" => Some(Role::Admin),
            "member" => Some(Role::Member),
            _ => None,
        }
    }
}

/// Membership lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MembershipStatus {
    Active,
    Invited,
    Disabled,
}

impl MembershipStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MembershipStatus::Active => "active",
            MembershipStatus::Invited => "invited",
            MembershipStatus::Disabled => "disabled",
        }
    }

    pub fn from_code(code: &str) -> Option<MembershipStatus> {
        match code {
            "active" => Some(MembershipStatus::Active),
            "invited" => Some(MembershipStatus::Invited),
            "disabled" => Some(MembershipStatus::Disabled),
            _ => None,
        }
    }
}

/// Membership entity. `user_id` is null while an invitation is pending.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Membership {
    pub membership_id: Uuid,
    pub organization_id: Uuid,
    pub user_id: Option<Uuid>,
    pub role_code: String,
    pub status_code: String,
    pub invited_email: Option<String>,
    pub created_utc: DateTime<Utc>,
}

impl Membership {
    /// Create an active membership for an existing user.
    pub fn new(organization_id: Uuid, user_id: Uuid, role: Role) -> Self {
        Self {
            membership_id: Uuid::new_v4(),
            organization_id,
            user_id: Some(user_id),
            role_code: role.as_str().to_string(),
            status_code: MembershipStatus::Active.as_str().to_string(),
            invited_email: None,
            created_utc: Utc::now(),
        }
    }

    /// Create a pending invitation addressed by email.
    pub fn invite(organization_id: Uuid, email: String, role: Role) -> Self {
        Self {
            membership_id: Uuid::new_v4(),
            organization_id,
            user_id: None,
            role_code: role.as_str().to_string(),
            status_code: MembershipStatus::Invited.as_str().to_string(),
            invited_email: Some(email),
            created_utc: Utc::now(),
        }
    }

    /// Typed role accessor; rejects unknown stored codes.
    pub fn role(&self) -> Result<Role, AppError> {
        Role::from_code(&self.role_code).ok_or_else(|| {
            AppError::CorruptRecord(anyhow!(
                "membership {} has unknown role code {:?}",
                self.membership_id,
                self.role_code
            ))
        })
    }

    /// Typed status accessor; rejects unknown stored codes.
    pub fn status(&self) -> Result<MembershipStatus, AppError> {
        MembershipStatus::from_code(&self.status_code).ok_or_else(|| {
            AppError::CorruptRecord(anyhow!(
                "membership {} has unknown status code {:?}",
                self.membership_id,
                self.status_code
            ))
        })
    }
}

/// Membership joined with the member's profile for listings.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct MemberRecord {
    pub membership_id: Uuid,
    pub role_code: String,
    pub status_code: String,
    pub invited_email: Option<String>,
    pub display_name: Option<String>,
    pub email: Option<String>,
    pub created_utc: DateTime<Utc>,
}

/// Request to invite a member.
#[derive(Debug, Deserialize, Validate)]
pub struct InviteMemberRequest {
    #[validate(email)]
    pub email: String,
    pub role: Role,
}

/// Request to change a member's role.
#[derive(Debug, Deserialize)]
pub struct UpdateMemberRoleRequest {
    pub role: Role,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_codes_round_trip() {
        for role in [Role::Owner, Role::Admin, Role::Member] {
            assert_eq!(Role::from_code(role.as_str()), Some(role));
        }
    }

    #[test]
    fn unknown_role_code_is_rejected() {
        assert_eq!(Role::from_code("superadmin"), None);
        assert_eq!(Role::from_code(""), None);
        assert_eq!(Role::from_code("Owner"), None);
    }

    #[test]
    fn unknown_stored_role_is_a_corrupt_record() {
        let mut membership = Membership::new(Uuid::new_v4(), Uuid::new_v4(), Role::Member);
        membership.role_code = "root".to_string();
        assert!(matches!(
            membership.role(),
            Err(AppError::CorruptRecord(_))
        ));
    }

    #[test]
    fn status_codes_round_trip() {
        for status in [
            MembershipStatus::Active,
            MembershipStatus::Invited,
            MembershipStatus::Disabled,
        ] {
            assert_eq!(MembershipStatus::from_code(status.as_str()), Some(status));
        }
        assert_eq!(MembershipStatus::from_code("banned"), None);
    }

    #[test]
    fn invitation_has_no_user_until_accepted() {
        let membership =
            Membership::invite(Uuid::new_v4(), "new@example.com".to_string(), Role::Member);
        assert!(membership.user_id.is_none());
        assert_eq!(membership.status().unwrap(), MembershipStatus::Invited);
    }
}

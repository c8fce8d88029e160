//! Role policy - the central allow/deny decision.
//!
//! The hierarchy is owner > admin > member by privilege, but checks are
//! exact set membership: callers enumerate every role they accept, and a
//! higher tier never implicitly satisfies a lower-tier requirement.

use crm_core::error::AppError;

use crate::models::Role;

/// True iff a role is present and listed in the required set.
pub fn has_role(role: Option<Role>, required: &[Role]) -> bool {
    match role {
        Some(role) => required.contains(&role),
        None => false,
    }
}

/// Same check as [`has_role`], signalling the failure kind: no role at all
/// is `Unauthenticated`, a role outside the required set is `Forbidden`
/// carrying the required set for diagnostics.
pub fn assert_role(role: Option<Role>, required: &[Role]) -> Result<(), AppError> {
    match role {
        None => Err(AppError::Unauthenticated(anyhow::anyhow!(
            "no role in request context"
        ))),
        Some(role) if required.contains(&role) => Ok(()),
        Some(_) => Err(AppError::Forbidden {
            required: required.iter().map(|r| r.as_str().to_string()).collect(),
        }),
    }
}

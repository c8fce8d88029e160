//! Organization resolver - determines the active organization for a request.
//!
//! A user may belong to several organizations; the listing query lives in
//! the database service, the selection policy here is pure so it can be
//! tested without a database.

use uuid::Uuid;

use crate::models::OrganizationWithRole;

/// Pick the active organization from a user's memberships, ordered by
/// membership creation time.
///
/// Resolution policy:
/// (a) an explicit selection, if it matches one of the memberships;
/// (b) the single membership, if there is exactly one;
/// (c) the first membership by creation time as a deterministic fallback.
///
/// An explicit selection that matches no membership falls through to the
/// chain - client input never widens access. Returns None for a user with
/// zero memberships.
pub fn select_active(
    organizations: &[OrganizationWithRole],
    explicit: Option<Uuid>,
) -> Option<&OrganizationWithRole> {
    if let Some(selected) = explicit {
        if let Some(org) = organizations
            .iter()
            .find(|o| o.organization_id == selected)
        {
            return Some(org);
        }
    }
    organizations.first()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn org(n: u8) -> OrganizationWithRole {
        OrganizationWithRole {
            organization_id: Uuid::from_u128(n as u128),
            org_slug: format!("org-{n}"),
            org_name: format!("Org {n}"),
            logo_url: None,
            brand_color: None,
            role_code: "member".to_string(),
            status_code: "active".to_string(),
            membership_created_utc: Utc::now() + Duration::seconds(n as i64),
        }
    }

    #[test]
    fn zero_memberships_resolves_to_none() {
        assert!(select_active(&[], None).is_none());
        assert!(select_active(&[], Some(Uuid::from_u128(1))).is_none());
    }

    #[test]
    fn single_membership_wins_without_selection() {
        let orgs = vec![org(1)];
        let active = select_active(&orgs, None).unwrap();
        assert_eq!(active.organization_id, Uuid::from_u128(1));
    }

    #[test]
    fn explicit_selection_wins_when_member() {
        let orgs = vec![org(1), org(2), org(3)];
        let active = select_active(&orgs, Some(Uuid::from_u128(2))).unwrap();
        assert_eq!(active.organization_id, Uuid::from_u128(2));
    }

    #[test]
    fn foreign_selection_falls_back_to_first() {
        let orgs = vec![org(1), org(2)];
        let active = select_active(&orgs, Some(Uuid::from_u128(9))).unwrap();
        assert_eq!(active.organization_id, Uuid::from_u128(1));
    }

    #[test]
    fn first_by_creation_time_is_the_fallback() {
        let orgs = vec![org(1), org(2), org(3)];
        let active = select_active(&orgs, None).unwrap();
        assert_eq!(active.organization_id, Uuid::from_u128(1));
    }
}

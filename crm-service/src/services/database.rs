//! PostgreSQL data-access layer.
//!
//! Every read and write on a tenant-scoped table is parameterized by the
//! organization id from the access guard's resolved context - never by
//! client-supplied input. Reads of a foreign organization's entity id come
//! back as None; writes that would associate entities across organization
//! boundaries fail with CrossTenantReference before any row changes.

use anyhow::anyhow;
use crm_core::error::AppError;
use sqlx::postgres::PgPool;
use uuid::Uuid;

use crate::models::{
    ActivityLog, Client, ClientStatus, DocumentStatus, MemberRecord, Membership,
    MembershipStatus, Offer, Organization, OrganizationWithRole, Page, Profile, Role, Template,
    UpdateClientRequest, UpdateOfferRequest, UpdateTemplateRequest, User,
};

/// PostgreSQL database wrapper.
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

/// The rows produced by one registration unit, all inserted atomically.
#[derive(Debug, Clone)]
pub struct RegistrationRecord {
    pub user: User,
    pub profile: Profile,
    pub organization: Organization,
    pub membership: Membership,
}

impl Database {
    /// Create a new database wrapper from a connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Health check - ping the database.
    pub async fn health_check(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Database health check failed: {}", e);
                AppError::DatabaseError(anyhow!("Database health check failed: {}", e))
            })?;
        Ok(())
    }

    // ==================== User / Profile Operations ====================

    /// Find the local mirror of an identity-provider principal.
    pub async fn find_user_by_external_id(
        &self,
        external_id: &str,
    ) -> Result<Option<User>, AppError> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE external_id = $1")
            .bind(external_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow!(e)))
    }

    /// Find a user by email.
    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE LOWER(email) = LOWER($1)")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow!(e)))
    }

    /// Find the profile for a user.
    pub async fn find_profile_by_user(&self, user_id: Uuid) -> Result<Option<Profile>, AppError> {
        sqlx::query_as::<_, Profile>("SELECT * FROM profiles WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow!(e)))
    }

    // ==================== Organization Operations ====================

    /// Find organization by ID.
    pub async fn find_organization_by_id(
        &self,
        organization_id: Uuid,
    ) -> Result<Option<Organization>, AppError> {
        sqlx::query_as::<_, Organization>(
            "SELECT * FROM organizations WHERE organization_id = $1",
        )
        .bind(organization_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow!(e)))
    }

    /// Find organization by slug.
    pub async fn find_organization_by_slug(
        &self,
        slug: &str,
    ) -> Result<Option<Organization>, AppError> {
        sqlx::query_as::<_, Organization>("SELECT * FROM organizations WHERE org_slug = $1")
            .bind(slug)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow!(e)))
    }

    /// All of a user's organizations paired with the membership role and
    /// status, ordered by membership creation time. Memberships of every
    /// status are included; the guard decides what an inactive one means.
    /// Empty vec for a user with zero memberships.
    pub async fn organizations_for_user(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<OrganizationWithRole>, AppError> {
        sqlx::query_as::<_, OrganizationWithRole>(
            r#"
            SELECT o.organization_id, o.org_slug, o.org_name, o.logo_url, o.brand_color,
                   m.role_code, m.status_code, m.created_utc AS membership_created_utc
            FROM memberships m
            JOIN organizations o ON o.organization_id = m.organization_id
            WHERE m.user_id = $1
            ORDER BY m.created_utc
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow!(e)))
    }

    // ==================== Membership Operations ====================

    /// Find the membership row for (organization, user).
    pub async fn find_membership(
        &self,
        organization_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Membership>, AppError> {
        sqlx::query_as::<_, Membership>(
            "SELECT * FROM memberships WHERE organization_id = $1 AND user_id = $2",
        )
        .bind(organization_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow!(e)))
    }

    /// Find a membership by id within an organization.
    pub async fn find_membership_by_id(
        &self,
        organization_id: Uuid,
        membership_id: Uuid,
    ) -> Result<Option<Membership>, AppError> {
        sqlx::query_as::<_, Membership>(
            "SELECT * FROM memberships WHERE organization_id = $1 AND membership_id = $2",
        )
        .bind(organization_id)
        .bind(membership_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow!(e)))
    }

    /// List members with their profiles, invited entries included.
    pub async fn list_members(
        &self,
        organization_id: Uuid,
        page: Page,
    ) -> Result<Vec<MemberRecord>, AppError> {
        sqlx::query_as::<_, MemberRecord>(
            r#"
            SELECT m.membership_id, m.role_code, m.status_code, m.invited_email,
                   p.display_name, p.email, m.created_utc
            FROM memberships m
            LEFT JOIN profiles p ON p.user_id = m.user_id
            WHERE m.organization_id = $1
            ORDER BY m.created_utc
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(organization_id)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow!(e)))
    }

    /// Insert a membership row (invitation or direct grant).
    pub async fn insert_membership(&self, membership: &Membership) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO memberships (membership_id, organization_id, user_id, role_code, status_code, invited_email, created_utc)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(membership.membership_id)
        .bind(membership.organization_id)
        .bind(membership.user_id)
        .bind(&membership.role_code)
        .bind(&membership.status_code)
        .bind(&membership.invited_email)
        .bind(membership.created_utc)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow!(e)))?;
        Ok(())
    }

    /// Change a member's role.
    pub async fn update_membership_role(
        &self,
        organization_id: Uuid,
        membership_id: Uuid,
        role: Role,
    ) -> Result<Option<Membership>, AppError> {
        sqlx::query_as::<_, Membership>(
            r#"
            UPDATE memberships SET role_code = $3
            WHERE organization_id = $1 AND membership_id = $2
            RETURNING *
            "#,
        )
        .bind(organization_id)
        .bind(membership_id)
        .bind(role.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow!(e)))
    }

    /// Disable a membership (soft status transition, never a delete).
    /// Applies to active memberships and pending invitations alike.
    pub async fn disable_membership(
        &self,
        organization_id: Uuid,
        membership_id: Uuid,
    ) -> Result<Option<Membership>, AppError> {
        sqlx::query_as::<_, Membership>(
            r#"
            UPDATE memberships SET status_code = $3
            WHERE organization_id = $1 AND membership_id = $2
              AND status_code IN ('active', 'invited')
            RETURNING *
            "#,
        )
        .bind(organization_id)
        .bind(membership_id)
        .bind(MembershipStatus::Disabled.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow!(e)))
    }

    /// Accept a pending invitation addressed to `email`, binding it to the
    /// accepting principal. Mirrors the user and profile locally when this
    /// is their first appearance, all within one transaction.
    pub async fn accept_invitation(
        &self,
        organization_id: Uuid,
        external_id: &str,
        email: &str,
        full_name: &str,
    ) -> Result<Membership, AppError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::DatabaseError(anyhow!(e)))?;

        let existing =
            sqlx::query_as::<_, User>("SELECT * FROM users WHERE external_id = $1")
                .bind(external_id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(|e| AppError::DatabaseError(anyhow!(e)))?;

        let user = match existing {
            Some(user) => user,
            None => {
                let user = User::new(
                    external_id.to_string(),
                    email.to_string(),
                    full_name.to_string(),
                );
                insert_user_tx(&mut tx, &user).await?;
                let profile =
                    Profile::new(user.user_id, full_name.to_string(), email.to_string());
                insert_profile_tx(&mut tx, &profile).await?;
                user
            }
        };

        let membership = sqlx::query_as::<_, Membership>(
            r#"
            UPDATE memberships SET user_id = $3, status_code = $4, invited_email = NULL
            WHERE organization_id = $1 AND LOWER(invited_email) = LOWER($2)
              AND status_code = 'invited'
            RETURNING *
            "#,
        )
        .bind(organization_id)
        .bind(email)
        .bind(user.user_id)
        .bind(MembershipStatus::Active.as_str())
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow!(e)))?
        .ok_or_else(|| AppError::NotFound(anyhow!("No pending invitation for {}", email)))?;

        tx.commit()
            .await
            .map_err(|e| AppError::DatabaseError(anyhow!(e)))?;
        Ok(membership)
    }

    // ==================== Registration ====================

    /// Provision a new tenant: mirror the user, create the profile, the
    /// default organization, and the owner membership as one atomic unit.
    /// If any statement fails the transaction rolls back and no partial
    /// tenant is ever observable.
    pub async fn register_user(
        &self,
        user: User,
        organization: Organization,
    ) -> Result<RegistrationRecord, AppError> {
        let profile = Profile::new(user.user_id, user.full_name.clone(), user.email.clone());
        let membership = Membership::new(organization.organization_id, user.user_id, Role::Owner);

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::DatabaseError(anyhow!(e)))?;

        insert_user_tx(&mut tx, &user).await?;
        insert_profile_tx(&mut tx, &profile).await?;

        sqlx::query(
            r#"
            INSERT INTO organizations (organization_id, org_slug, org_name, logo_url, brand_color, created_utc)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(organization.organization_id)
        .bind(&organization.org_slug)
        .bind(&organization.org_name)
        .bind(&organization.logo_url)
        .bind(&organization.brand_color)
        .bind(organization.created_utc)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow!(e)))?;

        sqlx::query(
            r#"
            INSERT INTO memberships (membership_id, organization_id, user_id, role_code, status_code, invited_email, created_utc)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(membership.membership_id)
        .bind(membership.organization_id)
        .bind(membership.user_id)
        .bind(&membership.role_code)
        .bind(&membership.status_code)
        .bind(&membership.invited_email)
        .bind(membership.created_utc)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow!(e)))?;

        tx.commit()
            .await
            .map_err(|e| AppError::DatabaseError(anyhow!(e)))?;

        Ok(RegistrationRecord {
            user,
            profile,
            organization,
            membership,
        })
    }

    // ==================== Client Operations ====================

    /// List clients for an organization, newest pages last.
    pub async fn list_clients(
        &self,
        organization_id: Uuid,
        page: Page,
    ) -> Result<Vec<Client>, AppError> {
        sqlx::query_as::<_, Client>(
            r#"
            SELECT * FROM clients WHERE organization_id = $1
            ORDER BY created_utc
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(organization_id)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow!(e)))
    }

    /// Find a client within an organization. A foreign organization's
    /// client id resolves to None.
    pub async fn find_client(
        &self,
        organization_id: Uuid,
        client_id: Uuid,
    ) -> Result<Option<Client>, AppError> {
        sqlx::query_as::<_, Client>(
            "SELECT * FROM clients WHERE organization_id = $1 AND client_id = $2",
        )
        .bind(organization_id)
        .bind(client_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow!(e)))
    }

    /// Insert a new client.
    pub async fn insert_client(&self, client: &Client) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO clients (client_id, organization_id, client_name, contact_email, contact_phone, status_code, created_utc, updated_utc)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(client.client_id)
        .bind(client.organization_id)
        .bind(&client.client_name)
        .bind(&client.contact_email)
        .bind(&client.contact_phone)
        .bind(&client.status_code)
        .bind(client.created_utc)
        .bind(client.updated_utc)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow!(e)))?;
        Ok(())
    }

    /// Partial update of a client's fields. Status is not reachable from
    /// this path.
    pub async fn update_client(
        &self,
        organization_id: Uuid,
        client_id: Uuid,
        changes: &UpdateClientRequest,
    ) -> Result<Option<Client>, AppError> {
        sqlx::query_as::<_, Client>(
            r#"
            UPDATE clients SET
                client_name = COALESCE($3, client_name),
                contact_email = COALESCE($4, contact_email),
                contact_phone = COALESCE($5, contact_phone),
                updated_utc = now()
            WHERE organization_id = $1 AND client_id = $2
            RETURNING *
            "#,
        )
        .bind(organization_id)
        .bind(client_id)
        .bind(&changes.client_name)
        .bind(&changes.contact_email)
        .bind(&changes.contact_phone)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow!(e)))
    }

    /// Explicit client status transition, validated against the allowed
    /// table and guarded in SQL against concurrent changes.
    pub async fn transition_client_status(
        &self,
        organization_id: Uuid,
        client_id: Uuid,
        to: ClientStatus,
    ) -> Result<Client, AppError> {
        let client = self
            .find_client(organization_id, client_id)
            .await?
            .ok_or_else(|| AppError::NotFound(anyhow!("Client not found")))?;
        let current = client.status()?;
        if !current.can_transition(to) {
            return Err(AppError::Conflict(anyhow!(
                "Cannot transition client from {} to {}",
                current.as_str(),
                to.as_str()
            )));
        }

        sqlx::query_as::<_, Client>(
            r#"
            UPDATE clients SET status_code = $3, updated_utc = now()
            WHERE organization_id = $1 AND client_id = $2 AND status_code = $4
            RETURNING *
            "#,
        )
        .bind(organization_id)
        .bind(client_id)
        .bind(to.as_str())
        .bind(current.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow!(e)))?
        .ok_or_else(|| AppError::Conflict(anyhow!("Client status changed concurrently")))
    }

    // ==================== Offer Operations ====================

    /// List offers for an organization.
    pub async fn list_offers(
        &self,
        organization_id: Uuid,
        page: Page,
    ) -> Result<Vec<Offer>, AppError> {
        sqlx::query_as::<_, Offer>(
            r#"
            SELECT * FROM offers WHERE organization_id = $1
            ORDER BY created_utc
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(organization_id)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow!(e)))
    }

    /// Find an offer within an organization.
    pub async fn find_offer(
        &self,
        organization_id: Uuid,
        offer_id: Uuid,
    ) -> Result<Option<Offer>, AppError> {
        sqlx::query_as::<_, Offer>(
            "SELECT * FROM offers WHERE organization_id = $1 AND offer_id = $2",
        )
        .bind(organization_id)
        .bind(offer_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow!(e)))
    }

    /// Insert a new offer, verifying the referenced client belongs to the
    /// same organization.
    pub async fn insert_offer(&self, offer: &Offer) -> Result<(), AppError> {
        if let Some(client_id) = offer.client_id {
            self.assert_client_in_org(offer.organization_id, client_id)
                .await?;
        }

        sqlx::query(
            r#"
            INSERT INTO offers (offer_id, organization_id, client_id, title, amount_cents, status_code, version_num, created_utc, updated_utc)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(offer.offer_id)
        .bind(offer.organization_id)
        .bind(offer.client_id)
        .bind(&offer.title)
        .bind(offer.amount_cents)
        .bind(&offer.status_code)
        .bind(offer.version_num)
        .bind(offer.created_utc)
        .bind(offer.updated_utc)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow!(e)))?;
        Ok(())
    }

    /// Partial update of an offer. Bumps the version; status is not
    /// reachable from this path. A new client reference is verified to be
    /// in the same organization first.
    pub async fn update_offer(
        &self,
        organization_id: Uuid,
        offer_id: Uuid,
        changes: &UpdateOfferRequest,
    ) -> Result<Option<Offer>, AppError> {
        if let Some(client_id) = changes.client_id {
            self.assert_client_in_org(organization_id, client_id).await?;
        }

        sqlx::query_as::<_, Offer>(
            r#"
            UPDATE offers SET
                title = COALESCE($3, title),
                client_id = COALESCE($4, client_id),
                amount_cents = COALESCE($5, amount_cents),
                version_num = version_num + 1,
                updated_utc = now()
            WHERE organization_id = $1 AND offer_id = $2
            RETURNING *
            "#,
        )
        .bind(organization_id)
        .bind(offer_id)
        .bind(&changes.title)
        .bind(changes.client_id)
        .bind(changes.amount_cents)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow!(e)))
    }

    /// Explicit offer status transition (publish, unpublish, archive),
    /// validated against the allowed table.
    pub async fn transition_offer_status(
        &self,
        organization_id: Uuid,
        offer_id: Uuid,
        to: DocumentStatus,
    ) -> Result<Offer, AppError> {
        let offer = self
            .find_offer(organization_id, offer_id)
            .await?
            .ok_or_else(|| AppError::NotFound(anyhow!("Offer not found")))?;
        let current = offer.status()?;
        if !current.can_transition(to) {
            return Err(AppError::Conflict(anyhow!(
                "Cannot transition offer from {} to {}",
                current.as_str(),
                to.as_str()
            )));
        }

        sqlx::query_as::<_, Offer>(
            r#"
            UPDATE offers SET status_code = $3, updated_utc = now()
            WHERE organization_id = $1 AND offer_id = $2 AND status_code = $4
            RETURNING *
            "#,
        )
        .bind(organization_id)
        .bind(offer_id)
        .bind(to.as_str())
        .bind(current.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow!(e)))?
        .ok_or_else(|| AppError::Conflict(anyhow!("Offer status changed concurrently")))
    }

    /// Verify a client reference stays inside the organization boundary.
    async fn assert_client_in_org(
        &self,
        organization_id: Uuid,
        client_id: Uuid,
    ) -> Result<(), AppError> {
        let found = self.find_client(organization_id, client_id).await?;
        if found.is_none() {
            return Err(AppError::CrossTenantReference(anyhow!(
                "Client {} does not belong to the active organization",
                client_id
            )));
        }
        Ok(())
    }

    // ==================== Template Operations ====================

    /// List templates for an organization.
    pub async fn list_templates(
        &self,
        organization_id: Uuid,
        page: Page,
    ) -> Result<Vec<Template>, AppError> {
        sqlx::query_as::<_, Template>(
            r#"
            SELECT * FROM templates WHERE organization_id = $1
            ORDER BY created_utc
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(organization_id)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow!(e)))
    }

    /// Find a template within an organization.
    pub async fn find_template(
        &self,
        organization_id: Uuid,
        template_id: Uuid,
    ) -> Result<Option<Template>, AppError> {
        sqlx::query_as::<_, Template>(
            "SELECT * FROM templates WHERE organization_id = $1 AND template_id = $2",
        )
        .bind(organization_id)
        .bind(template_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow!(e)))
    }

    /// Insert a new template.
    pub async fn insert_template(&self, template: &Template) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO templates (template_id, organization_id, template_name, body, status_code, version_num, created_utc, updated_utc)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(template.template_id)
        .bind(template.organization_id)
        .bind(&template.template_name)
        .bind(&template.body)
        .bind(&template.status_code)
        .bind(template.version_num)
        .bind(template.created_utc)
        .bind(template.updated_utc)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow!(e)))?;
        Ok(())
    }

    /// Partial update of a template. Bumps the version; status is not
    /// reachable from this path.
    pub async fn update_template(
        &self,
        organization_id: Uuid,
        template_id: Uuid,
        changes: &UpdateTemplateRequest,
    ) -> Result<Option<Template>, AppError> {
        sqlx::query_as::<_, Template>(
            r#"
            UPDATE templates SET
                template_name = COALESCE($3, template_name),
                body = COALESCE($4, body),
                version_num = version_num + 1,
                updated_utc = now()
            WHERE organization_id = $1 AND template_id = $2
            RETURNING *
            "#,
        )
        .bind(organization_id)
        .bind(template_id)
        .bind(&changes.template_name)
        .bind(&changes.body)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow!(e)))
    }

    /// Explicit template status transition.
    pub async fn transition_template_status(
        &self,
        organization_id: Uuid,
        template_id: Uuid,
        to: DocumentStatus,
    ) -> Result<Template, AppError> {
        let template = self
            .find_template(organization_id, template_id)
            .await?
            .ok_or_else(|| AppError::NotFound(anyhow!("Template not found")))?;
        let current = template.status()?;
        if !current.can_transition(to) {
            return Err(AppError::Conflict(anyhow!(
                "Cannot transition template from {} to {}",
                current.as_str(),
                to.as_str()
            )));
        }

        sqlx::query_as::<_, Template>(
            r#"
            UPDATE templates SET status_code = $3, updated_utc = now()
            WHERE organization_id = $1 AND template_id = $2 AND status_code = $4
            RETURNING *
            "#,
        )
        .bind(organization_id)
        .bind(template_id)
        .bind(to.as_str())
        .bind(current.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow!(e)))?
        .ok_or_else(|| AppError::Conflict(anyhow!("Template status changed concurrently")))
    }

    // ==================== Activity Operations ====================

    /// Append an activity record. There is no update or delete counterpart.
    pub async fn insert_activity(&self, entry: &ActivityLog) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO activity_log (activity_id, organization_id, actor_profile_id, action, entity_type, entity_id, metadata, created_utc)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(entry.activity_id)
        .bind(entry.organization_id)
        .bind(entry.actor_profile_id)
        .bind(&entry.action)
        .bind(&entry.entity_type)
        .bind(entry.entity_id)
        .bind(&entry.metadata)
        .bind(entry.created_utc)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow!(e)))?;
        Ok(())
    }

    /// List activity for an organization, most recent first.
    pub async fn list_activity(
        &self,
        organization_id: Uuid,
        page: Page,
    ) -> Result<Vec<ActivityLog>, AppError> {
        sqlx::query_as::<_, ActivityLog>(
            r#"
            SELECT * FROM activity_log WHERE organization_id = $1
            ORDER BY created_utc DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(organization_id)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow!(e)))
    }
}

async fn insert_user_tx(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    user: &User,
) -> Result<(), AppError> {
    sqlx::query(
        r#"
        INSERT INTO users (user_id, external_id, email, full_name, created_utc)
        VALUES ($1, $2, $3, $4, $5)
        "#,
    )
    .bind(user.user_id)
    .bind(&user.external_id)
    .bind(&user.email)
    .bind(&user.full_name)
    .bind(user.created_utc)
    .execute(&mut **tx)
    .await
    .map_err(|e| AppError::DatabaseError(anyhow!(e)))?;
    Ok(())
}

async fn insert_profile_tx(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    profile: &Profile,
) -> Result<(), AppError> {
    sqlx::query(
        r#"
        INSERT INTO profiles (profile_id, user_id, display_name, email, avatar_url, created_utc)
        VALUES ($1, $2, $3, $4, $5, $6)
        "#,
    )
    .bind(profile.profile_id)
    .bind(profile.user_id)
    .bind(&profile.display_name)
    .bind(&profile.email)
    .bind(&profile.avatar_url)
    .bind(profile.created_utc)
    .execute(&mut **tx)
    .await
    .map_err(|e| AppError::DatabaseError(anyhow!(e)))?;
    Ok(())
}

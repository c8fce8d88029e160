//! Membership lifecycle integration tests: invite, accept, role change,
//! disable, and the active-organization switch.

mod common;

use common::TestApp;
use serde_json::json;

/// Alice owns an org; Bob is invited, accepts, and is later disabled.
#[tokio::test]
#[ignore] // Requires PostgreSQL
async fn invite_accept_disable_lifecycle() {
    // Arrange
    let app = TestApp::spawn().await.expect("Failed to spawn test app");
    app.seed_identity("token-alice", "ext-alice", "alice@example.com");
    app.seed_identity("token-bob", "ext-bob", "bob@example.com");
    let registered = app.register("token-alice", "Alice Corp", "alice-corp").await;
    let org_id = registered["organization_id"].as_str().unwrap().to_string();
    let client = app.client();

    // Act - invite Bob
    let response = client
        .post(format!("{}/members", app.address))
        .bearer_auth("token-alice")
        .json(&json!({ "email": "bob@example.com", "role": "member" }))
        .send()
        .await
        .expect("Failed to invite");
    assert_eq!(response.status(), 201);
    let invited: serde_json::Value = response.json().await.unwrap();
    let membership_id = invited["membership_id"].as_str().unwrap().to_string();
    assert_eq!(invited["status_code"], "invited");

    // Bob cannot act on the org while the invitation is pending
    let response = client
        .get(format!("{}/clients", app.address))
        .bearer_auth("token-bob")
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), 403);

    // Act - Bob accepts
    let response = client
        .post(format!("{}/members/accept", app.address))
        .bearer_auth("token-bob")
        .json(&json!({ "organization_id": org_id }))
        .send()
        .await
        .expect("Failed to accept");
    assert_eq!(response.status(), 200);
    let accepted: serde_json::Value = response.json().await.unwrap();
    assert_eq!(accepted["status_code"], "active");

    // Bob now reads the org's data
    let response = client
        .get(format!("{}/clients", app.address))
        .bearer_auth("token-bob")
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), 200);

    // Act - disable Bob
    let response = client
        .post(format!(
            "{}/members/{}/disable",
            app.address, membership_id
        ))
        .bearer_auth("token-alice")
        .send()
        .await
        .expect("Failed to disable");
    assert_eq!(response.status(), 200);

    // Assert - Bob's access is gone, and the row still exists (soft delete)
    let response = client
        .get(format!("{}/clients", app.address))
        .bearer_auth("token-bob")
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), 403);

    let (rows,): (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM memberships WHERE status_code = 'disabled'",
    )
    .fetch_one(&app.pool)
    .await
    .unwrap();
    assert_eq!(rows, 1);
}

#[tokio::test]
#[ignore] // Requires PostgreSQL
async fn member_role_cannot_invite() {
    let app = TestApp::spawn().await.expect("Failed to spawn test app");
    app.seed_identity("token-alice", "ext-alice", "alice@example.com");
    app.seed_identity("token-bob", "ext-bob", "bob@example.com");
    let registered = app.register("token-alice", "Alice Corp", "alice-corp").await;
    let org_id = registered["organization_id"].as_str().unwrap().to_string();
    let client = app.client();

    client
        .post(format!("{}/members", app.address))
        .bearer_auth("token-alice")
        .json(&json!({ "email": "bob@example.com", "role": "member" }))
        .send()
        .await
        .expect("Failed to invite");
    client
        .post(format!("{}/members/accept", app.address))
        .bearer_auth("token-bob")
        .json(&json!({ "organization_id": org_id }))
        .send()
        .await
        .expect("Failed to accept");

    // Act - Bob (member) tries to invite
    let response = client
        .post(format!("{}/members", app.address))
        .bearer_auth("token-bob")
        .json(&json!({ "email": "carol@example.com", "role": "member" }))
        .send()
        .await
        .expect("Failed to execute request");

    // Assert - explicit role sets: member is not owner-or-admin
    assert_eq!(response.status(), 403);
}

/// Bob belongs to two organizations and switches the active one.
#[tokio::test]
#[ignore] // Requires PostgreSQL
async fn active_organization_switch_changes_scope() {
    let app = TestApp::spawn().await.expect("Failed to spawn test app");
    app.seed_identity("token-alice", "ext-alice", "alice@example.com");
    app.seed_identity("token-bob", "ext-bob", "bob@example.com");
    let alice_org = app.register("token-alice", "Alice Corp", "alice-corp").await;
    let alice_org_id = alice_org["organization_id"].as_str().unwrap().to_string();
    app.register("token-bob", "Bob Corp", "bob-corp").await;
    let client = app.client();

    // A client in Alice's org
    client
        .post(format!("{}/clients", app.address))
        .bearer_auth("token-alice")
        .json(&json!({ "client_name": "Acme Ltd" }))
        .send()
        .await
        .expect("Failed to create client");

    // Bob joins Alice's org too
    client
        .post(format!("{}/members", app.address))
        .bearer_auth("token-alice")
        .json(&json!({ "email": "bob@example.com", "role": "member" }))
        .send()
        .await
        .expect("Failed to invite");
    client
        .post(format!("{}/members/accept", app.address))
        .bearer_auth("token-bob")
        .json(&json!({ "organization_id": alice_org_id }))
        .send()
        .await
        .expect("Failed to accept");

    // Bob sees both organizations
    let response = client
        .get(format!("{}/organizations", app.address))
        .bearer_auth("token-bob")
        .send()
        .await
        .expect("Failed to list organizations");
    let orgs: Vec<serde_json::Value> = response.json().await.unwrap();
    assert_eq!(orgs.len(), 2);

    // Default active org is Bob's own (first membership by creation time)
    let response = client
        .get(format!("{}/clients", app.address))
        .bearer_auth("token-bob")
        .send()
        .await
        .expect("Failed to list clients");
    let clients: Vec<serde_json::Value> = response.json().await.unwrap();
    assert!(clients.is_empty());

    // Act - switch to Alice's org via the persisted selection
    let response = client
        .post(format!(
            "{}/organizations/{}/activate",
            app.address, alice_org_id
        ))
        .bearer_auth("token-bob")
        .send()
        .await
        .expect("Failed to activate");
    assert_eq!(response.status(), 200);

    let response = client
        .get(format!("{}/clients", app.address))
        .bearer_auth("token-bob")
        .header("cookie", format!("active_org={}", alice_org_id))
        .send()
        .await
        .expect("Failed to list clients");
    let clients: Vec<serde_json::Value> = response.json().await.unwrap();
    assert_eq!(clients.len(), 1, "the active organization scopes the listing");

    // A selection outside Bob's memberships falls back, never widens
    let response = client
        .get(format!("{}/clients", app.address))
        .bearer_auth("token-bob")
        .header(
            "cookie",
            format!("active_org={}", uuid::Uuid::new_v4()),
        )
        .send()
        .await
        .expect("Failed to list clients");
    let clients: Vec<serde_json::Value> = response.json().await.unwrap();
    assert!(clients.is_empty(), "unknown selection falls back to the first membership");
}

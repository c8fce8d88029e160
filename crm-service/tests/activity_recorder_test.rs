//! Activity recorder integration tests: audit trail contents and the
//! fire-and-forget guarantee.

mod common;

use common::TestApp;
use serde_json::json;

#[tokio::test]
#[ignore] // Requires PostgreSQL
async fn mutations_append_attributed_activity() {
    // Arrange
    let app = TestApp::spawn().await.expect("Failed to spawn test app");
    app.seed_identity("token-alice", "ext-alice", "alice@example.com");
    app.register("token-alice", "Alice Corp", "alice-corp").await;
    let client = app.client();

    // Act - one mutation
    let response = client
        .post(format!("{}/clients", app.address))
        .bearer_auth("token-alice")
        .json(&json!({ "client_name": "Acme Ltd" }))
        .send()
        .await
        .expect("Failed to create client");
    assert_eq!(response.status(), 201);

    // Assert - a record scoped to the org and attributed to the actor
    let response = client
        .get(format!("{}/activity", app.address))
        .bearer_auth("token-alice")
        .send()
        .await
        .expect("Failed to list activity");
    assert_eq!(response.status(), 200);

    let entries: Vec<serde_json::Value> = response.json().await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["action"], "client.created");
    assert_eq!(entries[0]["entity_type"], "client");
    assert!(entries[0]["actor_profile_id"].as_str().is_some());
}

#[tokio::test]
#[ignore] // Requires PostgreSQL
async fn recorder_failure_does_not_fail_the_mutation() {
    // Arrange
    let app = TestApp::spawn().await.expect("Failed to spawn test app");
    app.seed_identity("token-alice", "ext-alice", "alice@example.com");
    app.register("token-alice", "Alice Corp", "alice-corp").await;

    // Break the activity_log table so every recorder write fails.
    sqlx::query("ALTER TABLE activity_log RENAME TO activity_log_disabled")
        .execute(&app.pool)
        .await
        .expect("Failed to disable activity_log");

    // Act
    let response = app
        .client()
        .post(format!("{}/clients", app.address))
        .bearer_auth("token-alice")
        .json(&json!({ "client_name": "Acme Ltd" }))
        .send()
        .await
        .expect("Failed to create client");

    // Assert - the mutation's success response is unaffected
    assert_eq!(response.status(), 201);

    let (clients,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM clients")
        .fetch_one(&app.pool)
        .await
        .unwrap();
    assert_eq!(clients, 1, "the client row must be committed");

    // Restore for subsequent tests
    sqlx::query("ALTER TABLE activity_log_disabled RENAME TO activity_log")
        .execute(&app.pool)
        .await
        .expect("Failed to restore activity_log");
}

//! Offer status state-machine integration tests.

mod common;

use common::TestApp;
use serde_json::json;

async fn create_offer(app: &TestApp, token: &str) -> String {
    let response = app
        .client()
        .post(format!("{}/offers", app.address))
        .bearer_auth(token)
        .json(&json!({ "title": "Quarterly proposal" }))
        .send()
        .await
        .expect("Failed to create offer");
    assert_eq!(response.status(), 201);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["status"], "draft");
    body["offer_id"].as_str().unwrap().to_string()
}

#[tokio::test]
#[ignore] // Requires PostgreSQL
async fn publish_then_unpublish_round_trips() {
    let app = TestApp::spawn().await.expect("Failed to spawn test app");
    app.seed_identity("token-alice", "ext-alice", "alice@example.com");
    app.register("token-alice", "Alice Corp", "alice-corp").await;
    let offer_id = create_offer(&app, "token-alice").await;
    let client = app.client();

    // Act - publish
    let response = client
        .post(format!("{}/offers/{}/publish", app.address, offer_id))
        .bearer_auth("token-alice")
        .send()
        .await
        .expect("Failed to publish");
    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["status"], "published");

    // Act - explicit unpublish is the only way back to draft
    let response = client
        .post(format!("{}/offers/{}/unpublish", app.address, offer_id))
        .bearer_auth("token-alice")
        .send()
        .await
        .expect("Failed to unpublish");
    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["status"], "draft");
}

#[tokio::test]
#[ignore] // Requires PostgreSQL
async fn generic_update_never_changes_status() {
    let app = TestApp::spawn().await.expect("Failed to spawn test app");
    app.seed_identity("token-alice", "ext-alice", "alice@example.com");
    app.register("token-alice", "Alice Corp", "alice-corp").await;
    let offer_id = create_offer(&app, "token-alice").await;
    let client = app.client();

    client
        .post(format!("{}/offers/{}/publish", app.address, offer_id))
        .bearer_auth("token-alice")
        .send()
        .await
        .expect("Failed to publish");

    // Act - a generic update carrying a status field; the field is unknown
    // to the update contract and must not demote the offer to draft.
    let response = client
        .patch(format!("{}/offers/{}", app.address, offer_id))
        .bearer_auth("token-alice")
        .json(&json!({ "title": "Renamed proposal", "status": "draft" }))
        .send()
        .await
        .expect("Failed to update");
    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["title"], "Renamed proposal");
    assert_eq!(body["status"], "published", "update path must not change status");
    assert_eq!(body["version"], 2, "update bumps the version");
}

#[tokio::test]
#[ignore] // Requires PostgreSQL
async fn double_publish_conflicts() {
    let app = TestApp::spawn().await.expect("Failed to spawn test app");
    app.seed_identity("token-alice", "ext-alice", "alice@example.com");
    app.register("token-alice", "Alice Corp", "alice-corp").await;
    let offer_id = create_offer(&app, "token-alice").await;
    let client = app.client();

    client
        .post(format!("{}/offers/{}/publish", app.address, offer_id))
        .bearer_auth("token-alice")
        .send()
        .await
        .expect("Failed to publish");

    let response = client
        .post(format!("{}/offers/{}/publish", app.address, offer_id))
        .bearer_auth("token-alice")
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), 409);
}

#[tokio::test]
#[ignore] // Requires PostgreSQL
async fn archived_offers_cannot_be_published() {
    let app = TestApp::spawn().await.expect("Failed to spawn test app");
    app.seed_identity("token-alice", "ext-alice", "alice@example.com");
    app.register("token-alice", "Alice Corp", "alice-corp").await;
    let offer_id = create_offer(&app, "token-alice").await;
    let client = app.client();

    let response = client
        .post(format!("{}/offers/{}/archive", app.address, offer_id))
        .bearer_auth("token-alice")
        .send()
        .await
        .expect("Failed to archive");
    assert_eq!(response.status(), 200);

    let response = client
        .post(format!("{}/offers/{}/publish", app.address, offer_id))
        .bearer_auth("token-alice")
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), 409);
}

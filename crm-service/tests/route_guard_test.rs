//! Route guarding integration tests.

mod common;

use common::TestApp;

#[tokio::test]
#[ignore] // Requires PostgreSQL
async fn unauthenticated_protected_path_redirects_to_login() {
    let app = TestApp::spawn().await.expect("Failed to spawn test app");

    let response = app
        .client()
        .get(format!("{}/clients", app.address))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), 307);
    assert_eq!(
        response.headers()["location"],
        "/authentication/login?redirectTo=/clients"
    );
}

#[tokio::test]
#[ignore] // Requires PostgreSQL
async fn nested_protected_path_preserves_the_full_path() {
    let app = TestApp::spawn().await.expect("Failed to spawn test app");

    let response = app
        .client()
        .get(format!("{}/offers/42", app.address))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), 307);
    assert_eq!(
        response.headers()["location"],
        "/authentication/login?redirectTo=/offers/42"
    );
}

#[tokio::test]
#[ignore] // Requires PostgreSQL
async fn authenticated_auth_flow_path_redirects_home() {
    let app = TestApp::spawn().await.expect("Failed to spawn test app");
    app.seed_identity("token-alice", "ext-alice", "alice@example.com");

    let response = app
        .client()
        .get(format!("{}/authentication/login", app.address))
        .bearer_auth("token-alice")
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), 307);
    assert_eq!(response.headers()["location"], "/");
}

#[tokio::test]
#[ignore] // Requires PostgreSQL
async fn health_is_reachable_without_a_session() {
    let app = TestApp::spawn().await.expect("Failed to spawn test app");

    let response = app
        .client()
        .get(format!("{}/health", app.address))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), 200);
}

#[tokio::test]
#[ignore] // Requires PostgreSQL
async fn authenticated_without_organization_is_forbidden() {
    // A valid session that never registered has zero memberships: the
    // route guard lets the request through, the access guard stops it.
    let app = TestApp::spawn().await.expect("Failed to spawn test app");
    app.seed_identity("token-ghost", "ext-ghost", "ghost@example.com");

    let response = app
        .client()
        .get(format!("{}/clients", app.address))
        .bearer_auth("token-ghost")
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), 403);
}

#[tokio::test]
#[ignore] // Requires PostgreSQL
async fn session_cookie_also_authenticates() {
    let app = TestApp::spawn().await.expect("Failed to spawn test app");
    app.seed_identity("token-alice", "ext-alice", "alice@example.com");
    app.register("token-alice", "Alice Corp", "alice-corp").await;

    let response = app
        .client()
        .get(format!("{}/clients", app.address))
        .header("cookie", "session_token=token-alice")
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), 200);
}

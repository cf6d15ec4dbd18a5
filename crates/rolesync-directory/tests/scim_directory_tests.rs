//! SCIM directory tests against a wiremock SCIM server.
//!
//! Tests cover:
//! - user lookup, creation and deletion
//! - membership add/remove only PATCHing when the member list requires it
//! - HTTP error mapping and its classification

mod helpers;

use helpers::mock_scim_server::MockScimServer;
use rolesync_directory::prelude::*;
use rolesync_directory::scim::ScimClient;

// ═══════════════════════════════════════════════════════════════════════════
// Users
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_get_user_found() {
    let server = MockScimServer::new().await;
    server.mock_user("alice", "u-alice").await;

    let user = server.directory().get_user("alice").await.unwrap().unwrap();
    assert_eq!(user.username, "alice");
    assert_eq!(user.id, "u-alice");
}

#[tokio::test]
async fn test_get_user_absent() {
    let server = MockScimServer::new().await;
    server.mock_user_absent("ghost").await;

    assert!(server.directory().get_user("ghost").await.unwrap().is_none());
}

#[tokio::test]
async fn test_create_user_applied() {
    let server = MockScimServer::new().await;
    server.mock_create_user(201, "u-alice", "alice").await;

    let outcome = server.directory().create_user("alice").await.unwrap();
    assert_eq!(outcome, MutationOutcome::Applied);
}

#[tokio::test]
async fn test_create_user_conflict_is_already_satisfied() {
    let server = MockScimServer::new().await;
    server.mock_create_user(409, "", "alice").await;

    let outcome = server.directory().create_user("alice").await.unwrap();
    assert_eq!(outcome, MutationOutcome::AlreadySatisfied);
}

#[tokio::test]
async fn test_delete_user() {
    let server = MockScimServer::new().await;
    server.mock_user("alice", "u-alice").await;
    server.mock_delete_user("u-alice", 204).await;

    let outcome = server.directory().delete_user("alice").await.unwrap();
    assert_eq!(outcome, MutationOutcome::Applied);
}

#[tokio::test]
async fn test_delete_user_racing_404_is_already_satisfied() {
    let server = MockScimServer::new().await;
    server.mock_user("alice", "u-alice").await;
    server.mock_delete_user("u-alice", 404).await;

    let outcome = server.directory().delete_user("alice").await.unwrap();
    assert_eq!(outcome, MutationOutcome::AlreadySatisfied);
}

#[tokio::test]
async fn test_delete_absent_user_sends_no_delete() {
    let server = MockScimServer::new().await;
    server.mock_user_absent("ghost").await;

    let outcome = server.directory().delete_user("ghost").await.unwrap();
    assert_eq!(outcome, MutationOutcome::AlreadySatisfied);
}

// ═══════════════════════════════════════════════════════════════════════════
// Memberships
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_add_member_patches_group() {
    let server = MockScimServer::new().await;
    server.mock_user("alice", "u-alice").await;
    server.mock_group("Developer-Team", "g-dev", &[]).await;
    server.expect_group_patch("g-dev", 1).await;

    let outcome = server
        .directory()
        .add_user_to_group("Developer-Team", "alice")
        .await
        .unwrap();
    assert_eq!(outcome, MutationOutcome::Applied);
}

#[tokio::test]
async fn test_add_existing_member_skips_patch() {
    let server = MockScimServer::new().await;
    server.mock_user("alice", "u-alice").await;
    server
        .mock_group("Developer-Team", "g-dev", &["u-alice"])
        .await;
    server.expect_group_patch("g-dev", 0).await;

    let outcome = server
        .directory()
        .add_user_to_group("Developer-Team", "alice")
        .await
        .unwrap();
    assert_eq!(outcome, MutationOutcome::AlreadySatisfied);
}

#[tokio::test]
async fn test_add_to_missing_group_is_unexpected() {
    let server = MockScimServer::new().await;
    server.mock_user("alice", "u-alice").await;
    server.mock_group_absent("Ghost-Team").await;

    let err = server
        .directory()
        .add_user_to_group("Ghost-Team", "alice")
        .await
        .unwrap_err();
    assert!(matches!(err, DirectoryError::GroupNotFound { .. }));
    assert_eq!(err.classify(DirectoryOp::AddToGroup), ErrorClass::Unexpected);
}

#[tokio::test]
async fn test_add_for_missing_user_is_unexpected() {
    let server = MockScimServer::new().await;
    server.mock_user_absent("ghost").await;

    let err = server
        .directory()
        .add_user_to_group("Developer-Team", "ghost")
        .await
        .unwrap_err();
    assert!(matches!(err, DirectoryError::UserNotFound { .. }));
    assert_eq!(err.classify(DirectoryOp::AddToGroup), ErrorClass::Unexpected);
}

#[tokio::test]
async fn test_remove_member_patches_group() {
    let server = MockScimServer::new().await;
    server.mock_user("bob", "u-bob").await;
    server.mock_group("Read-Only", "g-ro", &["u-bob"]).await;
    server.expect_group_patch("g-ro", 1).await;

    let outcome = server
        .directory()
        .remove_user_from_group("Read-Only", "bob")
        .await
        .unwrap();
    assert_eq!(outcome, MutationOutcome::Applied);
}

#[tokio::test]
async fn test_remove_non_member_skips_patch() {
    let server = MockScimServer::new().await;
    server.mock_user("bob", "u-bob").await;
    server.mock_group("Read-Only", "g-ro", &["u-other"]).await;
    server.expect_group_patch("g-ro", 0).await;

    let outcome = server
        .directory()
        .remove_user_from_group("Read-Only", "bob")
        .await
        .unwrap();
    assert_eq!(outcome, MutationOutcome::AlreadySatisfied);
}

#[tokio::test]
async fn test_remove_for_missing_user_is_already_satisfied() {
    let server = MockScimServer::new().await;
    server.mock_user_absent("ghost").await;

    let outcome = server
        .directory()
        .remove_user_from_group("Read-Only", "ghost")
        .await
        .unwrap();
    assert_eq!(outcome, MutationOutcome::AlreadySatisfied);
}

// ═══════════════════════════════════════════════════════════════════════════
// Error mapping
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_unauthorized_maps_to_unauthorized() {
    let server = MockScimServer::new().await;
    server.mock_users_status(401).await;

    let err = server
        .directory_with_token("wrong")
        .get_user("alice")
        .await
        .unwrap_err();
    assert!(matches!(err, DirectoryError::Unauthorized { .. }));
    assert_eq!(err.classify(DirectoryOp::GetUser), ErrorClass::Unexpected);
}

#[tokio::test]
async fn test_server_error_maps_to_http() {
    let server = MockScimServer::new().await;
    server.mock_users_status(500).await;

    let err = server.directory().get_user("alice").await.unwrap_err();
    match err {
        DirectoryError::Http { status, detail } => {
            assert_eq!(status, 500);
            assert_eq!(detail, "failure");
        }
        other => panic!("Expected Http error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_unreachable_server_is_transport_error() {
    // Nothing listens on port 1.
    let dir = ScimDirectory::with_client(ScimClient::new(
        "http://127.0.0.1:1",
        ScimCredentials::bearer("t"),
        reqwest::Client::new(),
    ));
    let err = dir.get_user("alice").await.unwrap_err();
    assert_eq!(err.error_code(), "TRANSPORT_ERROR");
}

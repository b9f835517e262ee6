//! Integration tests for self-service account operations.

use algohub_core::error::ErrorKind;
use algohub_entity::rights::{AccessLevel, ResourceRef};

use crate::helpers::{TestApp, assert_kind};

#[tokio::test]
async fn test_get_own_account_only() {
    let app = TestApp::new();
    let u1 = app.create_user("u1@example.com").await;
    let u2 = app.create_user("u2@example.com").await;

    let me = app.users.get(&u1, u1.user_id).await.unwrap();
    assert_eq!(me.email, "u1@example.com");
    assert_kind(app.users.get(&u1, u2.user_id).await, ErrorKind::NotFound);
}

#[tokio::test]
async fn test_delete_account_drops_grants() {
    let app = TestApp::new();
    let u1 = app.create_user("u1@example.com").await;
    let u2 = app.create_user("u2@example.com").await;

    let root = app.create_folder(&u1, "Root", None).await;
    app.create_folder(&u2, "Mine", None).await;
    app.grant(u2.user_id, ResourceRef::Folder(root.id), AccessLevel::ReadWrite)
        .await;
    assert_eq!(app.store.rights_count().await, 3);

    app.users.delete_account(&u2).await.unwrap();

    assert_eq!(app.store.rights_count().await, 1);
    assert_eq!(
        app.resolver.resolve_folder_rights(u2.user_id, Some(root.id)).await.unwrap(),
        None
    );
    assert_kind(app.users.get(&u2, u2.user_id).await, ErrorKind::NotFound);
    assert_kind(app.users.delete_account(&u2).await, ErrorKind::NotFound);
}

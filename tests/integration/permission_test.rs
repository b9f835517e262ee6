//! Integration tests for inherited rights and the gates built on them.

use algohub_core::error::ErrorKind;
use algohub_database::store::RightsStore;
use algohub_entity::rights::{AccessLevel, ResourceRef};

use crate::helpers::{TestApp, assert_kind, rename};

#[tokio::test]
async fn test_read_only_on_root_folder_cannot_modify_algorithm() {
    let app = TestApp::new();
    let u1 = app.create_user("u1@example.com").await;
    let u2 = app.create_user("u2@example.com").await;

    let root = app.create_folder(&u1, "Root", None).await;
    let algo = app.create_algorithm(&u1, "Algo1", Some(root.id)).await;

    assert_eq!(
        app.resolver.resolve_folder_rights(u1.user_id, Some(root.id)).await.unwrap(),
        Some(AccessLevel::Owner)
    );
    assert_eq!(
        app.resolver.resolve_algo_rights(u1.user_id, algo.id).await.unwrap(),
        Some(AccessLevel::Owner)
    );

    assert_kind(
        app.algorithms.update(&u2, algo.id, rename("Stolen")).await,
        ErrorKind::Forbidden,
    );

    app.grant(u2.user_id, ResourceRef::Folder(root.id), AccessLevel::ReadOnly)
        .await;
    assert_eq!(
        app.resolver.resolve_algo_rights(u2.user_id, algo.id).await.unwrap(),
        Some(AccessLevel::ReadOnly)
    );
    assert_kind(
        app.algorithms.update(&u2, algo.id, rename("Stolen")).await,
        ErrorKind::Forbidden,
    );
    assert_kind(app.algorithms.delete(&u2, algo.id).await, ErrorKind::Forbidden);

    // Read access is enough to fetch it.
    let fetched = app.algorithms.get(&u2, algo.id).await.unwrap();
    assert_eq!(fetched.name, "Algo1");
}

#[tokio::test]
async fn test_read_write_on_root_folder_can_modify_but_not_delete() {
    let app = TestApp::new();
    let u1 = app.create_user("u1@example.com").await;
    let u2 = app.create_user("u2@example.com").await;

    let root = app.create_folder(&u1, "Root", None).await;
    let algo = app.create_algorithm(&u1, "Algo1", Some(root.id)).await;
    app.grant(u2.user_id, ResourceRef::Folder(root.id), AccessLevel::ReadWrite)
        .await;

    let updated = app
        .algorithms
        .update(&u2, algo.id, rename("Algo1 (edited)"))
        .await
        .unwrap();
    assert_eq!(updated.name, "Algo1 (edited)");

    assert_kind(app.algorithms.delete(&u2, algo.id).await, ErrorKind::Forbidden);
    assert!(app.algorithms.get(&u1, algo.id).await.is_ok());
}

#[tokio::test]
async fn test_no_grant_on_chain_resolves_to_none() {
    let app = TestApp::new();
    let u1 = app.create_user("u1@example.com").await;
    let u2 = app.create_user("u2@example.com").await;

    let root = app.create_folder(&u1, "Root", None).await;
    let child = app.create_folder(&u1, "Child", Some(root.id)).await;
    let other = app.create_folder(&u1, "Other", None).await;
    app.grant(u2.user_id, ResourceRef::Folder(other.id), AccessLevel::Owner)
        .await;

    assert_eq!(
        app.resolver.resolve_folder_rights(u2.user_id, Some(child.id)).await.unwrap(),
        None
    );
    assert_kind(app.folders.get(&u2, child.id).await, ErrorKind::NotFound);
}

#[tokio::test]
async fn test_ancestor_grant_elevates_weaker_direct_grant() {
    let app = TestApp::new();
    let u1 = app.create_user("u1@example.com").await;
    let u2 = app.create_user("u2@example.com").await;

    let parent = app.create_folder(&u1, "Parent", None).await;
    let child = app.create_folder(&u1, "Child", Some(parent.id)).await;
    app.grant(u2.user_id, ResourceRef::Folder(child.id), AccessLevel::ReadOnly)
        .await;
    app.grant(u2.user_id, ResourceRef::Folder(parent.id), AccessLevel::ReadWrite)
        .await;

    assert_eq!(
        app.resolver.resolve_folder_rights(u2.user_id, Some(child.id)).await.unwrap(),
        Some(AccessLevel::ReadWrite)
    );
}

#[tokio::test]
async fn test_owner_on_any_ancestor_wins() {
    let app = TestApp::new();
    let u1 = app.create_user("u1@example.com").await;
    let u2 = app.create_user("u2@example.com").await;

    let top = app.create_folder(&u1, "Top", None).await;
    let mid = app.create_folder(&u1, "Mid", Some(top.id)).await;
    let leaf = app.create_folder(&u1, "Leaf", Some(mid.id)).await;
    app.grant(u2.user_id, ResourceRef::Folder(top.id), AccessLevel::Owner)
        .await;
    app.grant(u2.user_id, ResourceRef::Folder(mid.id), AccessLevel::ReadOnly)
        .await;
    app.grant(u2.user_id, ResourceRef::Folder(leaf.id), AccessLevel::ReadWrite)
        .await;

    assert_eq!(
        app.resolver.resolve_folder_rights(u2.user_id, Some(leaf.id)).await.unwrap(),
        Some(AccessLevel::Owner)
    );

    // An inherited owner may delete.
    let deletion = app.folders.delete(&u2, leaf.id).await.unwrap();
    assert_eq!(deletion.folders, vec![leaf.id]);
}

#[tokio::test]
async fn test_algorithm_inherits_folder_grant() {
    let app = TestApp::new();
    let u1 = app.create_user("u1@example.com").await;
    let u2 = app.create_user("u2@example.com").await;

    let root = app.create_folder(&u1, "Root", None).await;
    let nested = app.create_folder(&u1, "Nested", Some(root.id)).await;
    let algo = app.create_algorithm(&u1, "Algo", Some(nested.id)).await;
    app.grant(u2.user_id, ResourceRef::Folder(nested.id), AccessLevel::ReadWrite)
        .await;

    assert_eq!(
        app.resolver.resolve_algo_rights(u2.user_id, algo.id).await.unwrap(),
        Some(AccessLevel::ReadWrite)
    );

    // A weaker direct grant does not hide the inherited one.
    app.grant(u2.user_id, ResourceRef::Algorithm(algo.id), AccessLevel::ReadOnly)
        .await;
    assert_eq!(
        app.resolver.resolve_algo_rights(u2.user_id, algo.id).await.unwrap(),
        Some(AccessLevel::ReadWrite)
    );
}

#[tokio::test]
async fn test_resolution_is_idempotent() {
    let app = TestApp::new();
    let u1 = app.create_user("u1@example.com").await;
    let u2 = app.create_user("u2@example.com").await;

    let root = app.create_folder(&u1, "Root", None).await;
    let child = app.create_folder(&u1, "Child", Some(root.id)).await;
    let algo = app.create_algorithm(&u1, "Algo", Some(child.id)).await;
    app.grant(u2.user_id, ResourceRef::Folder(root.id), AccessLevel::ReadOnly)
        .await;

    for user in [u1.user_id, u2.user_id] {
        let first = app.resolver.resolve_algo_rights(user, algo.id).await.unwrap();
        let second = app.resolver.resolve_algo_rights(user, algo.id).await.unwrap();
        assert_eq!(first, second);
    }
}

#[tokio::test]
async fn test_grant_replaces_previous_level() {
    let app = TestApp::new();
    let u1 = app.create_user("u1@example.com").await;
    let u2 = app.create_user("u2@example.com").await;

    let root = app.create_folder(&u1, "Root", None).await;
    let resource = ResourceRef::Folder(root.id);
    app.grant(u2.user_id, resource, AccessLevel::ReadOnly).await;
    app.grant(u2.user_id, resource, AccessLevel::ReadWrite).await;

    let entries = app.rights.list(resource).await.unwrap();
    assert_eq!(entries.len(), 2);
    let level = app.store.find_level(u2.user_id, resource).await.unwrap();
    assert_eq!(level, Some(AccessLevel::ReadWrite));

    let resolved = app.rights.resolve(u2.user_id, resource).await.unwrap();
    assert_eq!(resolved.level, Some(AccessLevel::ReadWrite));
}

#[tokio::test]
async fn test_revoke_removes_access() {
    let app = TestApp::new();
    let u1 = app.create_user("u1@example.com").await;
    let u2 = app.create_user("u2@example.com").await;

    let root = app.create_folder(&u1, "Root", None).await;
    let resource = ResourceRef::Folder(root.id);
    app.grant(u2.user_id, resource, AccessLevel::ReadOnly).await;
    assert!(app.folders.get(&u2, root.id).await.is_ok());

    app.rights.revoke(u2.user_id, resource).await.unwrap();
    assert_kind(app.folders.get(&u2, root.id).await, ErrorKind::NotFound);
    assert_kind(
        app.rights.revoke(u2.user_id, resource).await,
        ErrorKind::NotFound,
    );
}

#[tokio::test]
async fn test_grant_to_unknown_user_is_not_found() {
    let app = TestApp::new();
    let u1 = app.create_user("u1@example.com").await;
    let root = app.create_folder(&u1, "Root", None).await;

    assert_kind(
        app.rights
            .grant(
                algohub_core::types::UserId::new(),
                ResourceRef::Folder(root.id),
                AccessLevel::ReadOnly,
            )
            .await,
        ErrorKind::NotFound,
    );
}

//! Integration tests for folder creation, moves, listing, and cascading deletes.

use algohub_core::error::ErrorKind;
use algohub_database::store::{FolderStore, RightsStore};
use algohub_entity::rights::{AccessLevel, ResourceRef};
use algohub_service::folder::{CreateFolderRequest, UpdateFolderRequest};

use crate::helpers::{TestApp, assert_kind};

fn move_to(parent_id: Option<algohub_core::types::FolderId>) -> UpdateFolderRequest {
    UpdateFolderRequest {
        parent_id: Some(parent_id),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_create_then_read() {
    let app = TestApp::new();
    let u1 = app.create_user("u1@example.com").await;

    let root = app.create_folder(&u1, "  Root  ", None).await;
    assert_eq!(root.name, "Root");
    assert_eq!(
        app.resolver.resolve_folder_rights(u1.user_id, Some(root.id)).await.unwrap(),
        Some(AccessLevel::Owner)
    );

    let fetched = app.folders.get(&u1, root.id).await.unwrap();
    assert_eq!(fetched.id, root.id);
}

#[tokio::test]
async fn test_create_on_behalf_of_another_user_is_forbidden() {
    let app = TestApp::new();
    let u1 = app.create_user("u1@example.com").await;
    let u2 = app.create_user("u2@example.com").await;

    let result = app
        .folders
        .create(
            &u1,
            CreateFolderRequest {
                name: "Root".into(),
                parent_id: None,
                owner_id: u2.user_id,
            },
        )
        .await;
    assert_kind(result, ErrorKind::Forbidden);
    assert_eq!(app.store.rights_count().await, 0);
}

#[tokio::test]
async fn test_create_requires_write_on_parent() {
    let app = TestApp::new();
    let u1 = app.create_user("u1@example.com").await;
    let u2 = app.create_user("u2@example.com").await;
    let root = app.create_folder(&u1, "Root", None).await;

    let request = CreateFolderRequest {
        name: "Sub".into(),
        parent_id: Some(root.id),
        owner_id: u2.user_id,
    };
    assert_kind(
        app.folders.create(&u2, request.clone()).await,
        ErrorKind::Forbidden,
    );

    app.grant(u2.user_id, ResourceRef::Folder(root.id), AccessLevel::ReadWrite)
        .await;
    let sub = app.folders.create(&u2, request).await.unwrap();
    assert_eq!(sub.parent_id, Some(root.id));
    assert_eq!(
        app.resolver.resolve_folder_rights(u2.user_id, Some(sub.id)).await.unwrap(),
        Some(AccessLevel::Owner)
    );
}

#[tokio::test]
async fn test_create_under_missing_parent_is_not_found() {
    let app = TestApp::new();
    let u1 = app.create_user("u1@example.com").await;

    let result = app
        .folders
        .create(
            &u1,
            CreateFolderRequest {
                name: "Orphan".into(),
                parent_id: Some(algohub_core::types::FolderId::new()),
                owner_id: u1.user_id,
            },
        )
        .await;
    assert_kind(result, ErrorKind::NotFound);
}

#[tokio::test]
async fn test_blank_name_is_rejected() {
    let app = TestApp::new();
    let u1 = app.create_user("u1@example.com").await;

    let err = assert_kind(
        app.folders
            .create(
                &u1,
                CreateFolderRequest {
                    name: "   ".into(),
                    parent_id: None,
                    owner_id: u1.user_id,
                },
            )
            .await,
        ErrorKind::Validation,
    );
    assert!(err.issues.iter().any(|i| i.path == "name"));
}

#[tokio::test]
async fn test_nesting_limit_on_create() {
    let app = TestApp::with_max_depth(3);
    let u1 = app.create_user("u1@example.com").await;

    let a = app.create_folder(&u1, "a", None).await;
    let b = app.create_folder(&u1, "b", Some(a.id)).await;
    let c = app.create_folder(&u1, "c", Some(b.id)).await;

    let result = app
        .folders
        .create(
            &u1,
            CreateFolderRequest {
                name: "d".into(),
                parent_id: Some(c.id),
                owner_id: u1.user_id,
            },
        )
        .await;
    assert_kind(result, ErrorKind::Validation);
}

#[tokio::test]
async fn test_rename_and_move() {
    let app = TestApp::new();
    let u1 = app.create_user("u1@example.com").await;

    let a = app.create_folder(&u1, "a", None).await;
    let b = app.create_folder(&u1, "b", None).await;

    let moved = app
        .folders
        .update(
            &u1,
            b.id,
            UpdateFolderRequest {
                name: Some("b2".into()),
                parent_id: Some(Some(a.id)),
            },
        )
        .await
        .unwrap();
    assert_eq!(moved.name, "b2");
    assert_eq!(moved.parent_id, Some(a.id));

    let back = app.folders.update(&u1, b.id, move_to(None)).await.unwrap();
    assert!(back.is_root());
}

#[tokio::test]
async fn test_move_into_own_subtree_is_conflict() {
    let app = TestApp::new();
    let u1 = app.create_user("u1@example.com").await;

    let a = app.create_folder(&u1, "a", None).await;
    let b = app.create_folder(&u1, "b", Some(a.id)).await;
    let c = app.create_folder(&u1, "c", Some(b.id)).await;

    assert_kind(
        app.folders.update(&u1, a.id, move_to(Some(c.id))).await,
        ErrorKind::Conflict,
    );
    assert_kind(
        app.folders.update(&u1, a.id, move_to(Some(a.id))).await,
        ErrorKind::Conflict,
    );

    let unchanged = app.store.find_by_id(a.id).await.unwrap().unwrap();
    assert!(unchanged.is_root());
}

#[tokio::test]
async fn test_move_past_nesting_limit_is_rejected() {
    let app = TestApp::with_max_depth(3);
    let u1 = app.create_user("u1@example.com").await;

    let a = app.create_folder(&u1, "a", None).await;
    let b = app.create_folder(&u1, "b", Some(a.id)).await;
    let other = app.create_folder(&u1, "other", None).await;
    app.create_folder(&u1, "leaf", Some(other.id)).await;

    assert_kind(
        app.folders.update(&u1, other.id, move_to(Some(b.id))).await,
        ErrorKind::Validation,
    );
    app.folders.update(&u1, other.id, move_to(Some(a.id))).await.unwrap();
}

#[tokio::test]
async fn test_move_requires_write_on_destination() {
    let app = TestApp::new();
    let u1 = app.create_user("u1@example.com").await;
    let u2 = app.create_user("u2@example.com").await;

    let theirs = app.create_folder(&u1, "theirs", None).await;
    let mine = app.create_folder(&u2, "mine", None).await;
    app.grant(u2.user_id, ResourceRef::Folder(theirs.id), AccessLevel::ReadOnly)
        .await;

    assert_kind(
        app.folders.update(&u2, mine.id, move_to(Some(theirs.id))).await,
        ErrorKind::Forbidden,
    );
}

#[tokio::test]
async fn test_update_without_rights_is_forbidden() {
    let app = TestApp::new();
    let u1 = app.create_user("u1@example.com").await;
    let u2 = app.create_user("u2@example.com").await;
    let root = app.create_folder(&u1, "Root", None).await;

    let request = UpdateFolderRequest {
        name: Some("mine".into()),
        ..Default::default()
    };
    assert_kind(
        app.folders.update(&u2, root.id, request.clone()).await,
        ErrorKind::Forbidden,
    );
    assert_kind(
        app.folders
            .update(&u2, algohub_core::types::FolderId::new(), request)
            .await,
        ErrorKind::NotFound,
    );
}

#[tokio::test]
async fn test_delete_cascades_subtree_and_rights() {
    let app = TestApp::new();
    let u1 = app.create_user("u1@example.com").await;
    let u2 = app.create_user("u2@example.com").await;

    let root = app.create_folder(&u1, "Root", None).await;
    let child = app.create_folder(&u1, "Child", Some(root.id)).await;
    let algo = app.create_algorithm(&u1, "Algo", Some(child.id)).await;
    app.grant(u2.user_id, ResourceRef::Folder(child.id), AccessLevel::ReadOnly)
        .await;
    assert_eq!(app.blobs.len(), 1);

    assert_kind(app.folders.delete(&u2, child.id).await, ErrorKind::Forbidden);

    let deletion = app.folders.delete(&u1, root.id).await.unwrap();
    assert_eq!(deletion.folders.len(), 2);
    assert_eq!(deletion.algorithms, vec![algo.id]);
    assert_eq!(deletion.rights_removed, 4);

    assert_eq!(app.store.rights_count().await, 0);
    assert!(app.blobs.is_empty());
    for resource in [
        ResourceRef::Folder(root.id),
        ResourceRef::Folder(child.id),
        ResourceRef::Algorithm(algo.id),
    ] {
        assert!(app.store.find_by_resource(resource).await.unwrap().is_empty());
    }

    assert_kind(app.folders.get(&u1, root.id).await, ErrorKind::NotFound);
    assert_kind(app.algorithms.get(&u1, algo.id).await, ErrorKind::NotFound);
    assert_kind(app.folders.delete(&u1, root.id).await, ErrorKind::NotFound);
}

#[tokio::test]
async fn test_delete_survives_blob_outage() {
    let app = TestApp::new();
    let u1 = app.create_user("u1@example.com").await;

    let root = app.create_folder(&u1, "Root", None).await;
    app.create_algorithm(&u1, "Algo", Some(root.id)).await;

    app.blobs.set_unavailable(true);
    let deletion = app.folders.delete(&u1, root.id).await.unwrap();
    assert_eq!(deletion.algorithms.len(), 1);
    assert_eq!(app.store.rights_count().await, 0);
}

#[tokio::test]
async fn test_list_contents() {
    let app = TestApp::new();
    let u1 = app.create_user("u1@example.com").await;
    let u2 = app.create_user("u2@example.com").await;

    let root = app.create_folder(&u1, "Root", None).await;
    let child = app.create_folder(&u1, "Child", Some(root.id)).await;
    let loose = app.create_algorithm(&u1, "Loose", None).await;
    let filed = app.create_algorithm(&u1, "Filed", Some(root.id)).await;

    let top = app.folders.list_contents(&u1, None).await.unwrap();
    assert_eq!(top.folders.iter().map(|f| f.id).collect::<Vec<_>>(), vec![root.id]);
    assert_eq!(top.algorithms.iter().map(|a| a.id).collect::<Vec<_>>(), vec![loose.id]);

    let inside = app.folders.list_contents(&u1, Some(root.id)).await.unwrap();
    assert_eq!(inside.folders.iter().map(|f| f.id).collect::<Vec<_>>(), vec![child.id]);
    assert_eq!(inside.algorithms.iter().map(|a| a.id).collect::<Vec<_>>(), vec![filed.id]);

    assert_kind(
        app.folders.list_contents(&u2, Some(root.id)).await,
        ErrorKind::NotFound,
    );
    let empty = app.folders.list_contents(&u2, None).await.unwrap();
    assert!(empty.folders.is_empty() && empty.algorithms.is_empty());
}

//! Integration tests for algorithm content, moves, deletes, and the blob mirror.

use serde_json::{Value, json};

use algohub_core::error::ErrorKind;
use algohub_core::traits::BlobStore;
use algohub_database::store::{AlgorithmStore, RightsStore};
use algohub_entity::rights::{AccessLevel, ResourceRef};
use algohub_service::algorithm::UpdateAlgorithmRequest;

use crate::helpers::{TestApp, assert_kind, create_algorithm_request, valid_document};

fn misplaced_document() -> Value {
    json!([{
        "typeElement": "Problem",
        "abscisse": "10px",
        "ordonnee": "5vw",
        "enfants": [
            { "typeElement": "ExitCondition", "abscisse": "2vw", "ordonnee": "3em" }
        ]
    }])
}

#[tokio::test]
async fn test_create_then_read_mirrors_document() {
    let app = TestApp::new();
    let u1 = app.create_user("u1@example.com").await;

    let algo = app.create_algorithm(&u1, "Algo", None).await;
    assert_eq!(
        app.resolver.resolve_algo_rights(u1.user_id, algo.id).await.unwrap(),
        Some(AccessLevel::Owner)
    );

    let fetched = app.algorithms.get(&u1, algo.id).await.unwrap();
    assert_eq!(fetched.source_code, algo.source_code);

    let mirrored = app.blobs.get(algo.id).await.unwrap().expect("mirrored");
    let mirrored: Value = serde_json::from_slice(&mirrored).unwrap();
    assert_eq!(mirrored, algo.source_code);
}

#[tokio::test]
async fn test_wrong_unit_rejects_create() {
    let app = TestApp::new();
    let u1 = app.create_user("u1@example.com").await;
    let root = app.create_folder(&u1, "Root", None).await;
    let rights_before = app.store.rights_count().await;

    let err = assert_kind(
        app.algorithms
            .create(
                &u1,
                create_algorithm_request(u1.user_id, "Bad", Some(root.id), misplaced_document()),
            )
            .await,
        ErrorKind::Validation,
    );

    let paths: Vec<&str> = err.issues.iter().map(|i| i.path.as_str()).collect();
    assert_eq!(paths.len(), 2);
    assert!(paths.contains(&"[0].abscisse"));
    assert!(paths.contains(&"[0].enfants[0].ordonnee"));

    assert!(app.store.find_in_folder(root.id).await.unwrap().is_empty());
    assert_eq!(app.store.rights_count().await, rights_before);
    assert!(app.blobs.is_empty());
}

#[tokio::test]
async fn test_wrong_unit_leaves_algorithm_unchanged() {
    let app = TestApp::new();
    let u1 = app.create_user("u1@example.com").await;
    let algo = app.create_algorithm(&u1, "Algo", None).await;

    let request = UpdateAlgorithmRequest {
        name: Some("Renamed".into()),
        source_code: Some(misplaced_document()),
        ..Default::default()
    };
    assert_kind(
        app.algorithms.update(&u1, algo.id, request).await,
        ErrorKind::Validation,
    );

    let stored = app.store.find_by_id(algo.id).await.unwrap().unwrap();
    assert_eq!(stored.name, "Algo");
    assert_eq!(stored.source_code, algo.source_code);
}

#[tokio::test]
async fn test_content_update_is_mirrored() {
    let app = TestApp::new();
    let u1 = app.create_user("u1@example.com").await;
    let algo = app.create_algorithm(&u1, "Algo", None).await;

    let document = json!([{
        "typeElement": "DataDictionary",
        "abscisse": "50vw",
        "ordonnee": "5vw",
        "entrees": [{ "nom": "xs", "type": "list", "signification": "input values" }]
    }]);
    let updated = app
        .algorithms
        .update(
            &u1,
            algo.id,
            UpdateAlgorithmRequest {
                source_code: Some(document),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.source_code[0]["typeElement"], "DataDictionary");

    let mirrored = app.blobs.get(algo.id).await.unwrap().expect("mirrored");
    let mirrored: Value = serde_json::from_slice(&mirrored).unwrap();
    assert_eq!(mirrored, updated.source_code);
}

#[tokio::test]
async fn test_blob_outage_after_create_is_internal() {
    let app = TestApp::new();
    let u1 = app.create_user("u1@example.com").await;
    app.blobs.set_unavailable(true);

    assert_kind(
        app.algorithms
            .create(&u1, create_algorithm_request(u1.user_id, "Algo", None, valid_document()))
            .await,
        ErrorKind::Internal,
    );

    // The relational write is committed regardless.
    let listed = app.folders.list_contents(&u1, None).await.unwrap();
    assert_eq!(listed.algorithms.len(), 1);
    assert_eq!(app.store.rights_count().await, 1);
}

#[tokio::test]
async fn test_move_between_folders() {
    let app = TestApp::new();
    let u1 = app.create_user("u1@example.com").await;
    let u2 = app.create_user("u2@example.com").await;

    let source = app.create_folder(&u1, "Source", None).await;
    let target = app.create_folder(&u1, "Target", None).await;
    let algo = app.create_algorithm(&u1, "Algo", Some(source.id)).await;
    app.grant(u2.user_id, ResourceRef::Folder(source.id), AccessLevel::ReadWrite)
        .await;

    let move_to_target = UpdateAlgorithmRequest {
        folder_id: Some(Some(target.id)),
        ..Default::default()
    };
    assert_kind(
        app.algorithms.update(&u2, algo.id, move_to_target.clone()).await,
        ErrorKind::Forbidden,
    );

    let moved = app.algorithms.update(&u1, algo.id, move_to_target).await.unwrap();
    assert_eq!(moved.folder_id, Some(target.id));

    // Inherited access followed the folder, not the algorithm.
    assert_eq!(
        app.resolver.resolve_algo_rights(u2.user_id, algo.id).await.unwrap(),
        None
    );
}

#[tokio::test]
async fn test_create_in_folder_without_write_is_forbidden() {
    let app = TestApp::new();
    let u1 = app.create_user("u1@example.com").await;
    let u2 = app.create_user("u2@example.com").await;
    let root = app.create_folder(&u1, "Root", None).await;
    app.grant(u2.user_id, ResourceRef::Folder(root.id), AccessLevel::ReadOnly)
        .await;

    assert_kind(
        app.algorithms
            .create(
                &u2,
                create_algorithm_request(u2.user_id, "Algo", Some(root.id), valid_document()),
            )
            .await,
        ErrorKind::Forbidden,
    );
    assert_kind(
        app.algorithms
            .create(&u2, create_algorithm_request(u1.user_id, "Algo", None, valid_document()))
            .await,
        ErrorKind::Forbidden,
    );
}

#[tokio::test]
async fn test_delete_removes_rights_and_document() {
    let app = TestApp::new();
    let u1 = app.create_user("u1@example.com").await;
    let u2 = app.create_user("u2@example.com").await;

    let algo = app.create_algorithm(&u1, "Algo", None).await;
    app.grant(u2.user_id, ResourceRef::Algorithm(algo.id), AccessLevel::ReadWrite)
        .await;

    app.algorithms.delete(&u1, algo.id).await.unwrap();

    assert!(app
        .store
        .find_by_resource(ResourceRef::Algorithm(algo.id))
        .await
        .unwrap()
        .is_empty());
    assert!(app.blobs.get(algo.id).await.unwrap().is_none());
    assert_kind(app.algorithms.get(&u1, algo.id).await, ErrorKind::NotFound);
    assert_kind(app.algorithms.get(&u2, algo.id).await, ErrorKind::NotFound);
    assert_kind(app.algorithms.delete(&u1, algo.id).await, ErrorKind::NotFound);
}

#[tokio::test]
async fn test_normalize_fills_defaults() {
    let app = TestApp::new();
    let normalized = app
        .algorithms
        .normalize(&json!([{ "typeElement": "Condition", "abscisse": "1vw", "ordonnee": "2vw" }]))
        .unwrap();
    assert_eq!(normalized[0]["libelle"], "");
    assert_eq!(normalized[0]["enfants"], json!([]));
}

//! Shared test helpers for integration tests.

use std::sync::Arc;

use serde_json::{Value, json};

use algohub_auth::RightsResolver;
use algohub_core::error::{AppError, ErrorKind};
use algohub_core::types::{FolderId, UserId};
use algohub_database::MemoryStore;
use algohub_database::store::UserStore;
use algohub_entity::algorithm::Algorithm;
use algohub_entity::folder::Folder;
use algohub_entity::rights::{AccessLevel, ResourceRef};
use algohub_entity::user::User;
use algohub_service::algorithm::{CreateAlgorithmRequest, UpdateAlgorithmRequest};
use algohub_service::folder::CreateFolderRequest;
use algohub_service::{
    AlgorithmService, ContentValidator, FolderService, RequestContext, RightsAdminService,
    UserService,
};
use algohub_storage::MemoryBlobStore;

/// Test application context
pub struct TestApp {
    /// Backing store shared by every service
    pub store: MemoryStore,
    /// Blob mirror
    pub blobs: Arc<MemoryBlobStore>,
    /// Rights resolver
    pub resolver: Arc<RightsResolver>,
    /// Folder service
    pub folders: FolderService,
    /// Algorithm service
    pub algorithms: AlgorithmService,
    /// Operator rights service
    pub rights: RightsAdminService,
    /// Account service
    pub users: UserService,
}

impl TestApp {
    /// Create a test application with the default folder depth limit
    pub fn new() -> Self {
        Self::with_max_depth(32)
    }

    /// Create a test application bounding folder nesting to `max_depth`
    pub fn with_max_depth(max_depth: usize) -> Self {
        let store = MemoryStore::new();
        let shared = Arc::new(store.clone());
        let blobs = Arc::new(MemoryBlobStore::new());
        let resolver = Arc::new(RightsResolver::new(
            shared.clone(),
            shared.clone(),
            max_depth,
        ));

        let folders = FolderService::new(
            shared.clone(),
            shared.clone(),
            shared.clone(),
            blobs.clone(),
            Arc::clone(&resolver),
        );
        let algorithms = AlgorithmService::new(
            shared.clone(),
            shared.clone(),
            blobs.clone(),
            Arc::clone(&resolver),
            ContentValidator::new(64),
        );
        let rights = RightsAdminService::new(shared.clone(), shared.clone(), Arc::clone(&resolver));
        let users = UserService::new(shared);

        Self {
            store,
            blobs,
            resolver,
            folders,
            algorithms,
            rights,
            users,
        }
    }

    /// Register a user and return a request context acting as them
    pub async fn create_user(&self, email: &str) -> RequestContext {
        let user = UserStore::create(&self.store, &User::new(email, "hash"))
            .await
            .expect("Failed to create test user");
        RequestContext::new(user.id)
    }

    /// Create a folder owned by the caller
    pub async fn create_folder(
        &self,
        ctx: &RequestContext,
        name: &str,
        parent_id: Option<FolderId>,
    ) -> Folder {
        self.folders
            .create(
                ctx,
                CreateFolderRequest {
                    name: name.to_string(),
                    parent_id,
                    owner_id: ctx.user_id,
                },
            )
            .await
            .expect("Failed to create test folder")
    }

    /// Create an algorithm owned by the caller with a valid document
    pub async fn create_algorithm(
        &self,
        ctx: &RequestContext,
        name: &str,
        folder_id: Option<FolderId>,
    ) -> Algorithm {
        self.algorithms
            .create(ctx, create_algorithm_request(ctx.user_id, name, folder_id, valid_document()))
            .await
            .expect("Failed to create test algorithm")
    }

    /// Record a direct grant through the operator service
    pub async fn grant(&self, user_id: UserId, resource: ResourceRef, level: AccessLevel) {
        self.rights
            .grant(user_id, resource, level)
            .await
            .expect("Failed to grant rights");
    }
}

/// Build an algorithm creation request
pub fn create_algorithm_request(
    owner_id: UserId,
    name: &str,
    folder_id: Option<FolderId>,
    source_code: Value,
) -> CreateAlgorithmRequest {
    CreateAlgorithmRequest {
        name: name.to_string(),
        folder_id,
        owner_id,
        source_code,
    }
}

/// A request that only renames an algorithm
pub fn rename(name: &str) -> UpdateAlgorithmRequest {
    UpdateAlgorithmRequest {
        name: Some(name.to_string()),
        ..Default::default()
    }
}

/// A small, well-formed algorithm document
pub fn valid_document() -> Value {
    json!([{
        "typeElement": "Problem",
        "abscisse": "10vw",
        "ordonnee": "5vw",
        "libelle": "Sort the list",
        "listeDonnees": ["xs"],
        "listeResultats": ["ys"],
        "enfants": [{
            "typeElement": "UnboundedLoopStructure",
            "abscisse": "12vw",
            "ordonnee": "20vw",
            "enfants": [
                { "typeElement": "ExitCondition", "abscisse": "14vw", "ordonnee": "30vw", "libelle": "sorted" }
            ]
        }]
    }])
}

/// Assert that a result failed with the given error kind
pub fn assert_kind<T: std::fmt::Debug>(result: Result<T, AppError>, kind: ErrorKind) -> AppError {
    match result {
        Ok(value) => panic!("expected {kind:?}, got Ok({value:?})"),
        Err(e) => {
            assert_eq!(e.kind, kind, "unexpected error: {e}");
            e
        }
    }
}

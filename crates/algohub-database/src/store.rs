//! Store traits consumed by the rights engine and the services.
//!
//! Every method reads current state; nothing here caches across calls.
//! Methods that perform more than one write (`create_with_owner`,
//! `delete_cascade`, `delete_with_rights`) are atomic: implementations run
//! them inside a single transaction or critical section.

use async_trait::async_trait;

use algohub_core::result::AppResult;
use algohub_core::types::{AlgorithmId, FolderId, UserId};
use algohub_entity::algorithm::Algorithm;
use algohub_entity::folder::Folder;
use algohub_entity::rights::{AccessLevel, ResourceRef, RightsEntry};
use algohub_entity::user::User;

/// Point lookups and writes on (user, resource) grants.
#[async_trait]
pub trait RightsStore: Send + Sync + std::fmt::Debug + 'static {
    /// The level directly granted to a user on a resource, if any.
    async fn find_level(
        &self,
        user_id: UserId,
        resource: ResourceRef,
    ) -> AppResult<Option<AccessLevel>>;

    /// Insert or replace the grant for `(entry.user_id, entry.resource)`.
    async fn grant(&self, entry: &RightsEntry) -> AppResult<RightsEntry>;

    /// Remove the grant for a pair. Returns `true` if one existed.
    async fn revoke(&self, user_id: UserId, resource: ResourceRef) -> AppResult<bool>;

    /// Every grant on a resource.
    async fn find_by_resource(&self, resource: ResourceRef) -> AppResult<Vec<RightsEntry>>;

    /// Every grant held by a user.
    async fn find_by_user(&self, user_id: UserId) -> AppResult<Vec<RightsEntry>>;

    /// Remove every grant on a resource. Returns the number removed.
    async fn delete_by_resource(&self, resource: ResourceRef) -> AppResult<u64>;
}

/// Parent-pointer lookups over the folder forest.
#[async_trait]
pub trait TreeStore: Send + Sync + std::fmt::Debug + 'static {
    /// Parent of a folder; `None` for roots and for unknown folders.
    async fn folder_parent(&self, folder_id: FolderId) -> AppResult<Option<FolderId>>;

    /// Containing folder of an algorithm; `None` at the root scope or if unknown.
    async fn algorithm_folder(&self, algorithm_id: AlgorithmId) -> AppResult<Option<FolderId>>;
}

/// What a cascading folder delete removed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FolderDeletion {
    /// The deleted folder and all of its descendants.
    pub folders: Vec<FolderId>,
    /// Algorithms that lived anywhere in the deleted subtree.
    pub algorithms: Vec<AlgorithmId>,
    /// Rights entries removed across folders and algorithms.
    pub rights_removed: u64,
}

/// Folder rows.
#[async_trait]
pub trait FolderStore: Send + Sync + std::fmt::Debug + 'static {
    /// Find a folder by ID.
    async fn find_by_id(&self, id: FolderId) -> AppResult<Option<Folder>>;

    /// Direct children of a folder, ordered by name.
    async fn find_children(&self, parent_id: FolderId) -> AppResult<Vec<Folder>>;

    /// Folders among `ids`, ordered by name. Unknown ids are skipped.
    async fn find_many(&self, ids: &[FolderId]) -> AppResult<Vec<Folder>>;

    /// Insert a folder together with an Owner grant for `owner_id`.
    async fn create_with_owner(&self, folder: &Folder, owner_id: UserId) -> AppResult<Folder>;

    /// Persist name, parent, and `updated_at`. NotFound if the row is gone,
    /// Conflict if the new parent lies inside the folder's own subtree.
    /// The ancestry check and the write are atomic with respect to other moves.
    async fn update(&self, folder: &Folder) -> AppResult<Folder>;

    /// Remove a folder's subtree, the algorithms in it, and every rights
    /// entry on any of them. `None` if the folder does not exist.
    async fn delete_cascade(&self, id: FolderId) -> AppResult<Option<FolderDeletion>>;
}

/// Algorithm rows.
#[async_trait]
pub trait AlgorithmStore: Send + Sync + std::fmt::Debug + 'static {
    /// Find an algorithm by ID.
    async fn find_by_id(&self, id: AlgorithmId) -> AppResult<Option<Algorithm>>;

    /// Algorithms filed directly in a folder, ordered by name.
    async fn find_in_folder(&self, folder_id: FolderId) -> AppResult<Vec<Algorithm>>;

    /// Algorithms among `ids`, ordered by name. Unknown ids are skipped.
    async fn find_many(&self, ids: &[AlgorithmId]) -> AppResult<Vec<Algorithm>>;

    /// Insert an algorithm together with an Owner grant for `owner_id`.
    async fn create_with_owner(
        &self,
        algorithm: &Algorithm,
        owner_id: UserId,
    ) -> AppResult<Algorithm>;

    /// Persist name, folder, content, and `updated_at`. NotFound if the row is gone.
    async fn update(&self, algorithm: &Algorithm) -> AppResult<Algorithm>;

    /// Remove every rights entry on the algorithm, then the algorithm.
    /// Returns `true` if the algorithm existed.
    async fn delete_with_rights(&self, id: AlgorithmId) -> AppResult<bool>;
}

/// User rows.
#[async_trait]
pub trait UserStore: Send + Sync + std::fmt::Debug + 'static {
    /// Find a user by ID.
    async fn find_by_id(&self, id: UserId) -> AppResult<Option<User>>;

    /// Insert a user. Conflict if the email is taken.
    async fn create(&self, user: &User) -> AppResult<User>;

    /// Remove every rights entry held by the user, then the user.
    /// Returns `true` if the user existed.
    async fn delete_with_rights(&self, id: UserId) -> AppResult<bool>;
}

//! In-memory store backing every store trait.
//!
//! All tables live behind one async mutex, so each trait method (including
//! the multi-write ones) runs as a single critical section.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use algohub_core::error::AppError;
use algohub_core::result::AppResult;
use algohub_core::types::{AlgorithmId, FolderId, UserId};
use algohub_entity::algorithm::Algorithm;
use algohub_entity::folder::Folder;
use algohub_entity::rights::{AccessLevel, ResourceRef, RightsEntry};
use algohub_entity::user::User;

use crate::store::{
    AlgorithmStore, FolderDeletion, FolderStore, RightsStore, TreeStore, UserStore,
};

/// Tables held by the memory store.
#[derive(Debug, Default)]
struct InnerState {
    users: HashMap<UserId, User>,
    folders: HashMap<FolderId, Folder>,
    algorithms: HashMap<AlgorithmId, Algorithm>,
    rights: HashMap<(UserId, ResourceRef), RightsEntry>,
}

impl InnerState {
    fn resource_exists(&self, resource: ResourceRef) -> bool {
        match resource {
            ResourceRef::Folder(id) => self.folders.contains_key(&id),
            ResourceRef::Algorithm(id) => self.algorithms.contains_key(&id),
        }
    }

    fn require_user(&self, user_id: UserId) -> AppResult<()> {
        if self.users.contains_key(&user_id) {
            Ok(())
        } else {
            Err(AppError::not_found(format!("User {user_id} not found")))
        }
    }

    fn require_folder(&self, folder_id: Option<FolderId>, what: &str) -> AppResult<()> {
        match folder_id {
            Some(id) if !self.folders.contains_key(&id) => {
                Err(AppError::not_found(format!("{what} {id} not found")))
            }
            _ => Ok(()),
        }
    }

    /// Whether `ancestor` is `start` or lies on its parent chain.
    fn has_ancestor(&self, start: Option<FolderId>, ancestor: FolderId) -> bool {
        let mut seen = HashSet::new();
        let mut current = start;
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            if !seen.insert(id) {
                return false;
            }
            current = self.folders.get(&id).and_then(|f| f.parent_id);
        }
        false
    }

    fn remove_rights_on(&mut self, resource: ResourceRef) -> u64 {
        let before = self.rights.len();
        self.rights.retain(|(_, r), _| *r != resource);
        (before - self.rights.len()) as u64
    }
}

/// A store that keeps users, folders, algorithms, and grants in process memory.
///
/// Clones share the same tables.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<InnerState>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite a folder row without checking its parent.
    ///
    /// Used to seed fixtures, including corrupted parent chains.
    pub async fn insert_folder_unchecked(&self, folder: Folder) {
        let mut state = self.state.lock().await;
        state.folders.insert(folder.id, folder);
    }

    /// Number of grants currently stored.
    pub async fn rights_count(&self) -> usize {
        self.state.lock().await.rights.len()
    }
}

fn sorted_by_name<T>(mut items: Vec<T>, name: impl Fn(&T) -> &str) -> Vec<T> {
    items.sort_by(|a, b| name(a).cmp(name(b)));
    items
}

#[async_trait]
impl RightsStore for MemoryStore {
    async fn find_level(
        &self,
        user_id: UserId,
        resource: ResourceRef,
    ) -> AppResult<Option<AccessLevel>> {
        let state = self.state.lock().await;
        Ok(state.rights.get(&(user_id, resource)).map(|e| e.level))
    }

    async fn grant(&self, entry: &RightsEntry) -> AppResult<RightsEntry> {
        let mut state = self.state.lock().await;
        state.require_user(entry.user_id)?;
        if !state.resource_exists(entry.resource) {
            return Err(AppError::not_found(format!(
                "Resource {} not found",
                entry.resource
            )));
        }
        state
            .rights
            .insert((entry.user_id, entry.resource), entry.clone());
        Ok(entry.clone())
    }

    async fn revoke(&self, user_id: UserId, resource: ResourceRef) -> AppResult<bool> {
        let mut state = self.state.lock().await;
        Ok(state.rights.remove(&(user_id, resource)).is_some())
    }

    async fn find_by_resource(&self, resource: ResourceRef) -> AppResult<Vec<RightsEntry>> {
        let state = self.state.lock().await;
        let mut entries: Vec<RightsEntry> = state
            .rights
            .values()
            .filter(|e| e.resource == resource)
            .cloned()
            .collect();
        entries.sort_by_key(|e| e.granted_at);
        Ok(entries)
    }

    async fn find_by_user(&self, user_id: UserId) -> AppResult<Vec<RightsEntry>> {
        let state = self.state.lock().await;
        let mut entries: Vec<RightsEntry> = state
            .rights
            .values()
            .filter(|e| e.user_id == user_id)
            .cloned()
            .collect();
        entries.sort_by_key(|e| e.granted_at);
        Ok(entries)
    }

    async fn delete_by_resource(&self, resource: ResourceRef) -> AppResult<u64> {
        let mut state = self.state.lock().await;
        Ok(state.remove_rights_on(resource))
    }
}

#[async_trait]
impl TreeStore for MemoryStore {
    async fn folder_parent(&self, folder_id: FolderId) -> AppResult<Option<FolderId>> {
        let state = self.state.lock().await;
        Ok(state.folders.get(&folder_id).and_then(|f| f.parent_id))
    }

    async fn algorithm_folder(&self, algorithm_id: AlgorithmId) -> AppResult<Option<FolderId>> {
        let state = self.state.lock().await;
        Ok(state
            .algorithms
            .get(&algorithm_id)
            .and_then(|a| a.folder_id))
    }
}

#[async_trait]
impl FolderStore for MemoryStore {
    async fn find_by_id(&self, id: FolderId) -> AppResult<Option<Folder>> {
        let state = self.state.lock().await;
        Ok(state.folders.get(&id).cloned())
    }

    async fn find_children(&self, parent_id: FolderId) -> AppResult<Vec<Folder>> {
        let state = self.state.lock().await;
        let children = state
            .folders
            .values()
            .filter(|f| f.parent_id == Some(parent_id))
            .cloned()
            .collect();
        Ok(sorted_by_name(children, |f| &f.name))
    }

    async fn find_many(&self, ids: &[FolderId]) -> AppResult<Vec<Folder>> {
        let state = self.state.lock().await;
        let found = ids
            .iter()
            .collect::<HashSet<_>>()
            .into_iter()
            .filter_map(|id| state.folders.get(id).cloned())
            .collect();
        Ok(sorted_by_name(found, |f| &f.name))
    }

    async fn create_with_owner(&self, folder: &Folder, owner_id: UserId) -> AppResult<Folder> {
        let mut state = self.state.lock().await;
        state.require_folder(folder.parent_id, "Parent folder")?;
        state.require_user(owner_id)?;
        if state.folders.contains_key(&folder.id) {
            return Err(AppError::conflict(format!(
                "Folder {} already exists",
                folder.id
            )));
        }

        let resource = ResourceRef::Folder(folder.id);
        state.folders.insert(folder.id, folder.clone());
        state
            .rights
            .insert((owner_id, resource), RightsEntry::owner(owner_id, resource));
        Ok(folder.clone())
    }

    async fn update(&self, folder: &Folder) -> AppResult<Folder> {
        let mut state = self.state.lock().await;
        state.require_folder(folder.parent_id, "Destination folder")?;
        if state.has_ancestor(folder.parent_id, folder.id) {
            return Err(AppError::conflict(format!(
                "Folder {} cannot be moved into its own subtree",
                folder.id
            )));
        }
        match state.folders.get_mut(&folder.id) {
            Some(row) => {
                row.name = folder.name.clone();
                row.parent_id = folder.parent_id;
                row.updated_at = folder.updated_at;
                Ok(row.clone())
            }
            None => Err(AppError::not_found(format!("Folder {} not found", folder.id))),
        }
    }

    async fn delete_cascade(&self, id: FolderId) -> AppResult<Option<FolderDeletion>> {
        let mut state = self.state.lock().await;
        if !state.folders.contains_key(&id) {
            return Ok(None);
        }

        // Breadth-first over children; the visited set stops on corrupted cycles.
        let mut visited: HashSet<FolderId> = HashSet::from([id]);
        let mut folders = vec![id];
        let mut cursor = 0;
        while cursor < folders.len() {
            let current = folders[cursor];
            cursor += 1;
            let children: Vec<FolderId> = state
                .folders
                .values()
                .filter(|f| f.parent_id == Some(current))
                .map(|f| f.id)
                .collect();
            for child in children {
                if visited.insert(child) {
                    folders.push(child);
                }
            }
        }

        let algorithms: Vec<AlgorithmId> = state
            .algorithms
            .values()
            .filter(|a| a.folder_id.is_some_and(|f| visited.contains(&f)))
            .map(|a| a.id)
            .collect();

        let mut rights_removed = 0;
        for algorithm_id in &algorithms {
            rights_removed += state.remove_rights_on(ResourceRef::Algorithm(*algorithm_id));
            state.algorithms.remove(algorithm_id);
        }
        for folder_id in &folders {
            rights_removed += state.remove_rights_on(ResourceRef::Folder(*folder_id));
            state.folders.remove(folder_id);
        }

        Ok(Some(FolderDeletion {
            folders,
            algorithms,
            rights_removed,
        }))
    }
}

#[async_trait]
impl AlgorithmStore for MemoryStore {
    async fn find_by_id(&self, id: AlgorithmId) -> AppResult<Option<Algorithm>> {
        let state = self.state.lock().await;
        Ok(state.algorithms.get(&id).cloned())
    }

    async fn find_in_folder(&self, folder_id: FolderId) -> AppResult<Vec<Algorithm>> {
        let state = self.state.lock().await;
        let found = state
            .algorithms
            .values()
            .filter(|a| a.folder_id == Some(folder_id))
            .cloned()
            .collect();
        Ok(sorted_by_name(found, |a| &a.name))
    }

    async fn find_many(&self, ids: &[AlgorithmId]) -> AppResult<Vec<Algorithm>> {
        let state = self.state.lock().await;
        let found = ids
            .iter()
            .collect::<HashSet<_>>()
            .into_iter()
            .filter_map(|id| state.algorithms.get(id).cloned())
            .collect();
        Ok(sorted_by_name(found, |a| &a.name))
    }

    async fn create_with_owner(
        &self,
        algorithm: &Algorithm,
        owner_id: UserId,
    ) -> AppResult<Algorithm> {
        let mut state = self.state.lock().await;
        state.require_folder(algorithm.folder_id, "Containing folder")?;
        state.require_user(owner_id)?;
        if state.algorithms.contains_key(&algorithm.id) {
            return Err(AppError::conflict(format!(
                "Algorithm {} already exists",
                algorithm.id
            )));
        }

        let resource = ResourceRef::Algorithm(algorithm.id);
        state.algorithms.insert(algorithm.id, algorithm.clone());
        state
            .rights
            .insert((owner_id, resource), RightsEntry::owner(owner_id, resource));
        Ok(algorithm.clone())
    }

    async fn update(&self, algorithm: &Algorithm) -> AppResult<Algorithm> {
        let mut state = self.state.lock().await;
        state.require_folder(algorithm.folder_id, "Destination folder")?;
        match state.algorithms.get_mut(&algorithm.id) {
            Some(row) => {
                row.name = algorithm.name.clone();
                row.folder_id = algorithm.folder_id;
                row.source_code = algorithm.source_code.clone();
                row.updated_at = algorithm.updated_at;
                Ok(row.clone())
            }
            None => Err(AppError::not_found(format!(
                "Algorithm {} not found",
                algorithm.id
            ))),
        }
    }

    async fn delete_with_rights(&self, id: AlgorithmId) -> AppResult<bool> {
        let mut state = self.state.lock().await;
        state.remove_rights_on(ResourceRef::Algorithm(id));
        Ok(state.algorithms.remove(&id).is_some())
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_by_id(&self, id: UserId) -> AppResult<Option<User>> {
        let state = self.state.lock().await;
        Ok(state.users.get(&id).cloned())
    }

    async fn create(&self, user: &User) -> AppResult<User> {
        let mut state = self.state.lock().await;
        if state.users.values().any(|u| u.email == user.email) {
            return Err(AppError::conflict(format!(
                "Email '{}' is already registered",
                user.email
            )));
        }
        state.users.insert(user.id, user.clone());
        Ok(user.clone())
    }

    async fn delete_with_rights(&self, id: UserId) -> AppResult<bool> {
        let mut state = self.state.lock().await;
        state.rights.retain(|(user_id, _), _| *user_id != id);
        Ok(state.users.remove(&id).is_some())
    }
}

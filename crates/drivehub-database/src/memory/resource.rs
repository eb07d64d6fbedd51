//! In-memory resource store.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use uuid::Uuid;

use drivehub_core::error::AppError;
use drivehub_core::result::AppResult;
use drivehub_entity::{Resource, ResourceType};

use crate::store::{FolderKey, ResourceStore};

/// Resource store holding every node in a concurrent map.
#[derive(Debug, Clone, Default)]
pub struct MemoryResourceStore {
    resources: Arc<DashMap<Uuid, Resource>>,
}

impl MemoryResourceStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored resources, deleted or not.
    pub fn len(&self) -> usize {
        self.resources.len()
    }

    /// Check whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    fn collect<F>(&self, filter: F) -> Vec<Resource>
    where
        F: Fn(&Resource) -> bool,
    {
        let mut out: Vec<Resource> = self
            .resources
            .iter()
            .filter(|entry| filter(entry.value()))
            .map(|entry| entry.value().clone())
            .collect();
        out.sort_by(|a, b| {
            let rank = |r: &Resource| match r.resource_type {
                ResourceType::Folder => 0,
                ResourceType::File => 1,
            };
            rank(a).cmp(&rank(b)).then_with(|| a.name.cmp(&b.name))
        });
        out
    }
}

#[async_trait]
impl ResourceStore for MemoryResourceStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Resource>> {
        Ok(self.resources.get(&id).map(|r| r.value().clone()))
    }

    async fn find_many(&self, ids: &[Uuid]) -> AppResult<Vec<Resource>> {
        let mut seen = HashSet::new();
        Ok(ids
            .iter()
            .filter(|id| seen.insert(**id))
            .filter_map(|id| self.resources.get(id).map(|r| r.value().clone()))
            .collect())
    }

    async fn find_children(
        &self,
        parent_id: Uuid,
        include_deleted: bool,
    ) -> AppResult<Vec<Resource>> {
        self.find_children_of(&[parent_id], include_deleted).await
    }

    async fn find_children_of(
        &self,
        parent_ids: &[Uuid],
        include_deleted: bool,
    ) -> AppResult<Vec<Resource>> {
        let parents: HashSet<Uuid> = parent_ids.iter().copied().collect();
        Ok(self.collect(|r| {
            r.parent_id.is_some_and(|p| parents.contains(&p)) && (include_deleted || !r.is_deleted)
        }))
    }

    async fn find_folders_by_keys(&self, keys: &[FolderKey]) -> AppResult<Vec<Resource>> {
        let wanted: HashSet<(Uuid, &str)> = keys.iter().map(|(p, n)| (*p, n.as_str())).collect();
        Ok(self.collect(|r| {
            r.is_folder()
                && !r.is_deleted
                && r.parent_id
                    .is_some_and(|p| wanted.contains(&(p, r.name.as_str())))
        }))
    }

    async fn find_deleted(&self) -> AppResult<Vec<Resource>> {
        let mut out = self.collect(|r| r.is_deleted);
        out.sort_by_key(|r| r.deleted_at);
        Ok(out)
    }

    async fn find_shared_with(&self, user_id: Uuid) -> AppResult<Vec<Resource>> {
        Ok(self.collect(|r| !r.is_deleted && r.grant_for(user_id).is_some()))
    }

    async fn find_referenced_keys(&self, keys: &[String]) -> AppResult<HashSet<String>> {
        let wanted: HashSet<&str> = keys.iter().map(String::as_str).collect();
        Ok(self
            .resources
            .iter()
            .filter_map(|entry| entry.value().storage_key.clone())
            .filter(|k| wanted.contains(k.as_str()))
            .collect())
    }

    async fn is_key_shared(&self, key: &str, except: Uuid) -> AppResult<bool> {
        Ok(self.resources.iter().any(|entry| {
            let r = entry.value();
            r.id != except && r.storage_key.as_deref() == Some(key)
        }))
    }

    async fn list_storage_keys(&self) -> AppResult<HashSet<String>> {
        Ok(self
            .resources
            .iter()
            .filter_map(|entry| entry.value().storage_key.clone())
            .collect())
    }

    async fn insert(&self, resource: &Resource) -> AppResult<()> {
        if self.resources.contains_key(&resource.id) {
            return Err(AppError::conflict(format!(
                "Resource {} already exists",
                resource.id
            )));
        }
        self.resources.insert(resource.id, resource.clone());
        Ok(())
    }

    async fn insert_many(&self, resources: &[Resource]) -> AppResult<()> {
        if let Some(dup) = resources.iter().find(|r| self.resources.contains_key(&r.id)) {
            return Err(AppError::conflict(format!(
                "Resource {} already exists",
                dup.id
            )));
        }
        for r in resources {
            self.resources.insert(r.id, r.clone());
        }
        Ok(())
    }

    async fn save(&self, resource: &Resource) -> AppResult<()> {
        match self.resources.get_mut(&resource.id) {
            Some(mut entry) => {
                *entry.value_mut() = resource.clone();
                Ok(())
            }
            None => Err(AppError::not_found(format!(
                "Resource {} not found",
                resource.id
            ))),
        }
    }

    async fn soft_delete_many(&self, ids: &[Uuid], at: DateTime<Utc>) -> AppResult<u64> {
        let mut count = 0;
        for id in ids {
            if let Some(mut entry) = self.resources.get_mut(id) {
                let r = entry.value_mut();
                r.is_deleted = true;
                r.deleted_at = Some(at);
                r.updated_at = at;
                count += 1;
            }
        }
        Ok(count)
    }

    async fn hard_delete_many(&self, ids: &[Uuid]) -> AppResult<u64> {
        Ok(ids
            .iter()
            .filter(|id| self.resources.remove(*id).is_some())
            .count() as u64)
    }
}

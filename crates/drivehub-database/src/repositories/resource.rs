//! Resource repository implementation.

use std::collections::HashSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use sqlx::types::Json;
use uuid::Uuid;

use drivehub_core::error::{AppError, ErrorKind};
use drivehub_core::result::AppResult;
use drivehub_entity::Resource;

use crate::store::{FolderKey, ResourceStore};

/// Rows per multi-row insert. Keeps the bind count well below the
/// PostgreSQL parameter limit.
const INSERT_CHUNK: usize = 1000;

/// Repository for resource nodes backed by the `resources` table.
#[derive(Debug, Clone)]
pub struct ResourceRepository {
    pool: PgPool,
}

impl ResourceRepository {
    /// Create a new resource repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ResourceStore for ResourceRepository {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Resource>> {
        sqlx::query_as::<_, Resource>("SELECT * FROM resources WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find resource", e))
    }

    async fn find_many(&self, ids: &[Uuid]) -> AppResult<Vec<Resource>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        sqlx::query_as::<_, Resource>("SELECT * FROM resources WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find resources", e))
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
        if parent_ids.is_empty() {
            return Ok(Vec::new());
        }
        sqlx::query_as::<_, Resource>(
            "SELECT * FROM resources WHERE parent_id = ANY($1) AND ($2 OR is_deleted = FALSE) \
             ORDER BY resource_type DESC, name ASC",
        )
        .bind(parent_ids)
        .bind(include_deleted)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list children", e))
    }

    async fn find_folders_by_keys(&self, keys: &[FolderKey]) -> AppResult<Vec<Resource>> {
        if keys.is_empty() {
            return Ok(Vec::new());
        }
        let (parents, names): (Vec<Uuid>, Vec<String>) = keys.iter().cloned().unzip();
        sqlx::query_as::<_, Resource>(
            "SELECT r.* FROM resources r \
             JOIN UNNEST($1::uuid[], $2::text[]) AS k(parent_id, name) \
               ON r.parent_id = k.parent_id AND r.name = k.name \
             WHERE r.resource_type = 'FOLDER' AND r.is_deleted = FALSE",
        )
        .bind(&parents)
        .bind(&names)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to look up folders by path", e)
        })
    }

    async fn find_deleted(&self) -> AppResult<Vec<Resource>> {
        sqlx::query_as::<_, Resource>(
            "SELECT * FROM resources WHERE is_deleted = TRUE ORDER BY deleted_at ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to list deleted resources", e)
        })
    }

    async fn find_shared_with(&self, user_id: Uuid) -> AppResult<Vec<Resource>> {
        sqlx::query_as::<_, Resource>(
            "SELECT * FROM resources \
             WHERE is_deleted = FALSE \
               AND shared_with @> jsonb_build_array(jsonb_build_object('user_id', $1::text)) \
             ORDER BY name ASC",
        )
        .bind(user_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to list shared resources", e)
        })
    }

    async fn find_referenced_keys(&self, keys: &[String]) -> AppResult<HashSet<String>> {
        if keys.is_empty() {
            return Ok(HashSet::new());
        }
        let rows: Vec<String> = sqlx::query_scalar(
            "SELECT DISTINCT storage_key FROM resources WHERE storage_key = ANY($1)",
        )
        .bind(keys)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to check key references", e)
        })?;
        Ok(rows.into_iter().collect())
    }

    async fn is_key_shared(&self, key: &str, except: Uuid) -> AppResult<bool> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM resources WHERE storage_key = $1 AND id <> $2)",
        )
        .bind(key)
        .bind(except)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to check key sharing", e)
        })
    }

    async fn list_storage_keys(&self) -> AppResult<HashSet<String>> {
        let rows: Vec<String> = sqlx::query_scalar(
            "SELECT DISTINCT storage_key FROM resources WHERE storage_key IS NOT NULL",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list storage keys", e))?;
        Ok(rows.into_iter().collect())
    }

    async fn insert(&self, resource: &Resource) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO resources \
             (id, name, resource_type, parent_id, owner_id, size, created_at, updated_at, \
              is_deleted, deleted_at, shared_with, storage_key) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)",
        )
        .bind(resource.id)
        .bind(&resource.name)
        .bind(resource.resource_type)
        .bind(resource.parent_id)
        .bind(resource.owner_id)
        .bind(resource.size)
        .bind(resource.created_at)
        .bind(resource.updated_at)
        .bind(resource.is_deleted)
        .bind(resource.deleted_at)
        .bind(Json(&resource.shared_with))
        .bind(&resource.storage_key)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to insert resource", e))?;
        Ok(())
    }

    async fn insert_many(&self, resources: &[Resource]) -> AppResult<()> {
        for chunk in resources.chunks(INSERT_CHUNK) {
            let mut ids = Vec::with_capacity(chunk.len());
            let mut names = Vec::with_capacity(chunk.len());
            let mut types = Vec::with_capacity(chunk.len());
            let mut parents = Vec::with_capacity(chunk.len());
            let mut owners = Vec::with_capacity(chunk.len());
            let mut sizes = Vec::with_capacity(chunk.len());
            let mut created = Vec::with_capacity(chunk.len());
            let mut updated = Vec::with_capacity(chunk.len());
            let mut grants = Vec::with_capacity(chunk.len());
            let mut keys = Vec::with_capacity(chunk.len());
            for r in chunk {
                ids.push(r.id);
                names.push(r.name.clone());
                types.push(r.resource_type.as_str().to_string());
                parents.push(r.parent_id);
                owners.push(r.owner_id);
                sizes.push(r.size);
                created.push(r.created_at);
                updated.push(r.updated_at);
                grants.push(serde_json::to_value(&r.shared_with)?);
                keys.push(r.storage_key.clone());
            }

            sqlx::query(
                "INSERT INTO resources \
                 (id, name, resource_type, parent_id, owner_id, size, created_at, updated_at, \
                  shared_with, storage_key) \
                 SELECT id, name, kind::resource_type, parent_id, owner_id, size, created_at, \
                        updated_at, shared_with, storage_key \
                 FROM UNNEST($1::uuid[], $2::text[], $3::text[], $4::uuid[], $5::uuid[], \
                             $6::int8[], $7::timestamptz[], $8::timestamptz[], $9::jsonb[], \
                             $10::text[]) \
                   AS t(id, name, kind, parent_id, owner_id, size, created_at, updated_at, \
                        shared_with, storage_key)",
            )
            .bind(&ids)
            .bind(&names)
            .bind(&types)
            .bind(&parents)
            .bind(&owners)
            .bind(&sizes)
            .bind(&created)
            .bind(&updated)
            .bind(&grants)
            .bind(&keys)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to bulk insert resources", e)
            })?;
        }
        Ok(())
    }

    async fn save(&self, resource: &Resource) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE resources SET name = $2, parent_id = $3, size = $4, updated_at = $5, \
             is_deleted = $6, deleted_at = $7, shared_with = $8, storage_key = $9 \
             WHERE id = $1",
        )
        .bind(resource.id)
        .bind(&resource.name)
        .bind(resource.parent_id)
        .bind(resource.size)
        .bind(resource.updated_at)
        .bind(resource.is_deleted)
        .bind(resource.deleted_at)
        .bind(Json(&resource.shared_with))
        .bind(&resource.storage_key)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to save resource", e))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!(
                "Resource {} not found",
                resource.id
            )));
        }
        Ok(())
    }

    async fn soft_delete_many(&self, ids: &[Uuid], at: DateTime<Utc>) -> AppResult<u64> {
        if ids.is_empty() {
            return Ok(0);
        }
        let result = sqlx::query(
            "UPDATE resources SET is_deleted = TRUE, deleted_at = $2, updated_at = $2 \
             WHERE id = ANY($1)",
        )
        .bind(ids)
        .bind(at)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to delete resources", e))?;
        Ok(result.rows_affected())
    }

    async fn hard_delete_many(&self, ids: &[Uuid]) -> AppResult<u64> {
        if ids.is_empty() {
            return Ok(0);
        }
        let result = sqlx::query("DELETE FROM resources WHERE id = ANY($1)")
            .bind(ids)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to purge resources", e)
            })?;
        Ok(result.rows_affected())
    }
}

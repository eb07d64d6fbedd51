//! Bulk path resolver.
//!
//! Resolves the folder part of many relative paths at once. Unique folder
//! paths are grouped by depth and each depth costs one batched lookup plus
//! at most one batched insert, so the number of store round trips depends
//! on the deepest path rather than on the number of files.
//!
//! Resolution is not atomic. A failure between depths leaves the folders
//! already created in place; re-running the same request finds them.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;
use std::time::Duration;

use tracing::debug;
use uuid::Uuid;

use drivehub_core::result::AppResult;
use drivehub_core::traits::BlobStorage;
use drivehub_database::{FolderKey, ResourceStore};
use drivehub_entity::{Delta, Resource};
use drivehub_storage::BlobStorageManager;

use crate::validation::folder_segments;

/// One file in an upload request.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct UploadFile {
    /// File name.
    pub file_name: String,
    /// MIME type passed to the presigned upload.
    #[serde(default = "default_content_type")]
    pub content_type: String,
    /// Path relative to the upload destination, e.g. `"A/B/name.txt"`.
    #[serde(default)]
    pub relative_path: Option<String>,
    /// Declared size in bytes.
    pub size: i64,
}

fn default_content_type() -> String {
    "application/octet-stream".to_string()
}

/// Where one file should be uploaded.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct PlannedUpload {
    /// Id reserved for the FILE resource created on confirmation.
    pub resource_id: Uuid,
    /// File name.
    pub file_name: String,
    /// Blob key the client must upload to.
    pub storage_key: String,
    /// Folder the file will live in.
    pub actual_parent_id: Uuid,
    /// Presigned upload reference.
    pub upload_url: String,
}

/// Result of resolving an upload batch.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct BulkResolution {
    /// One entry per requested file, in request order.
    pub uploads: Vec<PlannedUpload>,
    /// Folders created while resolving.
    pub delta: Delta,
}

/// Blob key for a file: `{owner_id}/{resource_id}/{file_name}`.
pub fn storage_key_for(owner_id: Uuid, resource_id: Uuid, file_name: &str) -> String {
    format!("{owner_id}/{resource_id}/{file_name}")
}

/// Blob key for rewritten content that must not land on `current`. Uses the
/// resource's own slot when free, otherwise a revision slot below it.
pub fn rewrite_key_for(
    owner_id: Uuid,
    resource_id: Uuid,
    file_name: &str,
    current: &str,
) -> String {
    let own = storage_key_for(owner_id, resource_id, file_name);
    if own != current {
        return own;
    }
    format!("{owner_id}/{resource_id}/{}/{file_name}", Uuid::new_v4().simple())
}

/// Resolves and creates nested folder paths for upload batches.
#[derive(Debug, Clone)]
pub struct BulkPathResolver {
    /// Resource store.
    resources: Arc<dyn ResourceStore>,
    /// Blob storage for presigned references.
    storage: Arc<BlobStorageManager>,
    /// Lifetime of presigned upload references.
    presign_expiry: Duration,
}

impl BulkPathResolver {
    /// Creates a new resolver.
    pub fn new(
        resources: Arc<dyn ResourceStore>,
        storage: Arc<BlobStorageManager>,
        presign_expiry: Duration,
    ) -> Self {
        Self {
            resources,
            storage,
            presign_expiry,
        }
    }

    /// Resolves every file's folder path under `root_parent_id`, creating
    /// missing folders owned by `owner_id`, and plans one upload per file.
    pub async fn resolve(
        &self,
        owner_id: Uuid,
        root_parent_id: Uuid,
        files: &[UploadFile],
    ) -> AppResult<BulkResolution> {
        let mut file_paths = Vec::with_capacity(files.len());
        let mut by_depth: BTreeMap<usize, BTreeSet<Vec<String>>> = BTreeMap::new();
        for file in files {
            let segments = match &file.relative_path {
                Some(path) => folder_segments(path)?,
                None => Vec::new(),
            };
            for depth in 1..=segments.len() {
                by_depth
                    .entry(depth)
                    .or_default()
                    .insert(segments[..depth].to_vec());
            }
            file_paths.push(segments);
        }

        let mut resolved: HashMap<Vec<String>, Uuid> = HashMap::new();
        let mut created = Vec::new();

        for (depth, paths) in by_depth {
            let keyed: Vec<(Vec<String>, FolderKey)> = paths
                .into_iter()
                .map(|path| {
                    let parent_id = match path.len() {
                        1 => root_parent_id,
                        n => resolved[&path[..n - 1]],
                    };
                    let name = path[path.len() - 1].clone();
                    (path, (parent_id, name))
                })
                .collect();

            let lookup: Vec<FolderKey> = keyed.iter().map(|(_, key)| key.clone()).collect();
            let mut existing: HashMap<FolderKey, Uuid> = HashMap::new();
            for folder in self.resources.find_folders_by_keys(&lookup).await? {
                if let Some(parent_id) = folder.parent_id {
                    existing.entry((parent_id, folder.name)).or_insert(folder.id);
                }
            }

            let mut missing = Vec::new();
            for (path, key) in keyed {
                let id = match existing.get(&key) {
                    Some(id) => *id,
                    None => {
                        let folder = Resource::new_folder(key.1, Some(key.0), owner_id);
                        let id = folder.id;
                        missing.push(folder);
                        id
                    }
                };
                resolved.insert(path, id);
            }

            if !missing.is_empty() {
                self.resources.insert_many(&missing).await?;
            }
            debug!(
                depth,
                found = existing.len(),
                created = missing.len(),
                "Upload paths resolved at depth"
            );
            created.extend(missing);
        }

        let mut uploads = Vec::with_capacity(files.len());
        for (file, segments) in files.iter().zip(file_paths) {
            let actual_parent_id = if segments.is_empty() {
                root_parent_id
            } else {
                resolved[&segments]
            };
            let resource_id = Uuid::new_v4();
            let storage_key = storage_key_for(owner_id, resource_id, &file.file_name);
            let upload_url = self
                .storage
                .presign_upload(&storage_key, &file.content_type, self.presign_expiry)
                .await?;
            uploads.push(PlannedUpload {
                resource_id,
                file_name: file.file_name.clone(),
                storage_key,
                actual_parent_id,
                upload_url,
            });
        }

        Ok(BulkResolution {
            uploads,
            delta: Delta::added(created),
        })
    }
}

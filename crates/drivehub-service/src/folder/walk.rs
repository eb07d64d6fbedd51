//! Worklist traversals over the parent-link forest.
//!
//! Descending walks read one level per store call; ascending walks read one
//! ancestor per call. Both keep a visited set so malformed cycles terminate.

use std::collections::HashSet;

use tracing::warn;
use uuid::Uuid;

use drivehub_core::result::AppResult;
use drivehub_database::ResourceStore;
use drivehub_entity::Resource;

/// `roots` followed by every descendant reachable from them, in
/// breadth-first order. With `include_deleted = false`, deleted children
/// and everything below them are skipped.
pub async fn collect_subtree(
    store: &dyn ResourceStore,
    roots: Vec<Resource>,
    include_deleted: bool,
) -> AppResult<Vec<Resource>> {
    let mut visited: HashSet<Uuid> = roots.iter().map(|r| r.id).collect();
    let mut frontier: Vec<Uuid> = roots.iter().filter(|r| r.is_folder()).map(|r| r.id).collect();
    let mut out = roots;

    while !frontier.is_empty() {
        let children = store.find_children_of(&frontier, include_deleted).await?;
        frontier = Vec::new();
        for child in children {
            if !visited.insert(child.id) {
                continue;
            }
            if child.is_folder() {
                frontier.push(child.id);
            }
            out.push(child);
        }
    }

    Ok(out)
}

/// Ids of the ancestors of `start`, nearest first, stopping at the root,
/// a missing parent, a repeated id, or `max_depth` hops.
pub async fn ancestor_ids(
    store: &dyn ResourceStore,
    start: &Resource,
    max_depth: usize,
) -> AppResult<Vec<Uuid>> {
    let mut ids = Vec::new();
    let mut seen = HashSet::from([start.id]);
    let mut next = start.parent_id;

    while let Some(parent_id) = next {
        if !seen.insert(parent_id) || ids.len() >= max_depth {
            warn!(resource_id = %start.id, "Ancestor chain truncated");
            break;
        }
        ids.push(parent_id);
        next = match store.find_by_id(parent_id).await? {
            Some(parent) => parent.parent_id,
            None => None,
        };
    }

    Ok(ids)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use drivehub_database::MemoryResourceStore;

    #[tokio::test]
    async fn test_subtree_is_breadth_first_and_respects_flags() {
        let store = MemoryResourceStore::new();
        let owner = Uuid::new_v4();
        let root = Resource::new_folder("root", None, owner);
        let a = Resource::new_folder("a", Some(root.id), owner);
        let b = Resource::new_folder("b", Some(a.id), owner);
        let f = Resource::new_file(Uuid::new_v4(), "f", b.id, owner, 3, "k");
        store
            .insert_many(&[root.clone(), a.clone(), b.clone(), f.clone()])
            .await
            .unwrap();

        let all = collect_subtree(&store, vec![root.clone()], false).await.unwrap();
        let ids: Vec<Uuid> = all.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![root.id, a.id, b.id, f.id]);

        store.soft_delete_many(&[a.id], Utc::now()).await.unwrap();
        let live = collect_subtree(&store, vec![root.clone()], false).await.unwrap();
        assert_eq!(live.len(), 1);
        let everything = collect_subtree(&store, vec![root], true).await.unwrap();
        assert_eq!(everything.len(), 4);
    }

    #[tokio::test]
    async fn test_ancestor_ids_nearest_first() {
        let store = MemoryResourceStore::new();
        let owner = Uuid::new_v4();
        let root = Resource::new_folder("root", None, owner);
        let a = Resource::new_folder("a", Some(root.id), owner);
        let b = Resource::new_folder("b", Some(a.id), owner);
        store
            .insert_many(&[root.clone(), a.clone(), b.clone()])
            .await
            .unwrap();

        assert_eq!(
            ancestor_ids(&store, &b, 16).await.unwrap(),
            vec![a.id, root.id]
        );
        assert_eq!(ancestor_ids(&store, &b, 1).await.unwrap(), vec![a.id]);
    }
}

//! Cache keys. Deployment-wide prefixes are added by the provider.

use uuid::Uuid;

/// Namespace for tree snapshots.
const TREE: &str = "tree";

/// Cache key for a user's flattened tree snapshot.
pub fn tree_snapshot(user_id: Uuid) -> String {
    format!("{TREE}:{user_id}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tree_key() {
        assert_eq!(
            tree_snapshot(Uuid::nil()),
            "tree:00000000-0000-0000-0000-000000000000"
        );
    }
}

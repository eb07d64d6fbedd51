//! Integration tests for tree assembly and cache invalidation.

mod helpers;

use drivehub_database::ResourceStore;
use drivehub_entity::{AccessLevel, Plan, Resource};
use drivehub_service::share::ShareRequest;

#[tokio::test]
async fn test_tree_skips_deleted_nodes_but_keeps_orphans() {
    let app = helpers::TestApp::new();
    let alice = app.register("alice", Plan::Normal).await;
    let a = app.folder(&alice, alice.root_id, "A").await;
    let b = app.folder(&alice, a.id, "B").await;
    let x = app.file(&alice, b.id, "x.txt", 3).await;

    let tree = app.tree_service.get_tree(&alice).await.unwrap();
    assert_eq!(tree.len(), 4);
    assert_eq!(tree.nodes[0].id, alice.root_id.to_string());
    assert_eq!(tree.nodes[0].name, "My Drive");
    assert!(tree.nodes[0].parent_id.is_none());

    app.mutation_service.delete_resource(&alice, a.id).await.unwrap();

    let tree = app.tree_service.get_tree(&alice).await.unwrap();
    assert!(tree.find(&a.id.to_string()).is_none());
    let orphan = tree.find(&b.id.to_string()).expect("orphan is emitted");
    assert_eq!(orphan.parent_id.as_deref(), Some(a.id.to_string().as_str()));
    assert!(tree.find(&x.id.to_string()).is_some());
}

#[tokio::test]
async fn test_tree_is_served_from_cache_until_invalidated() {
    let app = helpers::TestApp::new();
    let alice = app.register("alice", Plan::Normal).await;

    let first = app.tree_service.get_tree(&alice).await.unwrap();
    assert_eq!(first.len(), 1);

    let sneaky = Resource::new_folder("sneaky", Some(alice.root_id), alice.user_id);
    app.resources.insert_many(std::slice::from_ref(&sneaky)).await.unwrap();
    let cached = app.tree_service.get_tree(&alice).await.unwrap();
    assert_eq!(cached, first);

    app.folder(&alice, alice.root_id, "visible").await;
    let fresh = app.tree_service.get_tree(&alice).await.unwrap();
    assert_eq!(fresh.len(), 3);
}

#[tokio::test]
async fn test_grantee_writes_invalidate_owner_tree() {
    let app = helpers::TestApp::new();
    let alice = app.register("alice", Plan::Normal).await;
    let bob = app.register("bob", Plan::Normal).await;
    let team = app.folder(&alice, alice.root_id, "team").await;
    app.share_service
        .share_resource(
            &alice,
            ShareRequest {
                resource_id: team.id,
                username: "bob".to_string(),
                access_level: Some(AccessLevel::Editor),
            },
        )
        .await
        .unwrap();

    assert_eq!(app.tree_service.get_tree(&alice).await.unwrap().len(), 2);

    let added = app.folder(&bob, team.id, "from-bob").await;
    let tree = app.tree_service.get_tree(&alice).await.unwrap();
    assert!(tree.find(&added.id.to_string()).is_some());
}

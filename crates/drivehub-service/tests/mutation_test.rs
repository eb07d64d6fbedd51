//! Integration tests for move, copy, and delete.

mod helpers;

use uuid::Uuid;

use drivehub_core::ErrorKind;
use drivehub_entity::{AccessLevel, Plan};
use drivehub_service::resource::{CopyRequest, MoveRequest};
use drivehub_service::share::ShareRequest;

fn move_req(ids: &[Uuid], target: Uuid) -> MoveRequest {
    MoveRequest {
        resource_ids: ids.to_vec(),
        target_parent_id: target,
    }
}

fn copy_req(ids: &[Uuid], target: Uuid) -> CopyRequest {
    CopyRequest {
        resource_ids: ids.to_vec(),
        target_parent_id: target,
    }
}

#[tokio::test]
async fn test_move_into_self_is_rejected() {
    let app = helpers::TestApp::new();
    let alice = app.register("alice", Plan::Normal).await;
    let a = app.folder(&alice, alice.root_id, "A").await;

    let err = app
        .mutation_service
        .move_resources(&alice, move_req(&[a.id], a.id))
        .await
        .unwrap_err();
    assert!(err.is(ErrorKind::InvalidOperation));
    assert_eq!(app.get(a.id).await.unwrap().parent_id, Some(alice.root_id));
}

#[tokio::test]
async fn test_move_into_descendant_is_rejected_without_changes() {
    let app = helpers::TestApp::new();
    let alice = app.register("alice", Plan::Normal).await;
    let a = app.folder(&alice, alice.root_id, "A").await;
    let b = app.folder(&alice, a.id, "B").await;
    let c = app.folder(&alice, b.id, "C").await;
    let loose = app.folder(&alice, alice.root_id, "loose").await;

    let err = app
        .mutation_service
        .move_resources(&alice, move_req(&[loose.id, a.id], c.id))
        .await
        .unwrap_err();
    assert!(err.is(ErrorKind::InvalidOperation));
    assert_eq!(app.get(a.id).await.unwrap().parent_id, Some(alice.root_id));
    assert_eq!(app.get(loose.id).await.unwrap().parent_id, Some(alice.root_id));
}

#[tokio::test]
async fn test_move_drops_unwritable_roots_and_noops() {
    let app = helpers::TestApp::new();
    let alice = app.register("alice", Plan::Normal).await;
    let bob = app.register("bob", Plan::Normal).await;

    let shared = app.folder(&alice, alice.root_id, "shared").await;
    let theirs = app.file(&alice, shared.id, "theirs.txt", 5).await;
    app.share_service
        .share_resource(
            &alice,
            ShareRequest {
                resource_id: shared.id,
                username: "bob".to_string(),
                access_level: Some(AccessLevel::Read),
            },
        )
        .await
        .unwrap();

    let dest = app.folder(&bob, bob.root_id, "dest").await;
    let mine = app.folder(&bob, bob.root_id, "mine").await;
    let already = app.folder(&bob, dest.id, "already").await;

    let delta = app
        .mutation_service
        .move_resources(
            &bob,
            move_req(&[theirs.id, mine.id, already.id, Uuid::new_v4()], dest.id),
        )
        .await
        .unwrap();

    assert_eq!(delta.updated.len(), 1);
    assert_eq!(delta.updated[0].id, mine.id);
    assert_eq!(app.get(mine.id).await.unwrap().parent_id, Some(dest.id));
    assert_eq!(app.get(theirs.id).await.unwrap().parent_id, Some(shared.id));
}

#[tokio::test]
async fn test_move_never_reparents_a_root() {
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

    let delta = app
        .mutation_service
        .move_resources(&bob, move_req(&[bob.root_id], team.id))
        .await
        .unwrap();

    assert!(delta.is_empty());
    assert!(app.get(bob.root_id).await.unwrap().is_root());
}

#[tokio::test]
async fn test_move_into_unwritable_target_is_denied() {
    let app = helpers::TestApp::new();
    let alice = app.register("alice", Plan::Normal).await;
    let bob = app.register("bob", Plan::Normal).await;
    let mine = app.folder(&bob, bob.root_id, "mine").await;

    let err = app
        .mutation_service
        .move_resources(&bob, move_req(&[mine.id], alice.root_id))
        .await
        .unwrap_err();
    assert!(err.is(ErrorKind::AccessDenied));
}

#[tokio::test]
async fn test_copy_clones_subtree_and_charges_caller() {
    let app = helpers::TestApp::new();
    let alice = app.register("alice", Plan::Normal).await;
    let f = app.folder(&alice, alice.root_id, "F").await;
    let s = app.folder(&alice, f.id, "S").await;
    let x = app.file(&alice, s.id, "x.bin", 300).await;
    let gone = app.file(&alice, f.id, "gone.bin", 700).await;
    app.mutation_service
        .delete_resource(&alice, gone.id)
        .await
        .unwrap();
    let dest = app.folder(&alice, alice.root_id, "dest").await;

    let before = app.resources.len();
    let delta = app
        .mutation_service
        .copy_resources(&alice, copy_req(&[f.id], dest.id))
        .await
        .unwrap();

    assert_eq!(delta.added.len(), 3);
    assert_eq!(app.resources.len(), before + 3);
    assert_eq!(app.used(alice.user_id).await, 1000 + 300);

    let f2 = &delta.added[0];
    let s2 = &delta.added[1];
    let x2 = &delta.added[2];
    assert_eq!(f2.name, "F");
    assert_eq!(f2.parent_id, Some(dest.id));
    assert_eq!(s2.parent_id, Some(f2.id));
    assert_eq!(x2.parent_id, Some(s2.id));
    assert_ne!(x2.id, x.id);
    assert_eq!(x2.storage_key, x.storage_key);
    assert!(delta.added.iter().all(|r| r.owner_id == alice.user_id));
    assert_eq!(app.blobs.len(), 2, "bytes are not duplicated");
}

#[tokio::test]
async fn test_repeated_ids_act_once() {
    let app = helpers::TestApp::new();
    let alice = app.register("alice", Plan::Normal).await;
    let x = app.file(&alice, alice.root_id, "x.bin", 200).await;
    let y = app.file(&alice, alice.root_id, "y.bin", 50).await;
    let dest = app.folder(&alice, alice.root_id, "dest").await;

    let copied = app
        .mutation_service
        .copy_resources(&alice, copy_req(&[x.id, x.id], dest.id))
        .await
        .unwrap();
    assert_eq!(copied.added.len(), 1);
    assert_eq!(app.used(alice.user_id).await, 250 + 200);

    let moved = app
        .mutation_service
        .move_resources(&alice, move_req(&[x.id, x.id], dest.id))
        .await
        .unwrap();
    assert_eq!(moved.updated.len(), 1);

    let deleted = app
        .mutation_service
        .delete_resources_bulk(&alice, &[y.id, y.id])
        .await
        .unwrap();
    assert_eq!(deleted.deleted, vec![y.id]);
}

#[tokio::test]
async fn test_copy_over_quota_writes_nothing() {
    let app = helpers::TestApp::new();
    let alice = app.register("alice", Plan::Normal).await;
    let f = app.folder(&alice, alice.root_id, "F").await;
    app.file(&alice, f.id, "big.bin", 6000).await;

    let before = app.resources.len();
    let err = app
        .mutation_service
        .copy_resources(&alice, copy_req(&[f.id], alice.root_id))
        .await
        .unwrap_err();

    assert!(err.is(ErrorKind::QuotaExceeded));
    assert_eq!(app.resources.len(), before);
    assert_eq!(app.used(alice.user_id).await, 6000);
}

#[tokio::test]
async fn test_copy_read_only_source_into_own_tree() {
    let app = helpers::TestApp::new();
    let alice = app.register("alice", Plan::Normal).await;
    let bob = app.register("bob", Plan::Normal).await;
    let f = app.folder(&alice, alice.root_id, "F").await;
    app.file(&alice, f.id, "x.bin", 400).await;
    let private = app.folder(&alice, alice.root_id, "private").await;
    app.share_service
        .share_resource(
            &alice,
            ShareRequest {
                resource_id: f.id,
                username: "bob".to_string(),
                access_level: None,
            },
        )
        .await
        .unwrap();

    let delta = app
        .mutation_service
        .copy_resources(&bob, copy_req(&[f.id, private.id], bob.root_id))
        .await
        .unwrap();

    assert_eq!(delta.added.len(), 2, "unreadable source is dropped");
    assert!(delta.added.iter().all(|r| r.owner_id == bob.user_id));
    assert!(delta.added.iter().all(|r| r.shared_with.is_empty()));
    assert_eq!(app.used(bob.user_id).await, 400);
    assert_eq!(app.used(alice.user_id).await, 400);
}

#[tokio::test]
async fn test_delete_rules() {
    let app = helpers::TestApp::new();
    let alice = app.register("alice", Plan::Normal).await;
    let bob = app.register("bob", Plan::Normal).await;
    let a = app.folder(&alice, alice.root_id, "A").await;
    let inner = app.file(&alice, a.id, "inner.txt", 1).await;

    let err = app
        .mutation_service
        .delete_resource(&alice, alice.root_id)
        .await
        .unwrap_err();
    assert!(err.is(ErrorKind::InvalidOperation));

    let err = app
        .mutation_service
        .delete_resource(&bob, a.id)
        .await
        .unwrap_err();
    assert!(err.is(ErrorKind::AccessDenied));

    let delta = app.mutation_service.delete_resource(&alice, a.id).await.unwrap();
    assert_eq!(delta.deleted, vec![a.id]);

    let stored = app.get(a.id).await.unwrap();
    assert!(stored.is_deleted);
    assert!(stored.deleted_at.is_some());
    assert!(!app.get(inner.id).await.unwrap().is_deleted);

    let err = app
        .mutation_service
        .delete_resource(&alice, a.id)
        .await
        .unwrap_err();
    assert!(err.is(ErrorKind::NotFound));
}

#[tokio::test]
async fn test_bulk_delete_drops_failing_candidates() {
    let app = helpers::TestApp::new();
    let alice = app.register("alice", Plan::Normal).await;
    let bob = app.register("bob", Plan::Normal).await;
    let a = app.folder(&bob, bob.root_id, "a").await;
    let b = app.folder(&bob, bob.root_id, "b").await;
    let foreign = app.folder(&alice, alice.root_id, "foreign").await;

    let delta = app
        .mutation_service
        .delete_resources_bulk(
            &bob,
            &[a.id, b.id, foreign.id, bob.root_id, Uuid::new_v4()],
        )
        .await
        .unwrap();

    let mut deleted = delta.deleted.clone();
    deleted.sort();
    let mut expected = vec![a.id, b.id];
    expected.sort();
    assert_eq!(deleted, expected);
    assert!(!app.get(foreign.id).await.unwrap().is_deleted);
    assert!(!app.get(bob.root_id).await.unwrap().is_deleted);
}

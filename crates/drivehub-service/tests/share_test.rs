//! Integration tests for sharing and inherited access.

mod helpers;

use bytes::Bytes;

use drivehub_core::ErrorKind;
use drivehub_entity::{AccessLevel, Plan};
use drivehub_service::share::{ShareOutcome, ShareRequest};

fn share(resource_id: uuid::Uuid, username: &str, level: Option<AccessLevel>) -> ShareRequest {
    ShareRequest {
        resource_id,
        username: username.to_string(),
        access_level: level,
    }
}

#[tokio::test]
async fn test_read_share_then_delete_scenario() {
    let app = helpers::TestApp::new();
    let alice = app.register("alice", Plan::Normal).await;
    let bob = app.register("bob", Plan::Normal).await;

    let folder = app.folder(&alice, alice.root_id, "F").await;
    let file = app.file(&alice, folder.id, "x.bin", 500).await;
    assert_eq!(app.used(alice.user_id).await, 500);

    let outcome = app
        .share_service
        .share_resource(&alice, share(folder.id, "bob", Some(AccessLevel::Read)))
        .await
        .unwrap();
    assert_eq!(outcome, ShareOutcome::Shared);

    assert!(app.permissions.can_read(&file, bob.user_id).await.unwrap());
    assert!(!app.permissions.can_write(&file, bob.user_id).await.unwrap());

    let err = app
        .upload_service
        .update_resource_content(&bob, file.id, Bytes::from_static(b"overwrite"))
        .await
        .unwrap_err();
    assert!(err.is(ErrorKind::AccessDenied));

    app.mutation_service
        .delete_resource(&alice, folder.id)
        .await
        .unwrap();

    for ctx in [&alice, &bob] {
        let err = app
            .folder_service
            .get_folder_contents(ctx, folder.id)
            .await
            .unwrap_err();
        assert!(err.is(ErrorKind::NotFound));
    }

    let stored = app.get(file.id).await.unwrap();
    assert!(!stored.is_deleted, "delete must not cascade");
    assert!(app.get(folder.id).await.unwrap().is_deleted);
}

#[tokio::test]
async fn test_editor_share_allows_writes_below() {
    let app = helpers::TestApp::new();
    let alice = app.register("alice", Plan::Normal).await;
    let bob = app.register("bob", Plan::Normal).await;

    let folder = app.folder(&alice, alice.root_id, "Team").await;
    let file = app.file(&alice, folder.id, "notes.txt", 10).await;

    app.share_service
        .share_resource(&alice, share(folder.id, "bob", Some(AccessLevel::Editor)))
        .await
        .unwrap();

    let updated = app
        .upload_service
        .update_resource_content(&bob, file.id, Bytes::from_static(b"0123456789abcdef"))
        .await
        .unwrap();
    assert_eq!(updated.size, 16);
    assert_eq!(updated.owner_id, alice.user_id);
    assert_eq!(app.used(alice.user_id).await, 16);
    assert_eq!(app.used(bob.user_id).await, 0);

    let sub = app.folder(&bob, folder.id, "from-bob").await;
    assert_eq!(sub.owner_id, bob.user_id);
}

#[tokio::test]
async fn test_share_outcomes() {
    let app = helpers::TestApp::new();
    let alice = app.register("alice", Plan::Normal).await;
    app.register("bob", Plan::Normal).await;
    let folder = app.folder(&alice, alice.root_id, "F").await;

    let first = app
        .share_service
        .share_resource(&alice, share(folder.id, "bob", None))
        .await
        .unwrap();
    let again = app
        .share_service
        .share_resource(&alice, share(folder.id, "bob", Some(AccessLevel::Read)))
        .await
        .unwrap();
    let upgraded = app
        .share_service
        .share_resource(&alice, share(folder.id, "bob", Some(AccessLevel::Editor)))
        .await
        .unwrap();

    assert_eq!(first, ShareOutcome::Shared);
    assert_eq!(again, ShareOutcome::AlreadyShared);
    assert_eq!(upgraded, ShareOutcome::Updated);

    let stored = app.get(folder.id).await.unwrap();
    assert_eq!(stored.shared_with.len(), 1);
    assert_eq!(stored.shared_with[0].access_level, AccessLevel::Editor);
}

#[tokio::test]
async fn test_share_requires_owner_and_other_user() {
    let app = helpers::TestApp::new();
    let alice = app.register("alice", Plan::Normal).await;
    let bob = app.register("bob", Plan::Normal).await;
    app.register("carol", Plan::Normal).await;
    let folder = app.folder(&alice, alice.root_id, "F").await;

    app.share_service
        .share_resource(&alice, share(folder.id, "bob", Some(AccessLevel::Editor)))
        .await
        .unwrap();

    let err = app
        .share_service
        .share_resource(&bob, share(folder.id, "carol", None))
        .await
        .unwrap_err();
    assert!(err.is(ErrorKind::AccessDenied), "editors cannot reshare");

    let err = app
        .share_service
        .share_resource(&alice, share(folder.id, "alice", None))
        .await
        .unwrap_err();
    assert!(err.is(ErrorKind::InvalidOperation));

    let err = app
        .share_service
        .share_resource(&alice, share(folder.id, "nobody", None))
        .await
        .unwrap_err();
    assert!(err.is(ErrorKind::NotFound));
}

#[tokio::test]
async fn test_unshare_and_shared_listing() {
    let app = helpers::TestApp::new();
    let alice = app.register("alice", Plan::Normal).await;
    let bob = app.register("bob", Plan::Normal).await;
    let folder = app.folder(&alice, alice.root_id, "F").await;
    let other = app.folder(&alice, alice.root_id, "G").await;

    for id in [folder.id, other.id] {
        app.share_service
            .share_resource(&alice, share(id, "bob", None))
            .await
            .unwrap();
    }
    app.mutation_service
        .delete_resource(&alice, other.id)
        .await
        .unwrap();

    let shared = app.share_service.get_shared_resources(&bob).await.unwrap();
    assert_eq!(shared.len(), 1);
    assert_eq!(shared[0].id, folder.id);

    assert!(app
        .share_service
        .unshare_resource(&alice, folder.id, "bob")
        .await
        .unwrap());
    assert!(!app
        .share_service
        .unshare_resource(&alice, folder.id, "bob")
        .await
        .unwrap());
    let folder = app.get(folder.id).await.unwrap();
    assert!(folder.shared_with.is_empty());
    assert!(!app.permissions.can_read(&folder, bob.user_id).await.unwrap());
}

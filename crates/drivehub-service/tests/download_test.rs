//! Integration tests for download links and folder manifests.

mod helpers;

use drivehub_core::ErrorKind;
use drivehub_core::traits::Disposition;
use drivehub_entity::Plan;
use drivehub_service::share::ShareRequest;

#[tokio::test]
async fn test_manifest_lists_files_relative_to_folder() {
    let app = helpers::TestApp::new();
    let alice = app.register("alice", Plan::Normal).await;
    let f = app.folder(&alice, alice.root_id, "Photos").await;
    let s = app.folder(&alice, f.id, "2024").await;
    app.folder(&alice, f.id, "empty").await;
    let a = app.file(&alice, f.id, "a.jpg", 10).await;
    let b = app.file(&alice, s.id, "b.jpg", 20).await;
    let gone = app.file(&alice, s.id, "gone.jpg", 30).await;
    app.mutation_service
        .delete_resource(&alice, gone.id)
        .await
        .unwrap();

    let manifest = app
        .download_service
        .folder_manifest(&alice, f.id)
        .await
        .unwrap();

    assert_eq!(manifest.archive_name, "Photos.zip");
    let entries: Vec<(&str, &str, i64)> = manifest
        .entries
        .iter()
        .map(|e| (e.path.as_str(), e.storage_key.as_str(), e.size))
        .collect();
    assert_eq!(
        entries,
        vec![
            ("a.jpg", a.storage_key.as_deref().unwrap(), 10),
            ("2024/b.jpg", b.storage_key.as_deref().unwrap(), 20),
        ]
    );
}

#[tokio::test]
async fn test_manifest_of_empty_folder_is_not_found() {
    let app = helpers::TestApp::new();
    let alice = app.register("alice", Plan::Normal).await;
    let f = app.folder(&alice, alice.root_id, "F").await;
    app.folder(&alice, f.id, "only-folders").await;

    let err = app
        .download_service
        .folder_manifest(&alice, f.id)
        .await
        .unwrap_err();
    assert!(err.is(ErrorKind::NotFound));
}

#[tokio::test]
async fn test_download_link_access() {
    let app = helpers::TestApp::new();
    let alice = app.register("alice", Plan::Normal).await;
    let bob = app.register("bob", Plan::Normal).await;
    let f = app.folder(&alice, alice.root_id, "F").await;
    let file = app.file(&alice, f.id, "doc.txt", 5).await;

    let link = app
        .download_service
        .download_link(&alice, file.id, Disposition::Inline)
        .await
        .unwrap();
    assert_eq!(link.resource_id, file.id);
    assert!(link.url.contains(file.storage_key.as_deref().unwrap()));
    assert_eq!(link.expires_in_seconds, 3600);

    let err = app
        .download_service
        .download_link(&bob, file.id, Disposition::Attachment)
        .await
        .unwrap_err();
    assert!(err.is(ErrorKind::AccessDenied));

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
    assert!(app
        .download_service
        .download_link(&bob, file.id, Disposition::Attachment)
        .await
        .is_ok());

    let err = app
        .download_service
        .download_link(&alice, f.id, Disposition::Attachment)
        .await
        .unwrap_err();
    assert!(err.is(ErrorKind::InvalidOperation));
}

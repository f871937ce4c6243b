// Unit tests for DiskUploadStore

use certificate_registry::api::UploadStore;
use certificate_registry::certificate::uploads::DiskUploadStore;
use certificate_registry::core::models::Upload;
use std::path::Path;
use tempfile::TempDir;

#[tokio::test]
async fn test_store_writes_bytes_under_root() {
    let dir = TempDir::new().unwrap();
    let store = DiskUploadStore::new(dir.path());

    let reference = store
        .store(&Upload {
            file_name: "diploma.png".to_string(),
            bytes: b"png-bytes".to_vec(),
        })
        .await
        .unwrap();

    let path = Path::new(&reference);
    assert!(path.starts_with(dir.path()));
    assert!(reference.ends_with("-diploma.png"));
    assert_eq!(std::fs::read(path).unwrap(), b"png-bytes");
}

#[tokio::test]
async fn test_store_creates_missing_root() {
    let dir = TempDir::new().unwrap();
    let root = dir.path().join("nested").join("uploads");
    let store = DiskUploadStore::new(&root);

    store
        .store(&Upload {
            file_name: "a.jpg".to_string(),
            bytes: vec![0xff, 0xd8],
        })
        .await
        .unwrap();

    assert!(root.is_dir());
}

#[tokio::test]
async fn test_traversal_names_stay_inside_root() {
    let dir = TempDir::new().unwrap();
    let store = DiskUploadStore::new(dir.path());

    let reference = store
        .store(&Upload {
            file_name: "../../outside.png".to_string(),
            bytes: vec![1],
        })
        .await
        .unwrap();

    let path = Path::new(&reference);
    assert_eq!(path.parent().unwrap(), dir.path());
    assert!(!dir.path().parent().unwrap().join("outside.png").exists());
}

// Disk storage for uploaded certificate images

use crate::api::UploadStore;
use crate::core::errors::ServiceError;
use crate::core::models::Upload;
use async_trait::async_trait;
use chrono::Utc;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::debug;
use uuid::Uuid;

/// Writes uploads under a root directory as `{unix_millis}-{uuid}-{file_name}`
pub struct DiskUploadStore {
    root: PathBuf,
}

impl DiskUploadStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &PathBuf {
        &self.root
    }
}

/// Reduce a client-supplied file name to a single safe path component
pub fn sanitize_file_name(name: &str) -> String {
    let last = name.rsplit(['/', '\\']).next().unwrap_or("");
    let cleaned: String = last
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'))
        .collect();
    let cleaned = cleaned.trim_start_matches('.');

    if cleaned.is_empty() {
        "upload".to_string()
    } else {
        cleaned.to_string()
    }
}

#[async_trait]
impl UploadStore for DiskUploadStore {
    async fn store(&self, upload: &Upload) -> Result<String, ServiceError> {
        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|e| ServiceError::UploadError(format!("Failed to create upload dir: {}", e)))?;

        let file_name = format!(
            "{}-{}-{}",
            Utc::now().timestamp_millis(),
            Uuid::new_v4().simple(),
            sanitize_file_name(&upload.file_name)
        );
        let path = self.root.join(file_name);

        // create_new: never truncate another upload's file
        let mut file = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
            .map_err(|e| ServiceError::UploadError(format!("Failed to create upload: {}", e)))?;
        file.write_all(&upload.bytes)
            .await
            .map_err(|e| ServiceError::UploadError(format!("Failed to write upload: {}", e)))?;
        file.flush()
            .await
            .map_err(|e| ServiceError::UploadError(format!("Failed to write upload: {}", e)))?;

        debug!(path = %path.display(), bytes = upload.bytes.len(), "Upload stored");
        Ok(path.to_string_lossy().into_owned())
    }

    async fn remove(&self, reference: &str) -> Result<(), ServiceError> {
        let path = Path::new(reference);
        if path.parent() != Some(self.root.as_path()) {
            return Err(ServiceError::UploadError(
                "Refusing to remove a file outside the upload directory".to_string(),
            ));
        }

        match tokio::fs::remove_file(path).await {
            Ok(()) => {
                debug!(path = %path.display(), "Upload removed");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(ServiceError::UploadError(format!("Failed to remove upload: {}", e))),
        }
    }
}

// Certificate record creation and retrieval

use crate::api::{StudentStore, UploadStore};
use crate::certificate::qr::{verification_url, QrEncoder};
use crate::core::errors::ServiceError;
use crate::core::models::{CertificateId, NewStudent, StudentRecord, Upload};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Issues and looks up certificate records
pub struct CertificateService {
    store: Arc<dyn StudentStore + Send + Sync>,
    uploads: Arc<dyn UploadStore + Send + Sync>,
    qr: QrEncoder,
    verification_base_url: String,
}

impl CertificateService {
    pub fn new(
        store: Arc<dyn StudentStore + Send + Sync>,
        uploads: Arc<dyn UploadStore + Send + Sync>,
        qr: QrEncoder,
        verification_base_url: String,
    ) -> Self {
        Self {
            store,
            uploads,
            qr,
            verification_base_url,
        }
    }

    /// Create a certificate record
    ///
    /// The id must exist before the QR payload, which embeds it:
    /// id -> verification URL -> QR data URI -> stored image -> persist.
    pub async fn create(
        &self,
        fields: NewStudent,
        image: Option<Upload>,
    ) -> Result<StudentRecord, ServiceError> {
        let certificate_id = CertificateId::generate();
        let url = verification_url(&self.verification_base_url, &certificate_id);

        let qr_code = self.qr.encode_data_uri(&url).map_err(|e| {
            error!(error = %e, certificate_id = %certificate_id, "QR encoding failed");
            e
        })?;

        let image_url = match image {
            Some(ref upload) => self.uploads.store(upload).await.map_err(|e| {
                error!(error = %e, certificate_id = %certificate_id, "Image upload failed");
                e
            })?,
            None => String::new(),
        };

        let record = StudentRecord::new(fields, certificate_id, qr_code, image_url);

        if let Err(e) = self.store.insert(&record).await {
            error!(error = %e, certificate_id = %certificate_id, "Failed to persist certificate");
            if !record.image_url.is_empty() {
                if let Err(cleanup) = self.uploads.remove(&record.image_url).await {
                    warn!(
                        error = %cleanup,
                        image_url = %record.image_url,
                        "Failed to remove orphaned upload"
                    );
                }
            }
            return Err(e);
        }

        info!(
            certificate_id = %certificate_id,
            has_image = !record.image_url.is_empty(),
            "Certificate created"
        );
        Ok(record)
    }

    pub async fn list(&self) -> Result<Vec<StudentRecord>, ServiceError> {
        self.store.list().await
    }

    /// Fetch by generated certificate id; `NotFound` when absent
    pub async fn get(&self, certificate_id: &str) -> Result<StudentRecord, ServiceError> {
        self.store
            .find_by_certificate_id(certificate_id)
            .await?
            .ok_or(ServiceError::NotFound)
    }

    pub async fn ping(&self) -> Result<(), ServiceError> {
        self.store.ping().await
    }
}

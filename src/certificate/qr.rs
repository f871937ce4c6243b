// Verification links and their QR encoding

use crate::core::errors::ServiceError;
use crate::core::models::CertificateId;
use base64::{engine::general_purpose::STANDARD, Engine};
use qrcode::render::svg;
use qrcode::QrCode;

const DATA_URI_PREFIX: &str = "data:image/svg+xml;base64,";

/// Build the public verification link for a certificate
pub fn verification_url(base_url: &str, certificate_id: &CertificateId) -> String {
    format!("{}/student/{}", base_url.trim_end_matches('/'), certificate_id)
}

/// Renders text as a QR code inside a data URI
#[derive(Debug, Clone, Copy)]
pub struct QrEncoder {
    min_size: u32,
}

impl QrEncoder {
    pub fn new(min_size: u32) -> Self {
        Self { min_size }
    }

    /// Encode `data` as an SVG QR code, base64 data URI
    pub fn encode_data_uri(&self, data: &str) -> Result<String, ServiceError> {
        let code = QrCode::new(data.as_bytes())
            .map_err(|e| ServiceError::EncodingError(format!("Failed to build QR code: {}", e)))?;

        let image = code
            .render::<svg::Color>()
            .min_dimensions(self.min_size, self.min_size)
            .build();

        Ok(format!("{}{}", DATA_URI_PREFIX, STANDARD.encode(image.as_bytes())))
    }
}

impl Default for QrEncoder {
    fn default() -> Self {
        Self::new(200)
    }
}

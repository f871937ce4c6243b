//! Domain models for the certificate registry.
//!
//! Plain data structures for certificate records, accounts and token claims.
//! Nothing in here performs I/O.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

/// Newtype wrapper around Uuid for the generated certificate identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CertificateId(Uuid);

impl CertificateId {
    /// Generate a new random CertificateId
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl FromStr for CertificateId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(CertificateId)
    }
}

impl From<CertificateId> for String {
    fn from(id: CertificateId) -> Self {
        id.0.to_string()
    }
}

impl TryFrom<String> for CertificateId {
    type Error = uuid::Error;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Uuid::parse_str(&s).map(CertificateId)
    }
}

impl std::fmt::Display for CertificateId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Certificate fields as submitted by the client
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewStudent {
    pub student_name: String,
    pub course_name: String,
    pub certificate_number: String,
    pub passing_year: String,
    pub course_duration: String,
    pub skills: String,
}

impl NewStudent {
    /// Set a field by its form name. Returns false for unknown names.
    pub fn set_field(&mut self, name: &str, value: String) -> bool {
        let slot = match name {
            "studentName" => &mut self.student_name,
            "courseName" => &mut self.course_name,
            "certificateNumber" => &mut self.certificate_number,
            "passingYear" => &mut self.passing_year,
            "courseDuration" => &mut self.course_duration,
            "skills" => &mut self.skills,
            _ => return false,
        };
        *slot = value;
        true
    }
}

/// A stored certificate record
///
/// Immutable once persisted. `certificate_id` is the public lookup key; the
/// store's own row key never leaves the storage layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentRecord {
    pub student_name: String,
    pub course_name: String,
    pub certificate_number: String,
    pub passing_year: String,
    pub course_duration: String,
    pub skills: String,
    pub certificate_id: String,
    pub qr_code: String,
    pub image_url: String,
    pub created_at: DateTime<Utc>,
}

impl StudentRecord {
    /// Assemble a record from submitted fields and the generated parts
    pub fn new(
        fields: NewStudent,
        certificate_id: CertificateId,
        qr_code: String,
        image_url: String,
    ) -> Self {
        Self {
            student_name: fields.student_name,
            course_name: fields.course_name,
            certificate_number: fields.certificate_number,
            passing_year: fields.passing_year,
            course_duration: fields.course_duration,
            skills: fields.skills,
            certificate_id: certificate_id.to_string(),
            qr_code,
            image_url,
            created_at: Utc::now(),
        }
    }
}

/// An uploaded file pulled out of a multipart form
#[derive(Clone)]
pub struct Upload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl std::fmt::Debug for Upload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Upload")
            .field("file_name", &self.file_name)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Stored account. The password is only ever held as a bcrypt hash.
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: crate::auth::password::PasswordHash,
}

/// Account about to be inserted
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: crate::auth::password::PasswordHash,
}

/// JWT payload. `user_id` is the only identity claim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    #[serde(rename = "userId")]
    pub user_id: String,
    pub iat: i64,
    pub exp: i64,
}

/// Identity attached to a request by the auth middleware
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: String,
}

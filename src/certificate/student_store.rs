// Database-backed certificate record storage with read-through cache

use crate::api::StudentStore;
use crate::core::errors::ServiceError;
use crate::core::models::StudentRecord;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use moka::future::Cache;
use sqlx::{FromRow, PgPool};
use std::sync::Arc;

/// Database row structure for certificate lookup
#[derive(FromRow)]
struct StudentRow {
    student_name: String,
    course_name: String,
    certificate_number: String,
    passing_year: String,
    course_duration: String,
    skills: String,
    certificate_id: String,
    qr_code: String,
    image_url: String,
    created_at: DateTime<Utc>,
}

impl From<StudentRow> for StudentRecord {
    fn from(r: StudentRow) -> Self {
        StudentRecord {
            student_name: r.student_name,
            course_name: r.course_name,
            certificate_number: r.certificate_number,
            passing_year: r.passing_year,
            course_duration: r.course_duration,
            skills: r.skills,
            certificate_id: r.certificate_id,
            qr_code: r.qr_code,
            image_url: r.image_url,
            created_at: r.created_at,
        }
    }
}

const SELECT_COLUMNS: &str = "student_name, course_name, certificate_number, passing_year, \
     course_duration, skills, certificate_id, qr_code, image_url, created_at";

/// Database-backed certificate store with in-memory caching
///
/// Records never change after insert, so cached entries are never stale and
/// only expire to bound memory.
pub struct DbStudentStore {
    db_pool: PgPool,
    cache: Cache<String, Arc<StudentRecord>>,
}

impl DbStudentStore {
    /// Create a new database-backed certificate store
    pub fn new(db_pool: PgPool) -> Self {
        let cache = Cache::builder()
            .time_to_live(std::time::Duration::from_secs(300)) // 5 minutes
            .max_capacity(1000)
            .build();

        Self { db_pool, cache }
    }
}

#[async_trait]
impl StudentStore for DbStudentStore {
    async fn insert(&self, record: &StudentRecord) -> Result<(), ServiceError> {
        sqlx::query(
            "INSERT INTO students (student_name, course_name, certificate_number, passing_year,
                                   course_duration, skills, certificate_id, qr_code, image_url, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
        )
        .bind(&record.student_name)
        .bind(&record.course_name)
        .bind(&record.certificate_number)
        .bind(&record.passing_year)
        .bind(&record.course_duration)
        .bind(&record.skills)
        .bind(&record.certificate_id)
        .bind(&record.qr_code)
        .bind(&record.image_url)
        .bind(record.created_at)
        .execute(&self.db_pool)
        .await?;

        self.cache
            .insert(record.certificate_id.clone(), Arc::new(record.clone()))
            .await;

        Ok(())
    }

    async fn list(&self) -> Result<Vec<StudentRecord>, ServiceError> {
        let rows = sqlx::query_as::<_, StudentRow>(&format!(
            "SELECT {} FROM students ORDER BY id",
            SELECT_COLUMNS
        ))
        .fetch_all(&self.db_pool)
        .await?;

        Ok(rows.into_iter().map(StudentRecord::from).collect())
    }

    async fn find_by_certificate_id(
        &self,
        certificate_id: &str,
    ) -> Result<Option<StudentRecord>, ServiceError> {
        // Check cache first
        if let Some(cached) = self.cache.get(certificate_id).await {
            return Ok(Some((*cached).clone()));
        }

        let row = sqlx::query_as::<_, StudentRow>(&format!(
            "SELECT {} FROM students WHERE certificate_id = $1",
            SELECT_COLUMNS
        ))
        .bind(certificate_id)
        .fetch_optional(&self.db_pool)
        .await?;

        let record = row.map(StudentRecord::from);

        // Cache if found
        if let Some(ref found) = record {
            self.cache
                .insert(certificate_id.to_string(), Arc::new(found.clone()))
                .await;
        }

        Ok(record)
    }

    async fn ping(&self) -> Result<(), ServiceError> {
        sqlx::query("SELECT 1")
            .execute(&self.db_pool)
            .await
            .map(|_| ())
            .map_err(|e| ServiceError::StorageError(format!("Database ping failed: {}", e)))
    }
}

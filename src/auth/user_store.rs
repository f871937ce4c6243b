// Database-backed account storage

use crate::api::UserStore;
use crate::auth::password::PasswordHash;
use crate::core::errors::ServiceError;
use crate::core::models::{NewUser, User};
use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use tracing::debug;
use uuid::Uuid;

/// PostgreSQL SQLSTATE for unique constraint violations
const UNIQUE_VIOLATION: &str = "23505";

/// Database row structure for account lookup
#[derive(FromRow)]
struct UserRow {
    id: Uuid,
    name: String,
    email: String,
    password_hash: String,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            name: row.name,
            email: row.email,
            password_hash: PasswordHash::from_stored(row.password_hash),
        }
    }
}

/// Account store on top of the `users` table
///
/// Email uniqueness is enforced by the table's UNIQUE constraint, so two
/// concurrent registrations for the same address cannot both succeed.
pub struct DbUserStore {
    db_pool: PgPool,
}

impl DbUserStore {
    pub fn new(db_pool: PgPool) -> Self {
        Self { db_pool }
    }
}

/// Map an insert failure, singling out duplicate emails
fn map_insert_error(err: sqlx::Error) -> ServiceError {
    if let sqlx::Error::Database(ref db_err) = err {
        if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) {
            return ServiceError::DuplicateEmail;
        }
    }
    ServiceError::StorageError(err.to_string())
}

#[async_trait]
impl UserStore for DbUserStore {
    async fn create_user(&self, user: NewUser) -> Result<User, ServiceError> {
        let row = sqlx::query_as::<_, UserRow>(
            "INSERT INTO users (id, name, email, password_hash)
             VALUES ($1, $2, $3, $4)
             RETURNING id, name, email, password_hash",
        )
        .bind(Uuid::new_v4())
        .bind(&user.name)
        .bind(&user.email)
        .bind(user.password_hash.as_str())
        .fetch_one(&self.db_pool)
        .await
        .map_err(map_insert_error)?;

        debug!(user_id = %row.id, "Account row inserted");
        Ok(row.into())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, ServiceError> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, name, email, password_hash
             FROM users
             WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.db_pool)
        .await?;

        Ok(row.map(User::from))
    }

    async fn ping(&self) -> Result<(), ServiceError> {
        sqlx::query("SELECT 1")
            .execute(&self.db_pool)
            .await
            .map(|_| ())
            .map_err(|e| ServiceError::StorageError(format!("Database ping failed: {}", e)))
    }
}

//! Admin repository for database operations
//!
//! Stores admin credential records with bcrypt password hashes.

use sqlx::PgPool;
use uuid::Uuid;

use crate::core::auth::store::CredentialStore;
use crate::core::db::models::{Admin, NewAdmin};

/// Cost factor for bcrypt hashing
const BCRYPT_COST: u32 = if cfg!(test) { 4 } else { 12 };

const ADMIN_COLUMNS: &str =
    "id, email, password_hash, name, role, is_active, created_by, created_at, updated_at";

/// Admin repository error types
#[derive(Debug, thiserror::Error)]
pub enum AdminRepositoryError {
    #[error("Admin not found")]
    NotFound,

    #[error("Email already exists")]
    EmailAlreadyExists,

    #[error("Password hashing failed: {0}")]
    HashingError(String),

    #[error("Credential store unavailable")]
    StoreUnavailable,

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
}

/// PostgreSQL-backed admin repository
#[derive(Clone)]
pub struct AdminRepository {
    pool: PgPool,
}

impl AdminRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Hash a password using bcrypt with automatic salt generation
    pub fn hash_password(password: &str) -> Result<String, AdminRepositoryError> {
        bcrypt::hash(password, BCRYPT_COST)
            .map_err(|e| AdminRepositoryError::HashingError(e.to_string()))
    }

    /// Verify a password against a bcrypt hash
    pub fn verify_password(password: &str, hash: &str) -> Result<bool, AdminRepositoryError> {
        bcrypt::verify(password, hash)
            .map_err(|e| AdminRepositoryError::HashingError(e.to_string()))
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}

impl CredentialStore for AdminRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<Admin>, AdminRepositoryError> {
        let admin = sqlx::query_as::<_, Admin>(&format!(
            "SELECT {ADMIN_COLUMNS} FROM admins WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(admin)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Admin>, AdminRepositoryError> {
        let admin = sqlx::query_as::<_, Admin>(&format!(
            "SELECT {ADMIN_COLUMNS} FROM admins WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(admin)
    }

    async fn list(&self) -> Result<Vec<Admin>, AdminRepositoryError> {
        let admins = sqlx::query_as::<_, Admin>(&format!(
            "SELECT {ADMIN_COLUMNS} FROM admins ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(admins)
    }

    async fn create(&self, admin: NewAdmin) -> Result<Admin, AdminRepositoryError> {
        let password_hash = Self::hash_password(&admin.password)?;

        let created = sqlx::query_as::<_, Admin>(&format!(
            r#"
            INSERT INTO admins (email, password_hash, name, role, created_by)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {ADMIN_COLUMNS}
            "#
        ))
        .bind(&admin.email)
        .bind(&password_hash)
        .bind(&admin.name)
        .bind(admin.role)
        .bind(admin.created_by)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AdminRepositoryError::EmailAlreadyExists
            } else {
                AdminRepositoryError::DatabaseError(e)
            }
        })?;

        Ok(created)
    }

    async fn set_active(&self, id: Uuid, is_active: bool) -> Result<Admin, AdminRepositoryError> {
        sqlx::query_as::<_, Admin>(&format!(
            r#"
            UPDATE admins
            SET is_active = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING {ADMIN_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(is_active)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(AdminRepositoryError::NotFound)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AdminRepositoryError> {
        let result = sqlx::query("DELETE FROM admins WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn count(&self) -> Result<i64, AdminRepositoryError> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM admins")
            .fetch_one(&self.pool)
            .await?;

        Ok(count.0)
    }
}

//! Credential store abstraction
//!
//! `AuthService` and the admin management API only talk to this trait. The
//! PostgreSQL `AdminRepository` is the production implementation;
//! `MemoryCredentialStore` backs tests and local tooling.

use std::sync::RwLock;

use chrono::Utc;
use uuid::Uuid;

use crate::core::db::models::{Admin, NewAdmin};
use crate::core::db::repositories::{AdminRepository, AdminRepositoryError};

/// Persistence for admin credential records
#[trait_variant::make(CredentialStore: Send)]
pub trait LocalCredentialStore {
    /// Find a record by (normalized) email
    async fn find_by_email(&self, email: &str) -> Result<Option<Admin>, AdminRepositoryError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Admin>, AdminRepositoryError>;

    /// All records, newest first
    async fn list(&self) -> Result<Vec<Admin>, AdminRepositoryError>;

    /// Insert a record, hashing the plain-text password
    async fn create(&self, admin: NewAdmin) -> Result<Admin, AdminRepositoryError>;

    async fn set_active(&self, id: Uuid, is_active: bool) -> Result<Admin, AdminRepositoryError>;

    /// Returns whether a record was removed
    async fn delete(&self, id: Uuid) -> Result<bool, AdminRepositoryError>;

    async fn count(&self) -> Result<i64, AdminRepositoryError>;
}

/// In-memory credential store
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    admins: RwLock<Vec<Admin>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, Vec<Admin>>, AdminRepositoryError> {
        self.admins
            .read()
            .map_err(|_| AdminRepositoryError::StoreUnavailable)
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, Vec<Admin>>, AdminRepositoryError> {
        self.admins
            .write()
            .map_err(|_| AdminRepositoryError::StoreUnavailable)
    }
}

impl CredentialStore for MemoryCredentialStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<Admin>, AdminRepositoryError> {
        Ok(self.read()?.iter().find(|a| a.email == email).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Admin>, AdminRepositoryError> {
        Ok(self.read()?.iter().find(|a| a.id == id).cloned())
    }

    async fn list(&self) -> Result<Vec<Admin>, AdminRepositoryError> {
        let mut admins = self.read()?.clone();
        admins.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(admins)
    }

    async fn create(&self, admin: NewAdmin) -> Result<Admin, AdminRepositoryError> {
        let password_hash = AdminRepository::hash_password(&admin.password)?;
        let mut admins = self.write()?;

        if admins.iter().any(|a| a.email == admin.email) {
            return Err(AdminRepositoryError::EmailAlreadyExists);
        }

        let now = Utc::now();
        let record = Admin {
            id: Uuid::new_v4(),
            email: admin.email,
            password_hash,
            name: admin.name,
            role: admin.role,
            is_active: true,
            created_by: admin.created_by,
            created_at: now,
            updated_at: now,
        };
        admins.push(record.clone());

        Ok(record)
    }

    async fn set_active(&self, id: Uuid, is_active: bool) -> Result<Admin, AdminRepositoryError> {
        let mut admins = self.write()?;
        let admin = admins
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or(AdminRepositoryError::NotFound)?;

        admin.is_active = is_active;
        admin.updated_at = Utc::now();
        Ok(admin.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AdminRepositoryError> {
        let mut admins = self.write()?;
        let before = admins.len();
        admins.retain(|a| a.id != id);
        Ok(admins.len() < before)
    }

    async fn count(&self) -> Result<i64, AdminRepositoryError> {
        Ok(self.read()?.len() as i64)
    }
}

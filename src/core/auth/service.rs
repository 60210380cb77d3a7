//! Authentication service
//!
//! Credential validation, token issuance and refresh. Coordinates the
//! credential store with the JWT service.

use std::sync::{Arc, LazyLock};

use uuid::Uuid;

use crate::core::auth::jwt::{Claims, JwtError, JwtService, TokenPair};
use crate::core::auth::store::CredentialStore;
use crate::core::db::models::{Admin, NewAdmin};
use crate::core::db::repositories::{AdminRepository, AdminRepositoryError};
use crate::core::protocol::{AdminRole, AdminSummary};

/// Hash compared against when the email is unknown, so a lookup miss costs
/// the same bcrypt work as a password mismatch.
static DUMMY_HASH: LazyLock<Option<String>> =
    LazyLock::new(|| AdminRepository::hash_password("shopfront-timing-equalizer").ok());

/// Authentication service error types
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Account inactive")]
    AccountInactive,

    #[error("Authentication required")]
    MissingToken,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Token expired")]
    TokenExpired,

    #[error("Insufficient permissions")]
    Forbidden,

    #[error("Admin not found")]
    AdminNotFound,

    #[error("Email already registered")]
    EmailAlreadyExists,

    #[error("Admins cannot delete their own account")]
    CannotDeleteSelf,

    #[error("Admins cannot change their own status")]
    CannotChangeOwnStatus,

    #[error("Password too short (minimum 8 characters)")]
    PasswordTooShort,

    #[error("Password must contain upper-case, lower-case and digit characters")]
    PasswordTooWeak,

    #[error("Invalid email format")]
    InvalidEmail,

    #[error("Name must not be empty")]
    InvalidName,

    #[error("Malformed request body: {0}")]
    MalformedBody(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl From<AdminRepositoryError> for AuthError {
    fn from(err: AdminRepositoryError) -> Self {
        match err {
            AdminRepositoryError::NotFound => AuthError::AdminNotFound,
            AdminRepositoryError::EmailAlreadyExists => AuthError::EmailAlreadyExists,
            _ => AuthError::InternalError(err.to_string()),
        }
    }
}

impl From<JwtError> for AuthError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::Expired => AuthError::TokenExpired,
            JwtError::InvalidToken | JwtError::InvalidTokenType => AuthError::InvalidToken,
            _ => AuthError::InternalError(err.to_string()),
        }
    }
}

/// Successful login: identity summary plus both signed tokens
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub admin: AdminSummary,
    pub tokens: TokenPair,
}

/// Identity decoded from a verified access token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedIdentity {
    pub admin_id: Uuid,
    pub email: String,
    pub role: AdminRole,
}

impl TryFrom<Claims> for VerifiedIdentity {
    type Error = AuthError;

    fn try_from(claims: Claims) -> Result<Self, Self::Error> {
        Ok(Self {
            admin_id: claims.admin_id()?,
            email: claims.email,
            role: claims.role,
        })
    }
}

/// Lower-case and trim an email before lookup or storage
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Authentication service
pub struct AuthService<S> {
    store: Arc<S>,
    jwt: JwtService,
}

impl<S> Clone for AuthService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            jwt: self.jwt.clone(),
        }
    }
}

impl<S> AuthService<S> {
    pub fn new(store: Arc<S>, jwt: JwtService) -> Self {
        Self { store, jwt }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn jwt(&self) -> &JwtService {
        &self.jwt
    }
}

impl<S> AuthService<S>
where
    S: CredentialStore + Sync + 'static,
{
    pub(crate) fn validate_email(email: &str) -> Result<(), AuthError> {
        let (local, domain) = email.split_once('@').ok_or(AuthError::InvalidEmail)?;

        if local.is_empty() || domain.contains('@') || email.chars().any(char::is_whitespace) {
            return Err(AuthError::InvalidEmail);
        }

        let mut labels = domain.split('.');
        let valid_domain = domain.contains('.') && labels.all(|label| !label.is_empty());
        if !valid_domain {
            return Err(AuthError::InvalidEmail);
        }

        Ok(())
    }

    pub(crate) fn validate_password(password: &str) -> Result<(), AuthError> {
        if password.chars().count() < 8 {
            return Err(AuthError::PasswordTooShort);
        }

        let has_uppercase = password.chars().any(char::is_uppercase);
        let has_lowercase = password.chars().any(char::is_lowercase);
        let has_digit = password.chars().any(|c| c.is_ascii_digit());

        if !has_uppercase || !has_lowercase || !has_digit {
            return Err(AuthError::PasswordTooWeak);
        }

        Ok(())
    }

    /// Validate email/password and mint a token pair
    ///
    /// Unknown email and wrong password produce the same error. The active
    /// flag is only revealed once the password matched.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginOutcome, AuthError> {
        let email = normalize_email(email);
        let admin = self.store.find_by_email(&email).await?;

        let admin = match admin {
            Some(admin) => {
                let matches = AdminRepository::verify_password(password, &admin.password_hash)
                    .map_err(|e| AuthError::InternalError(e.to_string()))?;
                if !matches {
                    return Err(AuthError::InvalidCredentials);
                }
                admin
            }
            None => {
                if let Some(hash) = DUMMY_HASH.as_deref() {
                    let _ = AdminRepository::verify_password(password, hash);
                }
                return Err(AuthError::InvalidCredentials);
            }
        };

        if !admin.is_active {
            return Err(AuthError::AccountInactive);
        }

        let tokens = self
            .jwt
            .generate_token_pair(admin.id, &admin.email, admin.role)?;

        Ok(LoginOutcome {
            admin: admin.into(),
            tokens,
        })
    }

    /// Exchange a refresh token for a new access token
    pub async fn refresh(&self, refresh_token: &str) -> Result<(String, i64), AuthError> {
        let claims = self.jwt.validate_refresh_token(refresh_token)?;
        let admin = self.load_active(claims.admin_id()?).await?;

        Ok(self
            .jwt
            .generate_access_token(admin.id, &admin.email, admin.role)?)
    }

    /// Verify an access token and decode the request identity
    pub fn verify_access_token(&self, token: &str) -> Result<VerifiedIdentity, AuthError> {
        self.jwt.validate_access_token(token)?.try_into()
    }

    /// Reload the record behind a verified identity
    pub async fn current_admin(&self, identity: &VerifiedIdentity) -> Result<AdminSummary, AuthError> {
        Ok(self.load_active(identity.admin_id).await?.into())
    }

    async fn load_active(&self, admin_id: Uuid) -> Result<Admin, AuthError> {
        let admin = self
            .store
            .find_by_id(admin_id)
            .await?
            // A deleted record invalidates its outstanding tokens
            .ok_or(AuthError::InvalidToken)?;

        if !admin.is_active {
            return Err(AuthError::AccountInactive);
        }

        Ok(admin)
    }

    /// Create an admin record on behalf of `created_by`
    pub async fn create_admin(
        &self,
        email: &str,
        password: &str,
        name: &str,
        role: AdminRole,
        created_by: Option<Uuid>,
    ) -> Result<Admin, AuthError> {
        let email = normalize_email(email);
        Self::validate_email(&email)?;
        Self::validate_password(password)?;

        let name = name.trim();
        if name.is_empty() {
            return Err(AuthError::InvalidName);
        }

        let admin = self
            .store
            .create(NewAdmin {
                email,
                password: password.to_string(),
                name: name.to_string(),
                role,
                created_by,
            })
            .await?;

        Ok(admin)
    }

    /// Create the first super admin when no records exist yet
    pub async fn bootstrap_super_admin(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<Admin>, AuthError> {
        if self.store.count().await? > 0 {
            return Ok(None);
        }

        let admin = self
            .create_admin(email, password, "Owner", AdminRole::SuperAdmin, None)
            .await?;
        tracing::info!(admin_id = %admin.id, "Bootstrapped initial super admin");

        Ok(Some(admin))
    }
}

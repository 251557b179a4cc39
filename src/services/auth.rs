//! Authentication and staff account management

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use crate::{
    config::AuthConfig,
    error::{AppError, AppResult},
    models::user::{CreateUser, User, UserClaims},
    repository::Repository,
};

#[derive(Clone)]
pub struct AuthService {
    repository: Repository,
    config: AuthConfig,
}

impl AuthService {
    pub fn new(repository: Repository, config: AuthConfig) -> Self {
        Self { repository, config }
    }

    /// Verify credentials and issue a JWT. The same error is returned for an
    /// unknown username and a wrong password.
    pub async fn login(&self, username: &str, password: &str) -> AppResult<(String, User)> {
        let user = self
            .repository
            .users
            .get_by_username(username)
            .await?
            .ok_or_else(|| {
                AppError::Authentication("Invalid username or password".to_string())
            })?;

        let parsed = PasswordHash::new(&user.password)
            .map_err(|e| AppError::Internal(format!("Stored password hash is invalid: {}", e)))?;

        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .map_err(|_| AppError::Authentication("Invalid username or password".to_string()))?;

        let now = chrono::Utc::now();
        let claims = UserClaims {
            sub: user.username.clone(),
            user_id: user.id,
            role: user.role,
            iat: now.timestamp(),
            exp: (now + chrono::Duration::hours(self.config.jwt_expiration_hours as i64))
                .timestamp(),
        };
        let token = claims
            .create_token(&self.config.jwt_secret)
            .map_err(|e| AppError::Internal(format!("Failed to issue token: {}", e)))?;

        tracing::info!(username = %user.username, "User logged in");
        Ok((token, user))
    }

    /// Create a staff account; superadmin only
    pub async fn create_user(&self, claims: &UserClaims, new_user: CreateUser) -> AppResult<User> {
        claims.require_superadmin()?;

        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(new_user.password.as_bytes(), &salt)
            .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?
            .to_string();

        let user = self
            .repository
            .users
            .create(&new_user.username, &hash, &new_user.name, new_user.role)
            .await?;

        tracing::info!(username = %user.username, role = %user.role, "Staff user created");
        Ok(user)
    }

    pub async fn get_user(&self, id: i32) -> AppResult<User> {
        self.repository.users.get_by_id(id).await
    }

    pub async fn list_users(&self, claims: &UserClaims) -> AppResult<Vec<User>> {
        claims.require_superadmin()?;
        self.repository.users.list().await
    }
}

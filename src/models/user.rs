//! Staff user model and JWT claims

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Decode, Encode, FromRow, Postgres};
use utoipa::ToSchema;
use validator::Validate;

use crate::error::AppError;

/// Staff roles. SUPERADMIN may close any serving queue; ADMIN only their own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Admin,
    Superadmin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::Superadmin => "SUPERADMIN",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "ADMIN" => Ok(Role::Admin),
            "SUPERADMIN" => Ok(Role::Superadmin),
            _ => Err(format!("Invalid role: {}", s)),
        }
    }
}

impl sqlx::Type<Postgres> for Role {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<Postgres>>::type_info()
    }
}

impl<'r> Decode<'r, Postgres> for Role {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s: String = Decode::<Postgres>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl Encode<'_, Postgres> for Role {
    fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
        let s: String = self.as_str().to_string();
        <String as Encode<Postgres>>::encode(s, buf)
    }
}

/// Staff user row from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct User {
    pub id: i32,
    pub username: String,
    /// Hashed password (argon2)
    #[serde(skip_serializing)]
    pub password: String,
    pub name: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

/// Create user request (superadmin only)
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateUser {
    #[validate(length(min = 3, message = "Username must be at least 3 characters"))]
    pub username: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
    #[validate(length(min = 2, message = "Name must be at least 2 characters"))]
    pub name: String,
    pub role: Role,
}

/// JWT claims for authenticated staff
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserClaims {
    pub sub: String,
    pub user_id: i32,
    pub role: Role,
    pub exp: i64,
    pub iat: i64,
}

impl UserClaims {
    /// Create a new JWT token
    pub fn create_token(&self, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{encode, EncodingKey, Header};
        encode(
            &Header::default(),
            self,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
    }

    /// Parse JWT token
    pub fn from_token(token: &str, secret: &str) -> Result<Self, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{decode, DecodingKey, Validation};
        let token_data = decode::<Self>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )?;
        Ok(token_data.claims)
    }

    pub fn is_superadmin(&self) -> bool {
        self.role == Role::Superadmin
    }

    /// Require superadmin privileges
    pub fn require_superadmin(&self) -> Result<(), AppError> {
        if self.is_superadmin() {
            Ok(())
        } else {
            Err(AppError::Authorization(
                "Superadmin privileges required".to_string(),
            ))
        }
    }

    /// Ownership guard for closing a serving queue: superadmin, or the admin
    /// who started the service.
    pub fn require_queue_owner(&self, assigned_admin_id: Option<i32>) -> Result<(), AppError> {
        if self.is_superadmin() || assigned_admin_id == Some(self.user_id) {
            Ok(())
        } else {
            Err(AppError::NotQueueOwner(
                "Only a superadmin or the assigned admin may close this queue".to_string(),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(user_id: i32, role: Role) -> UserClaims {
        UserClaims {
            sub: "test".to_string(),
            user_id,
            role,
            exp: 0,
            iat: 0,
        }
    }

    #[test]
    fn assigned_admin_may_close_own_queue() {
        assert!(claims(7, Role::Admin).require_queue_owner(Some(7)).is_ok());
    }

    #[test]
    fn other_admin_may_not_close_foreign_queue() {
        assert!(claims(8, Role::Admin).require_queue_owner(Some(7)).is_err());
    }

    #[test]
    fn superadmin_may_close_any_queue() {
        let c = claims(9, Role::Superadmin);
        assert!(c.require_queue_owner(Some(7)).is_ok());
        assert!(c.require_queue_owner(None).is_ok());
    }

    #[test]
    fn admin_may_not_close_unassigned_queue() {
        assert!(claims(7, Role::Admin).require_queue_owner(None).is_err());
    }
}

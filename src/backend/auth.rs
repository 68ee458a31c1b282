use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts},
};
use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use super::error::BackendError;
use super::repository::RepositoryState;
use crate::config::AppConfig;
use crate::models::{Role, UserStatus};

/// Tokens are valid for thirty days.
const TOKEN_TTL_SECS: i64 = 30 * 24 * 60 * 60;

/// Claims
///
/// Payload of the bearer tokens issued at login and registration.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Id of the user the token was issued to.
    pub sub: String,
    pub exp: usize,
    pub iat: usize,
}

pub fn issue_token(user_id: &str, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
    let now = Utc::now().timestamp();
    let claims = Claims {
        sub: user_id.to_string(),
        iat: now as usize,
        exp: (now + TOKEN_TTL_SECS) as usize,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

/// AuthUser
///
/// Identity resolved from the bearer token. The user is looked up on every
/// request so deleted or suspended accounts lose access immediately.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Admins may act on anything; everyone else only on what they own.
    pub fn can_manage(&self, owner_id: &str) -> bool {
        self.is_admin() || self.id == owner_id
    }
}

fn unauthorized(message: &str) -> BackendError {
    BackendError::Unauthorized(message.to_string())
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    RepositoryState: FromRef<S>,
    AppConfig: FromRef<S>,
{
    type Rejection = BackendError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let repo = RepositoryState::from_ref(state);
        let config = AppConfig::from_ref(state);

        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .ok_or_else(|| unauthorized("Not authorized, no token"))?;

        let mut validation = Validation::default();
        validation.validate_exp = true;

        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            &validation,
        )
        .map_err(|e| {
            tracing::debug!("token rejected: {}", e);
            unauthorized("Not authorized, token failed")
        })?;

        let user = repo
            .get_user(&token_data.claims.sub)
            .await
            .ok_or_else(|| unauthorized("Not authorized, user not found"))?;

        if user.status == UserStatus::Suspended {
            return Err(BackendError::forbidden("Your account has been suspended"));
        }

        Ok(AuthUser {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
        })
    }
}

/// AdminUser
///
/// An `AuthUser` whose role is `admin`. Any other role is refused with 403.
#[derive(Debug, Clone)]
pub struct AdminUser(pub AuthUser);

impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
    RepositoryState: FromRef<S>,
    AppConfig: FromRef<S>,
{
    type Rejection = BackendError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if !user.is_admin() {
            return Err(BackendError::forbidden("Not authorized as an admin"));
        }
        Ok(AdminUser(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issued_token_decodes_with_same_secret() {
        let token = issue_token("u1", "secret").unwrap();
        let data = decode::<Claims>(
            &token,
            &DecodingKey::from_secret(b"secret"),
            &Validation::default(),
        )
        .unwrap();
        assert_eq!(data.claims.sub, "u1");
        assert!(data.claims.exp > data.claims.iat);
    }

    #[test]
    fn token_with_other_secret_is_rejected() {
        let token = issue_token("u1", "secret").unwrap();
        let result = decode::<Claims>(
            &token,
            &DecodingKey::from_secret(b"other"),
            &Validation::default(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn owner_or_admin_may_manage() {
        let user = AuthUser {
            id: "u1".into(),
            name: "N".into(),
            email: "n@example.com".into(),
            role: Role::User,
        };
        assert!(user.can_manage("u1"));
        assert!(!user.can_manage("u2"));

        let admin = AuthUser {
            role: Role::Admin,
            ..user
        };
        assert!(admin.can_manage("u2"));
    }
}

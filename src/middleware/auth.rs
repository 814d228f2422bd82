use axum::{extract::FromRequestParts, http::header};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};

use crate::{
    dto::auth::Claims,
    error::{AppError, AppResult},
    models::{Role, User},
    state::AppState,
};

const TOKEN_TTL_HOURS: i64 = 24;

/// The authenticated caller of a request.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub uid: String,
    pub role: Role,
}

impl AuthUser {
    pub fn owns(&self, owner_uid: &str) -> bool {
        self.uid == owner_uid
    }
}

pub fn ensure_role(user: &AuthUser, role: Role) -> Result<(), AppError> {
    if user.role != role {
        return Err(AppError::Unauthorized);
    }
    Ok(())
}

pub fn ensure_admin(user: &AuthUser) -> Result<(), AppError> {
    ensure_role(user, Role::Admin)
}

pub fn ensure_privileged(user: &AuthUser) -> Result<(), AppError> {
    if !user.role.is_privileged() {
        return Err(AppError::Unauthorized);
    }
    Ok(())
}

/// Signs a bearer token for `user` with the configured secret.
pub fn issue_token(secret: &str, user: &User) -> AppResult<String> {
    let expiration = Utc::now()
        .checked_add_signed(Duration::hours(TOKEN_TTL_HOURS))
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to set expiration")))?;

    let claims = Claims {
        sub: user.uid.clone(),
        role: user.role,
        exp: expiration.timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))
}

pub fn verify_token(secret: &str, token: &str) -> AppResult<Claims> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| AppError::InvalidArgument("Invalid or expired token".into()))
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .ok_or_else(|| AppError::InvalidArgument("Missing Authorization header".into()))?;

        let auth_str = auth_header
            .to_str()
            .map_err(|_| AppError::InvalidArgument("Invalid Authorization header".into()))?;

        let token = auth_str
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::InvalidArgument("Invalid Authorization scheme".into()))?
            .trim();

        let claims = verify_token(&state.config.jwt_secret, token)?;

        // The role is read from the account row so role changes apply immediately.
        let user = match state.accounts.get(&claims.sub).await {
            Ok(user) => user,
            Err(AppError::NotFound(_)) => return Err(AppError::Unauthorized),
            Err(err) => return Err(err),
        };

        Ok(AuthUser {
            uid: user.uid,
            role: user.role,
        })
    }
}

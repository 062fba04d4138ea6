use axum::{extract::FromRequestParts, http::header};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use uuid::Uuid;

use crate::{
    dto::auth::Claims,
    error::AppError,
    models::{Role, User},
    state::AppState,
    store::UserStore,
};

#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub role: Role,
}

/// Signed credential embedding identity, role and the user's current token
/// version. Role changes bump the version, so older credentials stop
/// verifying instead of silently keeping the pre-change role.
pub fn issue_credential(secret: &str, ttl_hours: i64, user: &User) -> Result<String, AppError> {
    let expiration = Utc::now()
        .checked_add_signed(Duration::hours(ttl_hours))
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to set expiration")))?;

    let claims = Claims {
        sub: user.id.to_string(),
        role: user.role,
        ver: user.token_version,
        exp: expiration.timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))
}

pub fn verify_credential(secret: &str, token: &str) -> Result<Claims, AppError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| AppError::Unauthenticated("Invalid or expired token".into()))
}

pub fn ensure_roles(user: &AuthUser, roles: &[Role]) -> Result<(), AppError> {
    if roles.contains(&user.role) {
        return Ok(());
    }
    Err(AppError::Forbidden)
}

pub fn ensure_admin(user: &AuthUser) -> Result<(), AppError> {
    ensure_roles(user, &[Role::Admin, Role::SuperAdmin])
}

pub fn ensure_seller(user: &AuthUser) -> Result<(), AppError> {
    ensure_roles(user, &[Role::Seller])
}

pub fn ensure_super_admin(user: &AuthUser) -> Result<(), AppError> {
    ensure_roles(user, &[Role::SuperAdmin])
}

pub fn ensure_seller_or_super_admin(user: &AuthUser) -> Result<(), AppError> {
    ensure_roles(user, &[Role::Seller, Role::SuperAdmin])
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
            .ok_or_else(|| AppError::Unauthenticated("Missing Authorization header".into()))?;

        let auth_str = auth_header
            .to_str()
            .map_err(|_| AppError::Unauthenticated("Invalid Authorization header".into()))?;

        if !auth_str.starts_with("Bearer ") {
            return Err(AppError::Unauthenticated(
                "Invalid Authorization scheme".into(),
            ));
        }
        let token = auth_str.trim_start_matches("Bearer ").trim();

        let claims = verify_credential(&state.config.jwt_secret, token)?;

        let user_id = Uuid::parse_str(&claims.sub)
            .map_err(|_| AppError::Unauthenticated("Invalid user id in token".into()))?;

        let user = state
            .store
            .get_user(user_id)
            .await?
            .ok_or_else(|| AppError::Unauthenticated("Unknown user".into()))?;

        if claims.ver != user.token_version {
            return Err(AppError::Unauthenticated(
                "Credential superseded, please sign in again".into(),
            ));
        }

        Ok(AuthUser {
            user_id,
            role: user.role,
        })
    }
}

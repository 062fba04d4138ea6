use argon2::{
    Argon2, PasswordHasher,
    password_hash::{PasswordHash, PasswordVerifier, SaltString},
};
use chrono::Utc;
use password_hash::rand_core::OsRng;
use uuid::Uuid;

use crate::{
    audit::log_audit,
    config::AppConfig,
    dto::auth::{AuthPayload, LoginRequest, RegisterRequest, UserView},
    error::{AppError, AppResult},
    middleware::auth::issue_credential,
    models::{Role, User},
    response::ApiResponse,
    store::Store,
};

pub async fn register_user<S: Store>(
    store: &S,
    config: &AppConfig,
    payload: RegisterRequest,
) -> AppResult<ApiResponse<AuthPayload>> {
    let RegisterRequest {
        name,
        email,
        password,
    } = payload;

    if name.trim().is_empty() || email.trim().is_empty() {
        return Err(AppError::InvalidArgument(
            "Name and email are required".into(),
        ));
    }
    if store.find_user_by_email(&email).await?.is_some() {
        return Err(AppError::Conflict("Email is already taken".into()));
    }

    let password_hash = hash_password(&password)?;

    let user = User {
        id: Uuid::new_v4(),
        name,
        email,
        password_hash,
        role: Role::User,
        token_version: 0,
        created_at: Utc::now(),
    };
    let user = store.insert_user(user).await?;

    let token = issue_credential(&config.jwt_secret, config.token_ttl_hours, &user)?;

    if let Err(err) = log_audit(
        store,
        Some(user.id),
        "user_register",
        Some("users"),
        Some(serde_json::json!({ "user_id": user.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "User created",
        AuthPayload {
            token,
            user: UserView::from(&user),
        },
    ))
}

pub async fn login_user<S: Store>(
    store: &S,
    config: &AppConfig,
    payload: LoginRequest,
) -> AppResult<ApiResponse<AuthPayload>> {
    let LoginRequest { email, password } = payload;

    let user = store
        .find_user_by_email(&email)
        .await?
        .ok_or_else(|| AppError::Unauthenticated("Invalid email or password".into()))?;

    verify_password(&password, &user.password_hash)?;

    let token = issue_credential(&config.jwt_secret, config.token_ttl_hours, &user)?;

    if let Err(err) = log_audit(
        store,
        Some(user.id),
        "user_login",
        Some("users"),
        Some(serde_json::json!({ "user_id": user.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Logged in",
        AuthPayload {
            token,
            user: UserView::from(&user),
        },
    ))
}

fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))
}

fn verify_password(password: &str, stored_hash: &str) -> AppResult<()> {
    let parsed_hash = PasswordHash::new(stored_hash)
        .map_err(|_| AppError::Internal(anyhow::anyhow!("Invalid password hash")))?;
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AppError::Unauthenticated("Invalid email or password".into()))
}

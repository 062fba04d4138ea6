use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use uuid::Uuid;

use crate::{
    dto::sellers::{
        RegisterSellerRequest, RevenuePayload, SellerPayload, SellerRegistered,
        SellerStatsPayload, UpdateSellerRequest,
    },
    error::AppResult,
    middleware::auth::AuthUser,
    response::ApiResponse,
    services::seller_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register_seller))
        .route("/me", get(get_my_profile).put(update_my_profile))
        .route("/me/stats", get(get_my_stats))
        .route("/me/revenue", get(get_my_revenue))
        .route("/{id}", get(get_public_profile))
}

#[utoipa::path(
    post,
    path = "/api/sellers/register",
    request_body = RegisterSellerRequest,
    responses(
        (status = 200, description = "Seller registered", body = ApiResponse<SellerRegistered>),
        (status = 409, description = "Already registered as a seller")
    ),
    tag = "Sellers"
)]
pub async fn register_seller(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<RegisterSellerRequest>,
) -> AppResult<Json<ApiResponse<SellerRegistered>>> {
    let resp =
        seller_service::register_seller(state.store.as_ref(), &state.config, &user, payload)
            .await?;
    Ok(Json(resp))
}

#[utoipa::path(get, path = "/api/sellers/me", tag = "Sellers")]
pub async fn get_my_profile(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<SellerPayload>>> {
    let resp = seller_service::get_my_profile(state.store.as_ref(), &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/sellers/me",
    request_body = UpdateSellerRequest,
    tag = "Sellers"
)]
pub async fn update_my_profile(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<UpdateSellerRequest>,
) -> AppResult<Json<ApiResponse<SellerPayload>>> {
    let resp = seller_service::update_my_profile(state.store.as_ref(), &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(get, path = "/api/sellers/me/stats", tag = "Sellers")]
pub async fn get_my_stats(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<SellerStatsPayload>>> {
    let resp = seller_service::get_my_stats(state.store.as_ref(), &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(get, path = "/api/sellers/me/revenue", tag = "Sellers")]
pub async fn get_my_revenue(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<RevenuePayload>>> {
    let resp = seller_service::get_my_revenue(state.store.as_ref(), &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(get, path = "/api/sellers/{id}", tag = "Sellers")]
pub async fn get_public_profile(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<SellerPayload>>> {
    let resp = seller_service::get_public_profile(state.store.as_ref(), id).await?;
    Ok(Json(resp))
}

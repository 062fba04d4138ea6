use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, put},
};
use uuid::Uuid;

use crate::{
    dto::{
        admin::{PlatformStatsPayload, SellerList, UpdateCommissionRequest},
        sellers::SellerPayload,
    },
    error::AppResult,
    middleware::auth::AuthUser,
    response::ApiResponse,
    routes::params::SellerListQuery,
    services::super_admin_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/sellers", get(list_sellers))
        .route("/sellers/{id}/approve", put(approve_seller))
        .route("/sellers/{id}/reject", put(reject_seller))
        .route("/sellers/{id}/suspend", put(suspend_seller))
        .route("/sellers/{id}/commission", put(update_commission))
        .route("/stats", get(platform_stats))
}

#[utoipa::path(get, path = "/api/super-admin/sellers", tag = "Super Admin")]
pub async fn list_sellers(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<SellerListQuery>,
) -> AppResult<Json<ApiResponse<SellerList>>> {
    let resp =
        super_admin_service::list_sellers(state.store.as_ref(), &user, query.status).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/super-admin/sellers/{id}/approve",
    responses(
        (status = 200, description = "Seller approved", body = ApiResponse<SellerPayload>),
        (status = 400, description = "Transition not allowed")
    ),
    tag = "Super Admin"
)]
pub async fn approve_seller(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<SellerPayload>>> {
    let resp = super_admin_service::approve_seller(state.store.as_ref(), &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(put, path = "/api/super-admin/sellers/{id}/reject", tag = "Super Admin")]
pub async fn reject_seller(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<SellerPayload>>> {
    let resp = super_admin_service::reject_seller(state.store.as_ref(), &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(put, path = "/api/super-admin/sellers/{id}/suspend", tag = "Super Admin")]
pub async fn suspend_seller(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<SellerPayload>>> {
    let resp = super_admin_service::suspend_seller(state.store.as_ref(), &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/super-admin/sellers/{id}/commission",
    request_body = UpdateCommissionRequest,
    responses(
        (status = 200, description = "Commission updated", body = ApiResponse<SellerPayload>),
        (status = 400, description = "Commission out of range")
    ),
    tag = "Super Admin"
)]
pub async fn update_commission(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateCommissionRequest>,
) -> AppResult<Json<ApiResponse<SellerPayload>>> {
    let resp =
        super_admin_service::update_commission(state.store.as_ref(), &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(get, path = "/api/super-admin/stats", tag = "Super Admin")]
pub async fn platform_stats(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<PlatformStatsPayload>>> {
    let resp = super_admin_service::platform_stats(state.store.as_ref(), &user).await?;
    Ok(Json(resp))
}

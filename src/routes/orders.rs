use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, put},
};
use uuid::Uuid;

use crate::{
    dto::orders::{CreateOrderRequest, OrderPayload, UpdateOrderStatusRequest},
    error::AppResult,
    middleware::auth::AuthUser,
    models::Order,
    response::{ApiResponse, Page},
    routes::params::OrderListQuery,
    services::order_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_my_orders).post(create_order))
        .route("/admin/all", get(list_all_orders))
        .route("/{id}", get(get_order).delete(cancel_order))
        .route("/{id}/status", put(update_status))
}

#[utoipa::path(
    post,
    path = "/api/orders",
    request_body = CreateOrderRequest,
    responses(
        (status = 200, description = "Order placed", body = ApiResponse<OrderPayload>),
        (status = 400, description = "Empty cart, mixed sellers or insufficient stock")
    ),
    tag = "Orders"
)]
pub async fn create_order(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateOrderRequest>,
) -> AppResult<Json<ApiResponse<OrderPayload>>> {
    let resp = order_service::create_order(state.store.as_ref(), &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(get, path = "/api/orders", tag = "Orders")]
pub async fn list_my_orders(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<OrderListQuery>,
) -> AppResult<Json<ApiResponse<Page<Order>>>> {
    let resp = order_service::list_my_orders(state.store.as_ref(), &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/orders/{id}",
    responses(
        (status = 200, description = "Order", body = ApiResponse<OrderPayload>),
        (status = 403, description = "Not owner, admin or seller of record"),
        (status = 404, description = "Order not found")
    ),
    tag = "Orders"
)]
pub async fn get_order(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<OrderPayload>>> {
    let resp = order_service::get_order(state.store.as_ref(), &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(get, path = "/api/orders/admin/all", tag = "Orders")]
pub async fn list_all_orders(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<OrderListQuery>,
) -> AppResult<Json<ApiResponse<Page<Order>>>> {
    let resp = order_service::list_all_orders(state.store.as_ref(), &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/orders/{id}/status",
    request_body = UpdateOrderStatusRequest,
    responses(
        (status = 200, description = "Order status updated", body = ApiResponse<OrderPayload>),
        (status = 400, description = "Invalid status or transition"),
        (status = 403, description = "Not seller of record or super admin")
    ),
    tag = "Orders"
)]
pub async fn update_status(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateOrderStatusRequest>,
) -> AppResult<Json<ApiResponse<OrderPayload>>> {
    let resp = order_service::update_status(state.store.as_ref(), &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/orders/{id}",
    responses(
        (status = 200, description = "Order cancelled", body = ApiResponse<OrderPayload>),
        (status = 400, description = "Order no longer pending")
    ),
    tag = "Orders"
)]
pub async fn cancel_order(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<OrderPayload>>> {
    let resp = order_service::cancel_order(state.store.as_ref(), &user, id).await?;
    Ok(Json(resp))
}

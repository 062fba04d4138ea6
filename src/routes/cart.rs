use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};
use uuid::Uuid;

use crate::{
    dto::cart::{AddToCartRequest, CartPayload, UpdateCartItemRequest},
    error::AppResult,
    middleware::auth::AuthUser,
    response::ApiResponse,
    services::cart_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_cart).post(add_to_cart).delete(clear_cart))
        .route("/{product_id}", axum::routing::put(update_item).delete(remove_item))
}

#[utoipa::path(get, path = "/api/cart", tag = "Cart")]
pub async fn get_cart(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<CartPayload>>> {
    let resp = cart_service::get_cart(state.store.as_ref(), &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/cart",
    request_body = AddToCartRequest,
    responses(
        (status = 200, description = "Added to cart", body = ApiResponse<CartPayload>),
        (status = 404, description = "Product not found")
    ),
    tag = "Cart"
)]
pub async fn add_to_cart(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<AddToCartRequest>,
) -> AppResult<Json<ApiResponse<CartPayload>>> {
    let resp = cart_service::add_to_cart(state.store.as_ref(), &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/cart/{product_id}",
    request_body = UpdateCartItemRequest,
    tag = "Cart"
)]
pub async fn update_item(
    State(state): State<AppState>,
    user: AuthUser,
    Path(product_id): Path<Uuid>,
    Json(payload): Json<UpdateCartItemRequest>,
) -> AppResult<Json<ApiResponse<CartPayload>>> {
    let resp = cart_service::update_item(state.store.as_ref(), &user, product_id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(delete, path = "/api/cart/{product_id}", tag = "Cart")]
pub async fn remove_item(
    State(state): State<AppState>,
    user: AuthUser,
    Path(product_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<CartPayload>>> {
    let resp = cart_service::remove_item(state.store.as_ref(), &user, product_id).await?;
    Ok(Json(resp))
}

#[utoipa::path(delete, path = "/api/cart", tag = "Cart")]
pub async fn clear_cart(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<CartPayload>>> {
    let resp = cart_service::clear_cart(state.store.as_ref(), &user).await?;
    Ok(Json(resp))
}

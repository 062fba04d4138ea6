use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use uuid::Uuid;

use crate::{
    dto::products::{
        CreateProductRequest, FeaturedProducts, ProductPayload, UpdateProductRequest,
    },
    error::AppResult,
    middleware::auth::AuthUser,
    models::Product,
    response::{ApiResponse, Page},
    routes::params::ProductQuery,
    services::product_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_products).post(create_product))
        .route("/featured", get(get_featured))
        .route(
            "/{id}",
            get(get_product).put(update_product).delete(delete_product),
        )
}

#[utoipa::path(get, path = "/api/products", tag = "Products")]
pub async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<ProductQuery>,
) -> AppResult<Json<ApiResponse<Page<Product>>>> {
    let resp = product_service::list_products(state.store.as_ref(), query).await?;
    Ok(Json(resp))
}

#[utoipa::path(get, path = "/api/products/featured", tag = "Products")]
pub async fn get_featured(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<FeaturedProducts>>> {
    let resp = product_service::get_featured(state.store.as_ref()).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/products/{id}",
    responses(
        (status = 200, description = "Product", body = ApiResponse<ProductPayload>),
        (status = 404, description = "Product not found")
    ),
    tag = "Products"
)]
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<ProductPayload>>> {
    let resp = product_service::get_product(state.store.as_ref(), id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/products",
    request_body = CreateProductRequest,
    responses(
        (status = 200, description = "Product created", body = ApiResponse<ProductPayload>),
        (status = 403, description = "Not a seller or admin")
    ),
    tag = "Products"
)]
pub async fn create_product(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateProductRequest>,
) -> AppResult<Json<ApiResponse<ProductPayload>>> {
    let resp = product_service::create_product(state.store.as_ref(), &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/products/{id}",
    request_body = UpdateProductRequest,
    tag = "Products"
)]
pub async fn update_product(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateProductRequest>,
) -> AppResult<Json<ApiResponse<ProductPayload>>> {
    let resp = product_service::update_product(state.store.as_ref(), &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(delete, path = "/api/products/{id}", tag = "Products")]
pub async fn delete_product(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = product_service::delete_product(state.store.as_ref(), &user, id).await?;
    Ok(Json(resp))
}

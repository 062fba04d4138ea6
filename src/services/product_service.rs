use chrono::Utc;
use uuid::Uuid;

use crate::{
    dto::products::{CreateProductRequest, FeaturedProducts, ProductPayload, UpdateProductRequest},
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_roles},
    models::{Product, Role},
    response::{ApiResponse, Page},
    routes::params::ProductQuery,
    store::{ProductFilter, Store},
};

pub async fn list_products<S: Store>(
    store: &S,
    query: ProductQuery,
) -> AppResult<ApiResponse<Page<Product>>> {
    let (page, limit) = query.pagination.normalize();
    let filter = ProductFilter {
        category_id: query.category,
        search: query.search,
        min_price: query.min_price,
        max_price: query.max_price,
        ..Default::default()
    };

    let (products, total) = store.list_products(&filter, page, limit).await?;
    Ok(ApiResponse::success(
        "Ok",
        Page::new(products, total, page, limit),
    ))
}

pub async fn get_product<S: Store>(store: &S, id: Uuid) -> AppResult<ApiResponse<ProductPayload>> {
    let product = store.get_product(id).await?.ok_or(AppError::NotFound)?;
    Ok(ApiResponse::success("Ok", ProductPayload { product }))
}

pub async fn get_featured<S: Store>(store: &S) -> AppResult<ApiResponse<FeaturedProducts>> {
    let filter = ProductFilter {
        featured: Some(true),
        ..Default::default()
    };
    let (products, _) = store.list_products(&filter, 1, 8).await?;
    Ok(ApiResponse::success(
        "Ok",
        FeaturedProducts {
            count: products.len(),
            products,
        },
    ))
}

pub async fn create_product<S: Store>(
    store: &S,
    user: &AuthUser,
    payload: CreateProductRequest,
) -> AppResult<ApiResponse<ProductPayload>> {
    ensure_roles(user, &[Role::Seller, Role::Admin, Role::SuperAdmin])?;
    validate_price_and_stock(payload.price, payload.stock)?;

    // Sellers publish under their own seller-of-record; platform admins may
    // still own legacy products with no seller attached.
    let seller_id = match user.role {
        Role::Seller => {
            let seller = store
                .find_seller_by_user(user.user_id)
                .await?
                .ok_or_else(|| {
                    AppError::InvalidState(
                        "Seller profile not found. Please complete seller registration.".into(),
                    )
                })?;
            Some(seller.id)
        }
        _ => None,
    };

    let now = Utc::now();
    let product = Product {
        id: Uuid::new_v4(),
        seller_id,
        name: payload.name,
        description: payload.description,
        price: payload.price,
        stock: payload.stock,
        category_id: payload.category_id,
        image_url: payload.image_url,
        featured: payload.featured.unwrap_or(false),
        created_at: now,
        updated_at: now,
    };
    let product = store.insert_product(product).await?;

    Ok(ApiResponse::success(
        "Product created successfully",
        ProductPayload { product },
    ))
}

pub async fn update_product<S: Store>(
    store: &S,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateProductRequest,
) -> AppResult<ApiResponse<ProductPayload>> {
    let mut product = store.get_product(id).await?.ok_or(AppError::NotFound)?;
    ensure_owns_product(store, user, &product).await?;

    if let Some(name) = payload.name {
        product.name = name;
    }
    if let Some(description) = payload.description {
        product.description = description;
    }
    if let Some(price) = payload.price {
        product.price = price;
    }
    if let Some(stock) = payload.stock {
        product.stock = stock;
    }
    if let Some(category_id) = payload.category_id {
        product.category_id = Some(category_id);
    }
    if let Some(image_url) = payload.image_url {
        product.image_url = image_url;
    }
    if let Some(featured) = payload.featured {
        product.featured = featured;
    }
    validate_price_and_stock(product.price, product.stock)?;

    product.updated_at = Utc::now();
    let product = store.update_product(product).await?;
    Ok(ApiResponse::success(
        "Product updated successfully",
        ProductPayload { product },
    ))
}

// Hard delete; orders keep their snapshot items.
pub async fn delete_product<S: Store>(
    store: &S,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let product = store.get_product(id).await?.ok_or(AppError::NotFound)?;
    ensure_owns_product(store, user, &product).await?;

    store.delete_product(id).await?;
    Ok(ApiResponse::success(
        "Product deleted successfully",
        serde_json::json!({}),
    ))
}

fn validate_price_and_stock(price: f64, stock: i32) -> AppResult<()> {
    if !price.is_finite() || price < 0.0 {
        return Err(AppError::InvalidArgument("price must be >= 0".into()));
    }
    if stock < 0 {
        return Err(AppError::InvalidArgument("stock must be >= 0".into()));
    }
    Ok(())
}

async fn ensure_owns_product<S: Store>(
    store: &S,
    user: &AuthUser,
    product: &Product,
) -> AppResult<()> {
    if user.role.is_admin() {
        return Ok(());
    }
    if user.role == Role::Seller {
        let seller = store.find_seller_by_user(user.user_id).await?;
        if matches!(
            (&seller, product.seller_id),
            (Some(s), Some(owner)) if s.id == owner
        ) {
            return Ok(());
        }
    }
    Err(AppError::Forbidden)
}

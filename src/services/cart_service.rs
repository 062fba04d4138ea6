use uuid::Uuid;

use crate::{
    dto::cart::{AddToCartRequest, CartLineView, CartPayload, CartView, UpdateCartItemRequest},
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{Cart, CartLine},
    response::ApiResponse,
    store::Store,
};

pub async fn get_cart<S: Store>(store: &S, user: &AuthUser) -> AppResult<ApiResponse<CartPayload>> {
    let cart = store.get_cart(user.user_id).await?;
    let view = build_view(store, &cart).await?;
    Ok(ApiResponse::success("Ok", CartPayload { cart: view }))
}

pub async fn add_to_cart<S: Store>(
    store: &S,
    user: &AuthUser,
    payload: AddToCartRequest,
) -> AppResult<ApiResponse<CartPayload>> {
    if payload.quantity <= 0 {
        return Err(AppError::InvalidArgument(
            "quantity must be greater than 0".into(),
        ));
    }
    if store.get_product(payload.product_id).await?.is_none() {
        return Err(AppError::NotFound);
    }

    let mut cart = store.get_cart(user.user_id).await?;
    match cart
        .items
        .iter_mut()
        .find(|line| line.product_id == payload.product_id)
    {
        Some(line) => line.quantity = payload.quantity,
        None => cart.items.push(CartLine {
            product_id: payload.product_id,
            quantity: payload.quantity,
        }),
    }

    let cart = save_with_totals(store, cart).await?;
    let view = build_view(store, &cart).await?;
    Ok(ApiResponse::success("Added to cart", CartPayload { cart: view }))
}

pub async fn update_item<S: Store>(
    store: &S,
    user: &AuthUser,
    product_id: Uuid,
    payload: UpdateCartItemRequest,
) -> AppResult<ApiResponse<CartPayload>> {
    if payload.quantity <= 0 {
        return Err(AppError::InvalidArgument(
            "quantity must be greater than 0".into(),
        ));
    }

    let mut cart = store.get_cart(user.user_id).await?;
    let line = cart
        .items
        .iter_mut()
        .find(|line| line.product_id == product_id)
        .ok_or(AppError::NotFound)?;
    line.quantity = payload.quantity;

    let cart = save_with_totals(store, cart).await?;
    let view = build_view(store, &cart).await?;
    Ok(ApiResponse::success("Cart updated", CartPayload { cart: view }))
}

pub async fn remove_item<S: Store>(
    store: &S,
    user: &AuthUser,
    product_id: Uuid,
) -> AppResult<ApiResponse<CartPayload>> {
    let mut cart = store.get_cart(user.user_id).await?;
    let before = cart.items.len();
    cart.items.retain(|line| line.product_id != product_id);
    if cart.items.len() == before {
        return Err(AppError::NotFound);
    }

    let cart = save_with_totals(store, cart).await?;
    let view = build_view(store, &cart).await?;
    Ok(ApiResponse::success(
        "Removed from cart",
        CartPayload { cart: view },
    ))
}

pub async fn clear_cart<S: Store>(
    store: &S,
    user: &AuthUser,
) -> AppResult<ApiResponse<CartPayload>> {
    store.clear_cart(user.user_id).await?;
    let cart = store.get_cart(user.user_id).await?;
    let view = build_view(store, &cart).await?;
    Ok(ApiResponse::success("Cart cleared", CartPayload { cart: view }))
}

// Total is derived from live catalog prices on every mutation; lines whose
// product has been deleted are dropped rather than priced at zero.
async fn save_with_totals<S: Store>(store: &S, mut cart: Cart) -> AppResult<Cart> {
    let mut total = 0.0;
    let mut kept = Vec::with_capacity(cart.items.len());
    for line in cart.items {
        if let Some(product) = store.get_product(line.product_id).await? {
            total += product.price * f64::from(line.quantity);
            kept.push(line);
        }
    }
    cart.items = kept;
    cart.total_price = total;
    store.put_cart(cart).await
}

async fn build_view<S: Store>(store: &S, cart: &Cart) -> AppResult<CartView> {
    let mut items = Vec::with_capacity(cart.items.len());
    for line in &cart.items {
        if let Some(product) = store.get_product(line.product_id).await? {
            items.push(CartLineView {
                product,
                quantity: line.quantity,
            });
        }
    }
    Ok(CartView {
        items,
        total_price: cart.total_price,
    })
}

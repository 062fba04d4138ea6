use chrono::Utc;
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::orders::{CreateOrderRequest, OrderPayload, UpdateOrderStatusRequest},
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_seller_or_super_admin},
    models::{Order, OrderItem, OrderStatus, Role},
    response::{ApiResponse, Page},
    routes::params::OrderListQuery,
    store::{OrderFilter, Store},
};

/// Converts the caller's cart into a committed order: stock validation,
/// single-seller resolution, commission split at the seller's current rate,
/// conditional stock decrements with compensation on failure, seller
/// accrual and cart clearing.
pub async fn create_order<S: Store>(
    store: &S,
    user: &AuthUser,
    payload: CreateOrderRequest,
) -> AppResult<ApiResponse<OrderPayload>> {
    // Single snapshot of the cart; never re-read mid-flight.
    let cart = store.get_cart(user.user_id).await?;
    if cart.items.is_empty() {
        return Err(AppError::InvalidState("Cart is empty".into()));
    }

    let mut lines = Vec::with_capacity(cart.items.len());
    for line in &cart.items {
        if line.quantity <= 0 {
            return Err(AppError::InvalidArgument("Cart has invalid quantity".into()));
        }
        let product = store.get_product(line.product_id).await?.ok_or_else(|| {
            AppError::InvalidState("Cart references a product that no longer exists".into())
        })?;
        // Fast-path rejection only; the conditional decrement below is the
        // authoritative stock check.
        if product.stock < line.quantity {
            return Err(AppError::InsufficientStock(product.name));
        }
        lines.push((product, line.quantity));
    }

    // One seller of record per order. Mixed-seller carts would silently
    // mis-attribute commission, so they are rejected outright.
    let mut seller_ids: Vec<Option<Uuid>> = lines.iter().map(|(p, _)| p.seller_id).collect();
    seller_ids.sort();
    seller_ids.dedup();
    if seller_ids.len() > 1 {
        return Err(AppError::InvalidState(
            "Cart contains items from more than one seller".into(),
        ));
    }
    let seller_id = seller_ids[0];

    let total_price: f64 = lines.iter().map(|(p, q)| p.price * f64::from(*q)).sum();

    // Commission rate is read once, now; later rate changes never touch
    // this order.
    let seller = match seller_id {
        Some(id) => store.get_seller(id).await?,
        None => None,
    };
    let commission_rate = seller.as_ref().map(|s| s.commission).unwrap_or(0.0);
    let platform_commission = total_price * commission_rate / 100.0;
    let seller_revenue = total_price - platform_commission;

    let items: Vec<OrderItem> = lines
        .iter()
        .map(|(p, q)| OrderItem {
            product_id: p.id,
            name: p.name.clone(),
            price: p.price,
            image_url: p.image_url.clone(),
            quantity: *q,
        })
        .collect();

    // Conditional decrements; on any failure, re-apply what was already
    // taken before reporting the error.
    let mut applied: Vec<(Uuid, i32)> = Vec::new();
    for (product, qty) in &lines {
        match store.decrement_stock(product.id, *qty).await {
            Ok(true) => applied.push((product.id, *qty)),
            Ok(false) => {
                restore_decrements(store, &applied).await?;
                return Err(AppError::InsufficientStock(product.name.clone()));
            }
            Err(err) => {
                restore_decrements(store, &applied).await?;
                return Err(err);
            }
        }
    }

    let now = Utc::now();
    let order = Order {
        id: Uuid::new_v4(),
        user_id: user.user_id,
        items,
        shipping_address: payload.shipping_address,
        payment_method: payload.payment_method,
        total_price,
        seller_id: seller.as_ref().map(|s| s.id),
        platform_commission,
        seller_revenue,
        status: OrderStatus::Pending,
        created_at: now,
        updated_at: now,
    };
    let order = match store.insert_order(order).await {
        Ok(order) => order,
        Err(err) => {
            restore_decrements(store, &applied).await?;
            return Err(err);
        }
    };

    if let Some(seller) = seller.as_ref() {
        store
            .accrue_seller_totals(seller.id, seller_revenue, 1)
            .await
            .map_err(|err| {
                AppError::Inconsistency(format!(
                    "seller totals not applied to order {}: {err}",
                    order.id
                ))
            })?;
    }

    store.clear_cart(user.user_id).await?;

    if let Err(err) = log_audit(
        store,
        Some(user.user_id),
        "order_created",
        Some("orders"),
        Some(serde_json::json!({ "order_id": order.id, "total": order.total_price })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Order placed successfully",
        OrderPayload { order },
    ))
}

pub async fn list_my_orders<S: Store>(
    store: &S,
    user: &AuthUser,
    query: OrderListQuery,
) -> AppResult<ApiResponse<Page<Order>>> {
    let (page, limit) = query.pagination.normalize();
    let filter = OrderFilter {
        user_id: Some(user.user_id),
        status: parse_status_filter(query.status.as_deref())?,
        ..Default::default()
    };

    let (orders, total) = store.list_orders(&filter, page, limit).await?;
    Ok(ApiResponse::success("Ok", Page::new(orders, total, page, limit)))
}

/// Three independent grants: the owning user, any admin, or the seller of
/// record. The seller path resolves the caller's Seller document instead of
/// trusting the role claim.
pub async fn get_order<S: Store>(
    store: &S,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<OrderPayload>> {
    let order = store.get_order(id).await?.ok_or(AppError::NotFound)?;

    let mut authorized = order.user_id == user.user_id || user.role.is_admin();
    if !authorized && user.role == Role::Seller {
        let seller = store.find_seller_by_user(user.user_id).await?;
        authorized = matches!(
            (&seller, order.seller_id),
            (Some(s), Some(order_seller)) if s.id == order_seller
        );
    }
    if !authorized {
        return Err(AppError::Forbidden);
    }

    Ok(ApiResponse::success("Ok", OrderPayload { order }))
}

/// Seller callers are implicitly scoped to their own orders; a seller still
/// mid-registration sees an empty page rather than an error. Super admins
/// see everything.
pub async fn list_all_orders<S: Store>(
    store: &S,
    user: &AuthUser,
    query: OrderListQuery,
) -> AppResult<ApiResponse<Page<Order>>> {
    ensure_seller_or_super_admin(user)?;
    let (page, limit) = query.pagination.normalize();

    let mut filter = OrderFilter {
        status: parse_status_filter(query.status.as_deref())?,
        ..Default::default()
    };

    if user.role == Role::Seller {
        match store.find_seller_by_user(user.user_id).await? {
            Some(seller) => filter.seller_id = Some(seller.id),
            None => return Ok(ApiResponse::success("Orders", Page::empty(page))),
        }
    }

    let (orders, total) = store.list_orders(&filter, page, limit).await?;
    Ok(ApiResponse::success("Orders", Page::new(orders, total, page, limit)))
}

pub async fn update_status<S: Store>(
    store: &S,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateOrderStatusRequest,
) -> AppResult<ApiResponse<OrderPayload>> {
    ensure_seller_or_super_admin(user)?;

    let next: OrderStatus = payload
        .status
        .parse()
        .map_err(|_| AppError::InvalidArgument("Invalid status".into()))?;

    let order = store.get_order(id).await?.ok_or(AppError::NotFound)?;

    if user.role != Role::SuperAdmin {
        // Ownership re-checked against the live seller record, not the
        // role claim.
        let seller = store.find_seller_by_user(user.user_id).await?;
        let owns = matches!(
            (&seller, order.seller_id),
            (Some(s), Some(order_seller)) if s.id == order_seller
        );
        if !owns {
            return Err(AppError::Forbidden);
        }
    }

    if !order.status.can_transition_to(next) {
        return Err(AppError::InvalidState(format!(
            "Cannot move order from {} to {}",
            order.status, next
        )));
    }

    // Conditional on the status still being what was read; a concurrent
    // writer that flipped it first makes this a stale transition.
    let Some(order) = store.transition_order(id, order.status, next).await? else {
        let current = store.get_order(id).await?.ok_or(AppError::NotFound)?;
        return Err(AppError::InvalidState(format!(
            "Cannot move order from {} to {}",
            current.status, next
        )));
    };

    if next == OrderStatus::Cancelled {
        restore_stock(store, &order).await?;
    }

    if let Err(err) = log_audit(
        store,
        Some(user.user_id),
        "order_status_update",
        Some("orders"),
        Some(serde_json::json!({ "order_id": order.id, "status": order.status })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Order status updated",
        OrderPayload { order },
    ))
}

/// User-initiated cancellation, distinct from the admin status update:
/// only the owner, only while still Pending. Restores every decremented
/// quantity. Seller revenue accrual is intentionally left in place.
pub async fn cancel_order<S: Store>(
    store: &S,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<OrderPayload>> {
    let order = store.get_order(id).await?.ok_or(AppError::NotFound)?;

    if order.user_id != user.user_id {
        return Err(AppError::Forbidden);
    }
    if order.status != OrderStatus::Pending {
        return Err(AppError::InvalidState(
            "Cannot cancel order that is already being processed".into(),
        ));
    }

    // Only the writer that wins the Pending -> Cancelled flip restores the
    // stock, so racing cancellations cannot restore it twice.
    let Some(order) = store
        .transition_order(id, OrderStatus::Pending, OrderStatus::Cancelled)
        .await?
    else {
        return Err(AppError::InvalidState(
            "Cannot cancel order that is already being processed".into(),
        ));
    };

    restore_stock(store, &order).await?;

    if let Err(err) = log_audit(
        store,
        Some(user.user_id),
        "order_cancelled",
        Some("orders"),
        Some(serde_json::json!({ "order_id": order.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Order cancelled successfully",
        OrderPayload { order },
    ))
}

fn parse_status_filter(status: Option<&str>) -> AppResult<Option<OrderStatus>> {
    match status.filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(s) => s
            .parse()
            .map(Some)
            .map_err(|_| AppError::InvalidArgument("Invalid status".into())),
    }
}

async fn restore_decrements<S: Store>(store: &S, applied: &[(Uuid, i32)]) -> AppResult<()> {
    for (product_id, qty) in applied {
        store
            .increment_stock(*product_id, *qty)
            .await
            .map_err(|err| {
                AppError::Inconsistency(format!(
                    "stock restore failed for product {product_id} after aborted checkout: {err}"
                ))
            })?;
    }
    Ok(())
}

async fn restore_stock<S: Store>(store: &S, order: &Order) -> AppResult<()> {
    for item in &order.items {
        store.increment_stock(item.product_id, item.quantity).await?;
    }
    Ok(())
}

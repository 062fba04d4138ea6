use chrono::Utc;
use uuid::Uuid;

use crate::{
    audit::log_audit,
    config::AppConfig,
    dto::{
        auth::UserView,
        sellers::{
            RegisterSellerRequest, RevenuePayload, RevenueReport, SellerPayload, SellerRegistered,
            SellerStats, SellerStatsPayload, UpdateSellerRequest,
        },
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_seller, issue_credential},
    models::{OrderStatus, Role, Seller, SellerStatus},
    response::ApiResponse,
    store::{OrderFilter, Store},
};

/// Creates the pending Seller document, promotes the user's role and
/// reissues a credential embedding the new role. The old credential stops
/// verifying as soon as the promotion lands.
pub async fn register_seller<S: Store>(
    store: &S,
    config: &AppConfig,
    user: &AuthUser,
    payload: RegisterSellerRequest,
) -> AppResult<ApiResponse<SellerRegistered>> {
    if store
        .find_seller_by_user(user.user_id)
        .await?
        .is_some()
    {
        return Err(AppError::Conflict(
            "You are already registered as a seller".into(),
        ));
    }

    let seller = Seller {
        id: Uuid::new_v4(),
        user_id: user.user_id,
        business_name: payload.business_name,
        business_email: payload.business_email,
        business_phone: payload.business_phone,
        business_address: payload.business_address,
        commission: 10.0,
        status: SellerStatus::Pending,
        bank_details: payload.bank_details,
        total_revenue: 0.0,
        total_orders: 0,
        created_at: Utc::now(),
    };
    let seller = store.insert_seller(seller).await?;

    let promoted = store.set_role(user.user_id, Role::Seller).await?;
    let token = issue_credential(&config.jwt_secret, config.token_ttl_hours, &promoted)?;

    if let Err(err) = log_audit(
        store,
        Some(user.user_id),
        "seller_register",
        Some("sellers"),
        Some(serde_json::json!({ "seller_id": seller.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Seller registration submitted. Awaiting approval.",
        SellerRegistered {
            seller,
            token,
            user: UserView::from(&promoted),
        },
    ))
}

pub async fn get_my_profile<S: Store>(
    store: &S,
    user: &AuthUser,
) -> AppResult<ApiResponse<SellerPayload>> {
    ensure_seller(user)?;
    let seller = store
        .find_seller_by_user(user.user_id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(ApiResponse::success("Ok", SellerPayload { seller }))
}

pub async fn update_my_profile<S: Store>(
    store: &S,
    user: &AuthUser,
    payload: UpdateSellerRequest,
) -> AppResult<ApiResponse<SellerPayload>> {
    ensure_seller(user)?;
    let mut seller = store
        .find_seller_by_user(user.user_id)
        .await?
        .ok_or(AppError::NotFound)?;

    if let Some(name) = payload.business_name {
        seller.business_name = name;
    }
    if let Some(email) = payload.business_email {
        seller.business_email = email;
    }
    if let Some(phone) = payload.business_phone {
        seller.business_phone = Some(phone);
    }
    if let Some(address) = payload.business_address {
        seller.business_address = Some(address);
    }
    if let Some(bank) = payload.bank_details {
        seller.bank_details = Some(bank);
    }

    let seller = store.update_seller(seller).await?;
    Ok(ApiResponse::success(
        "Profile updated successfully",
        SellerPayload { seller },
    ))
}

/// Stored aggregates mixed with live counts; computed per call so the
/// product and order collections can move independently of the Seller
/// document.
pub async fn get_my_stats<S: Store>(
    store: &S,
    user: &AuthUser,
) -> AppResult<ApiResponse<SellerStatsPayload>> {
    ensure_seller(user)?;
    let seller = store
        .find_seller_by_user(user.user_id)
        .await?
        .ok_or(AppError::NotFound)?;

    let total_products = store.count_products(Some(seller.id)).await?;
    let pending_orders = store
        .count_orders(&OrderFilter {
            seller_id: Some(seller.id),
            status: Some(OrderStatus::Pending),
            ..Default::default()
        })
        .await?;

    let stats = SellerStats {
        total_revenue: seller.total_revenue,
        total_orders: seller.total_orders,
        total_products,
        pending_orders,
        commission: seller.commission,
        status: seller.status,
    };
    Ok(ApiResponse::success("Ok", SellerStatsPayload { stats }))
}

pub async fn get_my_revenue<S: Store>(
    store: &S,
    user: &AuthUser,
) -> AppResult<ApiResponse<RevenuePayload>> {
    ensure_seller(user)?;
    let seller = store
        .find_seller_by_user(user.user_id)
        .await?
        .ok_or(AppError::NotFound)?;

    let filter = OrderFilter {
        seller_id: Some(seller.id),
        exclude_cancelled: true,
        ..Default::default()
    };
    let (recent_orders, _) = store.list_orders(&filter, 1, 50).await?;
    let (_, total_commission) = store.sum_order_financials(&filter).await?;

    let revenue = RevenueReport {
        total_revenue: seller.total_revenue,
        total_commission,
        net_revenue: seller.total_revenue - total_commission,
        commission_rate: seller.commission,
        recent_orders,
    };
    Ok(ApiResponse::success("Ok", RevenuePayload { revenue }))
}

/// Public profile read; bank details never leave the store (the model
/// skips them on serialization as well).
pub async fn get_public_profile<S: Store>(
    store: &S,
    id: Uuid,
) -> AppResult<ApiResponse<SellerPayload>> {
    let seller = store.get_seller(id).await?.ok_or(AppError::NotFound)?;
    Ok(ApiResponse::success("Ok", SellerPayload { seller }))
}

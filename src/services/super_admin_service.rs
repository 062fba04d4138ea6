use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::{
        admin::{
            PlatformStats, PlatformStatsPayload, RevenueTotals, SellerCounts, SellerList,
            UpdateCommissionRequest,
        },
        sellers::SellerPayload,
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_super_admin},
    models::SellerStatus,
    response::ApiResponse,
    store::{OrderFilter, Store},
};

pub async fn list_sellers<S: Store>(
    store: &S,
    user: &AuthUser,
    status: Option<String>,
) -> AppResult<ApiResponse<SellerList>> {
    ensure_super_admin(user)?;
    let status = match status.as_deref().filter(|s| !s.is_empty()) {
        None => None,
        Some(s) => Some(
            s.parse::<SellerStatus>()
                .map_err(|_| AppError::InvalidArgument("Invalid seller status".into()))?,
        ),
    };

    let sellers = store.list_sellers(status).await?;
    Ok(ApiResponse::success(
        "Ok",
        SellerList {
            count: sellers.len(),
            sellers,
        },
    ))
}

pub async fn approve_seller<S: Store>(
    store: &S,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<SellerPayload>> {
    set_seller_status(
        store,
        user,
        id,
        SellerStatus::Approved,
        "Seller approved successfully",
    )
    .await
}

pub async fn reject_seller<S: Store>(
    store: &S,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<SellerPayload>> {
    set_seller_status(store, user, id, SellerStatus::Rejected, "Seller rejected").await
}

pub async fn suspend_seller<S: Store>(
    store: &S,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<SellerPayload>> {
    set_seller_status(store, user, id, SellerStatus::Suspended, "Seller suspended").await
}

async fn set_seller_status<S: Store>(
    store: &S,
    user: &AuthUser,
    id: Uuid,
    next: SellerStatus,
    message: &str,
) -> AppResult<ApiResponse<SellerPayload>> {
    ensure_super_admin(user)?;

    let mut seller = store.get_seller(id).await?.ok_or(AppError::NotFound)?;
    if !seller.status.can_transition_to(next) {
        return Err(AppError::InvalidState(format!(
            "Cannot move seller from {} to {}",
            seller.status, next
        )));
    }

    seller.status = next;
    let seller = store.update_seller(seller).await?;

    if let Err(err) = log_audit(
        store,
        Some(user.user_id),
        "seller_status_update",
        Some("sellers"),
        Some(serde_json::json!({ "seller_id": seller.id, "status": seller.status })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(message, SellerPayload { seller }))
}

pub async fn update_commission<S: Store>(
    store: &S,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateCommissionRequest,
) -> AppResult<ApiResponse<SellerPayload>> {
    ensure_super_admin(user)?;

    if !payload.commission.is_finite() || payload.commission < 0.0 || payload.commission > 100.0 {
        return Err(AppError::InvalidArgument(
            "Commission must be between 0 and 100".into(),
        ));
    }

    let mut seller = store.get_seller(id).await?.ok_or(AppError::NotFound)?;
    seller.commission = payload.commission;
    let seller = store.update_seller(seller).await?;

    if let Err(err) = log_audit(
        store,
        Some(user.user_id),
        "seller_commission_update",
        Some("sellers"),
        Some(serde_json::json!({ "seller_id": seller.id, "commission": seller.commission })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Commission updated successfully",
        SellerPayload { seller },
    ))
}

/// Platform-wide rollups. Financial sums always exclude cancelled orders.
pub async fn platform_stats<S: Store>(
    store: &S,
    user: &AuthUser,
) -> AppResult<ApiResponse<PlatformStatsPayload>> {
    ensure_super_admin(user)?;

    let sellers = SellerCounts {
        total: store.count_sellers(None).await?,
        pending: store.count_sellers(Some(SellerStatus::Pending)).await?,
        approved: store.count_sellers(Some(SellerStatus::Approved)).await?,
        suspended: store.count_sellers(Some(SellerStatus::Suspended)).await?,
    };

    let total_orders = store.count_orders(&OrderFilter::default()).await?;
    let total_products = store.count_products(None).await?;

    let (total, commission) = store
        .sum_order_financials(&OrderFilter {
            exclude_cancelled: true,
            ..Default::default()
        })
        .await?;

    let stats = PlatformStats {
        sellers,
        total_orders,
        total_products,
        revenue: RevenueTotals { total, commission },
    };
    Ok(ApiResponse::success("Ok", PlatformStatsPayload { stats }))
}

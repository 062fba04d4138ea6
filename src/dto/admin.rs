use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::Seller;

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateCommissionRequest {
    pub commission: f64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SellerList {
    pub count: usize,
    pub sellers: Vec<Seller>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SellerCounts {
    pub total: i64,
    pub pending: i64,
    pub approved: i64,
    pub suspended: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RevenueTotals {
    pub total: f64,
    pub commission: f64,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlatformStats {
    pub sellers: SellerCounts,
    pub total_orders: i64,
    pub total_products: i64,
    pub revenue: RevenueTotals,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PlatformStatsPayload {
    pub stats: PlatformStats,
}

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    dto::auth::UserView,
    models::{Address, BankDetails, Order, Seller, SellerStatus},
};

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterSellerRequest {
    pub business_name: String,
    pub business_email: String,
    pub business_phone: Option<String>,
    pub business_address: Option<Address>,
    pub bank_details: Option<BankDetails>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSellerRequest {
    pub business_name: Option<String>,
    pub business_email: Option<String>,
    pub business_phone: Option<String>,
    pub business_address: Option<Address>,
    pub bank_details: Option<BankDetails>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SellerPayload {
    pub seller: Seller,
}

/// Returned by seller registration: the freshly created profile plus a
/// reissued credential carrying the promoted role.
#[derive(Debug, Serialize, ToSchema)]
pub struct SellerRegistered {
    pub seller: Seller,
    pub token: String,
    pub user: UserView,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SellerStats {
    pub total_revenue: f64,
    pub total_orders: i64,
    pub total_products: i64,
    pub pending_orders: i64,
    pub commission: f64,
    pub status: SellerStatus,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SellerStatsPayload {
    pub stats: SellerStats,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RevenueReport {
    pub total_revenue: f64,
    pub total_commission: f64,
    pub net_revenue: f64,
    pub commission_rate: f64,
    pub recent_orders: Vec<Order>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RevenuePayload {
    pub revenue: RevenueReport,
}

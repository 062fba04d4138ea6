use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{Address, Order};

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub shipping_address: Address,
    pub payment_method: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateOrderStatusRequest {
    pub status: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderPayload {
    pub order: Order,
}

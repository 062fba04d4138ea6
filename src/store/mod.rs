#![allow(async_fn_in_trait)]

use uuid::Uuid;

use crate::{
    audit::AuditEntry,
    error::AppResult,
    models::{Cart, Order, OrderStatus, Product, Role, Seller, SellerStatus, User},
};

pub mod memory;

#[derive(Debug, Default, Clone)]
pub struct ProductFilter {
    pub seller_id: Option<Uuid>,
    pub category_id: Option<Uuid>,
    pub search: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub featured: Option<bool>,
}

#[derive(Debug, Default, Clone)]
pub struct OrderFilter {
    pub user_id: Option<Uuid>,
    pub seller_id: Option<Uuid>,
    pub status: Option<OrderStatus>,
    pub exclude_cancelled: bool,
}

pub trait UserStore: Send + Sync {
    async fn insert_user(&self, user: User) -> AppResult<User>;
    async fn get_user(&self, id: Uuid) -> AppResult<Option<User>>;
    async fn find_user_by_email(&self, email: &str) -> AppResult<Option<User>>;
    /// Persists the new role and bumps the user's token version so that
    /// previously issued credentials stop verifying.
    async fn set_role(&self, id: Uuid, role: Role) -> AppResult<User>;
}

pub trait SellerStore: Send + Sync {
    async fn insert_seller(&self, seller: Seller) -> AppResult<Seller>;
    async fn get_seller(&self, id: Uuid) -> AppResult<Option<Seller>>;
    async fn find_seller_by_user(&self, user_id: Uuid) -> AppResult<Option<Seller>>;
    async fn update_seller(&self, seller: Seller) -> AppResult<Seller>;
    /// Atomic increment of the running revenue/order-count aggregates.
    async fn accrue_seller_totals(&self, id: Uuid, revenue: f64, orders: i64) -> AppResult<()>;
    async fn list_sellers(&self, status: Option<SellerStatus>) -> AppResult<Vec<Seller>>;
    async fn count_sellers(&self, status: Option<SellerStatus>) -> AppResult<i64>;
}

pub trait ProductStore: Send + Sync {
    async fn insert_product(&self, product: Product) -> AppResult<Product>;
    async fn get_product(&self, id: Uuid) -> AppResult<Option<Product>>;
    async fn update_product(&self, product: Product) -> AppResult<Product>;
    async fn delete_product(&self, id: Uuid) -> AppResult<bool>;
    async fn list_products(
        &self,
        filter: &ProductFilter,
        page: i64,
        limit: i64,
    ) -> AppResult<(Vec<Product>, i64)>;
    async fn count_products(&self, seller_id: Option<Uuid>) -> AppResult<i64>;
    /// Conditional decrement: succeeds and returns true iff stock >= qty.
    async fn decrement_stock(&self, id: Uuid, qty: i32) -> AppResult<bool>;
    async fn increment_stock(&self, id: Uuid, qty: i32) -> AppResult<()>;
}

pub trait CartStore: Send + Sync {
    async fn get_cart(&self, user_id: Uuid) -> AppResult<Cart>;
    async fn put_cart(&self, cart: Cart) -> AppResult<Cart>;
    async fn clear_cart(&self, user_id: Uuid) -> AppResult<()>;
}

pub trait OrderStore: Send + Sync {
    async fn insert_order(&self, order: Order) -> AppResult<Order>;
    async fn get_order(&self, id: Uuid) -> AppResult<Option<Order>>;
    /// Conditional status flip: succeeds iff the order is currently `from`.
    /// Returns the updated order, or None when another writer got there
    /// first.
    async fn transition_order(
        &self,
        id: Uuid,
        from: OrderStatus,
        to: OrderStatus,
    ) -> AppResult<Option<Order>>;
    async fn list_orders(
        &self,
        filter: &OrderFilter,
        page: i64,
        limit: i64,
    ) -> AppResult<(Vec<Order>, i64)>;
    async fn count_orders(&self, filter: &OrderFilter) -> AppResult<i64>;
    /// Sum of (total_price, platform_commission) over matching orders.
    async fn sum_order_financials(&self, filter: &OrderFilter) -> AppResult<(f64, f64)>;
}

pub trait AuditStore: Send + Sync {
    async fn append_audit(&self, entry: AuditEntry) -> AppResult<()>;
}

pub trait Store:
    UserStore + SellerStore + ProductStore + CartStore + OrderStore + AuditStore
{
}

impl<T> Store for T where
    T: UserStore + SellerStore + ProductStore + CartStore + OrderStore + AuditStore
{
}

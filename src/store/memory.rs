use std::collections::HashMap;

use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    audit::AuditEntry,
    error::{AppError, AppResult},
    models::{Cart, Order, OrderStatus, Product, Role, Seller, SellerStatus, User},
    store::{
        AuditStore, CartStore, OrderFilter, OrderStore, ProductFilter, ProductStore, SellerStore,
        UserStore,
    },
};

/// In-memory document store. Collections are keyed by id; the conditional
/// stock decrement and the seller-total accruals run under the collection
/// write lock, which is what makes them atomic with respect to concurrent
/// requests.
#[derive(Default)]
pub struct MemoryStore {
    users: RwLock<HashMap<Uuid, User>>,
    sellers: RwLock<HashMap<Uuid, Seller>>,
    products: RwLock<HashMap<Uuid, Product>>,
    carts: RwLock<HashMap<Uuid, Cart>>,
    orders: RwLock<HashMap<Uuid, Order>>,
    audit_log: RwLock<Vec<AuditEntry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn paginate<T>(mut items: Vec<T>, page: i64, limit: i64) -> (Vec<T>, i64) {
    let total = items.len() as i64;
    let offset = ((page - 1) * limit).max(0) as usize;
    if offset >= items.len() {
        return (Vec::new(), total);
    }
    let items: Vec<T> = items.drain(offset..).take(limit.max(0) as usize).collect();
    (items, total)
}

impl UserStore for MemoryStore {
    async fn insert_user(&self, user: User) -> AppResult<User> {
        let mut users = self.users.write().await;
        if users.values().any(|u| u.email == user.email) {
            return Err(AppError::Conflict("Email is already taken".into()));
        }
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn get_user(&self, id: Uuid) -> AppResult<Option<User>> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> AppResult<Option<User>> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn set_role(&self, id: Uuid, role: Role) -> AppResult<User> {
        let mut users = self.users.write().await;
        let user = users.get_mut(&id).ok_or(AppError::NotFound)?;
        user.role = role;
        user.token_version += 1;
        Ok(user.clone())
    }
}

impl SellerStore for MemoryStore {
    async fn insert_seller(&self, seller: Seller) -> AppResult<Seller> {
        let mut sellers = self.sellers.write().await;
        // user -> seller is 1:1
        if sellers.values().any(|s| s.user_id == seller.user_id) {
            return Err(AppError::Conflict(
                "You are already registered as a seller".into(),
            ));
        }
        sellers.insert(seller.id, seller.clone());
        Ok(seller)
    }

    async fn get_seller(&self, id: Uuid) -> AppResult<Option<Seller>> {
        Ok(self.sellers.read().await.get(&id).cloned())
    }

    async fn find_seller_by_user(&self, user_id: Uuid) -> AppResult<Option<Seller>> {
        Ok(self
            .sellers
            .read()
            .await
            .values()
            .find(|s| s.user_id == user_id)
            .cloned())
    }

    async fn update_seller(&self, seller: Seller) -> AppResult<Seller> {
        let mut sellers = self.sellers.write().await;
        if !sellers.contains_key(&seller.id) {
            return Err(AppError::NotFound);
        }
        sellers.insert(seller.id, seller.clone());
        Ok(seller)
    }

    async fn accrue_seller_totals(&self, id: Uuid, revenue: f64, orders: i64) -> AppResult<()> {
        let mut sellers = self.sellers.write().await;
        let seller = sellers.get_mut(&id).ok_or(AppError::NotFound)?;
        seller.total_revenue += revenue;
        seller.total_orders += orders;
        Ok(())
    }

    async fn list_sellers(&self, status: Option<SellerStatus>) -> AppResult<Vec<Seller>> {
        let mut sellers: Vec<Seller> = self
            .sellers
            .read()
            .await
            .values()
            .filter(|s| status.is_none_or(|wanted| s.status == wanted))
            .cloned()
            .collect();
        sellers.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(sellers)
    }

    async fn count_sellers(&self, status: Option<SellerStatus>) -> AppResult<i64> {
        Ok(self
            .sellers
            .read()
            .await
            .values()
            .filter(|s| status.is_none_or(|wanted| s.status == wanted))
            .count() as i64)
    }
}

fn product_matches(product: &Product, filter: &ProductFilter) -> bool {
    if let Some(seller_id) = filter.seller_id {
        if product.seller_id != Some(seller_id) {
            return false;
        }
    }
    if let Some(category_id) = filter.category_id {
        if product.category_id != Some(category_id) {
            return false;
        }
    }
    if let Some(search) = filter.search.as_deref() {
        let needle = search.to_lowercase();
        if !product.name.to_lowercase().contains(&needle)
            && !product.description.to_lowercase().contains(&needle)
        {
            return false;
        }
    }
    if let Some(min) = filter.min_price {
        if product.price < min {
            return false;
        }
    }
    if let Some(max) = filter.max_price {
        if product.price > max {
            return false;
        }
    }
    if let Some(featured) = filter.featured {
        if product.featured != featured {
            return false;
        }
    }
    true
}

impl ProductStore for MemoryStore {
    async fn insert_product(&self, product: Product) -> AppResult<Product> {
        self.products
            .write()
            .await
            .insert(product.id, product.clone());
        Ok(product)
    }

    async fn get_product(&self, id: Uuid) -> AppResult<Option<Product>> {
        Ok(self.products.read().await.get(&id).cloned())
    }

    async fn update_product(&self, product: Product) -> AppResult<Product> {
        let mut products = self.products.write().await;
        if !products.contains_key(&product.id) {
            return Err(AppError::NotFound);
        }
        products.insert(product.id, product.clone());
        Ok(product)
    }

    async fn delete_product(&self, id: Uuid) -> AppResult<bool> {
        Ok(self.products.write().await.remove(&id).is_some())
    }

    async fn list_products(
        &self,
        filter: &ProductFilter,
        page: i64,
        limit: i64,
    ) -> AppResult<(Vec<Product>, i64)> {
        let mut products: Vec<Product> = self
            .products
            .read()
            .await
            .values()
            .filter(|p| product_matches(p, filter))
            .cloned()
            .collect();
        products.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(paginate(products, page, limit))
    }

    async fn count_products(&self, seller_id: Option<Uuid>) -> AppResult<i64> {
        Ok(self
            .products
            .read()
            .await
            .values()
            .filter(|p| seller_id.is_none_or(|id| p.seller_id == Some(id)))
            .count() as i64)
    }

    async fn decrement_stock(&self, id: Uuid, qty: i32) -> AppResult<bool> {
        let mut products = self.products.write().await;
        let Some(product) = products.get_mut(&id) else {
            return Ok(false);
        };
        if product.stock < qty {
            return Ok(false);
        }
        product.stock -= qty;
        product.updated_at = Utc::now();
        Ok(true)
    }

    async fn increment_stock(&self, id: Uuid, qty: i32) -> AppResult<()> {
        let mut products = self.products.write().await;
        // The product may have been hard-deleted after the order was placed;
        // there is nothing to restore in that case.
        if let Some(product) = products.get_mut(&id) {
            product.stock += qty;
            product.updated_at = Utc::now();
        }
        Ok(())
    }
}

impl CartStore for MemoryStore {
    async fn get_cart(&self, user_id: Uuid) -> AppResult<Cart> {
        Ok(self
            .carts
            .read()
            .await
            .get(&user_id)
            .cloned()
            .unwrap_or_else(|| Cart::empty(user_id)))
    }

    async fn put_cart(&self, cart: Cart) -> AppResult<Cart> {
        self.carts.write().await.insert(cart.user_id, cart.clone());
        Ok(cart)
    }

    async fn clear_cart(&self, user_id: Uuid) -> AppResult<()> {
        self.carts.write().await.insert(user_id, Cart::empty(user_id));
        Ok(())
    }
}

fn order_matches(order: &Order, filter: &OrderFilter) -> bool {
    if let Some(user_id) = filter.user_id {
        if order.user_id != user_id {
            return false;
        }
    }
    if let Some(seller_id) = filter.seller_id {
        if order.seller_id != Some(seller_id) {
            return false;
        }
    }
    if let Some(status) = filter.status {
        if order.status != status {
            return false;
        }
    }
    if filter.exclude_cancelled && order.status == OrderStatus::Cancelled {
        return false;
    }
    true
}

impl OrderStore for MemoryStore {
    async fn insert_order(&self, order: Order) -> AppResult<Order> {
        self.orders.write().await.insert(order.id, order.clone());
        Ok(order)
    }

    async fn get_order(&self, id: Uuid) -> AppResult<Option<Order>> {
        Ok(self.orders.read().await.get(&id).cloned())
    }

    async fn transition_order(
        &self,
        id: Uuid,
        from: OrderStatus,
        to: OrderStatus,
    ) -> AppResult<Option<Order>> {
        let mut orders = self.orders.write().await;
        let order = orders.get_mut(&id).ok_or(AppError::NotFound)?;
        if order.status != from {
            return Ok(None);
        }
        order.status = to;
        order.updated_at = Utc::now();
        Ok(Some(order.clone()))
    }

    async fn list_orders(
        &self,
        filter: &OrderFilter,
        page: i64,
        limit: i64,
    ) -> AppResult<(Vec<Order>, i64)> {
        let mut orders: Vec<Order> = self
            .orders
            .read()
            .await
            .values()
            .filter(|o| order_matches(o, filter))
            .cloned()
            .collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(paginate(orders, page, limit))
    }

    async fn count_orders(&self, filter: &OrderFilter) -> AppResult<i64> {
        Ok(self
            .orders
            .read()
            .await
            .values()
            .filter(|o| order_matches(o, filter))
            .count() as i64)
    }

    async fn sum_order_financials(&self, filter: &OrderFilter) -> AppResult<(f64, f64)> {
        Ok(self
            .orders
            .read()
            .await
            .values()
            .filter(|o| order_matches(o, filter))
            .fold((0.0, 0.0), |(total, commission), o| {
                (total + o.total_price, commission + o.platform_commission)
            }))
    }
}

impl AuditStore for MemoryStore {
    async fn append_audit(&self, entry: AuditEntry) -> AppResult<()> {
        self.audit_log.write().await.push(entry);
        Ok(())
    }
}

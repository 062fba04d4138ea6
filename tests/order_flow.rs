mod common;

use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::Barrier;
use uuid::Uuid;

use axum_marketplace_api::{
    audit::AuditEntry,
    dto::cart::AddToCartRequest,
    error::{AppError, AppResult},
    models::{Cart, Order, OrderStatus, Product, Role, Seller, SellerStatus, User},
    services::{cart_service, order_service},
    store::{
        AuditStore, CartStore, OrderFilter, OrderStore, ProductFilter, ProductStore, SellerStore,
        UserStore, memory::MemoryStore,
    },
};

use common::{approx, auth, order_request, seed_product, seed_seller, seed_user, store};

#[tokio::test]
async fn checkout_splits_commission_and_clears_cart() {
    let store = store();
    let buyer = seed_user(&store, Role::User).await;
    let seller_user = seed_user(&store, Role::Seller).await;
    let seller = seed_seller(&store, seller_user.id, SellerStatus::Approved, 10.0).await;
    let product = seed_product(&store, Some(seller.id), 50.0, 10).await;

    cart_service::add_to_cart(
        &store,
        &auth(&buyer),
        AddToCartRequest {
            product_id: product.id,
            quantity: 2,
        },
    )
    .await
    .unwrap();

    let resp = order_service::create_order(&store, &auth(&buyer), order_request())
        .await
        .unwrap();
    let order = resp.data.unwrap().order;

    assert_eq!(order.status, OrderStatus::Pending);
    assert!(approx(order.total_price, 100.0));
    assert!(approx(order.platform_commission, 10.0));
    assert!(approx(order.seller_revenue, 90.0));
    assert_eq!(order.seller_id, Some(seller.id));
    assert_eq!(order.items.len(), 1);
    assert_eq!(order.items[0].quantity, 2);

    let product = store.get_product(product.id).await.unwrap().unwrap();
    assert_eq!(product.stock, 8);

    let seller = store.get_seller(seller.id).await.unwrap().unwrap();
    assert!(approx(seller.total_revenue, 90.0));
    assert_eq!(seller.total_orders, 1);

    let cart = store.get_cart(buyer.id).await.unwrap();
    assert!(cart.items.is_empty());
}

#[tokio::test]
async fn checkout_rejects_empty_cart() {
    let store = store();
    let buyer = seed_user(&store, Role::User).await;

    let err = order_service::create_order(&store, &auth(&buyer), order_request())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidState(_)));
}

#[tokio::test]
async fn checkout_rejects_mixed_seller_carts() {
    let store = store();
    let buyer = seed_user(&store, Role::User).await;
    let user_a = seed_user(&store, Role::Seller).await;
    let user_b = seed_user(&store, Role::Seller).await;
    let seller_a = seed_seller(&store, user_a.id, SellerStatus::Approved, 10.0).await;
    let seller_b = seed_seller(&store, user_b.id, SellerStatus::Approved, 10.0).await;
    let product_a = seed_product(&store, Some(seller_a.id), 10.0, 5).await;
    let product_b = seed_product(&store, Some(seller_b.id), 20.0, 5).await;

    for product_id in [product_a.id, product_b.id] {
        cart_service::add_to_cart(
            &store,
            &auth(&buyer),
            AddToCartRequest {
                product_id,
                quantity: 1,
            },
        )
        .await
        .unwrap();
    }

    let err = order_service::create_order(&store, &auth(&buyer), order_request())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidState(_)));

    // Nothing was taken from either product.
    assert_eq!(store.get_product(product_a.id).await.unwrap().unwrap().stock, 5);
    assert_eq!(store.get_product(product_b.id).await.unwrap().unwrap().stock, 5);
    assert_eq!(store.count_orders(&OrderFilter::default()).await.unwrap(), 0);
}

#[tokio::test]
async fn insufficient_stock_leaves_everything_untouched() {
    let store = store();
    let buyer = seed_user(&store, Role::User).await;
    let seller_user = seed_user(&store, Role::Seller).await;
    let seller = seed_seller(&store, seller_user.id, SellerStatus::Approved, 10.0).await;
    let product = seed_product(&store, Some(seller.id), 25.0, 1).await;

    cart_service::add_to_cart(
        &store,
        &auth(&buyer),
        AddToCartRequest {
            product_id: product.id,
            quantity: 3,
        },
    )
    .await
    .unwrap();

    let err = order_service::create_order(&store, &auth(&buyer), order_request())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InsufficientStock(_)));

    assert_eq!(store.get_product(product.id).await.unwrap().unwrap().stock, 1);
    assert_eq!(store.count_orders(&OrderFilter::default()).await.unwrap(), 0);

    let seller = store.get_seller(seller.id).await.unwrap().unwrap();
    assert!(approx(seller.total_revenue, 0.0));
    assert_eq!(seller.total_orders, 0);

    // The cart survives a failed checkout.
    let cart = store.get_cart(buyer.id).await.unwrap();
    assert_eq!(cart.items.len(), 1);
}

#[tokio::test]
async fn checkout_snapshots_commission_rate_at_order_time() {
    let store = store();
    let buyer = seed_user(&store, Role::User).await;
    let seller_user = seed_user(&store, Role::Seller).await;
    let seller = seed_seller(&store, seller_user.id, SellerStatus::Approved, 10.0).await;
    let product = seed_product(&store, Some(seller.id), 100.0, 10).await;

    cart_service::add_to_cart(
        &store,
        &auth(&buyer),
        AddToCartRequest {
            product_id: product.id,
            quantity: 1,
        },
    )
    .await
    .unwrap();
    let first = order_service::create_order(&store, &auth(&buyer), order_request())
        .await
        .unwrap()
        .data
        .unwrap()
        .order;

    let mut updated = store.get_seller(seller.id).await.unwrap().unwrap();
    updated.commission = 20.0;
    store.update_seller(updated).await.unwrap();

    cart_service::add_to_cart(
        &store,
        &auth(&buyer),
        AddToCartRequest {
            product_id: product.id,
            quantity: 1,
        },
    )
    .await
    .unwrap();
    let second = order_service::create_order(&store, &auth(&buyer), order_request())
        .await
        .unwrap()
        .data
        .unwrap()
        .order;

    assert!(approx(first.platform_commission, 10.0));
    assert!(approx(second.platform_commission, 20.0));

    // The first order never changes retroactively.
    let first = store.get_order(first.id).await.unwrap().unwrap();
    assert!(approx(first.platform_commission, 10.0));
}

#[tokio::test]
async fn unattributed_products_carry_no_commission() {
    let store = store();
    let buyer = seed_user(&store, Role::User).await;
    let product = seed_product(&store, None, 40.0, 5).await;

    cart_service::add_to_cart(
        &store,
        &auth(&buyer),
        AddToCartRequest {
            product_id: product.id,
            quantity: 2,
        },
    )
    .await
    .unwrap();

    let order = order_service::create_order(&store, &auth(&buyer), order_request())
        .await
        .unwrap()
        .data
        .unwrap()
        .order;

    assert_eq!(order.seller_id, None);
    assert!(approx(order.total_price, 80.0));
    assert!(approx(order.platform_commission, 0.0));
    assert!(approx(order.seller_revenue, 80.0));
}

#[tokio::test]
async fn cancelling_a_pending_order_restores_stock() {
    let store = store();
    let buyer = seed_user(&store, Role::User).await;
    let seller_user = seed_user(&store, Role::Seller).await;
    let seller = seed_seller(&store, seller_user.id, SellerStatus::Approved, 10.0).await;
    let product = seed_product(&store, Some(seller.id), 30.0, 6).await;

    cart_service::add_to_cart(
        &store,
        &auth(&buyer),
        AddToCartRequest {
            product_id: product.id,
            quantity: 4,
        },
    )
    .await
    .unwrap();
    let order = order_service::create_order(&store, &auth(&buyer), order_request())
        .await
        .unwrap()
        .data
        .unwrap()
        .order;
    assert_eq!(store.get_product(product.id).await.unwrap().unwrap().stock, 2);

    let cancelled = order_service::cancel_order(&store, &auth(&buyer), order.id)
        .await
        .unwrap()
        .data
        .unwrap()
        .order;

    assert_eq!(cancelled.status, OrderStatus::Cancelled);
    assert_eq!(store.get_product(product.id).await.unwrap().unwrap().stock, 6);
}

#[tokio::test]
async fn only_the_owner_may_cancel() {
    let store = store();
    let buyer = seed_user(&store, Role::User).await;
    let stranger = seed_user(&store, Role::User).await;
    let product = seed_product(&store, None, 10.0, 5).await;

    cart_service::add_to_cart(
        &store,
        &auth(&buyer),
        AddToCartRequest {
            product_id: product.id,
            quantity: 1,
        },
    )
    .await
    .unwrap();
    let order = order_service::create_order(&store, &auth(&buyer), order_request())
        .await
        .unwrap()
        .data
        .unwrap()
        .order;

    let err = order_service::cancel_order(&store, &auth(&stranger), order.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden));
}

#[tokio::test]
async fn cancellation_window_closes_once_processing() {
    let store = store();
    let buyer = seed_user(&store, Role::User).await;
    let seller_user = seed_user(&store, Role::Seller).await;
    let seller = seed_seller(&store, seller_user.id, SellerStatus::Approved, 10.0).await;
    let product = seed_product(&store, Some(seller.id), 30.0, 6).await;

    cart_service::add_to_cart(
        &store,
        &auth(&buyer),
        AddToCartRequest {
            product_id: product.id,
            quantity: 1,
        },
    )
    .await
    .unwrap();
    let order = order_service::create_order(&store, &auth(&buyer), order_request())
        .await
        .unwrap()
        .data
        .unwrap()
        .order;

    order_service::update_status(
        &store,
        &auth(&seller_user),
        order.id,
        axum_marketplace_api::dto::orders::UpdateOrderStatusRequest {
            status: "Processing".to_string(),
        },
    )
    .await
    .unwrap();

    let err = order_service::cancel_order(&store, &auth(&buyer), order.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidState(_)));
}

/// Delegates to a [`MemoryStore`] while letting a test refuse particular
/// writes or hold the first two order reads at a rendezvous point, so that
/// two callers proceed from the same snapshot.
struct InstrumentedStore {
    inner: MemoryStore,
    refuse_decrement_for: Option<Uuid>,
    fail_order_inserts: bool,
    order_read_barrier: Option<Barrier>,
    barriered_reads: AtomicUsize,
}

impl InstrumentedStore {
    fn wrap(inner: MemoryStore) -> Self {
        Self {
            inner,
            refuse_decrement_for: None,
            fail_order_inserts: false,
            order_read_barrier: None,
            barriered_reads: AtomicUsize::new(0),
        }
    }
}

impl UserStore for InstrumentedStore {
    async fn insert_user(&self, user: User) -> AppResult<User> {
        self.inner.insert_user(user).await
    }

    async fn get_user(&self, id: Uuid) -> AppResult<Option<User>> {
        self.inner.get_user(id).await
    }

    async fn find_user_by_email(&self, email: &str) -> AppResult<Option<User>> {
        self.inner.find_user_by_email(email).await
    }

    async fn set_role(&self, id: Uuid, role: Role) -> AppResult<User> {
        self.inner.set_role(id, role).await
    }
}

impl SellerStore for InstrumentedStore {
    async fn insert_seller(&self, seller: Seller) -> AppResult<Seller> {
        self.inner.insert_seller(seller).await
    }

    async fn get_seller(&self, id: Uuid) -> AppResult<Option<Seller>> {
        self.inner.get_seller(id).await
    }

    async fn find_seller_by_user(&self, user_id: Uuid) -> AppResult<Option<Seller>> {
        self.inner.find_seller_by_user(user_id).await
    }

    async fn update_seller(&self, seller: Seller) -> AppResult<Seller> {
        self.inner.update_seller(seller).await
    }

    async fn accrue_seller_totals(&self, id: Uuid, revenue: f64, orders: i64) -> AppResult<()> {
        self.inner.accrue_seller_totals(id, revenue, orders).await
    }

    async fn list_sellers(&self, status: Option<SellerStatus>) -> AppResult<Vec<Seller>> {
        self.inner.list_sellers(status).await
    }

    async fn count_sellers(&self, status: Option<SellerStatus>) -> AppResult<i64> {
        self.inner.count_sellers(status).await
    }
}

impl ProductStore for InstrumentedStore {
    async fn insert_product(&self, product: Product) -> AppResult<Product> {
        self.inner.insert_product(product).await
    }

    async fn get_product(&self, id: Uuid) -> AppResult<Option<Product>> {
        self.inner.get_product(id).await
    }

    async fn update_product(&self, product: Product) -> AppResult<Product> {
        self.inner.update_product(product).await
    }

    async fn delete_product(&self, id: Uuid) -> AppResult<bool> {
        self.inner.delete_product(id).await
    }

    async fn list_products(
        &self,
        filter: &ProductFilter,
        page: i64,
        limit: i64,
    ) -> AppResult<(Vec<Product>, i64)> {
        self.inner.list_products(filter, page, limit).await
    }

    async fn count_products(&self, seller_id: Option<Uuid>) -> AppResult<i64> {
        self.inner.count_products(seller_id).await
    }

    async fn decrement_stock(&self, id: Uuid, qty: i32) -> AppResult<bool> {
        if self.refuse_decrement_for == Some(id) {
            return Ok(false);
        }
        self.inner.decrement_stock(id, qty).await
    }

    async fn increment_stock(&self, id: Uuid, qty: i32) -> AppResult<()> {
        self.inner.increment_stock(id, qty).await
    }
}

impl CartStore for InstrumentedStore {
    async fn get_cart(&self, user_id: Uuid) -> AppResult<Cart> {
        self.inner.get_cart(user_id).await
    }

    async fn put_cart(&self, cart: Cart) -> AppResult<Cart> {
        self.inner.put_cart(cart).await
    }

    async fn clear_cart(&self, user_id: Uuid) -> AppResult<()> {
        self.inner.clear_cart(user_id).await
    }
}

impl OrderStore for InstrumentedStore {
    async fn insert_order(&self, order: Order) -> AppResult<Order> {
        if self.fail_order_inserts {
            return Err(AppError::Internal(anyhow::anyhow!(
                "orders collection unavailable"
            )));
        }
        self.inner.insert_order(order).await
    }

    async fn get_order(&self, id: Uuid) -> AppResult<Option<Order>> {
        let order = self.inner.get_order(id).await?;
        if let Some(barrier) = &self.order_read_barrier {
            if self.barriered_reads.fetch_add(1, Ordering::SeqCst) < 2 {
                barrier.wait().await;
            }
        }
        Ok(order)
    }

    async fn transition_order(
        &self,
        id: Uuid,
        from: OrderStatus,
        to: OrderStatus,
    ) -> AppResult<Option<Order>> {
        self.inner.transition_order(id, from, to).await
    }

    async fn list_orders(
        &self,
        filter: &OrderFilter,
        page: i64,
        limit: i64,
    ) -> AppResult<(Vec<Order>, i64)> {
        self.inner.list_orders(filter, page, limit).await
    }

    async fn count_orders(&self, filter: &OrderFilter) -> AppResult<i64> {
        self.inner.count_orders(filter).await
    }

    async fn sum_order_financials(&self, filter: &OrderFilter) -> AppResult<(f64, f64)> {
        self.inner.sum_order_financials(filter).await
    }
}

impl AuditStore for InstrumentedStore {
    async fn append_audit(&self, entry: AuditEntry) -> AppResult<()> {
        self.inner.append_audit(entry).await
    }
}

#[tokio::test]
async fn racing_cancellations_restore_stock_exactly_once() {
    let inner = store();
    let buyer = seed_user(&inner, Role::User).await;
    let seller_user = seed_user(&inner, Role::Seller).await;
    let seller = seed_seller(&inner, seller_user.id, SellerStatus::Approved, 10.0).await;
    let product = seed_product(&inner, Some(seller.id), 30.0, 10).await;

    cart_service::add_to_cart(
        &inner,
        &auth(&buyer),
        AddToCartRequest {
            product_id: product.id,
            quantity: 4,
        },
    )
    .await
    .unwrap();
    let order = order_service::create_order(&inner, &auth(&buyer), order_request())
        .await
        .unwrap()
        .data
        .unwrap()
        .order;

    // Both cancellations read the order as Pending before either writes.
    let store = InstrumentedStore {
        order_read_barrier: Some(Barrier::new(2)),
        ..InstrumentedStore::wrap(inner)
    };

    let buyer_auth_a = auth(&buyer);
    let buyer_auth_b = auth(&buyer);
    let (first, second) = tokio::join!(
        order_service::cancel_order(&store, &buyer_auth_a, order.id),
        order_service::cancel_order(&store, &buyer_auth_b, order.id),
    );

    assert!(first.is_ok() != second.is_ok());
    let loser = if first.is_ok() { second } else { first };
    assert!(matches!(loser.unwrap_err(), AppError::InvalidState(_)));

    // Decremented 4, restored 4: never above the all-time ceiling of 10.
    let product = store.inner.get_product(product.id).await.unwrap().unwrap();
    assert_eq!(product.stock, 10);
    let order = store.inner.get_order(order.id).await.unwrap().unwrap();
    assert_eq!(order.status, OrderStatus::Cancelled);
}

#[tokio::test]
async fn racing_cancel_and_status_update_resolve_to_one_writer() {
    let inner = store();
    let buyer = seed_user(&inner, Role::User).await;
    let seller_user = seed_user(&inner, Role::Seller).await;
    let seller = seed_seller(&inner, seller_user.id, SellerStatus::Approved, 10.0).await;
    let product = seed_product(&inner, Some(seller.id), 30.0, 10).await;

    cart_service::add_to_cart(
        &inner,
        &auth(&buyer),
        AddToCartRequest {
            product_id: product.id,
            quantity: 4,
        },
    )
    .await
    .unwrap();
    let order = order_service::create_order(&inner, &auth(&buyer), order_request())
        .await
        .unwrap()
        .data
        .unwrap()
        .order;

    let store = InstrumentedStore {
        order_read_barrier: Some(Barrier::new(2)),
        ..InstrumentedStore::wrap(inner)
    };

    let buyer_auth = auth(&buyer);
    let seller_auth = auth(&seller_user);
    let (cancel, update) = tokio::join!(
        order_service::cancel_order(&store, &buyer_auth, order.id),
        order_service::update_status(
            &store,
            &seller_auth,
            order.id,
            axum_marketplace_api::dto::orders::UpdateOrderStatusRequest {
                status: "Processing".to_string(),
            },
        ),
    );

    assert!(cancel.is_ok() != update.is_ok());
    let product = store.inner.get_product(product.id).await.unwrap().unwrap();
    let order = store.inner.get_order(order.id).await.unwrap().unwrap();
    match order.status {
        // The cancellation won and restored stock; the update saw Cancelled.
        OrderStatus::Cancelled => {
            assert!(cancel.is_ok());
            assert_eq!(product.stock, 10);
        }
        // The update won; nothing was restored and the cancel window closed.
        OrderStatus::Processing => {
            assert!(update.is_ok());
            assert_eq!(product.stock, 6);
        }
        other => panic!("unexpected status {other}"),
    }
}

#[tokio::test]
async fn refused_decrement_rolls_back_lines_already_taken() {
    let inner = store();
    let buyer = seed_user(&inner, Role::User).await;
    let seller_user = seed_user(&inner, Role::Seller).await;
    let seller = seed_seller(&inner, seller_user.id, SellerStatus::Approved, 10.0).await;
    let product_a = seed_product(&inner, Some(seller.id), 10.0, 5).await;
    let product_b = seed_product(&inner, Some(seller.id), 20.0, 5).await;

    for (product_id, quantity) in [(product_a.id, 2), (product_b.id, 1)] {
        cart_service::add_to_cart(
            &inner,
            &auth(&buyer),
            AddToCartRequest {
                product_id,
                quantity,
            },
        )
        .await
        .unwrap();
    }

    // The second line's decrement is refused after the first already took
    // stock, forcing the rollback of the first.
    let store = InstrumentedStore {
        refuse_decrement_for: Some(product_b.id),
        ..InstrumentedStore::wrap(inner)
    };

    let err = order_service::create_order(&store, &auth(&buyer), order_request())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InsufficientStock(_)));

    assert_eq!(
        store.inner.get_product(product_a.id).await.unwrap().unwrap().stock,
        5
    );
    assert_eq!(
        store.inner.get_product(product_b.id).await.unwrap().unwrap().stock,
        5
    );
    assert_eq!(
        store.inner.count_orders(&OrderFilter::default()).await.unwrap(),
        0
    );
    let seller = store.inner.get_seller(seller.id).await.unwrap().unwrap();
    assert!(approx(seller.total_revenue, 0.0));
    assert_eq!(seller.total_orders, 0);
    assert_eq!(store.inner.get_cart(buyer.id).await.unwrap().items.len(), 2);
}

#[tokio::test]
async fn failed_order_persistence_rolls_back_stock() {
    let inner = store();
    let buyer = seed_user(&inner, Role::User).await;
    let seller_user = seed_user(&inner, Role::Seller).await;
    let seller = seed_seller(&inner, seller_user.id, SellerStatus::Approved, 10.0).await;
    let product = seed_product(&inner, Some(seller.id), 25.0, 5).await;

    cart_service::add_to_cart(
        &inner,
        &auth(&buyer),
        AddToCartRequest {
            product_id: product.id,
            quantity: 2,
        },
    )
    .await
    .unwrap();

    let store = InstrumentedStore {
        fail_order_inserts: true,
        ..InstrumentedStore::wrap(inner)
    };

    let err = order_service::create_order(&store, &auth(&buyer), order_request())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Internal(_)));

    assert_eq!(
        store.inner.get_product(product.id).await.unwrap().unwrap().stock,
        5
    );
    assert_eq!(
        store.inner.count_orders(&OrderFilter::default()).await.unwrap(),
        0
    );
    let seller = store.inner.get_seller(seller.id).await.unwrap().unwrap();
    assert!(approx(seller.total_revenue, 0.0));
    assert_eq!(seller.total_orders, 0);
}

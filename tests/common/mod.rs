#![allow(dead_code)]

use chrono::Utc;
use uuid::Uuid;

use axum_marketplace_api::{
    dto::orders::CreateOrderRequest,
    middleware::auth::AuthUser,
    models::{Address, Product, Role, Seller, SellerStatus, User},
    store::{ProductStore, SellerStore, UserStore, memory::MemoryStore},
};

pub fn store() -> MemoryStore {
    MemoryStore::new()
}

/// The cast of a typical marketplace scenario: a buyer, a seller with a
/// live profile, and one of the seller's products.
pub struct Fixture {
    pub buyer: User,
    pub seller_user: User,
    pub seller: Seller,
    pub product: Product,
}

pub async fn seed_user(store: &MemoryStore, role: Role) -> User {
    let id = Uuid::new_v4();
    let user = User {
        id,
        name: "Test User".to_string(),
        email: format!("{id}@example.com"),
        password_hash: "not-a-real-hash".to_string(),
        role,
        token_version: 0,
        created_at: Utc::now(),
    };
    store.insert_user(user).await.unwrap()
}

pub fn auth(user: &User) -> AuthUser {
    AuthUser {
        user_id: user.id,
        role: user.role,
    }
}

pub async fn seed_seller(
    store: &MemoryStore,
    user_id: Uuid,
    status: SellerStatus,
    commission: f64,
) -> Seller {
    let id = Uuid::new_v4();
    let seller = Seller {
        id,
        user_id,
        business_name: "Acme Goods".to_string(),
        business_email: format!("{id}@shop.example.com"),
        business_phone: None,
        business_address: None,
        commission,
        status,
        bank_details: None,
        total_revenue: 0.0,
        total_orders: 0,
        created_at: Utc::now(),
    };
    store.insert_seller(seller).await.unwrap()
}

pub async fn seed_product(
    store: &MemoryStore,
    seller_id: Option<Uuid>,
    price: f64,
    stock: i32,
) -> Product {
    let now = Utc::now();
    let product = Product {
        id: Uuid::new_v4(),
        seller_id,
        name: "Widget".to_string(),
        description: "A sturdy widget".to_string(),
        price,
        stock,
        category_id: None,
        image_url: "https://img.example.com/widget.png".to_string(),
        featured: false,
        created_at: now,
        updated_at: now,
    };
    store.insert_product(product).await.unwrap()
}

pub fn order_request() -> CreateOrderRequest {
    CreateOrderRequest {
        shipping_address: Address {
            street: Some("1 Main St".to_string()),
            city: Some("Springfield".to_string()),
            state: None,
            zip_code: Some("12345".to_string()),
            country: Some("US".to_string()),
        },
        payment_method: "card".to_string(),
    }
}

pub fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        admin::{
            PlatformStats, PlatformStatsPayload, RevenueTotals, SellerCounts, SellerList,
            UpdateCommissionRequest,
        },
        auth::{AuthPayload, LoginRequest, RegisterRequest, UserView},
        cart::{AddToCartRequest, CartLineView, CartPayload, CartView, UpdateCartItemRequest},
        orders::{CreateOrderRequest, OrderPayload, UpdateOrderStatusRequest},
        products::{CreateProductRequest, FeaturedProducts, ProductPayload, UpdateProductRequest},
        sellers::{
            RegisterSellerRequest, RevenuePayload, RevenueReport, SellerPayload, SellerRegistered,
            SellerStats, SellerStatsPayload, UpdateSellerRequest,
        },
    },
    models::{Address, BankDetails, Cart, Order, OrderItem, Product, Seller, User},
    routes::{auth, cart, health, orders, params, products, sellers, super_admin},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::register,
        auth::login,
        products::list_products,
        products::get_featured,
        products::get_product,
        products::create_product,
        products::update_product,
        products::delete_product,
        cart::get_cart,
        cart::add_to_cart,
        cart::update_item,
        cart::remove_item,
        cart::clear_cart,
        orders::create_order,
        orders::list_my_orders,
        orders::get_order,
        orders::list_all_orders,
        orders::update_status,
        orders::cancel_order,
        sellers::register_seller,
        sellers::get_my_profile,
        sellers::update_my_profile,
        sellers::get_my_stats,
        sellers::get_my_revenue,
        sellers::get_public_profile,
        super_admin::list_sellers,
        super_admin::approve_seller,
        super_admin::reject_seller,
        super_admin::suspend_seller,
        super_admin::update_commission,
        super_admin::platform_stats
    ),
    components(
        schemas(
            User,
            Seller,
            Product,
            Cart,
            Order,
            OrderItem,
            Address,
            BankDetails,
            RegisterRequest,
            LoginRequest,
            AuthPayload,
            UserView,
            RegisterSellerRequest,
            UpdateSellerRequest,
            SellerPayload,
            SellerRegistered,
            SellerStats,
            SellerStatsPayload,
            RevenueReport,
            RevenuePayload,
            AddToCartRequest,
            UpdateCartItemRequest,
            CartLineView,
            CartView,
            CartPayload,
            CreateOrderRequest,
            UpdateOrderStatusRequest,
            OrderPayload,
            CreateProductRequest,
            UpdateProductRequest,
            ProductPayload,
            FeaturedProducts,
            SellerList,
            UpdateCommissionRequest,
            SellerCounts,
            RevenueTotals,
            PlatformStats,
            PlatformStatsPayload,
            params::Pagination,
            params::OrderListQuery,
            params::ProductQuery,
            params::SellerListQuery
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Authentication endpoints"),
        (name = "Products", description = "Catalog endpoints"),
        (name = "Cart", description = "Cart endpoints"),
        (name = "Orders", description = "Order endpoints"),
        (name = "Sellers", description = "Seller portal endpoints"),
        (name = "Super Admin", description = "Platform governance endpoints"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}

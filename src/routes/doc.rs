use utoipa::{
    Modify, OpenApi,
    openapi::{
        self, OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        auth::{LoginRequest, LoginResponse, RegisterRequest},
        cart::AddToCartRequest,
        items::CreateItemRequest,
        orders::PlaceOrderRequest,
    },
    models::{Cart, CartLineItem, Item, Order, User},
    response::ErrorBody,
    routes::{carts, health, items, orders, users},
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
        users::register,
        users::user_list,
        users::login,
        items::item_create,
        items::item_list,
        carts::add_to_cart,
        carts::cart_list,
        orders::place_order,
        orders::order_list
    ),
    components(
        schemas(
            User,
            Item,
            Cart,
            CartLineItem,
            Order,
            ErrorBody,
            health::HealthData,
            RegisterRequest,
            LoginRequest,
            LoginResponse,
            CreateItemRequest,
            AddToCartRequest,
            PlaceOrderRequest
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Users", description = "Registration and login"),
        (name = "Items", description = "Catalog endpoints"),
        (name = "Carts", description = "Shopping cart endpoints"),
        (name = "Orders", description = "Order endpoints"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}

//! Route table. Everything lives under `/api`.

use actix_web::{web, HttpRequest};

use crate::error::ApiError;
use crate::handlers::{account, admin, auth, cart, health, orders, seller, shop};

fn json_error(err: actix_web::error::JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    ApiError::validation(format!("Invalid JSON body: {err}")).into()
}

fn query_error(err: actix_web::error::QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    ApiError::validation(format!("Invalid query string: {err}")).into()
}

fn path_error(err: actix_web::error::PathError, _req: &HttpRequest) -> actix_web::Error {
    ApiError::validation(format!("Invalid path: {err}")).into()
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error))
        .app_data(web::QueryConfig::default().error_handler(query_error))
        .app_data(web::PathConfig::default().error_handler(path_error))
        .service(
            web::scope("/api")
                .route("/health", web::get().to(health::health))
                .service(
                    web::scope("/auth")
                        .route("/signup", web::post().to(auth::signup))
                        .route("/verify-email", web::post().to(auth::verify_email))
                        .route(
                            "/resend-verification",
                            web::post().to(auth::resend_verification),
                        )
                        .route("/login", web::post().to(auth::login))
                        .route("/logout", web::post().to(auth::logout))
                        .route("/me", web::get().to(account::me))
                        .route("/me", web::patch().to(account::update_me)),
                )
                .route("/wallet", web::get().to(account::wallet))
                .service(
                    web::scope("/cart")
                        .route("", web::get().to(cart::get_cart))
                        .route("", web::post().to(cart::add_to_cart))
                        .route("/{item_id}", web::put().to(cart::update_cart_item))
                        .route("/{item_id}", web::delete().to(cart::remove_cart_item)),
                )
                .service(
                    web::scope("/orders")
                        .route("", web::get().to(orders::list_orders))
                        .route("", web::post().to(orders::place_order))
                        .route("/history", web::get().to(orders::order_history))
                        .route("/{order_id}", web::get().to(orders::get_order))
                        .route("/{order_id}/return", web::post().to(orders::request_return))
                        .route(
                            "/{order_id}/return/delivered",
                            web::post().to(orders::mark_return_delivered),
                        ),
                )
                .service(
                    web::scope("/seller")
                        .route("/orders", web::get().to(seller::list_orders))
                        .route("/orders", web::patch().to(seller::update_order_status))
                        .route(
                            "/orders/{order_id}/return",
                            web::post().to(seller::resolve_return),
                        )
                        .route("/products", web::get().to(seller::list_products))
                        .route("/products", web::post().to(seller::create_product))
                        .route("/products/{product_id}", web::put().to(seller::update_product))
                        .route(
                            "/products/{product_id}",
                            web::delete().to(seller::delete_product),
                        ),
                )
                .service(
                    web::scope("/shop")
                        .route("/products", web::get().to(shop::list_products))
                        .route("/products/{product_id}", web::get().to(shop::get_product)),
                )
                .service(
                    web::scope("/admin")
                        .route("/data", web::get().to(admin::admin_data))
                        .route("/products/{product_id}", web::delete().to(admin::delete_product)),
                ),
        );
}

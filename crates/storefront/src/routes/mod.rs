//! HTTP route handlers.
//!
//! All routes are JSON and mounted under `/api`:
//!
//! | Method | Path                    | Handler                      |
//! |--------|-------------------------|------------------------------|
//! | GET    | /api/cart               | [`cart::show`]               |
//! | DELETE | /api/cart               | [`cart::clear`]              |
//! | GET    | /api/cart/count         | [`cart::count`]              |
//! | POST   | /api/cart/items         | [`cart::add`]                |
//! | PUT    | /api/cart/items         | [`cart::update`]             |
//! | DELETE | /api/cart/items         | [`cart::remove`]             |
//! | POST   | /api/cart/coupon        | [`cart::apply_coupon`]       |
//! | DELETE | /api/cart/coupon        | [`cart::remove_coupon`]      |
//! | POST   | /api/checkout/start     | [`checkout::start`]          |
//! | GET    | /api/checkout           | [`checkout::show`]           |
//! | PUT    | /api/checkout/address   | [`checkout::address`]        |
//! | POST   | /api/checkout/submit    | [`checkout::submit`]         |
//! | POST   | /api/checkout/payment   | [`checkout::payment`]        |
//! | POST   | /api/checkout/retry     | [`checkout::retry`]          |
//! | GET    | /api/orders/{order_id}  | [`orders::show`]             |
//! | GET    | /api/products           | [`products::list`]           |
//! | GET    | /api/products/{id}      | [`products::show`]           |
//! | GET    | /api/account/me         | [`account::me`]              |

pub mod account;
pub mod cart;
pub mod checkout;
pub mod orders;
pub mod products;

use axum::Router;

use crate::state::AppState;

/// Assemble all API routes.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/cart", cart::routes())
        .nest("/checkout", checkout::routes())
        .nest("/orders", orders::routes())
        .nest("/products", products::routes())
        .nest("/account", account::routes())
}

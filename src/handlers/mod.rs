pub mod admin;
pub mod auth;
pub mod catalog;
pub mod order;
pub mod payment;
pub mod webhook;

pub use admin::admin_config;
pub use auth::auth_config;
pub use catalog::catalog_config;
pub use order::order_config;
pub use payment::payment_config;
pub use webhook::webhook_config;

pub mod auth_service;
pub mod catalog_service;
pub mod admin_catalog_service;
pub mod order_service;
pub mod payment_service;
pub mod webhook_service;

pub use auth_service::*;
pub use catalog_service::*;
pub use admin_catalog_service::*;
pub use order_service::*;
pub use payment_service::*;
pub use webhook_service::*;

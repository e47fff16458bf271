pub mod auth;
pub mod cors;

pub use auth::{AuthMiddleware, auth_user};
pub use cors::create_cors;

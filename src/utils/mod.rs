pub mod jwt;
pub mod order_no;
pub mod pagination;
pub mod password;
pub mod slug;

pub use jwt::*;
pub use order_no::generate_order_no;
pub use pagination::*;
pub use password::*;
pub use slug::validate_slug;

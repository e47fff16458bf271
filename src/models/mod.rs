pub mod category;
pub mod order;
pub mod payment;
pub mod product;
pub mod user;
pub mod variant;

pub use category::*;
pub use order::*;
pub use payment::*;
pub use product::*;
pub use user::*;
pub use variant::*;

pub mod persist;
pub mod store;

pub use persist::{CartStorage, FileStorage, MemoryStorage};
pub use store::{AddItemInput, CartLine, CartStore, SizeOption};

pub mod midtrans;

pub use midtrans::*;

pub mod fill;
pub mod order;
pub mod symbol;

pub use fill::Fill;
pub use order::{Order, OrderSide, OrderType};
pub use symbol::Symbol;

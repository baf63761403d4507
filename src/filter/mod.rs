pub mod types;
pub mod filter;
pub mod filter_where;
pub mod filter_order;
pub mod matcher;

pub use types::*;

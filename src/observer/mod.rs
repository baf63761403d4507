// Observer system: every record write passes through an ordered pipeline of rings

pub mod context;
pub mod error;
pub mod implementations;
pub mod pipeline;
pub mod traits;

pub use context::*;
pub use error::*;
pub use pipeline::*;
pub use traits::*;

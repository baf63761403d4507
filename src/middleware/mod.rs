pub mod auth;
pub mod response;

pub use auth::{authorize, Caller, Gate, GateState};
pub use response::{ApiResponse, ApiResult, Paginated};

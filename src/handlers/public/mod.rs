// handlers/public/mod.rs - endpoints that need no bearer token

pub mod auth;
pub mod system;

pub use auth::login;
pub use system::{health, root};

// handlers/protected/mod.rs - endpoints behind the authorization gate
//
// Every route here is wrapped by `middleware::authorize`, which attaches the
// `Caller` that handlers receive as an explicit argument.

pub mod auth;
pub mod logs;
pub mod resource;

pub use auth::me;
pub use resource::{create, list, remove, show, update, Access};

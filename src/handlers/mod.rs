// handlers/mod.rs - two tiers of handlers
//
// Public (no auth): service info, health, login
// Protected (bearer token + role gate): resource CRUD, audit log, current user

pub mod protected;
pub mod public;

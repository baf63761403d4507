pub mod bootstrap;
pub mod record_service;

pub use bootstrap::ensure_admin;
pub use record_service::RecordService;

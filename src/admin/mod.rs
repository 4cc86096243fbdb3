// Public API
pub use handlers::{admin_login, admin_stats};
pub use service::{AdminCredentials, AdminService};

// Internal modules
mod handlers;
pub mod service;
pub mod types;

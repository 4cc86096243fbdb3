// Public API - what other modules can use
pub use handlers::{create_session, logout, session_info};
pub use middleware::{admin_auth, jwt_auth};
pub use origin::ClientOrigin;
pub use types::{SessionClaims, SessionRole};

// Internal modules
pub mod generators;
mod handlers;
mod middleware;
pub mod models;
pub mod origin;
pub mod repository;
pub mod service;
pub mod token;
pub mod types;

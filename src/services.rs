pub mod auth;
pub mod dashboard_service;
pub mod filter_cascade;
pub mod metrics;
pub mod presentation;
pub mod schema;
pub mod session_store;

pub use auth::AuthService;
pub use dashboard_service::DashboardService;
pub use session_store::SessionStore;

// Gateway between the browser-facing apps and the backend API

pub mod client;
pub mod config;
pub mod credentials;
pub mod db;
pub mod errors;
pub mod gateway;
pub mod logger;
pub mod middleware;
pub mod models;
pub mod normalize;
pub mod request;
pub mod routes;
pub mod schema;

// Re-export common types
pub use crate::config::AppConfig;
pub use crate::credentials::AuthPolicy;
pub use crate::errors::{DbError, GatewayError};
pub use crate::gateway::Gateway;
pub use crate::request::BackendCall;

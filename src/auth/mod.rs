pub mod handlers;
pub mod jwt;
pub mod middleware;
pub mod model;

mod tests;

pub use handlers::config;
pub use middleware::{authenticated_user, validate_request_token};
pub use model::*;

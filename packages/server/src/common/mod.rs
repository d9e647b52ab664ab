pub mod api;
pub mod auth;
pub mod errors;

pub use api::{ApiRequest, ApiResponse};
pub use auth::AuthUser;
pub use errors::ApiError;

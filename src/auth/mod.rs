use crate::state::AppState;
use axum::Router;

mod claims;
mod dto;
pub mod extractors;
pub mod handlers;
pub mod jwt;
pub mod password;
pub mod services;

pub use extractors::AuthUser;
pub use jwt::{JwtKeys, TokenError};

pub fn router() -> Router<AppState> {
    handlers::auth_routes()
}

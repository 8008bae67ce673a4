mod dto;
pub mod error;
pub mod handlers;
pub mod password;
pub mod repo;
mod repo_types;
pub mod services;
pub mod validation;

use crate::state::AppState;
use axum::Router;

pub use dto::{CreateUserRequest, PublicUser};
pub use repo_types::{NewUser, UserPatch, UserRecord};

pub fn router() -> Router<AppState> {
    handlers::user_routes()
}

pub mod auth;
pub mod stats;
pub mod token;
pub mod user;

pub use auth::{ErrorBody, LoginRequest, SignupRequest, TokenResponse};
pub use stats::{AdminStats, DeleteUserResponse};
pub use token::TokenClaims;
pub use user::{Role, User, UserUpdate};

pub mod auth;

pub use auth::{auth_middleware, resolve_identity, AuthUser};

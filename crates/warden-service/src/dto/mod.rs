//! Request and response types.

mod auth_dto;
mod user_dto;

pub use auth_dto::*;
pub use user_dto::*;

//! # Warden Service
//!
//! User and authentication services. Reads go through the cache
//! (`user:<id>` for single users, the `users` namespace for pages) and every
//! successful write invalidates the affected keys.

pub mod auth_service;
pub mod dto;
pub mod r#impl;
pub mod notifier;
pub mod user_service;

pub use auth_service::*;
pub use dto::*;
pub use notifier::*;
pub use r#impl::{AuthServiceImpl, UserServiceImpl};
pub use user_service::*;

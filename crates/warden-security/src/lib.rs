//! # Warden Security
//!
//! Argon2 password hashing and HS256 JWT tokens, each behind a trait so the
//! services can be wired with any implementation.

pub mod jwt;
pub mod password;

pub use jwt::*;
pub use password::*;

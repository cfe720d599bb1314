//! # Warden Core
//!
//! Core types shared by every Warden crate: the unified error type,
//! typed identifiers, pagination and the user entity.

pub mod error;
pub mod id;
pub mod pagination;
pub mod result;
pub mod user;
pub mod validation;

pub use error::*;
pub use id::*;
pub use pagination::*;
pub use result::*;
pub use user::*;
pub use validation::*;

//! Result type aliases for Warden.

use crate::WardenError;

/// A specialized `Result` type for Warden operations.
pub type WardenResult<T> = Result<T, WardenError>;

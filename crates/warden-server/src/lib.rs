//! # Warden Server Library
//!
//! Dependency wiring and start-up helpers for the Warden binary.

pub mod di;
pub mod logging;
pub mod startup;

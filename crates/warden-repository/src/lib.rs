//! # Warden Repository
//!
//! Durable user store behind the [`UserRepository`] trait. Services hold an
//! `Arc<dyn UserRepository>`; [`InMemoryUserRepository`] is the bundled
//! implementation.

mod memory;
mod traits;

pub use memory::InMemoryUserRepository;
pub use traits::UserRepository;

//! Service implementations.

mod auth_service_impl;
mod user_service_impl;

pub use auth_service_impl::AuthServiceImpl;
pub use user_service_impl::UserServiceImpl;

#[cfg(test)]
pub(crate) mod test_support;

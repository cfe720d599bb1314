//! Key scheme for cached user data.
//!
//! Singletons live under `user:<id>`. Filtered pages live under the `users`
//! namespace so a single prefix delete drops every cached page.

use warden_core::{PageRequest, UserFilter, UserId};

/// Base name for single-user entries.
pub const USER: &str = "user";

/// Namespace shared by every cached user page.
pub const USERS_NAMESPACE: &str = "users";

/// Key for one user.
#[must_use]
pub fn user(id: UserId) -> String {
    format!("{}:{}", USER, id)
}

/// Key for one filtered page of users.
///
/// Layout is `users:<field>:<value>...:limit:<n>:offset:<m>`. With no filters
/// the filter section is empty, giving `users::limit:<n>:offset:<m>`.
#[must_use]
pub fn users_page(filter: &UserFilter, page: PageRequest) -> String {
    let filters = filter
        .pairs()
        .into_iter()
        .map(|(field, value)| format!("{}:{}", field, value))
        .collect::<Vec<_>>()
        .join(":");

    format!(
        "{}:{}:limit:{}:offset:{}",
        USERS_NAMESPACE, filters, page.limit, page.offset
    )
}

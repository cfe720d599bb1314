//! Cache key construction.

use std::fmt::{Display, Write};

/// Separator placed between key segments unless overridden.
pub const DEFAULT_DELIMITER: &str = ":";

/// Builder for delimiter-joined cache keys.
///
/// ```
/// use warden_cache::CacheKey;
///
/// let key = CacheKey::new("users").field("email", "a@x.com").segment(10).build();
/// assert_eq!(key, "users:email:a@x.com:10");
/// ```
#[derive(Debug, Clone)]
pub struct CacheKey {
    buf: String,
    delimiter: String,
}

impl CacheKey {
    /// Starts a key from its base name.
    #[must_use]
    pub fn new(base: impl Into<String>) -> Self {
        Self {
            buf: base.into(),
            delimiter: DEFAULT_DELIMITER.to_string(),
        }
    }

    /// Replaces the delimiter used for segments appended after this call.
    #[must_use]
    pub fn with_delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.delimiter = delimiter.into();
        self
    }

    /// Appends one segment.
    #[must_use]
    pub fn segment(mut self, value: impl Display) -> Self {
        self.push(value);
        self
    }

    /// Appends a `name` segment followed by a `value` segment.
    #[must_use]
    pub fn field(self, name: &str, value: impl Display) -> Self {
        self.segment(name).segment(value)
    }

    /// Appends every dimension of `dims`, in order.
    #[must_use]
    pub fn dimensions<D: KeyDimensions + ?Sized>(mut self, dims: &D) -> Self {
        dims.append_to(&mut self);
        self
    }

    /// Finishes the key.
    #[must_use]
    pub fn build(self) -> String {
        self.buf
    }

    fn push(&mut self, value: impl Display) {
        self.buf.push_str(&self.delimiter);
        // Writing into a String cannot fail.
        let _ = write!(self.buf, "{}", value);
    }
}

/// Named values folded into a memoized key.
///
/// Implemented for `()` and for tuples of up to four `Display` values.
pub trait KeyDimensions {
    /// Appends each dimension to `key`.
    fn append_to(&self, key: &mut CacheKey);
}

impl KeyDimensions for () {
    fn append_to(&self, _key: &mut CacheKey) {}
}

macro_rules! impl_key_dimensions {
    ($($name:ident),+) => {
        impl<$($name: Display),+> KeyDimensions for ($($name,)+) {
            #[allow(non_snake_case)]
            fn append_to(&self, key: &mut CacheKey) {
                let ($($name,)+) = self;
                $(key.push($name);)+
            }
        }
    };
}

impl_key_dimensions!(A);
impl_key_dimensions!(A, B);
impl_key_dimensions!(A, B, C);
impl_key_dimensions!(A, B, C, D);

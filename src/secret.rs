//! Redacting wrapper for sensitive values.
//!
//! Anything held in a [`Secret`] formats as a fixed placeholder, so credentials
//! cannot end up in logs through `{}` or `{:?}`. The raw value is only
//! available through [`Secret::reveal`].

use std::fmt;

/// Placeholder printed in place of any secret value.
pub const REDACTED: &str = "********";

/// An owned value that never shows itself through formatting.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Secret<T>(T);

impl<T> Secret<T> {
    /// Wraps a value.
    #[must_use]
    pub const fn new(value: T) -> Self {
        Self(value)
    }

    /// Returns the wrapped value.
    #[must_use]
    pub const fn reveal(&self) -> &T {
        &self.0
    }
}

impl<T> From<T> for Secret<T> {
    fn from(value: T) -> Self {
        Self::new(value)
    }
}

impl<T> fmt::Display for Secret<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(REDACTED)
    }
}

impl<T> fmt::Debug for Secret<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(REDACTED)
    }
}

//! Handle identifier type.

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};

/// Global counter for handle ID generation.
static COUNTER: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a handle.
///
/// The grammar engine keeps one of these as its back-reference to the
/// handle that owns it. IDs are displayed as `h-XXXXXXXX` where X is a
/// hexadecimal digit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HandleId(u64);

impl HandleId {
    /// Allocate a new unique handle ID.
    pub fn new() -> Self {
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw u64 value.
    pub fn as_u64(&self) -> u64 {
        self.0
    }

    /// Create a HandleId from a raw u64 value.
    pub fn from_raw(value: u64) -> Self {
        Self(value)
    }
}

impl Default for HandleId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for HandleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "h-{:08x}", self.0)
    }
}

/// Error returned when parsing a malformed handle ID.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseHandleIdError(String);

impl fmt::Display for ParseHandleIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "malformed handle id: '{}'", self.0)
    }
}

impl std::error::Error for ParseHandleIdError {}

impl FromStr for HandleId {
    type Err = ParseHandleIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.strip_prefix("h-")
            .and_then(|hex| u64::from_str_radix(hex, 16).ok())
            .map(HandleId)
            .ok_or_else(|| ParseHandleIdError(s.into()))
    }
}

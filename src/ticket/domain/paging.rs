//! One-based page numbers for listing operations.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One-based page number, clamped so page zero reads as page one.
///
/// Deserialization routes through [`PageNumber::new`] so the clamp holds for
/// values arriving off the wire as well.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "u32", into = "u32")]
pub struct PageNumber(u32);

impl PageNumber {
    /// The first page.
    pub const FIRST: Self = Self(1);

    /// Creates a page number, clamping zero up to one.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        if value == 0 { Self(1) } else { Self(value) }
    }

    /// Returns the one-based value.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }

    /// Returns the number of items on earlier pages for the given page size.
    #[must_use]
    pub const fn offset(self, page_size: u32) -> u64 {
        (self.0 as u64).saturating_sub(1) * page_size as u64
    }
}

impl Default for PageNumber {
    fn default() -> Self {
        Self::FIRST
    }
}

impl From<u32> for PageNumber {
    fn from(value: u32) -> Self {
        Self::new(value)
    }
}

impl From<PageNumber> for u32 {
    fn from(page: PageNumber) -> u32 {
        page.get()
    }
}

impl fmt::Display for PageNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

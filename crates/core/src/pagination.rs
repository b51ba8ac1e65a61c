use serde::{Deserialize, Serialize};

use crate::{AppError, AppResult};

/// Page size applied when the caller does not request one.
pub const DEFAULT_PAGE_LIMIT: usize = 50;

/// Largest page size a caller may receive.
pub const MAX_PAGE_LIMIT: usize = 100;

/// Validated page size for cursor-paginated listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageLimit(usize);

impl PageLimit {
    /// Resolves a requested page size.
    ///
    /// Missing values fall back to [`DEFAULT_PAGE_LIMIT`] and oversized values
    /// are capped at [`MAX_PAGE_LIMIT`]. Zero is rejected.
    pub fn new(requested: Option<usize>) -> AppResult<Self> {
        match requested {
            None => Ok(Self(DEFAULT_PAGE_LIMIT)),
            Some(0) => Err(AppError::Validation(
                "limit must be greater than zero".to_owned(),
            )),
            Some(value) => Ok(Self(value.min(MAX_PAGE_LIMIT))),
        }
    }

    /// Returns the number of rows the caller receives.
    #[must_use]
    pub fn get(self) -> usize {
        self.0
    }

    /// Returns the number of rows to read from storage.
    ///
    /// One extra row tells whether another page exists without a second query.
    #[must_use]
    pub fn fetch_size(self) -> usize {
        self.0 + 1
    }
}

impl Default for PageLimit {
    fn default() -> Self {
        Self(DEFAULT_PAGE_LIMIT)
    }
}

//! Opaque cursor encoding for forward-only pagination.
//!
//! A cursor is the base64url (no padding) encoding of a JSON document holding
//! the sort key(s) of the last row handed to the caller.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tenantry_core::{AppError, AppResult, PageLimit};

/// One page of results plus the cursor for the next page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    /// Rows for this page, at most `limit`.
    pub items: Vec<T>,
    /// Page size that was applied.
    pub limit: usize,
    /// Cursor for the following page, `None` once exhausted.
    pub next_cursor: Option<String>,
}

impl<T> Page<T> {
    /// Builds a page from a `limit + 1` over-fetch.
    pub(crate) fn from_overfetch<C, F>(
        mut rows: Vec<T>,
        limit: PageLimit,
        cursor_of: F,
    ) -> AppResult<Self>
    where
        C: Serialize,
        F: Fn(&T) -> C,
    {
        let has_next = rows.len() > limit.get();
        rows.truncate(limit.get());

        let next_cursor = match (has_next, rows.last()) {
            (true, Some(last)) => Some(encode_cursor(&cursor_of(last))?),
            _ => None,
        };

        Ok(Self {
            items: rows,
            limit: limit.get(),
            next_cursor,
        })
    }

    /// Maps page rows while keeping the cursor.
    pub fn map<U>(self, transform: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(transform).collect(),
            limit: self.limit,
            next_cursor: self.next_cursor,
        }
    }
}

pub(crate) fn encode_cursor<T: Serialize>(value: &T) -> AppResult<String> {
    let payload = serde_json::to_vec(value)
        .map_err(|error| AppError::Internal(format!("failed to encode cursor: {error}")))?;

    Ok(URL_SAFE_NO_PAD.encode(payload))
}

pub(crate) fn decode_cursor<T: DeserializeOwned>(cursor: &str) -> AppResult<T> {
    let payload = URL_SAFE_NO_PAD
        .decode(cursor.trim())
        .map_err(|_| AppError::Validation("invalid cursor".to_owned()))?;

    serde_json::from_slice(&payload).map_err(|_| AppError::Validation("invalid cursor".to_owned()))
}

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};
    use tenantry_core::{AppError, PageLimit};

    use super::{Page, decode_cursor, encode_cursor};

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Position {
        position: i64,
    }

    #[test]
    fn cursor_roundtrips_sort_key() {
        let encoded = encode_cursor(&Position { position: 42 });
        let Ok(encoded) = encoded else {
            panic!("cursor should encode");
        };

        let decoded = decode_cursor::<Position>(encoded.as_str());
        assert!(matches!(decoded, Ok(Position { position: 42 })));
    }

    #[test]
    fn tampered_cursor_is_rejected() {
        let decoded = decode_cursor::<Position>("not a cursor!");
        assert!(matches!(decoded, Err(AppError::Validation(_))));
    }

    #[test]
    fn overfetch_sets_next_cursor_from_last_returned_row() {
        let Ok(limit) = PageLimit::new(Some(2)) else {
            panic!("limit should be valid");
        };

        let page = Page::from_overfetch(vec![1_i64, 2, 3], limit, |value| Position {
            position: *value,
        });
        let Ok(page) = page else {
            panic!("page should build");
        };

        assert_eq!(page.items, vec![1, 2]);
        let Some(next_cursor) = page.next_cursor else {
            panic!("next cursor expected");
        };
        assert!(matches!(
            decode_cursor::<Position>(next_cursor.as_str()),
            Ok(Position { position: 2 })
        ));
    }

    #[test]
    fn short_page_has_no_next_cursor() {
        let page = Page::from_overfetch(vec![1_i64], PageLimit::default(), |value| Position {
            position: *value,
        });

        assert!(matches!(page, Ok(ref value) if value.next_cursor.is_none()));
    }
}

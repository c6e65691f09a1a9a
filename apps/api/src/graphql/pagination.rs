//! Shared pagination utilities for GraphQL resolvers
//!
//! Windowing here never reorders: the input sequence is already ordered by
//! whoever fetched it.

use crate::error::{ApiError, ApiResult};

/// Validated `limit`/`offset` pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Window {
    /// Maximum number of items, `None` for no limit
    pub limit: Option<usize>,
    /// Number of leading items to skip
    pub offset: usize,
}

impl Window {
    /// Validate raw GraphQL arguments; negative values are rejected
    pub fn from_args(limit: Option<i32>, offset: Option<i32>) -> ApiResult<Self> {
        let limit = limit
            .map(|l| usize::try_from(l).map_err(|_| ApiError::validation("limit must not be negative")))
            .transpose()?;
        let offset = offset
            .map(|o| usize::try_from(o).map_err(|_| ApiError::validation("offset must not be negative")))
            .transpose()?
            .unwrap_or(0);

        Ok(Self { limit, offset })
    }

    /// Apply this window to an ordered sequence
    pub fn apply<T>(&self, items: Vec<T>) -> Vec<T> {
        paginate(items, self.limit, self.offset)
    }
}

/// Return the contiguous `[offset, offset + limit)` slice of `items`
///
/// An absent limit means "up to the end". Out-of-range offsets yield an
/// empty result.
pub fn paginate<T>(items: Vec<T>, limit: Option<usize>, offset: usize) -> Vec<T> {
    let len = items.len();
    if offset >= len {
        return Vec::new();
    }

    let end = match limit {
        Some(limit) => offset.saturating_add(limit).min(len),
        None => len,
    };
    if offset > end {
        return Vec::new();
    }

    items.into_iter().skip(offset).take(end - offset).collect()
}

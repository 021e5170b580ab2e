//! Pagination primitives.

use serde::{Deserialize, Serialize};

const DEFAULT_LIMIT: i64 = 20;
const MAX_LIMIT: i64 = 100;

/// Pagination parameters as they arrive from the query string.
///
/// `normalize()` clamps to sane bounds; repositories always go through it so
/// an unbounded `limit` can never reach SQL.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PageQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl PageQuery {
    /// Clamp limit to `1..=100` (default 20) and offset to `>= 0`.
    pub fn normalize(self) -> (i64, i64) {
        let limit = self.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
        let offset = self.offset.unwrap_or(0).max(0);
        (limit, offset)
    }
}

/// One page of results plus the total row count for the filter.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: i64, limit: i64, offset: i64) -> Self {
        Self {
            items,
            total,
            limit,
            offset,
        }
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_defaults() {
        let (limit, offset) = PageQuery::default().normalize();
        assert_eq!((limit, offset), (20, 0));
    }

    #[test]
    fn normalize_clamps_extremes() {
        let q = PageQuery {
            limit: Some(10_000),
            offset: Some(-5),
        };
        assert_eq!(q.normalize(), (100, 0));

        let q = PageQuery {
            limit: Some(0),
            offset: Some(40),
        };
        assert_eq!(q.normalize(), (1, 40));
    }
}

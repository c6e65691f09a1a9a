//! Shared utility functions for repositories
//!
//! This module provides common functions used across repositories.

use std::collections::HashMap;
use std::hash::Hash;

// ============================================================================
// SQL Column Constants
//
// These constants define the SELECT column lists for each entity type,
// reducing duplication and ensuring consistency across queries.
// ============================================================================

/// SQL columns for user queries
pub const USER_COLUMNS: &str = "id, username";

/// SQL columns for post queries
pub const POST_COLUMNS: &str = r#"
    id, author_id, title, content,
    allow_comments, created_at
"#;

/// SQL columns for comment queries
pub const COMMENT_COLUMNS: &str = r#"
    id, post_id, author_id, parent_id,
    content, created_at
"#;

/// Realign rows fetched with `= ANY($1)` to the order of `keys`
///
/// Keys with no matching row yield `None`. Repeated keys each get a copy.
pub fn align_by_key<K, T>(keys: &[K], rows: Vec<T>, key_of: impl Fn(&T) -> K) -> Vec<Option<T>>
where
    K: Eq + Hash,
    T: Clone,
{
    let by_key: HashMap<K, T> = rows.into_iter().map(|row| (key_of(&row), row)).collect();
    keys.iter().map(|key| by_key.get(key).cloned()).collect()
}

/// Group rows by `key_of` and lay the groups out in the order of `keys`
///
/// Keys with no matching row yield an empty list. Row order inside a group
/// is the fetch order.
pub fn group_by_key<K, T>(keys: &[K], rows: Vec<T>, key_of: impl Fn(&T) -> K) -> Vec<Vec<T>>
where
    K: Eq + Hash,
    T: Clone,
{
    let mut groups: HashMap<K, Vec<T>> = HashMap::new();
    for row in rows {
        groups.entry(key_of(&row)).or_default().push(row);
    }

    keys.iter()
        .map(|key| groups.get(key).cloned().unwrap_or_default())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_align_by_key_preserves_request_order() {
        let rows = vec![(3, "c"), (1, "a")];
        let aligned = align_by_key(&[1, 2, 3], rows, |r| r.0);
        assert_eq!(aligned, vec![Some((1, "a")), None, Some((3, "c"))]);
    }

    #[test]
    fn test_align_by_key_repeated_keys() {
        let aligned = align_by_key(&[7, 7], vec![(7, "x")], |r| r.0);
        assert_eq!(aligned, vec![Some((7, "x")), Some((7, "x"))]);
    }

    #[test]
    fn test_align_by_key_large_batch_of_repeats() {
        let keys: Vec<i64> = (0..10_000).map(|i| i % 3).collect();
        let rows = vec![(0, "a"), (2, "c")];
        let aligned = align_by_key(&keys, rows, |r| r.0);

        assert_eq!(aligned.len(), keys.len());
        assert_eq!(aligned.iter().filter(|row| row.is_none()).count(), 3_333);
        assert_eq!(aligned[9_999], Some((0, "a")));
        assert_eq!(aligned[9_998], Some((2, "c")));
    }

    #[test]
    fn test_group_by_key_fills_missing_with_empty() {
        let rows = vec![(1, "a"), (2, "b"), (1, "c")];
        let grouped = group_by_key(&[2, 5, 1], rows, |r| r.0);
        assert_eq!(grouped, vec![vec![(2, "b")], vec![], vec![(1, "a"), (1, "c")]]);
    }
}

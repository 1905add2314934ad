//! Index normalisation shared by every container.
//!
//! Negative indices count from the end, so `-1` is the last element.

use std::ops::{Bound, Range, RangeBounds};

use crate::error::ContainerError;

fn shift(index: isize, len: usize) -> isize {
    if index < 0 {
        len as isize + index
    } else {
        index
    }
}

/// Resolves an index addressing an existing element (`0..len`).
pub fn resolve_index(index: isize, len: usize) -> Result<usize, ContainerError> {
    let resolved = shift(index, len);
    if resolved < 0 || resolved as usize >= len {
        return Err(ContainerError::IndexOutOfRange { index, len });
    }
    Ok(resolved as usize)
}

/// Resolves an insertion point (`0..=len`). With `clamp`, out-of-range
/// positions snap to the nearest end instead of failing.
pub fn resolve_insert(index: isize, len: usize, clamp: bool) -> Result<usize, ContainerError> {
    let resolved = shift(index, len);
    if clamp {
        return Ok(resolved.clamp(0, len as isize) as usize);
    }
    if resolved < 0 || resolved as usize > len {
        return Err(ContainerError::IndexOutOfRange { index, len });
    }
    Ok(resolved as usize)
}

pub fn resolve_range(range: impl RangeBounds<usize>, len: usize) -> Result<Range<usize>, ContainerError> {
    let start = match range.start_bound() {
        Bound::Included(&s) => s,
        Bound::Excluded(&s) => s.saturating_add(1),
        Bound::Unbounded => 0,
    };
    let end = match range.end_bound() {
        Bound::Included(&e) => e.saturating_add(1),
        Bound::Excluded(&e) => e,
        Bound::Unbounded => len,
    };
    if end > len {
        return Err(ContainerError::IndexOutOfRange {
            index: end as isize,
            len,
        });
    }
    if start > end {
        return Err(ContainerError::IndexOutOfRange {
            index: start as isize,
            len,
        });
    }
    Ok(start..end)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_indices_count_from_end() {
        assert_eq!(resolve_index(-1, 3).unwrap(), 2);
        assert_eq!(resolve_index(-3, 3).unwrap(), 0);
        assert!(resolve_index(-4, 3).is_err());
        assert!(resolve_index(3, 3).is_err());
        assert!(resolve_index(0, 0).is_err());
    }

    #[test]
    fn insert_allows_one_past_end() {
        assert_eq!(resolve_insert(3, 3, false).unwrap(), 3);
        assert_eq!(resolve_insert(-1, 3, false).unwrap(), 2);
        assert!(resolve_insert(4, 3, false).is_err());
        assert_eq!(resolve_insert(10, 3, true).unwrap(), 3);
        assert_eq!(resolve_insert(-10, 3, true).unwrap(), 0);
    }

    #[test]
    fn ranges_are_bounded_by_len() {
        assert_eq!(resolve_range(.., 4).unwrap(), 0..4);
        assert_eq!(resolve_range(1..=2, 4).unwrap(), 1..3);
        assert!(resolve_range(2..5, 4).is_err());
        #[allow(clippy::reversed_empty_ranges)]
        let reversed = 3..1;
        assert!(resolve_range(reversed, 4).is_err());
    }
}

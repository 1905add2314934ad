//! Index paths into a nested list.

/// Resolved location of a node: one index per level, outermost first.
pub type Path = Vec<usize>;

/// `[head] ++ tail`, used when a parent forwards a child's event.
pub fn prefixed(head: usize, tail: Path) -> Path {
    let mut out = Vec::with_capacity(tail.len() + 1);
    out.push(head);
    out.extend(tail);
    out
}

/// Splits a path into its parent segments and last segment.
pub fn split_last(path: &[isize]) -> Option<(&[isize], isize)> {
    let (last, parent) = path.split_last()?;
    Some((parent, *last))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_and_split() {
        assert_eq!(prefixed(2, vec![0, 1]), vec![2, 0, 1]);
        assert_eq!(prefixed(0, vec![]), vec![0]);
        assert_eq!(split_last(&[1, 2, -1]), Some((&[1isize, 2][..], -1)));
        assert_eq!(split_last(&[]), None);
    }
}

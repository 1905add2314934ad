//! A `Vec` that only ever holds elements satisfying its [`ElementType`].
//!
//! Every mutator validates first and touches storage second, so a failed
//! call leaves the sequence exactly as it was.

use std::fmt;
use std::ops::RangeBounds;
use std::sync::Arc;

use crate::element::ElementType;
use crate::error::ContainerError;
use crate::index::{resolve_index, resolve_insert, resolve_range};

type KeyFn<T> = dyn Fn(&T) -> Option<String> + Send + Sync;

pub struct TypedMutableSequence<T> {
    items: Vec<T>,
    element_type: ElementType<T>,
    key: Option<Arc<KeyFn<T>>>,
    clamp_insert: bool,
}

impl<T: fmt::Debug> fmt::Debug for TypedMutableSequence<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypedMutableSequence")
            .field("element_type", &self.element_type.name())
            .field("items", &self.items)
            .finish()
    }
}

impl<T> Default for TypedMutableSequence<T> {
    fn default() -> Self {
        Self::new(ElementType::any())
    }
}

impl<T> TypedMutableSequence<T> {
    pub fn new(element_type: ElementType<T>) -> Self {
        Self {
            items: Vec::new(),
            element_type,
            key: None,
            clamp_insert: false,
        }
    }

    /// Builds a sequence from `items`, rejecting the whole batch if any item
    /// fails the type check.
    pub fn with_items<I>(element_type: ElementType<T>, items: I) -> Result<Self, ContainerError>
    where
        I: IntoIterator<Item = T>,
    {
        let items: Vec<T> = items.into_iter().collect();
        element_type.check_all(&items)?;
        Ok(Self {
            items,
            element_type,
            key: None,
            clamp_insert: false,
        })
    }

    /// Registers the key function used by [`lookup`](Self::lookup).
    pub fn with_key<F>(mut self, key: F) -> Self
    where
        F: Fn(&T) -> Option<String> + Send + Sync + 'static,
    {
        self.key = Some(Arc::new(key));
        self
    }

    pub fn with_clamp_insert(mut self, clamp: bool) -> Self {
        self.clamp_insert = clamp;
        self
    }

    pub fn element_type(&self) -> &ElementType<T> {
        &self.element_type
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn into_vec(self) -> Vec<T> {
        self.items
    }

    pub fn get(&self, index: isize) -> Result<&T, ContainerError> {
        let idx = self.resolve_index(index)?;
        Ok(&self.items[idx])
    }

    /// Finds the first element whose key equals `key`.
    pub fn lookup(&self, key: &str) -> Option<&T> {
        self.position_of_key(key).map(|i| &self.items[i])
    }

    pub fn position_of_key(&self, key: &str) -> Option<usize> {
        let key_fn = self.key.as_ref()?;
        self.items
            .iter()
            .position(|item| key_fn(item).as_deref() == Some(key))
    }

    // ── Validation ─────────────────────────────────────────────────────────

    pub fn check(&self, value: &T) -> Result<(), ContainerError> {
        self.element_type.check(value)
    }

    pub fn resolve_index(&self, index: isize) -> Result<usize, ContainerError> {
        resolve_index(index, self.items.len())
    }

    pub fn resolve_insert(&self, index: isize) -> Result<usize, ContainerError> {
        resolve_insert(index, self.items.len(), self.clamp_insert)
    }

    pub fn resolve_range(&self, range: impl RangeBounds<usize>) -> Result<std::ops::Range<usize>, ContainerError> {
        resolve_range(range, self.items.len())
    }

    // ── Mutation ───────────────────────────────────────────────────────────

    /// Inserts `value` and returns the resolved position.
    pub fn insert(&mut self, index: isize, value: T) -> Result<usize, ContainerError> {
        let idx = self.resolve_insert(index)?;
        self.check(&value)?;
        self.items.insert(idx, value);
        Ok(idx)
    }

    pub fn push(&mut self, value: T) -> Result<(), ContainerError> {
        self.check(&value)?;
        self.items.push(value);
        Ok(())
    }

    /// Replaces the element at `index`, returning the previous one.
    pub fn set(&mut self, index: isize, value: T) -> Result<T, ContainerError> {
        let idx = self.resolve_index(index)?;
        self.check(&value)?;
        Ok(std::mem::replace(&mut self.items[idx], value))
    }

    pub fn remove(&mut self, index: isize) -> Result<T, ContainerError> {
        let idx = self.resolve_index(index)?;
        Ok(self.items.remove(idx))
    }

    pub fn pop(&mut self) -> Option<T> {
        self.items.pop()
    }

    /// Moves the element at `from` so that it ends up at index `to`.
    pub fn move_item(&mut self, from: isize, to: isize) -> Result<(usize, usize), ContainerError> {
        let src = self.resolve_index(from)?;
        let dst = self.resolve_index(to)?;
        let value = self.items.remove(src);
        self.items.insert(dst, value);
        Ok((src, dst))
    }

    /// Appends every value, or none of them if any fails the type check.
    pub fn extend<I>(&mut self, values: I) -> Result<(), ContainerError>
    where
        I: IntoIterator<Item = T>,
    {
        let values: Vec<T> = values.into_iter().collect();
        self.element_type.check_all(&values)?;
        self.items.extend(values);
        Ok(())
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    // Storage access for already-validated operations in the evented wrappers.

    pub(crate) fn insert_unchecked(&mut self, idx: usize, value: T) {
        self.items.insert(idx, value);
    }

    pub(crate) fn remove_unchecked(&mut self, idx: usize) -> T {
        self.items.remove(idx)
    }

    pub(crate) fn replace_unchecked(&mut self, idx: usize, value: T) -> T {
        std::mem::replace(&mut self.items[idx], value)
    }
}

impl<T: PartialEq> TypedMutableSequence<T> {
    pub fn index_of(&self, value: &T) -> Option<usize> {
        self.items.iter().position(|v| v == value)
    }

    pub fn contains(&self, value: &T) -> bool {
        self.items.contains(value)
    }

    pub fn count(&self, value: &T) -> usize {
        self.items.iter().filter(|v| *v == value).count()
    }
}

impl<'a, T> IntoIterator for &'a TypedMutableSequence<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use evented_emitter::ErrorKind;
    use serde_json::{json, Value};

    fn ints() -> TypedMutableSequence<Value> {
        TypedMutableSequence::with_items(ElementType::integer(), vec![json!(1), json!(2), json!(3)]).unwrap()
    }

    #[test]
    fn insert_enforces_type() {
        let mut seq = ints();
        assert_eq!(seq.insert(0, json!(0)).unwrap(), 0);
        let err = seq.insert(0, json!("x")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Type);
        assert_eq!(seq.as_slice(), &[json!(0), json!(1), json!(2), json!(3)]);
    }

    #[test]
    fn insert_out_of_range_is_index_error_unless_clamped() {
        let mut seq = ints();
        assert_eq!(seq.insert(9, json!(4)).unwrap_err().kind(), ErrorKind::Index);
        assert_eq!(seq.len(), 3);
        let mut seq = ints().with_clamp_insert(true);
        assert_eq!(seq.insert(9, json!(4)).unwrap(), 3);
        assert_eq!(seq.insert(-9, json!(0)).unwrap(), 0);
    }

    #[test]
    fn set_checks_type_and_returns_old() {
        let mut seq = ints();
        assert_eq!(seq.set(-1, json!(30)).unwrap(), json!(3));
        assert!(seq.set(0, json!(1.5)).is_err());
        assert_eq!(seq.as_slice(), &[json!(1), json!(2), json!(30)]);
    }

    #[test]
    fn extend_is_atomic() {
        let mut seq = ints();
        assert!(seq.extend(vec![json!(4), json!("five"), json!(6)]).is_err());
        assert_eq!(seq.len(), 3);
        seq.extend(vec![json!(4), json!(5)]).unwrap();
        assert_eq!(seq.len(), 5);
    }

    #[test]
    fn with_items_rejects_bad_batch() {
        let res = TypedMutableSequence::with_items(ElementType::string(), vec![json!("a"), json!(1)]);
        assert!(res.is_err());
    }

    #[test]
    fn move_uses_final_index() {
        let mut seq = ints();
        assert_eq!(seq.move_item(0, 2).unwrap(), (0, 2));
        assert_eq!(seq.as_slice(), &[json!(2), json!(3), json!(1)]);
        assert!(seq.move_item(0, 3).is_err());
    }

    #[test]
    fn sequence_queries() {
        let mut seq = TypedMutableSequence::<i32>::default();
        seq.extend([1, 2, 1]).unwrap();
        assert_eq!(seq.index_of(&2), Some(1));
        assert_eq!(seq.count(&1), 2);
        assert!(seq.contains(&1));
        assert!(!seq.contains(&7));
        assert_eq!(seq.remove(0).unwrap(), 1);
        assert_eq!(seq.pop(), Some(1));
        assert_eq!(seq.iter().copied().collect::<Vec<_>>(), vec![2]);
        seq.clear();
        assert!(seq.is_empty());
        assert!(seq.get(0).is_err());
    }

    #[test]
    fn lookup_by_key() {
        #[derive(Debug, PartialEq)]
        struct Layer {
            name: String,
        }
        let mut seq = TypedMutableSequence::default().with_key(|l: &Layer| Some(l.name.clone()));
        seq.push(Layer { name: "points".into() }).unwrap();
        seq.push(Layer { name: "image".into() }).unwrap();
        assert_eq!(seq.position_of_key("image"), Some(1));
        assert_eq!(seq.lookup("points").map(|l| l.name.as_str()), Some("points"));
        assert!(seq.lookup("labels").is_none());
    }
}

//! A mutable sequence that announces every mutation.
//!
//! Each primitive follows the same sequence: validate, emit the intent event,
//! mutate storage, emit the completed event.
//!
//! ```text
//! insert(i, v)    inserting{i}      -> inserted{i, v}
//! remove(i)       removing{i}       -> removed{i, v}
//! move_item(i, j) moving{i, j}      -> moved{i, j, v}
//! set(i, v)                         -> changed{i, old, new}
//! ```
//!
//! Bulk operations are decomposed into these primitives. Reorders (`reverse`,
//! `reorder`, `sort_by`) additionally finish with one `reordered` event that
//! carries the final sequence.
//!
//! Intent events are informational. A subscriber error raised while handling
//! one aborts the call before storage is touched. An error raised by a
//! completed event leaves storage mutated, and the remaining subscribers are
//! not notified.

use std::cmp::Ordering;
use std::fmt;
use std::ops::RangeBounds;

use evented_emitter::{EmitterGroup, SourceId};

use crate::config::{EventedConfig, NoopMoves};
use crate::element::ElementType;
use crate::error::ContainerError;
use crate::events::{lifecycle_group, ListEvent, SupportsEvents};
use crate::typed::TypedMutableSequence;

pub type FlatEvent<T> = ListEvent<usize, T>;

pub struct EventedList<T> {
    items: TypedMutableSequence<T>,
    events: EmitterGroup<FlatEvent<T>>,
    config: EventedConfig,
}

impl<T: fmt::Debug> fmt::Debug for EventedList<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventedList")
            .field("source", &self.events.source())
            .field("items", &self.items.as_slice())
            .finish()
    }
}

impl<T> Default for EventedList<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> SupportsEvents for EventedList<T> {
    type Payload = FlatEvent<T>;

    fn events(&self) -> &EmitterGroup<FlatEvent<T>> {
        &self.events
    }
}

impl<T> EventedList<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// An empty list accepting any element.
    pub fn new() -> Self {
        Self::typed(ElementType::any())
    }

    pub fn typed(element_type: ElementType<T>) -> Self {
        Self::from_sequence(TypedMutableSequence::new(element_type))
    }

    /// Builds a list holding `items`. No events are emitted.
    pub fn with_items<I>(element_type: ElementType<T>, items: I) -> Result<Self, ContainerError>
    where
        I: IntoIterator<Item = T>,
    {
        Ok(Self::from_sequence(TypedMutableSequence::with_items(element_type, items)?))
    }

    pub fn from_sequence(items: TypedMutableSequence<T>) -> Self {
        Self {
            items,
            events: lifecycle_group(SourceId::next(), true),
            config: EventedConfig::default(),
        }
    }

    pub fn with_config(mut self, config: EventedConfig) -> Self {
        self.items = self.items.with_clamp_insert(config.clamp_insert);
        self.config = config;
        self
    }

    /// Registers the key function used by [`lookup`](Self::lookup).
    pub fn with_key<F>(mut self, key: F) -> Self
    where
        F: Fn(&T) -> Option<String> + Send + Sync + 'static,
    {
        self.items = self.items.with_key(key);
        self
    }

    pub fn events(&self) -> &EmitterGroup<FlatEvent<T>> {
        &self.events
    }

    pub fn source(&self) -> Option<SourceId> {
        self.events.source()
    }

    pub fn config(&self) -> EventedConfig {
        self.config
    }

    pub fn element_type(&self) -> &ElementType<T> {
        self.items.element_type()
    }

    // ── Reads ──────────────────────────────────────────────────────────────

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: isize) -> Result<&T, ContainerError> {
        self.items.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[T] {
        self.items.as_slice()
    }

    pub fn to_vec(&self) -> Vec<T> {
        self.items.as_slice().to_vec()
    }

    pub fn lookup(&self, key: &str) -> Option<&T> {
        self.items.lookup(key)
    }

    // ── Primitives ─────────────────────────────────────────────────────────

    pub fn insert(&mut self, index: isize, value: T) -> Result<(), ContainerError> {
        let idx = self.items.resolve_insert(index)?;
        self.items.check(&value)?;
        self.emit(ListEvent::Inserting { index: idx })?;
        self.items.insert_unchecked(idx, value.clone());
        self.emit(ListEvent::Inserted { index: idx, value })
    }

    pub fn push(&mut self, value: T) -> Result<(), ContainerError> {
        self.insert(self.len() as isize, value)
    }

    /// Removes and returns the element at `index`.
    pub fn remove(&mut self, index: isize) -> Result<T, ContainerError> {
        let idx = self.items.resolve_index(index)?;
        self.emit(ListEvent::Removing { index: idx })?;
        let value = self.items.remove_unchecked(idx);
        self.emit(ListEvent::Removed {
            index: idx,
            value: value.clone(),
        })?;
        Ok(value)
    }

    /// Removes the last element.
    pub fn pop(&mut self) -> Result<T, ContainerError> {
        self.remove(-1)
    }

    /// Moves the element at `from` so that it ends up at index `to`.
    ///
    /// Returns `false` when `from == to` and no-op moves are suppressed.
    pub fn move_item(&mut self, from: isize, to: isize) -> Result<bool, ContainerError> {
        let src = self.items.resolve_index(from)?;
        let dst = self.items.resolve_index(to)?;
        if src == dst && self.config.noop_moves == NoopMoves::Suppress {
            tracing::debug!(source = ?self.events.source(), index = src, "no-op move suppressed");
            return Ok(false);
        }
        self.emit(ListEvent::Moving {
            index: src,
            new_index: dst,
        })?;
        let value = self.items.remove_unchecked(src);
        self.items.insert_unchecked(dst, value.clone());
        self.emit(ListEvent::Moved {
            index: src,
            new_index: dst,
            value,
        })?;
        Ok(true)
    }

    /// Replaces the element at `index`, returning the previous one.
    pub fn set(&mut self, index: isize, value: T) -> Result<T, ContainerError> {
        let idx = self.items.resolve_index(index)?;
        self.items.check(&value)?;
        let old = self.items.replace_unchecked(idx, value.clone());
        self.emit(ListEvent::Changed {
            index: idx,
            old_value: old.clone(),
            new_value: value,
        })?;
        Ok(old)
    }

    // ── Bulk operations ────────────────────────────────────────────────────

    /// Appends `values`, one `inserting`/`inserted` pair each.
    pub fn extend<I>(&mut self, values: I) -> Result<(), ContainerError>
    where
        I: IntoIterator<Item = T>,
    {
        let at = self.len() as isize;
        self.insert_many(at, values)
    }

    /// Inserts `values` consecutively starting at `index`. Type checks every
    /// value before the first insertion.
    pub fn insert_many<I>(&mut self, index: isize, values: I) -> Result<(), ContainerError>
    where
        I: IntoIterator<Item = T>,
    {
        let start = self.items.resolve_insert(index)?;
        let values: Vec<T> = values.into_iter().collect();
        self.items.element_type().check_all(&values)?;
        for (offset, value) in values.into_iter().enumerate() {
            self.insert((start + offset) as isize, value)?;
        }
        Ok(())
    }

    /// Removes `range`, highest index first, and returns the removed values in
    /// their original order.
    pub fn remove_range(&mut self, range: impl RangeBounds<usize>) -> Result<Vec<T>, ContainerError> {
        let range = self.items.resolve_range(range)?;
        let mut removed = Vec::with_capacity(range.len());
        for idx in range.rev() {
            removed.push(self.remove(idx as isize)?);
        }
        removed.reverse();
        Ok(removed)
    }

    pub fn clear(&mut self) -> Result<(), ContainerError> {
        self.remove_range(..).map(|_| ())
    }

    /// Slice assignment. Equal lengths become one `changed` per index;
    /// otherwise the range is removed and `values` inserted in its place.
    pub fn set_range<I>(&mut self, range: impl RangeBounds<usize>, values: I) -> Result<(), ContainerError>
    where
        I: IntoIterator<Item = T>,
    {
        let range = self.items.resolve_range(range)?;
        let values: Vec<T> = values.into_iter().collect();
        self.items.element_type().check_all(&values)?;
        if values.len() == range.len() {
            for (idx, value) in range.zip(values) {
                self.set(idx as isize, value)?;
            }
            return Ok(());
        }
        let start = range.start;
        self.remove_range(range)?;
        self.insert_many(start as isize, values)
    }

    /// Moves the elements at `sources` (in the given order) to a contiguous
    /// block inserted before position `dest`, where `dest` is counted before
    /// the move. Returns the number of `moved` events emitted.
    pub fn move_multiple(&mut self, sources: &[isize], dest: isize) -> Result<usize, ContainerError> {
        let len = self.len();
        let dest = crate::index::resolve_insert(dest, len, false)?;
        let mut picked = Vec::with_capacity(sources.len());
        for &s in sources {
            let idx = self.items.resolve_index(s)?;
            if picked.contains(&idx) {
                return Err(ContainerError::InvalidOrder(format!("index {idx} given twice")));
            }
            picked.push(idx);
        }
        let before: Vec<usize> = (0..dest).filter(|i| !picked.contains(i)).collect();
        let after: Vec<usize> = (dest..len).filter(|i| !picked.contains(i)).collect();
        let order: Vec<usize> = before.into_iter().chain(picked).chain(after).collect();
        self.apply_order(&order)
    }

    // ── Reorders ───────────────────────────────────────────────────────────

    /// Rearranges the list so that position `i` holds the element previously
    /// at `order[i]`. `order` must be a permutation of `0..len`.
    pub fn reorder(&mut self, order: &[usize]) -> Result<(), ContainerError> {
        let len = self.len();
        if order.len() != len {
            return Err(ContainerError::InvalidOrder(format!(
                "expected {len} positions, got {}",
                order.len()
            )));
        }
        let mut seen = vec![false; len];
        for &i in order {
            if i >= len || std::mem::replace(&mut seen[i], true) {
                return Err(ContainerError::InvalidOrder(format!("{order:?} is not a permutation")));
            }
        }
        let moves = self.apply_order(order)?;
        tracing::trace!(source = ?self.events.source(), moves, "reordered");
        self.emit(ListEvent::Reordered { value: self.to_vec() })
    }

    pub fn reverse(&mut self) -> Result<(), ContainerError> {
        let order: Vec<usize> = (0..self.len()).rev().collect();
        self.reorder(&order)
    }

    /// Stable sort, expressed as moves followed by `reordered`.
    pub fn sort_by<F>(&mut self, mut compare: F) -> Result<(), ContainerError>
    where
        F: FnMut(&T, &T) -> Ordering,
    {
        let items = self.items.as_slice();
        let mut order: Vec<usize> = (0..items.len()).collect();
        order.sort_by(|&a, &b| compare(&items[a], &items[b]));
        self.reorder(&order)
    }

    /// Brings the list into `order` by filling each position in turn from
    /// further right. Settled positions are never disturbed.
    fn apply_order(&mut self, order: &[usize]) -> Result<usize, ContainerError> {
        let mut current: Vec<usize> = (0..self.len()).collect();
        let mut moves = 0;
        for (pos, want) in order.iter().enumerate() {
            let Some(cur) = current.iter().position(|c| c == want) else {
                continue;
            };
            if cur != pos {
                self.move_item(cur as isize, pos as isize)?;
                let v = current.remove(cur);
                current.insert(pos, v);
                moves += 1;
            }
        }
        Ok(moves)
    }

    fn emit(&self, event: FlatEvent<T>) -> Result<(), ContainerError> {
        self.events.emit(event.name(), event)?;
        Ok(())
    }
}

impl<T> EventedList<T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    pub fn index_of(&self, value: &T) -> Option<usize> {
        self.items.index_of(value)
    }

    pub fn contains(&self, value: &T) -> bool {
        self.items.contains(value)
    }

    pub fn count(&self, value: &T) -> usize {
        self.items.count(value)
    }

    /// Removes the first occurrence of `value`.
    pub fn remove_value(&mut self, value: &T) -> Result<T, ContainerError> {
        let idx = self.index_of(value).ok_or(ContainerError::ValueNotFound)?;
        self.remove(idx as isize)
    }
}

impl<'a, T> IntoIterator for &'a EventedList<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

//! A named collection of emitters belonging to one evented object.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::emitter::{Blocker, EventEmitter};
use crate::error::EventError;
use crate::event::Event;
use crate::source::{ConnectionId, SourceId};
use crate::subscriber::{Callback, Subscriber};

/// Ordered map from event name to [`EventEmitter`].
///
/// Names are unique and iterate in declaration order. Every emitter shares the
/// group's [`SourceId`], so listeners attached to several groups can tell
/// events apart by [`Event::source`].
pub struct EmitterGroup<P> {
    source: Option<SourceId>,
    emitters: IndexMap<String, EventEmitter<P>>,
}

impl<P> Clone for EmitterGroup<P> {
    fn clone(&self) -> Self {
        Self {
            source: self.source,
            emitters: self.emitters.clone(),
        }
    }
}

impl<P> fmt::Debug for EmitterGroup<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmitterGroup")
            .field("source", &self.source)
            .field("emitters", &self.emitters.keys().collect::<Vec<_>>())
            .finish()
    }
}

pub struct EmitterGroupBuilder<P> {
    group: EmitterGroup<P>,
}

impl<P> EmitterGroupBuilder<P> {
    /// Declares an emitter. Declaring a name twice panics in debug builds;
    /// release builds log it and keep the first declaration.
    pub fn emitter<I, S>(mut self, name: &str, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if let Err(err) = self.group.add_emitter(name, fields) {
            debug_assert!(false, "{err}");
            tracing::debug!(error = %err, "emitter declaration ignored");
        }
        self
    }

    pub fn build(self) -> EmitterGroup<P> {
        self.group
    }
}

impl<P> EmitterGroup<P> {
    pub fn new(source: Option<SourceId>) -> Self {
        Self {
            source,
            emitters: IndexMap::new(),
        }
    }

    pub fn builder(source: Option<SourceId>) -> EmitterGroupBuilder<P> {
        EmitterGroupBuilder {
            group: Self::new(source),
        }
    }

    pub fn source(&self) -> Option<SourceId> {
        self.source
    }

    pub fn add_emitter<I, S>(&mut self, name: &str, fields: I) -> Result<&EventEmitter<P>, EventError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if self.emitters.contains_key(name) {
            return Err(EventError::DuplicateEmitter(name.to_string()));
        }
        let emitter = EventEmitter::new(name, fields, self.source);
        Ok(self.emitters.entry(name.to_string()).or_insert(emitter))
    }

    /// Resolves `name` to its emitter.
    pub fn emitter(&self, name: &str) -> Result<&EventEmitter<P>, EventError> {
        self.emitters
            .get(name)
            .ok_or_else(|| EventError::UnknownEmitter(name.to_string()))
    }

    pub fn get(&self, name: &str) -> Option<&EventEmitter<P>> {
        self.emitters.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.emitters.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.emitters.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &EventEmitter<P>)> {
        self.emitters.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.emitters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.emitters.is_empty()
    }

    // ── Connection ─────────────────────────────────────────────────────────

    pub fn connect<F>(&self, name: &str, f: F) -> Result<ConnectionId, EventError>
    where
        F: Fn(&Event<P>) + Send + Sync + 'static,
    {
        Ok(self.emitter(name)?.connect(f))
    }

    pub fn connect_with(&self, name: &str, subscriber: Subscriber<P>) -> Result<ConnectionId, EventError> {
        self.emitter(name)?.connect_with(subscriber)
    }

    pub fn disconnect(&self, name: &str, id: ConnectionId) -> Result<bool, EventError> {
        Ok(self.emitter(name)?.disconnect(id))
    }

    /// Connects `callback` to every emitter, in declaration order.
    pub fn connect_all(&self, callback: &Callback<P>) -> Vec<ConnectionId> {
        self.emitters
            .values()
            .map(|e| e.connect_callback(callback))
            .collect()
    }

    /// Disconnects `callback` from every emitter. Returns how many emitters
    /// it was removed from.
    pub fn disconnect_all(&self, callback: &Callback<P>) -> usize {
        self.emitters
            .values()
            .filter(|e| e.disconnect_callback(callback))
            .count()
    }

    /// Disconnects the given connections wherever they are attached.
    pub fn disconnect_ids(&self, ids: &[ConnectionId]) -> usize {
        ids.iter()
            .map(|id| self.emitters.values().filter(|e| e.disconnect(*id)).count())
            .sum()
    }

    pub fn disconnect_owner<O>(&self, owner: &Arc<O>) -> usize
    where
        O: Any + Send + Sync,
    {
        self.emitters.values().map(|e| e.disconnect_owner(owner)).sum()
    }

    // ── Blocking ───────────────────────────────────────────────────────────

    pub fn block_all(&self) {
        for e in self.emitters.values() {
            e.block();
        }
    }

    pub fn unblock_all(&self) {
        for e in self.emitters.values() {
            e.unblock();
        }
    }

    /// Blocks every emitter until the returned guard is dropped.
    #[must_use = "the group is unblocked as soon as the guard is dropped"]
    pub fn blocker_all(&self) -> GroupBlocker<P> {
        GroupBlocker {
            _blockers: self.emitters.values().map(EventEmitter::blocker).collect(),
        }
    }

    // ── Dispatch ───────────────────────────────────────────────────────────

    pub fn emit(&self, name: &str, payload: P) -> Result<(), EventError> {
        self.emitter(name)?.emit(payload)
    }

    pub fn emit_event(&self, name: &str, event: &Event<P>) -> Result<(), EventError> {
        self.emitter(name)?.emit_event(event)
    }
}

/// Scoped suppression of a whole group; see [`EmitterGroup::blocker_all`].
#[must_use]
pub struct GroupBlocker<P> {
    _blockers: Vec<Blocker<P>>,
}

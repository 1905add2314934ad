//! Per-event-type broadcaster.
//!
//! Subscribers are kept in an ordered list of shared slots. `emit` snapshots
//! the list under the lock and releases it before invoking anything, so
//! callbacks may connect, disconnect or block while a dispatch is running:
//!   - a subscriber connected during dispatch does not see the in-flight event,
//!   - a subscriber disconnected during dispatch is skipped for the remainder
//!     of it (each slot carries a `connected` flag checked right before the
//!     call).

use std::any::Any;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::EventError;
use crate::event::Event;
use crate::source::{ConnectionId, SourceId};
use crate::subscriber::{owner_matches, Callback, OwnerRef, Position, Subscriber};

struct Slot<P> {
    id: ConnectionId,
    callback: Callback<P>,
    owner: Option<OwnerRef>,
    connected: AtomicBool,
    blocked: AtomicUsize,
}

impl<P> Slot<P> {
    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }

    fn owner_alive(&self) -> bool {
        self.owner.as_ref().is_none_or(|w| w.strong_count() > 0)
    }
}

struct Inner<P> {
    name: String,
    fields: Vec<String>,
    source: Option<SourceId>,
    slots: Mutex<Vec<Arc<Slot<P>>>>,
    blocked: AtomicUsize,
}

/// Broadcasts one event type to an ordered set of subscribers.
///
/// `EventEmitter` is a handle: clones refer to the same subscriber list.
pub struct EventEmitter<P> {
    inner: Arc<Inner<P>>,
}

impl<P> Clone for EventEmitter<P> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<P> fmt::Debug for EventEmitter<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventEmitter")
            .field("name", &self.inner.name)
            .field("fields", &self.inner.fields)
            .field("source", &self.inner.source)
            .field("subscribers", &self.len())
            .field("blocked", &self.is_blocked())
            .finish()
    }
}

impl<P> EventEmitter<P> {
    /// Creates an emitter that dispatches events of type `name`.
    ///
    /// `fields` are the payload field names this emitter promises; they are
    /// checked against [`Subscriber::requiring`] on connect.
    pub fn new<I, S>(name: impl Into<String>, fields: I, source: Option<SourceId>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            inner: Arc::new(Inner {
                name: name.into(),
                fields: fields.into_iter().map(Into::into).collect(),
                source,
                slots: Mutex::new(Vec::new()),
                blocked: AtomicUsize::new(0),
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn fields(&self) -> &[String] {
        &self.inner.fields
    }

    pub fn source(&self) -> Option<SourceId> {
        self.inner.source
    }

    /// Number of connected subscribers whose owner (if any) is still alive.
    pub fn len(&self) -> usize {
        self.inner
            .slots
            .lock()
            .iter()
            .filter(|s| s.owner_alive())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_connected(&self, id: ConnectionId) -> bool {
        self.inner.slots.lock().iter().any(|s| s.id == id)
    }

    // ── Connection ─────────────────────────────────────────────────────────

    /// Connects an infallible closure at the end of the invocation order.
    pub fn connect<F>(&self, f: F) -> ConnectionId
    where
        F: Fn(&Event<P>) + Send + Sync + 'static,
    {
        self.attach(Subscriber::new(Callback::new(f)))
    }

    /// Connects a shared callback. Connecting the same callback twice returns
    /// the existing connection.
    pub fn connect_callback(&self, callback: &Callback<P>) -> ConnectionId {
        self.attach(Subscriber::new(callback.clone()))
    }

    /// Connects a fully described subscriber.
    pub fn connect_with(&self, subscriber: Subscriber<P>) -> Result<ConnectionId, EventError> {
        if let Some(field) = subscriber
            .requires
            .iter()
            .find(|f| !self.inner.fields.contains(f))
        {
            return Err(EventError::IncompatibleCallback {
                emitter: self.inner.name.clone(),
                field: field.clone(),
            });
        }
        Ok(self.attach(subscriber))
    }

    fn attach(&self, subscriber: Subscriber<P>) -> ConnectionId {
        let mut slots = self.inner.slots.lock();
        // Dead-owner slots never fire again and must not match a reconnect.
        slots.retain(|s| {
            let alive = s.owner_alive();
            if !alive {
                s.connected.store(false, Ordering::Release);
            }
            alive
        });
        if let Some(existing) = slots
            .iter()
            .find(|s| s.callback.same_as(&subscriber.callback))
        {
            return existing.id;
        }
        let slot = Arc::new(Slot {
            id: ConnectionId::next(),
            callback: subscriber.callback,
            owner: subscriber.owner,
            connected: AtomicBool::new(true),
            blocked: AtomicUsize::new(0),
        });
        let id = slot.id;
        match subscriber.position {
            Position::First => slots.insert(0, slot),
            Position::Last => slots.push(slot),
        }
        id
    }

    /// Removes the subscriber if present. Returns whether anything was removed.
    pub fn disconnect(&self, id: ConnectionId) -> bool {
        self.detach_where(|s| s.id == id) > 0
    }

    /// Like [`disconnect`](Self::disconnect) but fails when `id` is unknown.
    pub fn disconnect_strict(&self, id: ConnectionId) -> Result<(), EventError> {
        if self.disconnect(id) {
            Ok(())
        } else {
            Err(EventError::NotConnected {
                emitter: self.inner.name.clone(),
                id: id.get(),
            })
        }
    }

    pub fn disconnect_callback(&self, callback: &Callback<P>) -> bool {
        self.detach_where(|s| s.callback.same_as(callback)) > 0
    }

    /// Removes every subscriber tied to `owner`.
    pub fn disconnect_owner<O>(&self, owner: &Arc<O>) -> usize
    where
        O: Any + Send + Sync,
    {
        self.detach_where(|s| s.owner.as_ref().is_some_and(|w| owner_matches(w, owner)))
    }

    pub fn disconnect_all(&self) -> usize {
        self.detach_where(|_| true)
    }

    fn detach_where(&self, pred: impl Fn(&Slot<P>) -> bool) -> usize {
        let mut slots = self.inner.slots.lock();
        let before = slots.len();
        slots.retain(|s| {
            if pred(s) {
                s.connected.store(false, Ordering::Release);
                false
            } else {
                true
            }
        });
        before - slots.len()
    }

    // ── Blocking ───────────────────────────────────────────────────────────

    /// Suppresses dispatch until a matching [`unblock`](Self::unblock).
    /// Calls nest: the emitter is live again only when every block is undone.
    pub fn block(&self) {
        self.inner.blocked.fetch_add(1, Ordering::AcqRel);
    }

    pub fn unblock(&self) {
        let _ = self
            .inner
            .blocked
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1));
    }

    pub fn is_blocked(&self) -> bool {
        self.inner.blocked.load(Ordering::Acquire) > 0
    }

    /// Blocks the emitter until the returned guard is dropped.
    #[must_use = "the emitter is unblocked as soon as the guard is dropped"]
    pub fn blocker(&self) -> Blocker<P> {
        self.block();
        Blocker {
            emitter: self.clone(),
            target: BlockTarget::Emitter,
        }
    }

    /// Suppresses delivery to one subscriber. Counted like [`block`](Self::block).
    /// Returns `false` if `id` is not connected.
    pub fn block_subscriber(&self, id: ConnectionId) -> bool {
        match self.slot(id) {
            Some(slot) => {
                slot.blocked.fetch_add(1, Ordering::AcqRel);
                true
            }
            None => false,
        }
    }

    pub fn unblock_subscriber(&self, id: ConnectionId) -> bool {
        match self.slot(id) {
            Some(slot) => {
                let _ = slot
                    .blocked
                    .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1));
                true
            }
            None => false,
        }
    }

    /// Blocks one subscriber until the returned guard is dropped. For an id
    /// that is not connected the guard does nothing.
    #[must_use = "the subscriber is unblocked as soon as the guard is dropped"]
    pub fn subscriber_blocker(&self, id: ConnectionId) -> Blocker<P> {
        let target = if self.block_subscriber(id) {
            BlockTarget::Subscriber(id)
        } else {
            BlockTarget::Inert
        };
        Blocker {
            emitter: self.clone(),
            target,
        }
    }

    fn slot(&self, id: ConnectionId) -> Option<Arc<Slot<P>>> {
        self.inner.slots.lock().iter().find(|s| s.id == id).cloned()
    }

    // ── Dispatch ───────────────────────────────────────────────────────────

    /// Builds an event from `payload` and dispatches it.
    pub fn emit(&self, payload: P) -> Result<(), EventError> {
        let event = Event::new(self.inner.name.clone(), self.inner.source, payload);
        self.emit_event(&event)
    }

    /// Dispatches a prebuilt event (for example one forwarded from a child).
    ///
    /// Subscribers run synchronously in order. The first failing subscriber
    /// stops the dispatch and its error is returned; later subscribers are not
    /// invoked.
    pub fn emit_event(&self, event: &Event<P>) -> Result<(), EventError> {
        if self.is_blocked() {
            tracing::debug!(emitter = %self.inner.name, "emitter blocked, event dropped");
            return Ok(());
        }
        let snapshot: Vec<Arc<Slot<P>>> = self.inner.slots.lock().clone();
        tracing::trace!(
            emitter = %self.inner.name,
            subscribers = snapshot.len(),
            source = ?event.source(),
            "dispatch"
        );
        let mut pruned = false;
        for slot in &snapshot {
            if !slot.is_connected() {
                continue;
            }
            if !slot.owner_alive() {
                pruned = true;
                continue;
            }
            if slot.blocked.load(Ordering::Acquire) > 0 {
                continue;
            }
            if let Err(source) = slot.callback.call(event) {
                tracing::debug!(
                    emitter = %self.inner.name,
                    connection = %slot.id,
                    error = %source,
                    "subscriber failed, aborting dispatch"
                );
                if pruned {
                    self.prune_dead_owners();
                }
                return Err(EventError::Subscriber {
                    emitter: self.inner.name.clone(),
                    source,
                });
            }
        }
        if pruned {
            self.prune_dead_owners();
        }
        Ok(())
    }

    fn prune_dead_owners(&self) {
        let removed = self.detach_where(|s| !s.owner_alive());
        tracing::debug!(emitter = %self.inner.name, removed, "pruned subscribers with dropped owners");
    }
}

#[derive(Debug, Clone, Copy)]
enum BlockTarget {
    Emitter,
    Subscriber(ConnectionId),
    // The subscriber was not connected; nothing to undo.
    Inert,
}

/// Scoped suppression returned by [`EventEmitter::blocker`] and
/// [`EventEmitter::subscriber_blocker`].
#[must_use]
pub struct Blocker<P> {
    emitter: EventEmitter<P>,
    target: BlockTarget,
}

impl<P> Drop for Blocker<P> {
    fn drop(&mut self) {
        match self.target {
            BlockTarget::Emitter => self.emitter.unblock(),
            BlockTarget::Subscriber(id) => {
                self.emitter.unblock_subscriber(id);
            }
            BlockTarget::Inert => {}
        }
    }
}

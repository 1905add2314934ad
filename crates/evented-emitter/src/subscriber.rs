//! Subscriber records: a callback plus the metadata `connect` needs.

use std::any::Any;
use std::fmt;
use std::sync::{Arc, Weak};

use crate::error::BoxError;
use crate::event::Event;

pub type CallbackResult = Result<(), BoxError>;

type CallbackFn<P> = dyn Fn(&Event<P>) -> CallbackResult + Send + Sync;

/// A shareable event callback.
///
/// Clones compare equal by identity, which is what makes connecting the same
/// `Callback` twice a no-op.
pub struct Callback<P>(Arc<CallbackFn<P>>);

impl<P> Callback<P> {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&Event<P>) + Send + Sync + 'static,
    {
        Self(Arc::new(move |ev: &Event<P>| {
            f(ev);
            Ok(())
        }))
    }

    /// A callback whose error aborts delivery to the remaining subscribers.
    pub fn fallible<F>(f: F) -> Self
    where
        F: Fn(&Event<P>) -> CallbackResult + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    pub fn same_as(&self, other: &Callback<P>) -> bool {
        std::ptr::addr_eq(Arc::as_ptr(&self.0), Arc::as_ptr(&other.0))
    }

    pub(crate) fn call(&self, event: &Event<P>) -> CallbackResult {
        (self.0)(event)
    }
}

impl<P> Clone for Callback<P> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<P> fmt::Debug for Callback<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Callback")
            .field(&Arc::as_ptr(&self.0).cast::<()>())
            .finish()
    }
}

/// Where a new subscriber goes in the invocation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Position {
    First,
    #[default]
    Last,
}

pub(crate) type OwnerRef = Weak<dyn Any + Send + Sync>;

/// Everything `connect_with` needs to register a callback.
pub struct Subscriber<P> {
    pub(crate) callback: Callback<P>,
    pub(crate) position: Position,
    pub(crate) requires: Vec<String>,
    pub(crate) owner: Option<OwnerRef>,
}

impl<P> Subscriber<P> {
    pub fn new(callback: Callback<P>) -> Self {
        Self {
            callback,
            position: Position::Last,
            requires: Vec::new(),
            owner: None,
        }
    }

    pub fn at(mut self, position: Position) -> Self {
        self.position = position;
        self
    }

    /// Payload fields the callback reads. Connecting fails if the emitter does
    /// not declare all of them.
    pub fn requiring<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.requires.extend(fields.into_iter().map(Into::into));
        self
    }

    /// Ties the subscription to `owner`'s lifetime. Once the last strong
    /// reference to `owner` is gone the callback is no longer invoked.
    pub fn owned_by<O>(mut self, owner: &Arc<O>) -> Self
    where
        O: Any + Send + Sync,
    {
        let owner: Arc<dyn Any + Send + Sync> = owner.clone();
        self.owner = Some(Arc::downgrade(&owner));
        self
    }
}

impl<P> From<Callback<P>> for Subscriber<P> {
    fn from(callback: Callback<P>) -> Self {
        Subscriber::new(callback)
    }
}

pub(crate) fn owner_matches<O: Any + Send + Sync>(owner: &OwnerRef, candidate: &Arc<O>) -> bool {
    std::ptr::addr_eq(owner.as_ptr(), Arc::as_ptr(candidate))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_identity() {
        let a: Callback<()> = Callback::new(|_| {});
        let b = a.clone();
        let c: Callback<()> = Callback::new(|_| {});
        assert!(a.same_as(&b));
        assert!(!a.same_as(&c));
    }

    #[test]
    fn fallible_callback_returns_error() {
        let cb: Callback<u8> = Callback::fallible(|ev| {
            if *ev.payload() > 1 {
                Err("too big".into())
            } else {
                Ok(())
            }
        });
        assert!(cb.call(&Event::new("x", None, 0)).is_ok());
        assert!(cb.call(&Event::new("x", None, 2)).is_err());
    }

    #[test]
    fn owner_weak_ref_tracks_liveness() {
        let owner = Arc::new(String::from("widget"));
        let sub: Subscriber<()> = Subscriber::new(Callback::new(|_| {})).owned_by(&owner);
        let weak = sub.owner.clone().unwrap();
        assert!(owner_matches(&weak, &owner));
        assert!(weak.upgrade().is_some());
        drop(owner);
        assert!(weak.upgrade().is_none());
    }
}

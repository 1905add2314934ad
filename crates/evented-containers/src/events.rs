//! Lifecycle event vocabulary shared by the evented containers.

use evented_emitter::{EmitterGroup, SourceId};
use serde::Serialize;

pub const INSERTING: &str = "inserting";
pub const INSERTED: &str = "inserted";
pub const REMOVING: &str = "removing";
pub const REMOVED: &str = "removed";
pub const MOVING: &str = "moving";
pub const MOVED: &str = "moved";
pub const CHANGED: &str = "changed";
pub const REORDERED: &str = "reordered";

/// Payload of a container lifecycle event.
///
/// `I` is the index type (`usize` for flat lists, a path for nested ones) and
/// `V` the value carried. Serializes to the bare named fields, e.g.
/// `{"index": 0, "value": 5}`; the event name travels on
/// [`Event::kind`](evented_emitter::Event::kind).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ListEvent<I, V> {
    Inserting { index: I },
    Inserted { index: I, value: V },
    Removing { index: I },
    Removed { index: I, value: V },
    Moving { index: I, new_index: I },
    Moved { index: I, new_index: I, value: V },
    Changed { index: I, old_value: V, new_value: V },
    Reordered { value: Vec<V> },
}

impl<I, V> ListEvent<I, V> {
    /// The emitter this payload is dispatched on.
    pub fn name(&self) -> &'static str {
        match self {
            ListEvent::Inserting { .. } => INSERTING,
            ListEvent::Inserted { .. } => INSERTED,
            ListEvent::Removing { .. } => REMOVING,
            ListEvent::Removed { .. } => REMOVED,
            ListEvent::Moving { .. } => MOVING,
            ListEvent::Moved { .. } => MOVED,
            ListEvent::Changed { .. } => CHANGED,
            ListEvent::Reordered { .. } => REORDERED,
        }
    }

    pub fn index(&self) -> Option<&I> {
        match self {
            ListEvent::Inserting { index }
            | ListEvent::Inserted { index, .. }
            | ListEvent::Removing { index }
            | ListEvent::Removed { index, .. }
            | ListEvent::Moving { index, .. }
            | ListEvent::Moved { index, .. }
            | ListEvent::Changed { index, .. } => Some(index),
            ListEvent::Reordered { .. } => None,
        }
    }

    pub fn new_index(&self) -> Option<&I> {
        match self {
            ListEvent::Moving { new_index, .. } | ListEvent::Moved { new_index, .. } => Some(new_index),
            _ => None,
        }
    }

    /// The value inserted, removed or moved; the new value for `changed`.
    pub fn value(&self) -> Option<&V> {
        match self {
            ListEvent::Inserted { value, .. }
            | ListEvent::Removed { value, .. }
            | ListEvent::Moved { value, .. } => Some(value),
            ListEvent::Changed { new_value, .. } => Some(new_value),
            _ => None,
        }
    }

    pub fn is_pre_event(&self) -> bool {
        matches!(
            self,
            ListEvent::Inserting { .. } | ListEvent::Removing { .. } | ListEvent::Moving { .. }
        )
    }

    /// Rewrites every index field, e.g. to prefix a child's position.
    pub fn map_index<J>(self, mut f: impl FnMut(I) -> J) -> ListEvent<J, V> {
        match self {
            ListEvent::Inserting { index } => ListEvent::Inserting { index: f(index) },
            ListEvent::Inserted { index, value } => ListEvent::Inserted { index: f(index), value },
            ListEvent::Removing { index } => ListEvent::Removing { index: f(index) },
            ListEvent::Removed { index, value } => ListEvent::Removed { index: f(index), value },
            ListEvent::Moving { index, new_index } => ListEvent::Moving {
                index: f(index),
                new_index: f(new_index),
            },
            ListEvent::Moved {
                index,
                new_index,
                value,
            } => ListEvent::Moved {
                index: f(index),
                new_index: f(new_index),
                value,
            },
            ListEvent::Changed {
                index,
                old_value,
                new_value,
            } => ListEvent::Changed {
                index: f(index),
                old_value,
                new_value,
            },
            ListEvent::Reordered { value } => ListEvent::Reordered { value },
        }
    }
}

/// Declares the lifecycle emitters in their canonical order.
pub(crate) fn lifecycle_group<I, V>(source: SourceId, reordered: bool) -> EmitterGroup<ListEvent<I, V>> {
    let builder = EmitterGroup::builder(Some(source))
        .emitter(INSERTING, ["index"])
        .emitter(INSERTED, ["index", "value"])
        .emitter(REMOVING, ["index"])
        .emitter(REMOVED, ["index", "value"])
        .emitter(MOVING, ["index", "new_index"])
        .emitter(MOVED, ["index", "new_index", "value"])
        .emitter(CHANGED, ["index", "old_value", "new_value"]);
    if reordered {
        builder.emitter(REORDERED, ["value"]).build()
    } else {
        builder.build()
    }
}

/// Objects exposing an [`EmitterGroup`].
pub trait SupportsEvents {
    type Payload;

    fn events(&self) -> &EmitterGroup<Self::Payload>;
}

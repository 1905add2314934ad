//! Typed and evented mutable sequences.
//!
//! - [`TypedMutableSequence`]: a `Vec` restricted to an [`ElementType`].
//! - [`EventedList`]: a typed sequence announcing every mutation through an
//!   [`EmitterGroup`](evented_emitter::EmitterGroup) with `inserting`,
//!   `inserted`, `removing`, `removed`, `moving`, `moved`, `changed` and
//!   `reordered` emitters.
//! - [`NestableEventedList`]: an evented list whose elements may be evented
//!   lists; events carry index paths and bubble to every ancestor.
//!
//! ```
//! use std::sync::{Arc, Mutex};
//! use evented_containers::{EventedList, ListEvent, INSERTED};
//!
//! let mut list: EventedList<&str> = EventedList::new();
//! let seen = Arc::new(Mutex::new(Vec::new()));
//! let sink = Arc::clone(&seen);
//! list.events()
//!     .connect(INSERTED, move |ev| sink.lock().unwrap().push(ev.payload().clone()))
//!     .unwrap();
//!
//! list.push("a").unwrap();
//! assert_eq!(
//!     *seen.lock().unwrap(),
//!     vec![ListEvent::Inserted { index: 0, value: "a" }]
//! );
//! ```

pub mod config;
pub mod element;
pub mod error;
pub mod evented_list;
pub mod events;
pub mod index;
pub mod nested;
pub mod typed;

pub use config::{EventedConfig, NoopMoves};
pub use element::ElementType;
pub use error::ContainerError;
pub use evented_list::{EventedList, FlatEvent};
pub use events::{
    ListEvent, SupportsEvents, CHANGED, INSERTED, INSERTING, MOVED, MOVING, REMOVED, REMOVING, REORDERED,
};
pub use nested::{NestableEventedList, NestedEvent, NestedValue, Node, Path};
pub use typed::TypedMutableSequence;

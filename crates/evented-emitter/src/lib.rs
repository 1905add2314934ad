//! Synchronous event emitters.
//!
//! - [`Event`]: immutable record of a type tag, a typed payload and a source
//!   chain.
//! - [`EventEmitter`]: broadcasts one event type to subscribers in connection
//!   order, with counted blocking and snapshot-on-emit dispatch.
//! - [`EmitterGroup`]: the named emitters of one evented object.
//!
//! # Example
//!
//! ```
//! use std::sync::{Arc, Mutex};
//! use evented_emitter::{EmitterGroup, SourceId};
//!
//! let events: EmitterGroup<usize> = EmitterGroup::builder(Some(SourceId::next()))
//!     .emitter("inserted", ["index"])
//!     .emitter("removed", ["index"])
//!     .build();
//!
//! let seen = Arc::new(Mutex::new(Vec::new()));
//! let sink = Arc::clone(&seen);
//! events
//!     .connect("inserted", move |ev| sink.lock().unwrap().push(*ev.payload()))
//!     .unwrap();
//!
//! events.emit("inserted", 3).unwrap();
//! assert_eq!(*seen.lock().unwrap(), vec![3]);
//! assert!(events.emitter("nope").is_err());
//! ```

pub mod emitter;
pub mod error;
pub mod event;
pub mod group;
pub mod source;
pub mod subscriber;

pub use emitter::{Blocker, EventEmitter};
pub use error::{BoxError, ErrorKind, EventError};
pub use event::Event;
pub use group::{EmitterGroup, EmitterGroupBuilder, GroupBlocker};
pub use source::{ConnectionId, SourceId};
pub use subscriber::{Callback, CallbackResult, Position, Subscriber};

//! Observable containers that report every mutation as an ordered stream of
//! structured events.
//!
//! This crate bundles [`evented_emitter`] (events, emitters, emitter groups)
//! and [`evented_containers`] (typed, evented and nestable sequences) behind
//! one import path.
//!
//! ```
//! use std::sync::{Arc, Mutex};
//! use evented::{ElementType, EventedList, ErrorKind};
//! use serde_json::json;
//!
//! let mut layers = EventedList::typed(ElementType::integer());
//! let log = Arc::new(Mutex::new(Vec::new()));
//! for name in ["inserting", "inserted"] {
//!     let sink = Arc::clone(&log);
//!     layers
//!         .events()
//!         .connect(name, move |ev| sink.lock().unwrap().push(ev.kind().to_string()))
//!         .unwrap();
//! }
//!
//! layers.insert(0, json!(5)).unwrap();
//! assert_eq!(*log.lock().unwrap(), ["inserting", "inserted"]);
//!
//! let err = layers.insert(0, json!("x")).unwrap_err();
//! assert_eq!(err.kind(), ErrorKind::Type);
//! assert_eq!(layers.as_slice(), &[json!(5)]);
//! ```

pub use evented_containers::{
    config, element, events, index, nested, ContainerError, ElementType, EventedConfig, EventedList, FlatEvent,
    ListEvent, NestableEventedList, NestedEvent, NestedValue, Node, NoopMoves, Path, SupportsEvents,
    TypedMutableSequence, CHANGED, INSERTED, INSERTING, MOVED, MOVING, REMOVED, REMOVING, REORDERED,
};
pub use evented_emitter::{
    Blocker, BoxError, Callback, CallbackResult, ConnectionId, EmitterGroup, EmitterGroupBuilder, ErrorKind, Event,
    EventEmitter, EventError, GroupBlocker, Position, SourceId, Subscriber,
};

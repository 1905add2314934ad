use serde::Serialize;
use serde_json::{Map, Value};

use crate::source::SourceId;

/// An immutable record of something that happened.
///
/// `kind` is the name of the emitter that dispatched it. The payload holds the
/// named fields. `sources` is the chain of emitting objects, from the object
/// where the event originated to the one currently dispatching it; nested
/// containers append themselves when they forward a child's event.
#[derive(Debug, Clone, PartialEq)]
pub struct Event<P> {
    kind: String,
    sources: Vec<SourceId>,
    payload: P,
}

impl<P> Event<P> {
    pub fn new(kind: impl Into<String>, source: Option<SourceId>, payload: P) -> Self {
        Self {
            kind: kind.into(),
            sources: source.into_iter().collect(),
            payload,
        }
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn payload(&self) -> &P {
        &self.payload
    }

    pub fn into_payload(self) -> P {
        self.payload
    }

    /// The object currently dispatching this event.
    pub fn source(&self) -> Option<SourceId> {
        self.sources.last().copied()
    }

    /// The object the event originated from.
    pub fn origin(&self) -> Option<SourceId> {
        self.sources.first().copied()
    }

    pub fn sources(&self) -> &[SourceId] {
        &self.sources
    }

    /// Builds the event an ancestor re-dispatches: same kind, `source` appended
    /// to the chain, payload replaced (typically with a rewritten index).
    pub fn forwarded<Q>(&self, source: Option<SourceId>, payload: Q) -> Event<Q> {
        let mut sources = self.sources.clone();
        sources.extend(source);
        Event {
            kind: self.kind.clone(),
            sources,
            payload,
        }
    }
}

impl<P: Serialize> Event<P> {
    /// Returns the payload as a map of named fields.
    ///
    /// Payloads that do not serialize to an object are exposed under `value`.
    pub fn fields(&self) -> Result<Map<String, Value>, serde_json::Error> {
        match serde_json::to_value(&self.payload)? {
            Value::Object(map) => Ok(map),
            Value::Null => Ok(Map::new()),
            other => {
                let mut map = Map::new();
                map.insert("value".to_string(), other);
                Ok(map)
            }
        }
    }

    pub fn field(&self, name: &str) -> Option<Value> {
        self.fields().ok()?.remove(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Serialize)]
    struct Inserted {
        index: usize,
        value: i64,
    }

    #[test]
    fn fields_expose_payload_by_name() {
        let ev = Event::new("inserted", None, Inserted { index: 0, value: 5 });
        assert_eq!(ev.kind(), "inserted");
        assert_eq!(ev.field("index"), Some(json!(0)));
        assert_eq!(ev.field("value"), Some(json!(5)));
        assert_eq!(ev.field("missing"), None);
    }

    #[test]
    fn scalar_payload_is_exposed_as_value() {
        let ev = Event::new("ping", None, 7u8);
        assert_eq!(ev.field("value"), Some(json!(7)));
        let unit = Event::new("reset", None, ());
        assert!(unit.fields().unwrap().is_empty());
    }

    #[test]
    fn forwarded_appends_source() {
        let child = SourceId::next();
        let parent = SourceId::next();
        let ev = Event::new("removed", Some(child), 1usize);
        let fwd = ev.forwarded(Some(parent), vec![0usize, 1]);
        assert_eq!(fwd.kind(), "removed");
        assert_eq!(fwd.origin(), Some(child));
        assert_eq!(fwd.source(), Some(parent));
        assert_eq!(fwd.sources(), &[child, parent]);
        assert_eq!(fwd.payload(), &vec![0, 1]);
    }
}

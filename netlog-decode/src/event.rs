use std::path::Path;

use once_cell::sync::Lazy;
use serde_json::{Map, Value};

use crate::api::LoadError;

static EMPTY_FIELDS: Lazy<Map<String, Value>> = Lazy::new(Map::new);

/// A fully loaded network-capture log. Only the ordered `events` list is kept, everything else
/// in the container (constants, polled data) is irrelevant to payload extraction.
#[derive(Debug, Clone)]
pub struct LogDocument {
    events: Vec<Value>,
}

impl LogDocument {
    pub fn from_path(path: &Path) -> Result<LogDocument, LoadError> {
        let bytes = std::fs::read(path)?;
        tracing::debug!(path = %path.display(), len = bytes.len(), "read log file");
        Self::from_slice(&bytes)
    }

    pub fn from_slice(bytes: &[u8]) -> Result<LogDocument, LoadError> {
        let document: Value = serde_json::from_slice(bytes)?;
        Self::from_value(document)
    }

    pub fn from_value(document: Value) -> Result<LogDocument, LoadError> {
        let Value::Object(mut top) = document else {
            return Err(LoadError::MissingEvents);
        };
        match top.remove("events") {
            Some(Value::Array(events)) => Ok(LogDocument { events }),
            Some(_) => Err(LoadError::EventsNotSequence),
            None => Err(LoadError::MissingEvents),
        }
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn events(&self) -> impl Iterator<Item = Event<'_>> {
        self.events.iter().map(Event::from_value)
    }
}

/// Read-only, lenient view over one raw event. Malformed events never fail: they simply
/// expose no time, no source and no fields.
#[derive(Debug, Clone, Copy)]
pub struct Event<'a> {
    raw: &'a Value,
}

impl<'a> Event<'a> {
    pub fn from_value(raw: &'a Value) -> Event<'a> {
        Event { raw }
    }

    pub fn time(&self) -> Option<&'a Value> {
        self.raw.get("time").filter(|time| !time.is_null())
    }

    pub fn source_id(&self) -> Option<&'a Value> {
        self.raw
            .get("source")
            .and_then(Value::as_object)
            .and_then(|source| source.get("id"))
            .filter(|id| !id.is_null())
    }

    /// The event's `params`, in document order.
    pub fn fields(&self) -> &'a Map<String, Value> {
        self.raw
            .get("params")
            .and_then(Value::as_object)
            .unwrap_or(&EMPTY_FIELDS)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn loads_events_in_order() {
        let doc = LogDocument::from_slice(
            br#"{"constants": {}, "events": [{"time": "1"}, {"time": "2"}]}"#,
        )
        .unwrap();
        let times: Vec<_> = doc.events().map(|e| e.time().cloned()).collect();
        assert_eq!(times, vec![Some(json!("1")), Some(json!("2"))]);
    }

    #[test]
    fn rejects_bad_containers() {
        assert!(matches!(
            LogDocument::from_slice(b"not json"),
            Err(LoadError::InvalidDocument(_))
        ));
        assert!(matches!(
            LogDocument::from_slice(br#"{"constants": {}}"#),
            Err(LoadError::MissingEvents)
        ));
        assert!(matches!(
            LogDocument::from_slice(br#"[1, 2, 3]"#),
            Err(LoadError::MissingEvents)
        ));
        assert!(matches!(
            LogDocument::from_slice(br#"{"events": {"a": 1}}"#),
            Err(LoadError::EventsNotSequence)
        ));
    }

    #[test]
    fn parse_failures_keep_the_cause_out_of_the_message() {
        use std::error::Error;

        let err = LogDocument::from_slice(b"{\"events\": [").unwrap_err();
        assert_eq!(err.to_string(), "log is not valid JSON");
        let cause = err.source().expect("parse error is the source").to_string();
        assert!(!err.to_string().contains(&cause));

        let missing = LogDocument::from_path(Path::new("/definitely/not/here.json")).unwrap_err();
        assert_eq!(missing.to_string(), "failed to read log file");
        assert!(missing.source().is_some());
    }

    #[test]
    fn source_id_requires_an_object_with_id() {
        let with_id = json!({"source": {"id": 42, "type": 1}});
        let scalar_source = json!({"source": 42});
        let no_id = json!({"source": {"type": 1}});

        assert_eq!(Event::from_value(&with_id).source_id(), Some(&json!(42)));
        assert_eq!(Event::from_value(&scalar_source).source_id(), None);
        assert_eq!(Event::from_value(&no_id).source_id(), None);
    }

    #[test]
    fn malformed_events_expose_nothing() {
        for raw in [json!("just a string"), json!(null), json!({"params": [1, 2]})] {
            let event = Event::from_value(&raw);
            assert!(event.time().is_none());
            assert!(event.source_id().is_none());
            assert!(event.fields().is_empty());
        }
    }

    #[test]
    fn fields_keep_document_order() {
        let doc = LogDocument::from_slice(br#"{"events": [{"params": {"z": 1, "a": 2, "m": 3}}]}"#)
            .unwrap();
        let event = doc.events().next().unwrap();
        let names: Vec<_> = event.fields().keys().cloned().collect();
        assert_eq!(names, vec!["z", "a", "m"]);
    }
}

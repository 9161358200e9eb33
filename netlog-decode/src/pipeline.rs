use rayon::prelude::*;
use tracing::instrument;

use crate::api::OutputRecord;
use crate::decoder;
use crate::detector;
use crate::event::{Event, LogDocument};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub events: usize,
    pub candidates: usize,
    pub json_payloads: usize,
    pub decode_errors: usize,
}

impl Summary {
    pub fn of(events: usize, records: &[OutputRecord]) -> Summary {
        Summary {
            events,
            candidates: records.len(),
            json_payloads: records.iter().filter(|r| r.pretty_json.is_some()).count(),
            decode_errors: records
                .iter()
                .filter(|r| r.decoded_text.starts_with(decoder::DECODE_ERROR_MARKER))
                .count(),
        }
    }
}

/// Every candidate of one event, decoded, in field order.
pub fn process_event(event: Event<'_>) -> Vec<OutputRecord> {
    let time = event.time().cloned();
    let source_id = event.source_id().cloned();

    detector::detect(event.fields())
        .into_iter()
        .map(|candidate| {
            let decoded = decoder::decode(candidate.raw);
            OutputRecord {
                time: time.clone(),
                source_id: source_id.clone(),
                field: candidate.field.to_string(),
                decoded_text: decoded.decoded_text,
                pretty_json: decoded.pretty_json,
            }
        })
        .collect()
}

#[instrument(skip_all, fields(events = document.len()))]
pub fn scan(document: &LogDocument) -> Vec<OutputRecord> {
    let records: Vec<OutputRecord> = document.events().flat_map(process_event).collect();
    log_summary(document, &records);
    records
}

/// Same output as [`scan`]; events are decoded on the rayon pool and reassembled in order.
#[instrument(skip_all, fields(events = document.len()))]
pub fn scan_parallel(document: &LogDocument) -> Vec<OutputRecord> {
    let events: Vec<Event<'_>> = document.events().collect();
    let per_event: Vec<Vec<OutputRecord>> = events.into_par_iter().map(process_event).collect();
    let records: Vec<OutputRecord> = per_event.into_iter().flatten().collect();
    log_summary(document, &records);
    records
}

fn log_summary(document: &LogDocument, records: &[OutputRecord]) {
    let summary = Summary::of(document.len(), records);
    tracing::info!(
        events = summary.events,
        candidates = summary.candidates,
        json_payloads = summary.json_payloads,
        decode_errors = summary.decode_errors,
        "scanned log"
    );
}

#[cfg(test)]
mod tests {
    use base64::Engine;
    use serde_json::json;

    use super::*;

    fn b64(bytes: &[u8]) -> String {
        base64::engine::general_purpose::STANDARD.encode(bytes)
    }

    fn document(value: serde_json::Value) -> LogDocument {
        LogDocument::from_value(value).unwrap()
    }

    #[test]
    fn every_candidate_yields_a_record() {
        let doc = document(json!({"events": [{
            "time": "100",
            "source": {"id": 7},
            "params": {
                "good": b64(b"hello payload world"),
                "bad": "AAAAAAAAAAAAAAAAAAAAA",
                "ignored": "short",
            }
        }]}));

        let records = scan(&doc);
        assert_eq!(records.len(), 2);

        assert_eq!(records[0].field, "good");
        assert_eq!(records[0].decoded_text, "hello payload world");
        assert_eq!(records[0].time, Some(json!("100")));
        assert_eq!(records[0].source_id, Some(json!(7)));

        assert_eq!(records[1].field, "bad");
        assert!(records[1]
            .decoded_text
            .starts_with(decoder::DECODE_ERROR_MARKER));

        let summary = Summary::of(doc.len(), &records);
        assert_eq!(summary.candidates, 2);
        assert_eq!(summary.decode_errors, 1);
        assert_eq!(summary.json_payloads, 0);
    }

    #[test]
    fn malformed_events_contribute_nothing() {
        let doc = document(json!({"events": [
            "not an event",
            42,
            {"params": "not a mapping"},
            {"time": 5, "params": {"data": b64(b"{\"ok\": true, \"n\": 1}")}},
        ]}));

        let records = scan(&doc);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].time, Some(json!(5)));
        assert_eq!(records[0].source_id, None);
        assert!(records[0].pretty_json.is_some());
    }

    #[test]
    fn parallel_scan_matches_sequential_order() {
        let events: Vec<_> = (0..64)
            .map(|i| {
                json!({
                    "time": i,
                    "source": {"id": i},
                    "params": {
                        "first": b64(format!("first payload of event {i}").as_bytes()),
                        "second": b64(format!("second payload of event {i}").as_bytes()),
                    }
                })
            })
            .collect();
        let doc = document(json!({ "events": events }));

        let sequential = scan(&doc);
        assert_eq!(sequential.len(), 128);
        assert_eq!(sequential, scan_parallel(&doc));
        assert_eq!(sequential[0].decoded_text, "first payload of event 0");
        assert_eq!(sequential[1].decoded_text, "second payload of event 0");
        assert_eq!(sequential[127].decoded_text, "second payload of event 63");
    }
}

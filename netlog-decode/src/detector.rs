//! Syntactic detection of base64-looking field values.
//!
//! This is deliberately a heuristic: short genuine payloads are missed and long identifiers that
//! happen to use only the base64 alphabet are picked up. The decoder copes with the latter.
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};

pub const MIN_CANDIDATE_LEN: usize = 20;

static BASE64_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9+/=]{20,}$").expect("hard-coded regular expression to be valid")
});

/// A field whose value looks like it could be a base64 payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate<'a> {
    pub field: &'a str,
    pub raw: &'a str,
}

pub fn looks_like_base64(value: &str) -> bool {
    BASE64_REGEX.is_match(value)
}

/// Candidates in the field mapping's own iteration order.
pub fn detect(fields: &Map<String, Value>) -> Vec<Candidate<'_>> {
    fields
        .iter()
        .filter_map(|(field, value)| match value {
            Value::String(raw) if looks_like_base64(raw) => Some(Candidate { field, raw }),
            _ => None,
        })
        .collect()
}

use serde_json::Value;
use thiserror::Error;

/// Fatal problems with the input container. Anything below the container level is absorbed
/// by the decoder and never surfaces here.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("failed to read log file")]
    Io(#[from] std::io::Error),
    #[error("log is not valid JSON")]
    InvalidDocument(#[from] serde_json::Error),

    #[error("invalid log format: missing 'events' key")]
    MissingEvents,
    #[error("invalid log format: 'events' is not a list")]
    EventsNotSequence,
}

/// One decoded payload, tied back to the event it was found in.
#[derive(Clone, Debug, PartialEq)]
pub struct OutputRecord {
    pub time: Option<Value>,
    pub source_id: Option<Value>,
    pub field: String,
    pub decoded_text: String,
    pub pretty_json: Option<String>,
}

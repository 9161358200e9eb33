//! Layered decoding of a single candidate: base64, then decompression (zlib, gzip or none),
//! then lossy UTF-8, then an optional JSON pretty-print.
//!
//! Every stage reports its own outcome and the next stage only looks at that outcome, so the
//! public [`decode`] always produces a [`DecodeResult`].
use std::fmt;
use std::io::Read;

use base64::alphabet;
use base64::engine::{GeneralPurpose, GeneralPurposeConfig};
use base64::Engine;
use flate2::read::{GzDecoder, ZlibDecoder};
use metrics::counter;
use serde_json::Value;

pub const DECODE_ERROR_MARKER: &str = "[Decode error:";
pub const EMPTY_PAYLOAD_MARKER: &str = "[Empty payload]";

// Padding must be right, but stray low bits in the last symbol are tolerated.
const LENIENT_STANDARD: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_allow_trailing_bits(true),
);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeResult {
    pub decoded_text: String,
    pub pretty_json: Option<String>,
}

impl DecodeResult {
    fn failed(reason: impl fmt::Display) -> Self {
        DecodeResult {
            decoded_text: format!("{DECODE_ERROR_MARKER} {reason}]"),
            pretty_json: None,
        }
    }

    pub fn is_error(&self) -> bool {
        self.decoded_text.starts_with(DECODE_ERROR_MARKER)
    }
}

/// Which decompression strategy produced the payload bytes. `Raw` covers both "never
/// compressed" and "compressed in a framing we do not recognise".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Framing {
    Zlib,
    Gzip,
    Raw,
}

impl Framing {
    pub fn as_str(&self) -> &'static str {
        match self {
            Framing::Zlib => "zlib",
            Framing::Gzip => "gzip",
            Framing::Raw => "raw",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inflated {
    pub framing: Framing,
    pub bytes: Vec<u8>,
}

pub fn decode(candidate: &str) -> DecodeResult {
    let raw = match decode_base64(candidate) {
        Ok(raw) => raw,
        Err(e) => {
            tracing::debug!(len = candidate.len(), "base64 decoding failed: {}", e);
            counter!("netlog_decode_errors_total").increment(1);
            return DecodeResult::failed(e);
        }
    };

    let inflated = decompress(raw);
    counter!("netlog_decode_candidates_total", "framing" => inflated.framing.as_str()).increment(1);

    let mut decoded_text = decode_text(&inflated.bytes);
    if decoded_text.is_empty() {
        decoded_text = EMPTY_PAYLOAD_MARKER.to_string();
    }

    let pretty_json = pretty_json(&decoded_text);
    if pretty_json.is_some() {
        counter!("netlog_decode_json_payloads_total").increment(1);
    }

    tracing::debug!(
        framing = inflated.framing.as_str(),
        len = inflated.bytes.len(),
        json = pretty_json.is_some(),
        "decoded candidate"
    );

    DecodeResult {
        decoded_text,
        pretty_json,
    }
}

pub fn decode_base64(candidate: &str) -> Result<Vec<u8>, base64::DecodeError> {
    LENIENT_STANDARD.decode(normalize_padding(candidate))
}

/// Rewrites `=` the way forgiving decoders read it: a pad that completes a 4-symbol group
/// ends the payload, anything after it is ignored, and pads that cannot complete a group are
/// dropped. Other symbols pass through untouched so the engine still rejects them.
fn normalize_padding(candidate: &str) -> String {
    let mut out = String::with_capacity(candidate.len());
    let mut quad_pos = 0;
    let mut pads = 0;
    for ch in candidate.chars() {
        if ch == '=' {
            if quad_pos >= 2 {
                pads += 1;
                if quad_pos + pads >= 4 {
                    out.extend(std::iter::repeat('=').take(4 - quad_pos));
                    return out;
                }
            }
            continue;
        }
        pads = 0;
        quad_pos = (quad_pos + 1) % 4;
        out.push(ch);
    }
    out
}

pub fn inflate_zlib(raw: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut decoder = ZlibDecoder::new(raw);
    let mut out = Vec::new();
    decoder.read_to_end(&mut out)?;
    Ok(out)
}

pub fn inflate_gzip(raw: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut decoder = GzDecoder::new(raw);
    let mut out = Vec::new();
    decoder.read_to_end(&mut out)?;
    Ok(out)
}

/// Zlib first, then gzip, then the bytes as they are. Failures here are silent by design of
/// the format: most payloads are simply not compressed.
pub fn decompress(raw: Vec<u8>) -> Inflated {
    if let Ok(bytes) = inflate_zlib(&raw) {
        return Inflated {
            framing: Framing::Zlib,
            bytes,
        };
    }
    if let Ok(bytes) = inflate_gzip(&raw) {
        return Inflated {
            framing: Framing::Gzip,
            bytes,
        };
    }
    Inflated {
        framing: Framing::Raw,
        bytes: raw,
    }
}

/// Invalid UTF-8 sequences become U+FFFD instead of failing.
pub fn decode_text(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

/// `None` means "not JSON", which is the common case and not an error.
pub fn pretty_json(text: &str) -> Option<String> {
    let value: Value = serde_json::from_str(text).ok()?;
    serde_json::to_string_pretty(&value).ok()
}

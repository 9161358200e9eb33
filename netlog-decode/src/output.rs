use std::io;

use serde_json::Value;

use crate::api::OutputRecord;

const RULE_WIDTH: usize = 80;
pub const CSV_HEADER: [&str; 4] = ["time", "source_id", "field", "decoded_text"];

/// Human-oriented rendering of a scalar: strings lose their quotes, everything else is JSON.
fn display_value(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => "null".to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

fn cell_value(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(_) => display_value(value),
    }
}

pub fn render_record(out: &mut String, record: &OutputRecord) {
    out.push_str("[+] Base64 Payload Found\n");
    out.push_str(&format!("Time: {}\n", display_value(record.time.as_ref())));
    out.push_str(&format!(
        "Source ID: {}\n",
        display_value(record.source_id.as_ref())
    ));
    out.push_str(&format!("Field: {}\n", record.field));
    out.push_str("Decoded:\n");
    out.push_str(&record.decoded_text);
    out.push('\n');
    if let Some(pretty) = &record.pretty_json {
        out.push_str("\n[JSON Detected]\n");
        out.push_str(pretty);
        out.push('\n');
    }
    out.push_str(&"=".repeat(RULE_WIDTH));
    out.push_str("\n\n");
}

pub fn render_report(records: &[OutputRecord]) -> String {
    let mut out = String::new();
    for record in records {
        render_record(&mut out, record);
    }
    out
}

/// Tabular export. The pretty JSON is left out; the raw decoded text already carries it.
pub fn write_csv<W: io::Write>(records: &[OutputRecord], writer: W) -> Result<(), csv::Error> {
    let mut csv_writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::CRLF)
        .from_writer(writer);
    csv_writer.write_record(CSV_HEADER)?;
    for record in records {
        csv_writer.write_record([
            cell_value(record.time.as_ref()),
            cell_value(record.source_id.as_ref()),
            record.field.clone(),
            record.decoded_text.clone(),
        ])?;
    }
    csv_writer.flush()?;
    Ok(())
}

// src/serialize.rs
//
// Canonical wire encoder.
//
// Records are consumed byte-for-byte by the offline joining pipeline, so the
// encoder assembles JSON by hand: field order is fixed, floats always carry
// exactly six digits after the decimal point, and opaque fragments are
// spliced verbatim. A general-purpose serializer would decide both for us.
//
// Action indices are zero-based everywhere else in the crate; the +1 shift
// onto the wire happens here and nowhere else.

use crate::buffer::DataBuffer;
use crate::events::{Fragment, Outcome};
use crate::ranking::RankingResponse;

/// Protocol generation tag emitted in every ranking record.
pub const RANKING_EVENT_VERSION: &str = "1";

/// Append an outcome record: `{"EventId":"<id>","v":<outcome>}`.
///
/// A numeric outcome is printed with fixed six-decimal formatting; a
/// fragment outcome is emitted verbatim, unquoted, as a raw sub-document.
pub fn serialize_outcome(buf: &mut DataBuffer, event_id: &str, outcome: &Outcome) {
    buf.push_str("{\"EventId\":");
    write_json_string(buf, event_id);
    buf.push_str(",\"v\":");
    match outcome {
        Outcome::Numeric(v) => write_fixed(buf, *v),
        Outcome::Fragment(f) => buf.push_str(f.as_str()),
    }
    buf.push_char('}');
}

/// Append a ranking record:
/// `{"Version":"1","EventId":...,"a":[...],"c":<context>,"p":[...],"VWState":{"m":...}}`
/// with a trailing `"pdrop"` marker when `retention_probability < 1`.
///
/// `retention_probability` is the event's current cumulative retention
/// state; pass 1.0 for a record thinning never touched.
pub fn serialize_ranking(
    buf: &mut DataBuffer,
    event_id: &str,
    context: &Fragment,
    response: &RankingResponse,
    retention_probability: f64,
) {
    buf.push_str("{\"Version\":\"");
    buf.push_str(RANKING_EVENT_VERSION);
    buf.push_str("\",\"EventId\":");
    write_json_string(buf, event_id);

    buf.push_str(",\"a\":[");
    for (i, pair) in response.iter().enumerate() {
        if i > 0 {
            buf.push_char(',');
        }
        // one-based at the wire boundary
        buf.push_str(&(pair.action_id + 1).to_string());
    }
    buf.push_str("],\"c\":");
    buf.push_str(context.as_str());

    buf.push_str(",\"p\":[");
    for (i, pair) in response.iter().enumerate() {
        if i > 0 {
            buf.push_char(',');
        }
        write_fixed(buf, pair.probability);
    }
    buf.push_str("],\"VWState\":{\"m\":");
    write_json_string(buf, response.model_id());
    buf.push_char('}');

    if retention_probability < 1.0 {
        buf.push_str(",\"pdrop\":");
        write_fixed(buf, 1.0 - retention_probability);
    }
    buf.push_char('}');
}

/// Fixed six-decimal float formatting: `1.0` → `1.000000`. Never scientific
/// notation, never trimmed trailing zeros.
fn write_fixed(buf: &mut DataBuffer, value: f64) {
    buf.push_str(&format!("{value:.6}"));
}

/// Append `text` as a quoted, escaped JSON string.
///
/// Only ids and model names pass through here; opaque fragments never do.
fn write_json_string(buf: &mut DataBuffer, text: &str) {
    buf.push_char('"');
    for ch in text.chars() {
        match ch {
            '"' => buf.push_str("\\\""),
            '\\' => buf.push_str("\\\\"),
            '\n' => buf.push_str("\\n"),
            '\r' => buf.push_str("\\r"),
            '\t' => buf.push_str("\\t"),
            c if (c as u32) < 0x20 => {
                buf.push_str(&format!("\\u{:04x}", c as u32));
            }
            c => buf.push_char(c),
        }
    }
    buf.push_char('"');
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed(value: f64) -> String {
        let mut buf = DataBuffer::new();
        write_fixed(&mut buf, value);
        buf.into_string()
    }

    #[test]
    fn test_fixed_formatting() {
        assert_eq!(fixed(1.0), "1.000000");
        assert_eq!(fixed(0.8), "0.800000");
        assert_eq!(fixed(0.25), "0.250000");
        assert_eq!(fixed(0.0), "0.000000");
        // no scientific notation for small magnitudes
        assert_eq!(fixed(0.0000001), "0.000000");
    }

    #[test]
    fn test_json_string_escaping() {
        let mut buf = DataBuffer::new();
        write_json_string(&mut buf, "a\"b\\c\nd");
        assert_eq!(buf.as_str(), r#""a\"b\\c\nd""#);

        let mut buf = DataBuffer::new();
        write_json_string(&mut buf, "\u{1}");
        assert_eq!(buf.as_str(), "\"\\u0001\"");
    }

    #[test]
    fn test_empty_string() {
        let mut buf = DataBuffer::new();
        write_json_string(&mut buf, "");
        assert_eq!(buf.as_str(), "\"\"");
    }
}

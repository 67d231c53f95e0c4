//! JSON codec
//!
//! ## Layout
//!
//! ```text
//! node            {"$id": 3, "$type": "0|app::Player", "hp": 10, ...}
//! later same type {"$id": 4, "$type": 0, ...}
//! regular array   "$rlength": 2, "$rcontent": [ ... ]
//! primitive array "$plength": 3, "$pcontent": [1, 2, 3]
//! references      "$iref:3"  "$eref:0"  "$guidref:<guid>"  "$strref:<id>"
//! ```
//!
//! Numbers, booleans and `null` are bare literals; floats use `NaN`,
//! `Infinity` and `-Infinity` for non-finite values. Strings, chars and GUIDs
//! are quoted. Control and non-ASCII characters are written as `\uXXXX`
//! (UTF-16 units, so astral chars become surrogate pairs).
//!
//! A string value starting with `$` has that character written as
//! `\u0024`. Only a literal `$` opens a reference, so user text never reads
//! back as one.

mod reader;
mod text_reader;
mod writer;

pub use reader::JsonDataReader;
pub use text_reader::{JsonTextReader, JsonToken};
pub use writer::JsonDataWriter;

pub(crate) const KEY_ID: &str = "$id";
pub(crate) const KEY_TYPE: &str = "$type";
pub(crate) const KEY_ARRAY_LENGTH: &str = "$rlength";
pub(crate) const KEY_ARRAY_CONTENT: &str = "$rcontent";
pub(crate) const KEY_PRIMITIVE_LENGTH: &str = "$plength";
pub(crate) const KEY_PRIMITIVE_CONTENT: &str = "$pcontent";

pub(crate) const PREFIX_INTERNAL: &str = "$iref:";
pub(crate) const PREFIX_EXTERNAL_INDEX: &str = "$eref:";
pub(crate) const PREFIX_EXTERNAL_GUID: &str = "$guidref:";
pub(crate) const PREFIX_EXTERNAL_STRING: &str = "$strref:";

/// Append `value` as a quoted, escaped JSON string.
pub(crate) fn push_quoted(out: &mut String, value: &str) {
    out.push('"');
    push_escaped(out, value);
    out.push('"');
}

/// Append a string value. A leading `$` is escaped so the reader can tell
/// it apart from a reference prefix.
pub(crate) fn push_quoted_text(out: &mut String, value: &str) {
    match value.strip_prefix('$') {
        Some(rest) => {
            out.push_str("\"\\u0024");
            push_escaped(out, rest);
            out.push('"');
        }
        None => push_quoted(out, value),
    }
}

fn push_escaped(out: &mut String, value: &str) {
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{8}' => out.push_str("\\b"),
            '\u{c}' => out.push_str("\\f"),
            c if (c as u32) < 0x20 || (c as u32) > 0x7E => {
                let mut units = [0u16; 2];
                for unit in c.encode_utf16(&mut units) {
                    out.push_str(&format!("\\u{:04x}", unit));
                }
            }
            c => out.push(c),
        }
    }
}

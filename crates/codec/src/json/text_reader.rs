//! JSON tokenizer

use super::{PREFIX_EXTERNAL_GUID, PREFIX_EXTERNAL_INDEX, PREFIX_EXTERNAL_STRING, PREFIX_INTERNAL};
use crate::staging::StagingReader;
use graphstream_core::{EntryType, Result};
use std::io::Read;

/// One entry of JSON text: an optional `"name":` prefix plus its value.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct JsonToken {
    /// Key preceding the value
    pub name: Option<String>,

    /// Value text: unescaped string contents (without a reference
    /// prefix), a literal, or the bracket itself
    pub content: String,

    /// Logical entry kind
    pub entry: EntryType,
}

impl JsonToken {
    fn bracket(name: Option<String>, bracket: char, entry: EntryType) -> Self {
        JsonToken {
            name,
            content: bracket.to_string(),
            entry,
        }
    }
}

/// Splits JSON text into [`JsonToken`]s.
///
/// Commas, colons and whitespace between entries are skipped, so the
/// tokenizer accepts the writer's packed and readable output alike, as well
/// as concatenated documents.
pub struct JsonTextReader<R: Read> {
    input: StagingReader<R>,
}

impl<R: Read> JsonTextReader<R> {
    /// Tokenize `stream` through a staging buffer of `capacity` bytes.
    pub fn new(stream: R, capacity: usize) -> Self {
        JsonTextReader {
            input: StagingReader::new(stream, capacity),
        }
    }

    /// Bytes consumed so far.
    pub fn position(&self) -> u64 {
        self.input.position()
    }

    /// The underlying stream.
    pub fn get_mut(&mut self) -> &mut R {
        self.input.get_mut()
    }

    /// Return the stream. Bytes read ahead are lost.
    pub fn into_inner(self) -> R {
        self.input.into_inner()
    }

    /// Read the next token; `EndOfStream` once the text is exhausted.
    pub fn read_token(&mut self) -> Result<JsonToken> {
        self.skip_separators()?;
        let Some(first) = self.input.peek_u8()? else {
            return Ok(JsonToken {
                entry: EntryType::EndOfStream,
                ..JsonToken::default()
            });
        };
        if first == b'"' {
            self.input.take_u8()?;
            let Some(quoted) = self.read_quoted()? else {
                return Ok(end_of_stream(None));
            };
            self.skip_whitespace()?;
            if self.input.peek_u8()? == Some(b':') {
                self.input.take_u8()?;
                return self.read_value(Some(quoted.text));
            }
            return Ok(classify_string(None, quoted));
        }
        self.read_value(None)
    }

    fn read_value(&mut self, name: Option<String>) -> Result<JsonToken> {
        self.skip_whitespace()?;
        let Some(first) = self.input.peek_u8()? else {
            return Ok(end_of_stream(name));
        };
        let token = match first {
            b'{' => JsonToken::bracket(name, '{', EntryType::StartOfNode),
            b'}' => JsonToken::bracket(name, '}', EntryType::EndOfNode),
            b'[' => JsonToken::bracket(name, '[', EntryType::StartOfArray),
            b']' => JsonToken::bracket(name, ']', EntryType::EndOfArray),
            b'"' => {
                self.input.take_u8()?;
                return Ok(match self.read_quoted()? {
                    Some(quoted) => classify_string(name, quoted),
                    None => end_of_stream(name),
                });
            }
            _ => return self.read_literal(name),
        };
        self.input.take_u8()?;
        Ok(token)
    }

    fn read_literal(&mut self, name: Option<String>) -> Result<JsonToken> {
        let mut bytes = Vec::new();
        while let Some(b) = self.input.peek_u8()? {
            if matches!(b, b',' | b':' | b'}' | b']' | b'{' | b'[' | b'"') || b.is_ascii_whitespace() {
                break;
            }
            bytes.push(b);
            self.input.take_u8()?;
        }
        if bytes.is_empty() {
            // a separator after a name, e.g. `"a":,`
            return Ok(JsonToken {
                name,
                entry: EntryType::Invalid,
                ..JsonToken::default()
            });
        }
        let content = String::from_utf8_lossy(&bytes).into_owned();
        let entry = classify_literal(&content);
        Ok(JsonToken {
            name,
            content,
            entry,
        })
    }

    /// Read up to the closing quote. `None` if the text ends first.
    fn read_quoted(&mut self) -> Result<Option<Quoted>> {
        let mut bytes = Vec::new();
        let mut pending_high: Option<u16> = None;
        let mut escaped_first = false;
        loop {
            let Some(b) = self.input.take_u8()? else {
                return Ok(None);
            };
            match b {
                b'"' => break,
                b'\\' => {
                    let Some(escape) = self.input.take_u8()? else {
                        return Ok(None);
                    };
                    escaped_first |= bytes.is_empty();
                    let c = match escape {
                        b'n' => '\n',
                        b'r' => '\r',
                        b't' => '\t',
                        b'b' => '\u{8}',
                        b'f' => '\u{c}',
                        b'u' => {
                            let Some(unit) = self.read_hex_unit()? else {
                                return Ok(None);
                            };
                            match (pending_high.take(), unit) {
                                (None, 0xD800..=0xDBFF) => {
                                    pending_high = Some(unit);
                                    continue;
                                }
                                (Some(high), 0xDC00..=0xDFFF) => {
                                    let scalar = 0x10000
                                        + (((high as u32) - 0xD800) << 10)
                                        + ((unit as u32) - 0xDC00);
                                    char::from_u32(scalar).unwrap_or(char::REPLACEMENT_CHARACTER)
                                }
                                _ => {
                                    char::from_u32(unit as u32).unwrap_or(char::REPLACEMENT_CHARACTER)
                                }
                            }
                        }
                        other => other as char,
                    };
                    let mut buf = [0u8; 4];
                    bytes.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
                }
                b => bytes.push(b),
            }
        }
        Ok(Some(Quoted {
            text: String::from_utf8_lossy(&bytes).into_owned(),
            escaped_first,
        }))
    }

    fn read_hex_unit(&mut self) -> Result<Option<u16>> {
        let Some(digits) = self.input.take_array::<4>()? else {
            return Ok(None);
        };
        let text = String::from_utf8_lossy(&digits);
        Ok(Some(u16::from_str_radix(&text, 16).unwrap_or(0xFFFD)))
    }

    fn skip_whitespace(&mut self) -> Result<()> {
        while let Some(b) = self.input.peek_u8()? {
            if !b.is_ascii_whitespace() {
                break;
            }
            self.input.take_u8()?;
        }
        Ok(())
    }

    fn skip_separators(&mut self) -> Result<()> {
        while let Some(b) = self.input.peek_u8()? {
            if !(b.is_ascii_whitespace() || b == b',' || b == b':') {
                break;
            }
            self.input.take_u8()?;
        }
        Ok(())
    }
}

/// Unescaped contents of a quoted string.
struct Quoted {
    text: String,
    /// The first character came from an escape sequence
    escaped_first: bool,
}

fn end_of_stream(name: Option<String>) -> JsonToken {
    JsonToken {
        name,
        entry: EntryType::EndOfStream,
        ..JsonToken::default()
    }
}

/// Reference prefixes only count when their `$` was written literally.
fn classify_string(name: Option<String>, quoted: Quoted) -> JsonToken {
    let Quoted { text, escaped_first } = quoted;
    if !escaped_first {
        let prefixes = [
            (PREFIX_INTERNAL, EntryType::InternalReference),
            (PREFIX_EXTERNAL_INDEX, EntryType::ExternalReferenceByIndex),
            (PREFIX_EXTERNAL_GUID, EntryType::ExternalReferenceByGuid),
            (PREFIX_EXTERNAL_STRING, EntryType::ExternalReferenceByString),
        ];
        for (prefix, entry) in prefixes {
            if let Some(rest) = text.strip_prefix(prefix) {
                return JsonToken {
                    name,
                    content: rest.to_string(),
                    entry,
                };
            }
        }
    }
    JsonToken {
        name,
        content: text,
        entry: EntryType::String,
    }
}

fn classify_literal(text: &str) -> EntryType {
    match text {
        "null" => EntryType::Null,
        "true" | "false" => EntryType::Boolean,
        "NaN" | "Infinity" | "-Infinity" => EntryType::FloatingPoint,
        _ => {
            let digits = text.strip_prefix('-').unwrap_or(text);
            if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
                EntryType::Integer
            } else if text.parse::<f64>().is_ok() {
                EntryType::FloatingPoint
            } else {
                EntryType::Invalid
            }
        }
    }
}

//! Textual scalar conversions shared by the JSON and node codecs.
//!
//! Text codecs carry every scalar as its textual form. These helpers turn
//! that text back into the requested type, logging an error and returning
//! `Ok(None)` when it does not parse or does not fit.

use graphstream_core::{
    parse_float, DebugContext, Decimal, EntryType, Guid, PrimitiveKind, Result,
};

/// Parse an integer and narrow it to `T`.
pub(crate) fn parse_integer<T: TryFrom<i128>>(
    debug: &DebugContext,
    text: &str,
    expected: &str,
) -> Result<Option<T>> {
    let Ok(wide) = text.trim().parse::<i128>() else {
        debug.log_error(format!("cannot parse '{}' as {}", text, expected))?;
        return Ok(None);
    };
    match T::try_from(wide) {
        Ok(value) => Ok(Some(value)),
        Err(_) => {
            debug.log_error(format!("integer {} is out of range for {}", wide, expected))?;
            Ok(None)
        }
    }
}

pub(crate) fn parse_f64(debug: &DebugContext, text: &str) -> Result<Option<f64>> {
    let value = parse_float(text, f64::NAN, f64::INFINITY, f64::NEG_INFINITY);
    if value.is_none() {
        debug.log_error(format!("cannot parse '{}' as f64", text))?;
    }
    Ok(value)
}

pub(crate) fn parse_f32(debug: &DebugContext, text: &str) -> Result<Option<f32>> {
    let value = parse_float(text, f32::NAN, f32::INFINITY, f32::NEG_INFINITY);
    if value.is_none() {
        debug.log_error(format!("cannot parse '{}' as f32", text))?;
    }
    Ok(value)
}

pub(crate) fn parse_decimal(debug: &DebugContext, text: &str) -> Result<Option<Decimal>> {
    let text = text.trim();
    match text.parse::<Decimal>() {
        Ok(value) => Ok(Some(value)),
        // exponent notation
        Err(e) => match text.parse::<f64>().ok().and_then(Decimal::from_f64) {
            Some(value) => Ok(Some(value)),
            None => {
                debug.log_error(format!("cannot parse '{}' as Decimal: {}", text, e))?;
                Ok(None)
            }
        },
    }
}

pub(crate) fn parse_bool(debug: &DebugContext, text: &str) -> Result<Option<bool>> {
    match text.trim() {
        "true" => Ok(Some(true)),
        "false" => Ok(Some(false)),
        _ => {
            debug.log_error(format!("cannot parse '{}' as bool", text))?;
            Ok(None)
        }
    }
}

pub(crate) fn parse_char(debug: &DebugContext, text: &str) -> Result<Option<char>> {
    let mut chars = text.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(Some(c)),
        _ => {
            debug.log_error(format!("string '{}' cannot be read as a char", text))?;
            Ok(None)
        }
    }
}

pub(crate) fn parse_guid(debug: &DebugContext, text: &str) -> Result<Option<Guid>> {
    match Guid::parse_str(text.trim()) {
        Ok(guid) => Ok(Some(guid)),
        Err(e) => {
            debug.log_error(format!("cannot parse '{}' as Guid: {}", text, e))?;
            Ok(None)
        }
    }
}

/// Logical entry kind of a primitive array element written as text.
pub(crate) fn element_entry_type(kind: PrimitiveKind) -> EntryType {
    match kind {
        PrimitiveKind::Bool => EntryType::Boolean,
        PrimitiveKind::I8
        | PrimitiveKind::U8
        | PrimitiveKind::I16
        | PrimitiveKind::U16
        | PrimitiveKind::I32
        | PrimitiveKind::U32
        | PrimitiveKind::I64
        | PrimitiveKind::U64 => EntryType::Integer,
        PrimitiveKind::F32 | PrimitiveKind::F64 | PrimitiveKind::Decimal => {
            EntryType::FloatingPoint
        }
        PrimitiveKind::Char => EntryType::String,
        PrimitiveKind::Guid => EntryType::Guid,
    }
}

//! Primitive array elements
//!
//! Only a fixed set of element types may travel as a primitive array: each
//! has a fixed little-endian wire width and a textual form. The protocol
//! traits are object safe, so typed slices cross them as [`PrimitiveSlice`]
//! and [`PrimitiveVecMut`]; codecs get back to the element type with a
//! [`SliceVisitor`] or [`VecVisitor`].
//!
//! ## Element widths
//!
//! | Element | Bytes | Raw copy |
//! |---------|-------|----------|
//! | bool, i8, u8 | 1 | i8, u8 |
//! | i16, u16 | 2 | yes |
//! | i32, u32, f32 | 4 | yes |
//! | char | 4 | no (u32 scalar value) |
//! | i64, u64, f64 | 8 | yes |
//! | Guid, Decimal | 16 | no |
//!
//! "Raw copy" elements have no invalid bit patterns, so on little-endian
//! hosts a whole slice may be copied to or from the wire in one piece.

use crate::decimal::Decimal;
use crate::Guid;

mod sealed {
    /// Restricts [`super::PrimitiveElement`] to the element types listed in
    /// this module; codecs reinterpret raw-copy slices as bytes.
    pub trait Sealed {}
}

/// Element type allowed in a primitive array.
///
/// Sealed: the set of element types is fixed.
pub trait PrimitiveElement: sealed::Sealed + Copy + Default + Send + Sync + 'static {
    /// Kind tag of the element type
    const KIND: PrimitiveKind;

    /// Wire width in bytes
    const BYTES: usize;

    /// Whether the in-memory layout on a little-endian host equals the
    /// wire layout and every bit pattern is a valid value.
    const RAW_COPY: bool;

    /// Encode into `out[..Self::BYTES]`, little-endian.
    ///
    /// Panics if `out` is shorter than `Self::BYTES`.
    fn write_le(self, out: &mut [u8]);

    /// Decode from `bytes[..Self::BYTES]`, little-endian.
    ///
    /// Panics if `bytes` is shorter than `Self::BYTES`.
    fn read_le(bytes: &[u8]) -> Self;

    /// Append the textual form used by text codecs.
    fn write_text(self, out: &mut String);

    /// Parse the textual form.
    fn parse_text(text: &str) -> Option<Self>;

    /// Erase a typed slice.
    fn slice(values: &[Self]) -> PrimitiveSlice<'_>;

    /// Erase a typed vector.
    fn vec_mut(values: &mut Vec<Self>) -> PrimitiveVecMut<'_>;
}

/// Generic operation over a typed primitive slice.
pub trait SliceVisitor {
    /// Result of the visit
    type Output;

    /// Visit the slice with its element type restored.
    fn visit<T: PrimitiveElement>(self, values: &[T]) -> Self::Output;
}

/// Generic operation over a typed primitive vector.
pub trait VecVisitor {
    /// Result of the visit
    type Output;

    /// Visit the vector with its element type restored.
    fn visit<T: PrimitiveElement>(self, values: &mut Vec<T>) -> Self::Output;
}

macro_rules! primitive_kinds {
    ($($variant:ident => $ty:ty),* $(,)?) => {
        /// Element type of a primitive array.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum PrimitiveKind {
            $(
                #[allow(missing_docs)]
                $variant,
            )*
        }

        impl PrimitiveKind {
            /// Wire width of one element in bytes.
            pub fn bytes_per_element(self) -> usize {
                match self {
                    $(PrimitiveKind::$variant => <$ty as PrimitiveElement>::BYTES,)*
                }
            }

            /// Rust name of the element type.
            pub fn type_name(self) -> &'static str {
                match self {
                    $(PrimitiveKind::$variant => std::any::type_name::<$ty>(),)*
                }
            }
        }

        /// Borrowed primitive array with its element type erased.
        #[derive(Debug, Clone, Copy)]
        pub enum PrimitiveSlice<'a> {
            $(
                #[allow(missing_docs)]
                $variant(&'a [$ty]),
            )*
        }

        impl<'a> PrimitiveSlice<'a> {
            /// Element type.
            pub fn kind(&self) -> PrimitiveKind {
                match self {
                    $(PrimitiveSlice::$variant(_) => PrimitiveKind::$variant,)*
                }
            }

            /// Number of elements.
            pub fn len(&self) -> usize {
                match self {
                    $(PrimitiveSlice::$variant(v) => v.len(),)*
                }
            }

            /// Whether the slice has no elements.
            pub fn is_empty(&self) -> bool {
                self.len() == 0
            }

            /// Run `visitor` on the typed slice.
            pub fn visit<V: SliceVisitor>(self, visitor: V) -> V::Output {
                match self {
                    $(PrimitiveSlice::$variant(v) => visitor.visit(v),)*
                }
            }
        }

        /// Mutable primitive vector with its element type erased.
        #[derive(Debug)]
        pub enum PrimitiveVecMut<'a> {
            $(
                #[allow(missing_docs)]
                $variant(&'a mut Vec<$ty>),
            )*
        }

        impl<'a> PrimitiveVecMut<'a> {
            /// Element type.
            pub fn kind(&self) -> PrimitiveKind {
                match self {
                    $(PrimitiveVecMut::$variant(_) => PrimitiveKind::$variant,)*
                }
            }

            /// Run `visitor` on the typed vector.
            pub fn visit<V: VecVisitor>(self, visitor: V) -> V::Output {
                match self {
                    $(PrimitiveVecMut::$variant(v) => visitor.visit(v),)*
                }
            }
        }

        $(
            impl sealed::Sealed for $ty {}

            impl PrimitiveElementErase for $ty {
                fn erase_slice(values: &[Self]) -> PrimitiveSlice<'_> {
                    PrimitiveSlice::$variant(values)
                }

                fn erase_vec(values: &mut Vec<Self>) -> PrimitiveVecMut<'_> {
                    PrimitiveVecMut::$variant(values)
                }
            }
        )*
    };
}

primitive_kinds! {
    Bool => bool,
    I8 => i8,
    U8 => u8,
    I16 => i16,
    U16 => u16,
    I32 => i32,
    U32 => u32,
    I64 => i64,
    U64 => u64,
    F32 => f32,
    F64 => f64,
    Char => char,
    Guid => Guid,
    Decimal => Decimal,
}

trait PrimitiveElementErase: Sized {
    fn erase_slice(values: &[Self]) -> PrimitiveSlice<'_>;
    fn erase_vec(values: &mut Vec<Self>) -> PrimitiveVecMut<'_>;
}

macro_rules! integer_element {
    ($($ty:ty => $kind:ident),* $(,)?) => {
        $(
            impl PrimitiveElement for $ty {
                const KIND: PrimitiveKind = PrimitiveKind::$kind;
                const BYTES: usize = std::mem::size_of::<$ty>();
                const RAW_COPY: bool = true;

                fn write_le(self, out: &mut [u8]) {
                    out[..Self::BYTES].copy_from_slice(&self.to_le_bytes());
                }

                fn read_le(bytes: &[u8]) -> Self {
                    let mut raw = [0u8; std::mem::size_of::<$ty>()];
                    raw.copy_from_slice(&bytes[..Self::BYTES]);
                    <$ty>::from_le_bytes(raw)
                }

                fn write_text(self, out: &mut String) {
                    out.push_str(&self.to_string());
                }

                fn parse_text(text: &str) -> Option<Self> {
                    text.trim().parse().ok()
                }

                fn slice(values: &[Self]) -> PrimitiveSlice<'_> {
                    Self::erase_slice(values)
                }

                fn vec_mut(values: &mut Vec<Self>) -> PrimitiveVecMut<'_> {
                    Self::erase_vec(values)
                }
            }
        )*
    };
}

integer_element! {
    i8 => I8,
    u8 => U8,
    i16 => I16,
    u16 => U16,
    i32 => I32,
    u32 => U32,
    i64 => I64,
    u64 => U64,
}

/// Textual form of a float: shortest round-trip digits, `NaN`,
/// `Infinity` or `-Infinity`.
pub fn format_float(value: f64, display: impl std::fmt::Display, out: &mut String) {
    if value.is_nan() {
        out.push_str("NaN");
    } else if value == f64::INFINITY {
        out.push_str("Infinity");
    } else if value == f64::NEG_INFINITY {
        out.push_str("-Infinity");
    } else {
        out.push_str(&display.to_string());
    }
}

/// Parse the textual form written by [`format_float`].
pub fn parse_float<F: std::str::FromStr>(text: &str, nan: F, inf: F, neg_inf: F) -> Option<F> {
    match text.trim() {
        "NaN" => Some(nan),
        "Infinity" => Some(inf),
        "-Infinity" => Some(neg_inf),
        other => other.parse().ok(),
    }
}

macro_rules! float_element {
    ($($ty:ty => $kind:ident),* $(,)?) => {
        $(
            impl PrimitiveElement for $ty {
                const KIND: PrimitiveKind = PrimitiveKind::$kind;
                const BYTES: usize = std::mem::size_of::<$ty>();
                const RAW_COPY: bool = true;

                fn write_le(self, out: &mut [u8]) {
                    out[..Self::BYTES].copy_from_slice(&self.to_le_bytes());
                }

                fn read_le(bytes: &[u8]) -> Self {
                    let mut raw = [0u8; std::mem::size_of::<$ty>()];
                    raw.copy_from_slice(&bytes[..Self::BYTES]);
                    <$ty>::from_le_bytes(raw)
                }

                fn write_text(self, out: &mut String) {
                    format_float(self as f64, self, out);
                }

                fn parse_text(text: &str) -> Option<Self> {
                    parse_float(text, <$ty>::NAN, <$ty>::INFINITY, <$ty>::NEG_INFINITY)
                }

                fn slice(values: &[Self]) -> PrimitiveSlice<'_> {
                    Self::erase_slice(values)
                }

                fn vec_mut(values: &mut Vec<Self>) -> PrimitiveVecMut<'_> {
                    Self::erase_vec(values)
                }
            }
        )*
    };
}

float_element! {
    f32 => F32,
    f64 => F64,
}

impl PrimitiveElement for bool {
    const KIND: PrimitiveKind = PrimitiveKind::Bool;
    const BYTES: usize = 1;
    const RAW_COPY: bool = false;

    fn write_le(self, out: &mut [u8]) {
        out[0] = self as u8;
    }

    fn read_le(bytes: &[u8]) -> Self {
        bytes[0] != 0
    }

    fn write_text(self, out: &mut String) {
        out.push_str(if self { "true" } else { "false" });
    }

    fn parse_text(text: &str) -> Option<Self> {
        text.trim().parse().ok()
    }

    fn slice(values: &[Self]) -> PrimitiveSlice<'_> {
        Self::erase_slice(values)
    }

    fn vec_mut(values: &mut Vec<Self>) -> PrimitiveVecMut<'_> {
        Self::erase_vec(values)
    }
}

impl PrimitiveElement for char {
    const KIND: PrimitiveKind = PrimitiveKind::Char;
    const BYTES: usize = 4;
    const RAW_COPY: bool = false;

    fn write_le(self, out: &mut [u8]) {
        out[..4].copy_from_slice(&(self as u32).to_le_bytes());
    }

    fn read_le(bytes: &[u8]) -> Self {
        let mut raw = [0u8; 4];
        raw.copy_from_slice(&bytes[..4]);
        char::from_u32(u32::from_le_bytes(raw)).unwrap_or(char::REPLACEMENT_CHARACTER)
    }

    fn write_text(self, out: &mut String) {
        out.push(self);
    }

    fn parse_text(text: &str) -> Option<Self> {
        let mut chars = text.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Some(c),
            _ => None,
        }
    }

    fn slice(values: &[Self]) -> PrimitiveSlice<'_> {
        Self::erase_slice(values)
    }

    fn vec_mut(values: &mut Vec<Self>) -> PrimitiveVecMut<'_> {
        Self::erase_vec(values)
    }
}

impl PrimitiveElement for Guid {
    const KIND: PrimitiveKind = PrimitiveKind::Guid;
    const BYTES: usize = 16;
    const RAW_COPY: bool = false;

    fn write_le(self, out: &mut [u8]) {
        out[..16].copy_from_slice(self.as_bytes());
    }

    fn read_le(bytes: &[u8]) -> Self {
        let mut raw = [0u8; 16];
        raw.copy_from_slice(&bytes[..16]);
        Guid::from_bytes(raw)
    }

    fn write_text(self, out: &mut String) {
        out.push_str(&self.hyphenated().to_string());
    }

    fn parse_text(text: &str) -> Option<Self> {
        Guid::parse_str(text.trim()).ok()
    }

    fn slice(values: &[Self]) -> PrimitiveSlice<'_> {
        Self::erase_slice(values)
    }

    fn vec_mut(values: &mut Vec<Self>) -> PrimitiveVecMut<'_> {
        Self::erase_vec(values)
    }
}

impl PrimitiveElement for Decimal {
    const KIND: PrimitiveKind = PrimitiveKind::Decimal;
    const BYTES: usize = 16;
    const RAW_COPY: bool = false;

    fn write_le(self, out: &mut [u8]) {
        for (i, word) in self.to_words().iter().enumerate() {
            out[i * 4..i * 4 + 4].copy_from_slice(&word.to_le_bytes());
        }
    }

    fn read_le(bytes: &[u8]) -> Self {
        let mut words = [0u32; 4];
        for (i, word) in words.iter_mut().enumerate() {
            let mut raw = [0u8; 4];
            raw.copy_from_slice(&bytes[i * 4..i * 4 + 4]);
            *word = u32::from_le_bytes(raw);
        }
        Decimal::from_words(words)
    }

    fn write_text(self, out: &mut String) {
        out.push_str(&self.to_string());
    }

    fn parse_text(text: &str) -> Option<Self> {
        text.parse().ok()
    }

    fn slice(values: &[Self]) -> PrimitiveSlice<'_> {
        Self::erase_slice(values)
    }

    fn vec_mut(values: &mut Vec<Self>) -> PrimitiveVecMut<'_> {
        Self::erase_vec(values)
    }
}

impl PrimitiveKind {
    /// Whether text codecs quote the element's textual form.
    pub fn is_quoted(self) -> bool {
        matches!(self, PrimitiveKind::Char | PrimitiveKind::Guid)
    }
}

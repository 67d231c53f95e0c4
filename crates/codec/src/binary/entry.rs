//! Binary wire tags

use graphstream_core::EntryType;

/// One-byte tag preceding every binary entry.
///
/// Most entries come as a named/unnamed pair; a named entry is followed by
/// its name string before the payload.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum BinaryEntryType {
    Invalid = 0x00,
    NamedStartOfReferenceNode = 0x01,
    UnnamedStartOfReferenceNode = 0x02,
    NamedStartOfStructNode = 0x03,
    UnnamedStartOfStructNode = 0x04,
    EndOfNode = 0x05,
    StartOfArray = 0x06,
    EndOfArray = 0x07,
    PrimitiveArray = 0x08,
    NamedInternalReference = 0x09,
    UnnamedInternalReference = 0x0A,
    NamedExternalReferenceByIndex = 0x0B,
    UnnamedExternalReferenceByIndex = 0x0C,
    NamedExternalReferenceByGuid = 0x0D,
    UnnamedExternalReferenceByGuid = 0x0E,
    NamedSByte = 0x0F,
    UnnamedSByte = 0x10,
    NamedByte = 0x11,
    UnnamedByte = 0x12,
    NamedShort = 0x13,
    UnnamedShort = 0x14,
    NamedUShort = 0x15,
    UnnamedUShort = 0x16,
    NamedInt = 0x17,
    UnnamedInt = 0x18,
    NamedUInt = 0x19,
    UnnamedUInt = 0x1A,
    NamedLong = 0x1B,
    UnnamedLong = 0x1C,
    NamedULong = 0x1D,
    UnnamedULong = 0x1E,
    NamedFloat = 0x1F,
    UnnamedFloat = 0x20,
    NamedDouble = 0x21,
    UnnamedDouble = 0x22,
    NamedDecimal = 0x23,
    UnnamedDecimal = 0x24,
    NamedChar = 0x25,
    UnnamedChar = 0x26,
    NamedString = 0x27,
    UnnamedString = 0x28,
    NamedGuid = 0x29,
    UnnamedGuid = 0x2A,
    NamedBoolean = 0x2B,
    UnnamedBoolean = 0x2C,
    NamedNull = 0x2D,
    UnnamedNull = 0x2E,
    TypeName = 0x2F,
    TypeID = 0x30,
    EndOfStream = 0x31,
    NamedExternalReferenceByString = 0x32,
    UnnamedExternalReferenceByString = 0x33,
}

use BinaryEntryType as B;

impl BinaryEntryType {
    /// Decode a tag byte. `None` for undefined values.
    pub fn from_u8(tag: u8) -> Option<Self> {
        let entry = match tag {
            0x00 => B::Invalid,
            0x01 => B::NamedStartOfReferenceNode,
            0x02 => B::UnnamedStartOfReferenceNode,
            0x03 => B::NamedStartOfStructNode,
            0x04 => B::UnnamedStartOfStructNode,
            0x05 => B::EndOfNode,
            0x06 => B::StartOfArray,
            0x07 => B::EndOfArray,
            0x08 => B::PrimitiveArray,
            0x09 => B::NamedInternalReference,
            0x0A => B::UnnamedInternalReference,
            0x0B => B::NamedExternalReferenceByIndex,
            0x0C => B::UnnamedExternalReferenceByIndex,
            0x0D => B::NamedExternalReferenceByGuid,
            0x0E => B::UnnamedExternalReferenceByGuid,
            0x0F => B::NamedSByte,
            0x10 => B::UnnamedSByte,
            0x11 => B::NamedByte,
            0x12 => B::UnnamedByte,
            0x13 => B::NamedShort,
            0x14 => B::UnnamedShort,
            0x15 => B::NamedUShort,
            0x16 => B::UnnamedUShort,
            0x17 => B::NamedInt,
            0x18 => B::UnnamedInt,
            0x19 => B::NamedUInt,
            0x1A => B::UnnamedUInt,
            0x1B => B::NamedLong,
            0x1C => B::UnnamedLong,
            0x1D => B::NamedULong,
            0x1E => B::UnnamedULong,
            0x1F => B::NamedFloat,
            0x20 => B::UnnamedFloat,
            0x21 => B::NamedDouble,
            0x22 => B::UnnamedDouble,
            0x23 => B::NamedDecimal,
            0x24 => B::UnnamedDecimal,
            0x25 => B::NamedChar,
            0x26 => B::UnnamedChar,
            0x27 => B::NamedString,
            0x28 => B::UnnamedString,
            0x29 => B::NamedGuid,
            0x2A => B::UnnamedGuid,
            0x2B => B::NamedBoolean,
            0x2C => B::UnnamedBoolean,
            0x2D => B::NamedNull,
            0x2E => B::UnnamedNull,
            0x2F => B::TypeName,
            0x30 => B::TypeID,
            0x31 => B::EndOfStream,
            0x32 => B::NamedExternalReferenceByString,
            0x33 => B::UnnamedExternalReferenceByString,
            _ => return None,
        };
        Some(entry)
    }

    /// Whether a name string follows the tag.
    pub fn is_named(self) -> bool {
        matches!(
            self,
            B::NamedStartOfReferenceNode
                | B::NamedStartOfStructNode
                | B::NamedInternalReference
                | B::NamedExternalReferenceByIndex
                | B::NamedExternalReferenceByGuid
                | B::NamedExternalReferenceByString
                | B::NamedSByte
                | B::NamedByte
                | B::NamedShort
                | B::NamedUShort
                | B::NamedInt
                | B::NamedUInt
                | B::NamedLong
                | B::NamedULong
                | B::NamedFloat
                | B::NamedDouble
                | B::NamedDecimal
                | B::NamedChar
                | B::NamedString
                | B::NamedGuid
                | B::NamedBoolean
                | B::NamedNull
        )
    }

    /// Logical entry kind.
    ///
    /// Type entries only occur inside node headers; found anywhere else they
    /// are reported as `Invalid`.
    pub fn entry_type(self) -> EntryType {
        match self {
            B::NamedStartOfReferenceNode
            | B::UnnamedStartOfReferenceNode
            | B::NamedStartOfStructNode
            | B::UnnamedStartOfStructNode => EntryType::StartOfNode,
            B::EndOfNode => EntryType::EndOfNode,
            B::StartOfArray => EntryType::StartOfArray,
            B::EndOfArray => EntryType::EndOfArray,
            B::PrimitiveArray => EntryType::PrimitiveArray,
            B::NamedInternalReference | B::UnnamedInternalReference => {
                EntryType::InternalReference
            }
            B::NamedExternalReferenceByIndex | B::UnnamedExternalReferenceByIndex => {
                EntryType::ExternalReferenceByIndex
            }
            B::NamedExternalReferenceByGuid | B::UnnamedExternalReferenceByGuid => {
                EntryType::ExternalReferenceByGuid
            }
            B::NamedExternalReferenceByString | B::UnnamedExternalReferenceByString => {
                EntryType::ExternalReferenceByString
            }
            B::NamedSByte
            | B::UnnamedSByte
            | B::NamedByte
            | B::UnnamedByte
            | B::NamedShort
            | B::UnnamedShort
            | B::NamedUShort
            | B::UnnamedUShort
            | B::NamedInt
            | B::UnnamedInt
            | B::NamedUInt
            | B::UnnamedUInt
            | B::NamedLong
            | B::UnnamedLong
            | B::NamedULong
            | B::UnnamedULong => EntryType::Integer,
            B::NamedFloat
            | B::UnnamedFloat
            | B::NamedDouble
            | B::UnnamedDouble
            | B::NamedDecimal
            | B::UnnamedDecimal => EntryType::FloatingPoint,
            B::NamedChar | B::UnnamedChar | B::NamedString | B::UnnamedString => {
                EntryType::String
            }
            B::NamedGuid | B::UnnamedGuid => EntryType::Guid,
            B::NamedBoolean | B::UnnamedBoolean => EntryType::Boolean,
            B::NamedNull | B::UnnamedNull => EntryType::Null,
            B::EndOfStream => EntryType::EndOfStream,
            B::Invalid | B::TypeName | B::TypeID => EntryType::Invalid,
        }
    }

    /// Size of the fixed payload following tag and name, `None` for
    /// variable-length or structural entries.
    pub fn fixed_payload_size(self) -> Option<usize> {
        let size = match self {
            B::NamedSByte | B::UnnamedSByte | B::NamedByte | B::UnnamedByte => 1,
            B::NamedBoolean | B::UnnamedBoolean => 1,
            B::NamedShort | B::UnnamedShort | B::NamedUShort | B::UnnamedUShort => 2,
            B::NamedInt | B::UnnamedInt | B::NamedUInt | B::UnnamedUInt => 4,
            B::NamedFloat | B::UnnamedFloat | B::NamedChar | B::UnnamedChar => 4,
            B::NamedInternalReference | B::UnnamedInternalReference => 4,
            B::NamedExternalReferenceByIndex | B::UnnamedExternalReferenceByIndex => 4,
            B::TypeID => 4,
            B::NamedLong | B::UnnamedLong | B::NamedULong | B::UnnamedULong => 8,
            B::NamedDouble | B::UnnamedDouble => 8,
            B::NamedDecimal | B::UnnamedDecimal | B::NamedGuid | B::UnnamedGuid => 16,
            B::NamedExternalReferenceByGuid | B::UnnamedExternalReferenceByGuid => 16,
            B::NamedNull | B::UnnamedNull | B::EndOfNode | B::EndOfArray => 0,
            _ => return None,
        };
        Some(size)
    }

    /// Pick the named or unnamed variant of a pair.
    pub(crate) fn pick(name: Option<&str>, named: Self, unnamed: Self) -> Self {
        if name.is_some() {
            named
        } else {
            unnamed
        }
    }
}

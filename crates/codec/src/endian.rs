//! Byte order handling for primitive arrays
//!
//! The wire is always little-endian. On little-endian hosts, element types
//! whose memory layout equals their wire layout are copied in one piece;
//! everything else goes element by element through
//! [`PrimitiveElement::write_le`] / [`PrimitiveElement::read_le`].

use graphstream_core::PrimitiveElement;

/// Byte order assumed for the host when copying primitive arrays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostEndian {
    /// Bulk copies allowed for raw-layout elements
    Little,
    /// Every element is converted individually
    Big,
}

impl HostEndian {
    /// Byte order of the compilation target.
    pub fn native() -> Self {
        if cfg!(target_endian = "little") {
            HostEndian::Little
        } else {
            HostEndian::Big
        }
    }

    fn bulk_copy<T: PrimitiveElement>(self) -> bool {
        T::RAW_COPY && self == HostEndian::Little && cfg!(target_endian = "little")
    }
}

impl Default for HostEndian {
    fn default() -> Self {
        Self::native()
    }
}

/// Wire bytes of `values` when they can be used without conversion.
pub(crate) fn as_wire_bytes<T: PrimitiveElement>(values: &[T], host: HostEndian) -> Option<&[u8]> {
    if !host.bulk_copy::<T>() && !(T::RAW_COPY && T::BYTES == 1) {
        return None;
    }
    assert_eq!(std::mem::size_of::<T>(), T::BYTES);
    // SAFETY: raw-copy elements are plain integers or floats with no padding,
    // and on a little-endian host their memory bytes are the wire bytes.
    Some(unsafe {
        std::slice::from_raw_parts(values.as_ptr() as *const u8, values.len() * T::BYTES)
    })
}

/// Mutable wire view of `values` when they can be filled without conversion.
pub(crate) fn as_wire_bytes_mut<T: PrimitiveElement>(
    values: &mut [T],
    host: HostEndian,
) -> Option<&mut [u8]> {
    if !host.bulk_copy::<T>() && !(T::RAW_COPY && T::BYTES == 1) {
        return None;
    }
    assert_eq!(std::mem::size_of::<T>(), T::BYTES);
    // SAFETY: as above; every bit pattern is a valid raw-copy element.
    Some(unsafe {
        std::slice::from_raw_parts_mut(values.as_mut_ptr() as *mut u8, values.len() * T::BYTES)
    })
}

/// Encode `values` into `out[..values.len() * T::BYTES]`.
pub(crate) fn encode_slice<T: PrimitiveElement>(values: &[T], out: &mut [u8], host: HostEndian) {
    match as_wire_bytes(values, host) {
        Some(bytes) => out[..bytes.len()].copy_from_slice(bytes),
        None => {
            for (value, chunk) in values.iter().zip(out.chunks_exact_mut(T::BYTES)) {
                value.write_le(chunk);
            }
        }
    }
}

/// Decode `bytes` into `out`; `bytes` must hold `out.len() * T::BYTES` bytes.
pub(crate) fn decode_slice<T: PrimitiveElement>(bytes: &[u8], out: &mut [T], host: HostEndian) {
    match as_wire_bytes_mut(out, host) {
        Some(raw) => {
            let n = raw.len();
            raw.copy_from_slice(&bytes[..n]);
        }
        None => {
            for (value, chunk) in out.iter_mut().zip(bytes.chunks_exact(T::BYTES)) {
                *value = T::read_le(chunk);
            }
        }
    }
}

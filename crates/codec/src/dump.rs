//! Data dumps for diagnostics.

use graphstream_core::Result;
use std::fmt::Write as _;
use std::io::{Read, Seek, SeekFrom};

/// Classic 16-bytes-per-line hex dump with an ASCII column.
pub fn hex_dump(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 4 + 16);
    for (line, chunk) in bytes.chunks(16).enumerate() {
        let _ = write!(out, "{:08x}  ", line * 16);
        for i in 0..16 {
            match chunk.get(i) {
                Some(b) => {
                    let _ = write!(out, "{:02x} ", b);
                }
                None => out.push_str("   "),
            }
            if i == 7 {
                out.push(' ');
            }
        }
        out.push_str(" |");
        for &b in chunk {
            out.push(if b.is_ascii_graphic() || b == b' ' {
                b as char
            } else {
                '.'
            });
        }
        out.push_str("|\n");
    }
    out
}

/// Read a whole seekable stream and restore its position afterwards.
pub fn read_whole_stream<S: Read + Seek>(stream: &mut S) -> Result<Vec<u8>> {
    let position = stream.stream_position()?;
    stream.seek(SeekFrom::Start(0))?;
    let mut bytes = Vec::new();
    let read = stream.read_to_end(&mut bytes);
    stream.seek(SeekFrom::Start(position))?;
    read?;
    Ok(bytes)
}

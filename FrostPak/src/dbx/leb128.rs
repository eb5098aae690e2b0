//! Unsigned LEB128 varints used for DBX string indices and counts

use std::io::Read;

use byteorder::ReadBytesExt;

use crate::error::{Error, Result};

/// Read an unsigned LEB128 value.
///
/// Bits past the 64th are dropped rather than rejected.
pub(crate) fn read_leb128<R: Read>(reader: &mut R) -> Result<u64> {
    let mut result = 0u64;
    let mut shift = 0u32;
    loop {
        let byte = reader.read_u8().map_err(|_| Error::UnexpectedEof)?;
        if shift < 64 {
            result |= u64::from(byte & 0x7F) << shift;
        }
        shift += 7;
        if byte & 0x80 == 0 {
            return Ok(result);
        }
    }
}

/// Append an unsigned LEB128 value.
pub(crate) fn write_leb128(out: &mut Vec<u8>, mut value: u64) {
    loop {
        let byte = (value & 0x7F) as u8;
        value >>= 7;
        if value == 0 {
            out.push(byte);
            return;
        }
        out.push(byte | 0x80);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_encodings() {
        let mut out = Vec::new();
        write_leb128(&mut out, 0);
        write_leb128(&mut out, 127);
        write_leb128(&mut out, 128);
        write_leb128(&mut out, 300);
        assert_eq!(out, [0x00, 0x7F, 0x80, 0x01, 0xAC, 0x02]);

        let mut cursor = out.as_slice();
        assert_eq!(read_leb128(&mut cursor).unwrap(), 0);
        assert_eq!(read_leb128(&mut cursor).unwrap(), 127);
        assert_eq!(read_leb128(&mut cursor).unwrap(), 128);
        assert_eq!(read_leb128(&mut cursor).unwrap(), 300);
    }

    #[test]
    fn test_truncated_value() {
        let mut cursor: &[u8] = &[0x80];
        assert!(matches!(read_leb128(&mut cursor), Err(Error::UnexpectedEof)));
    }
}

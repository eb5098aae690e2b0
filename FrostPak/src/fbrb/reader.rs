//! FBRB archive reader
//!
//! The archive is a gzip-compressed header followed by the payload, which is
//! either one gzip stream over every file or the raw concatenated bytes.

use std::fs::File;
use std::io::{self, BufReader, Read, Seek, SeekFrom, Write};
use std::path::Path;

use byteorder::{BigEndian, ByteOrder, ReadBytesExt};
use flate2::read::{GzDecoder, MultiGzDecoder};

use super::staging::Staging;
use super::{ENTRY_SIZE, FbrbEntry, HEADER_VERSION, MAGIC};
use crate::error::{Error, Result};

/// Decompressed FBRB header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FbrbHeader {
    /// Header version (always 2 in shipped archives)
    pub version: u32,
    /// File table
    pub entries: Vec<FbrbEntry>,
    /// Whether the payload is a gzip stream
    pub zipped: bool,
    /// Uncompressed payload length
    pub payload_len: u32,
}

/// FBRB archive reader
pub struct FbrbReader<R: Read> {
    reader: BufReader<R>,
    header: FbrbHeader,
}

impl FbrbReader<File> {
    /// Open an archive from disk and read its header
    ///
    /// # Errors
    /// Returns an error if the file cannot be opened or the header is invalid.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::new(File::open(path)?)
    }
}

impl<R: Read> FbrbReader<R> {
    /// Read the magic and header from `reader`, leaving it positioned at the payload
    ///
    /// # Errors
    /// Returns [`Error::InvalidFbrbMagic`] for non-FBRB data, or an IO error
    /// if the header cannot be decompressed.
    pub fn new(reader: R) -> Result<Self> {
        let mut reader = BufReader::new(reader);

        let mut magic = [0u8; 4];
        reader.read_exact(&mut magic)?;
        if magic != MAGIC {
            return Err(Error::InvalidFbrbMagic(magic));
        }

        let header_len = reader.read_u32::<BigEndian>()?;
        let mut compressed = Vec::new();
        (&mut reader).take(u64::from(header_len)).read_to_end(&mut compressed)?;
        if compressed.len() < header_len as usize {
            return Err(Error::UnexpectedEof);
        }

        let mut data = Vec::new();
        GzDecoder::new(compressed.as_slice()).read_to_end(&mut data)?;
        let header = parse_header(&data)?;

        tracing::debug!(
            "FBRB header: {} entries, payload {} bytes, zipped: {}",
            header.entries.len(),
            header.payload_len,
            header.zipped
        );

        Ok(Self { reader, header })
    }

    /// The decompressed header
    pub fn header(&self) -> &FbrbHeader {
        &self.header
    }

    /// The file table
    pub fn entries(&self) -> &[FbrbEntry] {
        &self.header.entries
    }

    /// Decompress the payload into a seekable staging area
    ///
    /// # Errors
    /// Returns an error if the payload stream is corrupt or cannot be staged.
    pub fn stage_payload(self, temp_file: bool) -> Result<(FbrbHeader, FbrbPayload)> {
        let Self { mut reader, header } = self;
        let mut staging = Staging::new(temp_file)?;

        if header.payload_len > 0 {
            if header.zipped {
                io::copy(&mut MultiGzDecoder::new(reader), &mut staging)?;
            } else {
                io::copy(&mut reader, &mut staging)?;
            }
        }

        let len = staging.len()?;
        if len < u64::from(header.payload_len) {
            tracing::warn!(
                "Payload shorter than declared: {len} of {} bytes",
                header.payload_len
            );
        }

        Ok((header, FbrbPayload { staging, len }))
    }
}

/// Decompressed payload with random access to entries
pub struct FbrbPayload {
    staging: Staging,
    len: u64,
}

impl FbrbPayload {
    /// Length of the staged payload
    pub fn len(&self) -> u64 {
        self.len
    }

    /// Returns true if nothing was staged
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Copy an entry's bytes into `out`
    ///
    /// # Errors
    /// Returns [`Error::PayloadOutOfRange`] if the entry points past the payload.
    pub fn copy_entry<W: Write>(&mut self, entry: &FbrbEntry, out: &mut W) -> Result<u64> {
        let (offset, size) = self.entry_range(entry)?;
        self.staging.seek(SeekFrom::Start(offset))?;
        let copied = io::copy(&mut Read::by_ref(&mut self.staging).take(size), out)?;
        Ok(copied)
    }

    /// Read an entry's bytes into memory
    ///
    /// # Errors
    /// Returns [`Error::PayloadOutOfRange`] if the entry points past the payload.
    pub fn read_entry(&mut self, entry: &FbrbEntry) -> Result<Vec<u8>> {
        // The size comes from the archive; only trust it once it fits the payload
        let (_, size) = self.entry_range(entry)?;
        let mut data = Vec::with_capacity(size as usize);
        self.copy_entry(entry, &mut data)?;
        Ok(data)
    }

    fn entry_range(&self, entry: &FbrbEntry) -> Result<(u64, u64)> {
        let offset = u64::from(entry.payload_offset);
        let size = u64::from(entry.size);
        if offset + size > self.len {
            return Err(Error::PayloadOutOfRange {
                path: entry.name.clone(),
                offset,
                size,
            });
        }
        Ok((offset, size))
    }
}

/// Parse a decompressed header
pub(crate) fn parse_header(data: &[u8]) -> Result<FbrbHeader> {
    let version = read_u32_at(data, 0)?;
    if version != HEADER_VERSION {
        tracing::warn!("Unexpected FBRB header version {version}, reading anyway");
    }

    let strings_len = read_u32_at(data, 4)? as usize;
    let strings_base = 8;
    let count = read_u32_at(data, strings_base + strings_len)? as usize;
    let entries_base = strings_base + strings_len + 4;

    let table_end = count
        .checked_mul(ENTRY_SIZE)
        .and_then(|size| size.checked_add(entries_base))
        .filter(|&end| end <= data.len())
        .ok_or(Error::FbrbOffsetOutOfBounds {
            offset: entries_base,
            len: data.len(),
        })?;

    let mut entries = Vec::with_capacity(count);
    for i in 0..count {
        let base = entries_base + i * ENTRY_SIZE;
        let name_offset = read_u32_at(data, base)? as usize;
        let type_offset = read_u32_at(data, base + 20)? as usize;

        entries.push(FbrbEntry {
            name: read_cstr_at(data, strings_base + name_offset)?,
            type_name: read_cstr_at(data, strings_base + type_offset)?,
            flags: read_u32_at(data, base + 4)?,
            payload_offset: read_u32_at(data, base + 8)?,
            size: read_u32_at(data, base + 12)?,
            stored_size: read_u32_at(data, base + 16)?,
        });
    }

    let zipped = data.get(table_end).is_some_and(|&flag| flag != 0);
    let payload_len = read_u32_at(data, table_end + 1)?;

    Ok(FbrbHeader {
        version,
        entries,
        zipped,
        payload_len,
    })
}

fn read_u32_at(data: &[u8], pos: usize) -> Result<u32> {
    pos.checked_add(4)
        .and_then(|end| data.get(pos..end))
        .map(BigEndian::read_u32)
        .ok_or(Error::FbrbOffsetOutOfBounds {
            offset: pos,
            len: data.len(),
        })
}

fn read_cstr_at(data: &[u8], pos: usize) -> Result<String> {
    let out_of_bounds = Error::FbrbOffsetOutOfBounds {
        offset: pos,
        len: data.len(),
    };
    let tail = data.get(pos..).ok_or(out_of_bounds)?;
    let end = tail.iter().position(|&b| b == 0).ok_or(Error::UnexpectedEof)?;
    Ok(String::from_utf8_lossy(&tail[..end]).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use byteorder::WriteBytesExt;

    fn header_bytes() -> Vec<u8> {
        let strings = b"a/b.res\0ITexture\0";
        let mut data = Vec::new();
        data.write_u32::<BigEndian>(2).unwrap();
        data.write_u32::<BigEndian>(strings.len() as u32).unwrap();
        data.extend_from_slice(strings);
        data.write_u32::<BigEndian>(1).unwrap();
        for value in [0u32, 0x0001_0000, 0, 5, 5, 8] {
            data.write_u32::<BigEndian>(value).unwrap();
        }
        data.push(1);
        data.write_u32::<BigEndian>(5).unwrap();
        data
    }

    #[test]
    fn test_parse_header() {
        let header = parse_header(&header_bytes()).unwrap();
        assert_eq!(header.version, 2);
        assert!(header.zipped);
        assert_eq!(header.payload_len, 5);
        assert_eq!(header.entries.len(), 1);

        let entry = &header.entries[0];
        assert_eq!(entry.name, "a/b.res");
        assert_eq!(entry.type_name, "ITexture");
        assert_eq!(entry.size, 5);
        assert_eq!(entry.flags, 0x0001_0000);
    }

    #[test]
    fn test_parse_header_rejects_truncated_table() {
        let mut data = header_bytes();
        data.truncate(40);
        assert!(matches!(
            parse_header(&data),
            Err(Error::FbrbOffsetOutOfBounds { .. })
        ));
    }

    #[test]
    fn test_read_entry_rejects_oversized_entry() {
        let mut staging = Staging::new(false).unwrap();
        staging.write_all(b"hello").unwrap();
        let mut payload = FbrbPayload { staging, len: 5 };

        let mut entry = parse_header(&header_bytes()).unwrap().entries.remove(0);
        assert_eq!(payload.read_entry(&entry).unwrap(), b"hello");

        entry.size = u32::MAX;
        assert!(matches!(
            payload.read_entry(&entry),
            Err(Error::PayloadOutOfRange { size, .. }) if size == u64::from(u32::MAX)
        ));

        entry.size = 1;
        entry.payload_offset = 5;
        assert!(matches!(
            payload.read_entry(&entry),
            Err(Error::PayloadOutOfRange { offset: 5, .. })
        ));
    }

    #[test]
    fn test_reader_rejects_bad_magic() {
        let data = b"PK\x03\x04\0\0\0\0".to_vec();
        assert!(matches!(
            FbrbReader::new(data.as_slice()),
            Err(Error::InvalidFbrbMagic(_))
        ));
    }
}

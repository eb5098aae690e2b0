//! Payload staging buffer, kept in memory or spilled to a temp file

use std::fs::File;
use std::io::{self, BufReader, Cursor, Read, Seek, SeekFrom, Write};

use super::COPY_BUFFER_SIZE;

/// Seekable scratch storage for an archive payload.
pub(crate) enum Staging {
    Memory(Cursor<Vec<u8>>),
    Disk(File),
}

impl Staging {
    /// Create an empty staging area, on disk when `temp_file` is set.
    pub(crate) fn new(temp_file: bool) -> io::Result<Self> {
        if temp_file {
            Ok(Self::Disk(tempfile::tempfile()?))
        } else {
            Ok(Self::Memory(Cursor::new(Vec::new())))
        }
    }

    /// Total number of staged bytes.
    pub(crate) fn len(&mut self) -> io::Result<u64> {
        match self {
            Self::Memory(cursor) => Ok(cursor.get_ref().len() as u64),
            Self::Disk(file) => Ok(file.metadata()?.len()),
        }
    }

    /// Copy everything staged into `out`, in `COPY_BUFFER_SIZE` chunks.
    pub(crate) fn copy_into<W: Write>(mut self, out: &mut W) -> io::Result<u64> {
        match &mut self {
            Self::Memory(cursor) => {
                out.write_all(cursor.get_ref())?;
                Ok(cursor.get_ref().len() as u64)
            }
            Self::Disk(file) => {
                file.seek(SeekFrom::Start(0))?;
                let mut reader = BufReader::with_capacity(COPY_BUFFER_SIZE, file);
                io::copy(&mut reader, out)
            }
        }
    }
}

impl Read for Staging {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            Self::Memory(cursor) => cursor.read(buf),
            Self::Disk(file) => file.read(buf),
        }
    }
}

impl Write for Staging {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Self::Memory(cursor) => cursor.write(buf),
            Self::Disk(file) => file.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Self::Memory(cursor) => cursor.flush(),
            Self::Disk(file) => file.flush(),
        }
    }
}

impl Seek for Staging {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        match self {
            Self::Memory(cursor) => cursor.seek(pos),
            Self::Disk(file) => file.seek(pos),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_staging_round_trip_memory_and_disk() {
        for temp_file in [false, true] {
            let mut staging = Staging::new(temp_file).unwrap();
            staging.write_all(b"hello payload").unwrap();
            assert_eq!(staging.len().unwrap(), 13);

            staging.seek(SeekFrom::Start(6)).unwrap();
            let mut buf = [0u8; 7];
            staging.read_exact(&mut buf).unwrap();
            assert_eq!(&buf, b"payload");

            let mut out = Vec::new();
            assert_eq!(staging.copy_into(&mut out).unwrap(), 13);
            assert_eq!(out, b"hello payload");
        }
    }
}

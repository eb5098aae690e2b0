//! Binary DBX reader and writer

use std::io::{Cursor, Read};

use byteorder::{BigEndian, ByteOrder, ReadBytesExt, WriteBytesExt};
use indexmap::IndexSet;

use super::document::{DbxDocument, DbxElement, DbxNumbers, DbxValue};
use super::leb128::{read_leb128, write_leb128};
use super::{HEADER_SIZE, MAGIC};
use crate::error::{Error, Result};

const KIND_CONTAINER: u8 = 0xA;
const KIND_STRING: u8 = 0x2;
const KIND_NUMBERS: u8 = 0x7;
const KIND_FLAG: u8 = 0x6;

/// Maximum attributes per record (low nibble of the type byte)
const MAX_ATTRIBUTES: usize = 0x0F;

/// Parse a binary DBX file.
///
/// # Errors
/// Returns [`Error::InvalidDbxMagic`] if the data does not start with
/// `{binary}`, or a format error if the string table or records are corrupt.
pub fn read_dbx(data: &[u8]) -> Result<DbxDocument> {
    if !data.starts_with(MAGIC) {
        return Err(Error::InvalidDbxMagic);
    }
    if data.len() < HEADER_SIZE {
        return Err(Error::UnexpectedEof);
    }

    let total_offset = BigEndian::read_u32(&data[8..12]) as usize;
    let rel_offset = BigEndian::read_u32(&data[16..20]) as usize;
    let string_count = BigEndian::read_u32(&data[20..24]) as usize;

    let table_end = string_count
        .checked_mul(4)
        .and_then(|size| size.checked_add(HEADER_SIZE))
        .ok_or(Error::UnexpectedEof)?;
    let payload_start = rel_offset
        .checked_add(HEADER_SIZE)
        .ok_or(Error::UnexpectedEof)?;
    if table_end > payload_start || payload_start > data.len() {
        return Err(Error::UnexpectedEof);
    }
    if total_offset != payload_start {
        tracing::debug!("DBX total offset {total_offset} differs from {payload_start}");
    }

    let block = &data[table_end..payload_start];
    let strings = (0..string_count)
        .map(|i| {
            let pos = HEADER_SIZE + i * 4;
            let offset = BigEndian::read_u32(&data[pos..pos + 4]) as usize;
            let tail = block.get(offset..).ok_or(Error::UnexpectedEof)?;
            let end = tail.iter().position(|&b| b == 0).unwrap_or(tail.len());
            Ok(String::from_utf8_lossy(&tail[..end]).into_owned())
        })
        .collect::<Result<Vec<_>>>()?;

    let elements = read_records(&data[payload_start..], payload_start as u64, &strings)?;
    Ok(DbxDocument { elements })
}

fn read_records(payload: &[u8], base: u64, strings: &[String]) -> Result<Vec<DbxElement>> {
    let len = payload.len() as u64;
    let mut cursor = Cursor::new(payload);
    let mut open: Vec<DbxElement> = Vec::new();
    let mut elements = Vec::new();

    while cursor.position() < len {
        let record_offset = base + cursor.position();
        let tag = read_leb128(&mut cursor)?;
        if tag == 0 {
            let element = open.pop().ok_or(Error::UnbalancedDbx(record_offset))?;
            attach(&mut open, &mut elements, element);
            continue;
        }

        let tag = lookup(strings, tag)?;
        let type_byte = read_byte(&mut cursor)?;
        let attribute_count = usize::from(type_byte & 0x0F);

        let mut attributes = Vec::with_capacity(attribute_count);
        for _ in 0..attribute_count {
            let key = lookup(strings, read_leb128(&mut cursor)?)?;
            let value = lookup(strings, read_leb128(&mut cursor)?)?;
            attributes.push((key, value));
        }

        let value = match type_byte >> 4 {
            KIND_CONTAINER => {
                read_byte(&mut cursor)?;
                open.push(DbxElement {
                    tag,
                    attributes,
                    value: DbxValue::Container(Vec::new()),
                });
                continue;
            }
            KIND_STRING => DbxValue::String(lookup(strings, read_leb128(&mut cursor)?)?),
            KIND_NUMBERS => DbxValue::Numbers(read_numbers(&mut cursor, len)?),
            kind => {
                if kind != KIND_FLAG {
                    tracing::debug!("Unknown DBX record kind {kind:#x} at {record_offset}, reading as flag");
                }
                read_byte(&mut cursor)?;
                DbxValue::Flag(read_byte(&mut cursor)?)
            }
        };

        attach(
            &mut open,
            &mut elements,
            DbxElement {
                tag,
                attributes,
                value,
            },
        );
    }

    if !open.is_empty() {
        tracing::warn!("DBX payload ended with {} open elements", open.len());
        while let Some(element) = open.pop() {
            attach(&mut open, &mut elements, element);
        }
    }

    Ok(elements)
}

fn read_numbers(cursor: &mut Cursor<&[u8]>, len: u64) -> Result<DbxNumbers> {
    let count = read_leb128(cursor)?;
    let width = read_leb128(cursor)?;

    // Widths other than 4 and 8 decode as u16 halves
    let element_size = match width {
        4 | 8 => width,
        2 => 2,
        other => {
            tracing::warn!("Unusual DBX number width {other}, reading as 16-bit values");
            2
        }
    };

    let remaining = len - cursor.position();
    if count
        .checked_mul(element_size)
        .is_none_or(|size| size > remaining)
    {
        return Err(Error::UnexpectedEof);
    }

    let count = count as usize;
    let numbers = match element_size {
        4 => DbxNumbers::Words(
            (0..count)
                .map(|_| cursor.read_u32::<BigEndian>())
                .collect::<std::io::Result<_>>()?,
        ),
        8 => DbxNumbers::Doubles(
            (0..count)
                .map(|_| cursor.read_f64::<BigEndian>())
                .collect::<std::io::Result<_>>()?,
        ),
        _ => DbxNumbers::Halves(
            (0..count)
                .map(|_| cursor.read_u16::<BigEndian>())
                .collect::<std::io::Result<_>>()?,
        ),
    };
    Ok(numbers)
}

fn attach(open: &mut [DbxElement], elements: &mut Vec<DbxElement>, element: DbxElement) {
    match open.last_mut() {
        Some(DbxElement {
            value: DbxValue::Container(children),
            ..
        }) => children.push(element),
        _ => elements.push(element),
    }
}

fn lookup(strings: &[String], index: u64) -> Result<String> {
    usize::try_from(index)
        .ok()
        .and_then(|i| strings.get(i))
        .cloned()
        .ok_or(Error::InvalidStringIndex(index))
}

fn read_byte<R: Read>(reader: &mut R) -> Result<u8> {
    reader.read_u8().map_err(|_| Error::UnexpectedEof)
}

/// Serialize a document to binary DBX.
///
/// Strings are numbered in first-use order with the empty string at index 0.
///
/// # Errors
/// Returns [`Error::TooManyAttributes`] if an element has more than 15 attributes.
pub fn write_dbx(doc: &DbxDocument) -> Result<Vec<u8>> {
    let mut strings = IndexSet::new();
    strings.insert(String::new());

    let mut payload = Vec::new();
    for element in &doc.elements {
        write_element(&mut payload, &mut strings, element)?;
    }

    let mut block = Vec::new();
    let mut offsets = Vec::with_capacity(strings.len());
    for string in &strings {
        offsets.push(block.len() as u32);
        block.extend_from_slice(string.as_bytes());
        block.push(0);
    }

    let rel_offset = (offsets.len() * 4 + block.len()) as u32;
    let mut out = Vec::with_capacity(HEADER_SIZE + rel_offset as usize + payload.len());
    out.extend_from_slice(MAGIC);
    out.write_u32::<BigEndian>(rel_offset + HEADER_SIZE as u32)?;
    out.write_u32::<BigEndian>(0)?;
    out.write_u32::<BigEndian>(rel_offset)?;
    out.write_u32::<BigEndian>(offsets.len() as u32)?;
    for offset in offsets {
        out.write_u32::<BigEndian>(offset)?;
    }
    out.extend_from_slice(&block);
    out.extend_from_slice(&payload);

    Ok(out)
}

fn write_element(
    out: &mut Vec<u8>,
    strings: &mut IndexSet<String>,
    element: &DbxElement,
) -> Result<()> {
    let count = element.attributes.len();
    if count > MAX_ATTRIBUTES {
        return Err(Error::TooManyAttributes {
            name: element.tag.clone(),
            count,
        });
    }

    let kind = match element.value {
        DbxValue::Container(_) => KIND_CONTAINER,
        DbxValue::String(_) => KIND_STRING,
        DbxValue::Numbers(_) => KIND_NUMBERS,
        DbxValue::Flag(_) => KIND_FLAG,
    };

    write_leb128(out, intern(strings, &element.tag));
    out.push((kind << 4) | count as u8);
    for (key, value) in &element.attributes {
        write_leb128(out, intern(strings, key));
        write_leb128(out, intern(strings, value));
    }

    match &element.value {
        DbxValue::Container(children) => {
            out.push(0);
            for child in children {
                write_element(out, strings, child)?;
            }
            // close record
            write_leb128(out, 0);
        }
        DbxValue::String(text) => write_leb128(out, intern(strings, text)),
        DbxValue::Numbers(numbers) => {
            write_leb128(out, numbers.len() as u64);
            write_leb128(out, u64::from(numbers.width()));
            match numbers {
                DbxNumbers::Halves(values) => {
                    for &v in values {
                        out.write_u16::<BigEndian>(v)?;
                    }
                }
                DbxNumbers::Words(values) => {
                    for &v in values {
                        out.write_u32::<BigEndian>(v)?;
                    }
                }
                DbxNumbers::Doubles(values) => {
                    for &v in values {
                        out.write_f64::<BigEndian>(v)?;
                    }
                }
            }
        }
        DbxValue::Flag(value) => {
            out.push(0x01);
            out.push(*value);
        }
    }

    Ok(())
}

fn intern(strings: &mut IndexSet<String>, value: &str) -> u64 {
    if let Some(index) = strings.get_index_of(value) {
        return index as u64;
    }
    strings.insert_full(value.to_string()).0 as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample() -> DbxDocument {
        let children = vec![
            DbxElement::new("field", DbxValue::String("Soldier".to_string()))
                .with_attribute("name", "Name"),
            DbxElement::new("field", DbxValue::Flag(1)).with_attribute("name", "Enabled"),
            DbxElement::new(
                "field",
                DbxValue::Numbers(DbxNumbers::Words(vec![0x3F80_0000, 0, 0, 0])),
            )
            .with_attribute("name", "Position"),
            DbxElement::new("field", DbxValue::Numbers(DbxNumbers::Halves(vec![3, 4])))
                .with_attribute("name", "TargetId"),
            DbxElement::new("field", DbxValue::Numbers(DbxNumbers::Doubles(vec![0.5])))
                .with_attribute("name", "FireKeepTime"),
            DbxElement::new("array", DbxValue::Container(Vec::new()))
                .with_attribute("name", "Empty"),
        ];
        DbxDocument::new(
            DbxElement::new("instance", DbxValue::Container(children))
                .with_attribute("guid", "ABCD")
                .with_attribute("type", "Entity.SoldierData"),
        )
    }

    #[test]
    fn test_minimal_layout() {
        let doc = DbxDocument::new(DbxElement::new("a", DbxValue::String("b".to_string())));
        let bytes = write_dbx(&doc).unwrap();

        let mut expected = b"{binary}".to_vec();
        for value in [41u32, 0, 17, 3, 0, 1, 3] {
            expected.write_u32::<BigEndian>(value).unwrap();
        }
        expected.extend_from_slice(b"\0a\0b\0");
        expected.extend_from_slice(&[0x01, 0x20, 0x02]);
        assert_eq!(bytes, expected);
    }

    #[test]
    fn test_write_then_read() {
        let doc = sample();
        let bytes = write_dbx(&doc).unwrap();
        assert_eq!(read_dbx(&bytes).unwrap(), doc);
        assert_eq!(doc.element_count(), 7);
    }

    #[test]
    fn test_string_table_order() {
        let bytes = write_dbx(&sample()).unwrap();
        let count = BigEndian::read_u32(&bytes[20..24]) as usize;
        let block_start = HEADER_SIZE + count * 4;
        let block = &bytes[block_start..block_start + 21];
        assert_eq!(block, b"\0instance\0guid\0ABCD\0t");
    }

    #[test]
    fn test_rejects_bad_magic() {
        assert!(matches!(read_dbx(b"<?xml version"), Err(Error::InvalidDbxMagic)));
    }

    #[test]
    fn test_rejects_unbalanced_close() {
        let doc = DbxDocument::new(DbxElement::new("a", DbxValue::String("b".to_string())));
        let mut bytes = write_dbx(&doc).unwrap();
        bytes.push(0);
        assert!(matches!(read_dbx(&bytes), Err(Error::UnbalancedDbx(_))));
    }

    #[test]
    fn test_unclosed_container_is_closed_at_end() {
        let doc = DbxDocument::new(DbxElement::new(
            "root",
            DbxValue::Container(vec![DbxElement::new("leaf", DbxValue::Flag(0))]),
        ));
        let mut bytes = write_dbx(&doc).unwrap();
        bytes.pop();
        assert_eq!(read_dbx(&bytes).unwrap(), doc);
    }

    #[test]
    fn test_odd_number_width_reads_halves() {
        let doc = DbxDocument::new(DbxElement::new(
            "field",
            DbxValue::Numbers(DbxNumbers::Halves(vec![1, 0xFFFF])),
        ));
        let mut bytes = write_dbx(&doc).unwrap();
        // Record tail is: type byte, count, width, values
        let width_at = bytes.len() - 5;
        assert_eq!(bytes[width_at], 2);
        bytes[width_at] = 3;
        assert_eq!(read_dbx(&bytes).unwrap(), doc);
    }

    #[test]
    fn test_rejects_too_many_attributes() {
        let mut element = DbxElement::new("a", DbxValue::String(String::new()));
        for i in 0..16 {
            element = element.with_attribute(format!("k{i}"), "v");
        }
        assert!(matches!(
            write_dbx(&DbxDocument::new(element)),
            Err(Error::TooManyAttributes { count: 16, .. })
        ));
    }
}

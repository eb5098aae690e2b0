//! DBX <-> XML text
//!
//! The text form is tab-indented with CRLF line endings. Leaves sit on one
//! line, empty strings self-close, and containers always open and close on
//! their own lines (an empty container keeps both lines). Line breaks inside
//! string values are written as character references so they stay on one line.

use quick_xml::Reader;
use quick_xml::Writer;
use quick_xml::escape::partial_escape;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};

use super::XML_HEADER;
use super::document::{DbxDocument, DbxElement, DbxValue};
use super::numbers::{classify_leaf, render_flag, render_numbers};
use crate::error::{Error, Result};

/// Render a document as XML text.
///
/// # Errors
/// Returns an error if XML serialization fails.
pub fn to_xml(doc: &DbxDocument) -> Result<String> {
    let mut output = Vec::new();
    let mut writer = Writer::new_with_indent(&mut output, b'\t', 1);

    writer.write_event(Event::Decl(BytesDecl::new("1.0", None, None)))?;
    for element in &doc.elements {
        write_element(&mut writer, element)?;
    }

    let mut xml = String::from_utf8(output)?;
    // Space before self-closing tags
    xml = xml.replace("/>", " />");
    xml.push('\n');
    Ok(xml.replace('\n', "\r\n"))
}

fn write_element<W: std::io::Write>(writer: &mut Writer<W>, element: &DbxElement) -> Result<()> {
    let mut start = BytesStart::new(element.tag.as_str());
    for (key, value) in &element.attributes {
        start.push_attribute((key.as_str(), value.as_str()));
    }

    let text = match &element.value {
        DbxValue::Container(children) => {
            writer.write_event(Event::Start(start))?;
            for child in children {
                write_element(writer, child)?;
            }
            writer.write_event(Event::End(BytesEnd::new(element.tag.as_str())))?;
            return Ok(());
        }
        DbxValue::String(text) if text.is_empty() => {
            writer.write_event(Event::Empty(start))?;
            return Ok(());
        }
        DbxValue::String(text) => text.clone(),
        DbxValue::Numbers(numbers) => render_numbers(numbers, element.field_name()),
        DbxValue::Flag(value) => render_flag(*value),
    };

    writer.write_event(Event::Start(start))?;
    // An empty text event keeps `<a></a>` on one line
    let escaped = partial_escape(&text)
        .replace('\r', "&#13;")
        .replace('\n', "&#10;");
    writer.write_event(Event::Text(BytesText::from_escaped(escaped)))?;
    writer.write_event(Event::End(BytesEnd::new(element.tag.as_str())))?;
    Ok(())
}

/// Element being read; becomes a container once it has children or only
/// whitespace spread over several lines.
struct OpenElement {
    tag: String,
    attributes: Vec<(String, String)>,
    text: String,
    spans_lines: bool,
    children: Vec<DbxElement>,
}

impl OpenElement {
    fn is_container(&self) -> bool {
        !self.children.is_empty() || (self.spans_lines && self.text.trim().is_empty())
    }
}

/// Parse XML text into a document, deciding the binary kind of every leaf.
///
/// Hand-edited files often carry a bare `&`; text and attribute values that
/// fail to unescape are kept as written.
///
/// # Errors
/// Returns [`Error::MissingXmlDeclaration`] if the text does not start with an
/// XML declaration, an XML error for malformed markup, or
/// [`Error::InvalidNumber`] for numeric fields that do not encode.
pub fn from_xml(content: &str) -> Result<DbxDocument> {
    let content = content.trim_start_matches('\u{feff}');
    if !content.starts_with(&XML_HEADER[..5]) {
        return Err(Error::MissingXmlDeclaration);
    }

    let mut reader = Reader::from_str(content);
    // Whitespace decides between an empty container and an empty leaf
    reader.trim_text(false);

    let mut open: Vec<OpenElement> = Vec::new();
    let mut elements = Vec::new();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                open.push(OpenElement {
                    tag: String::from_utf8_lossy(e.name().as_ref()).into_owned(),
                    attributes: read_attributes(&e)?,
                    text: String::new(),
                    spans_lines: false,
                    children: Vec::new(),
                });
            }
            Ok(Event::Empty(e)) => {
                let element = DbxElement {
                    tag: String::from_utf8_lossy(e.name().as_ref()).into_owned(),
                    attributes: read_attributes(&e)?,
                    value: DbxValue::String(String::new()),
                };
                attach(&mut open, &mut elements, element);
            }
            Ok(Event::Text(e)) => {
                if let Some(current) = open.last_mut() {
                    current.spans_lines |= e.contains(&b'\n');
                    match e.unescape() {
                        Ok(text) => current.text.push_str(&text),
                        Err(err) => {
                            tracing::debug!("Keeping unescaped text: {err}");
                            current.text.push_str(&String::from_utf8_lossy(&e));
                        }
                    }
                }
            }
            Ok(Event::CData(e)) => {
                if let Some(current) = open.last_mut() {
                    current.text.push_str(&String::from_utf8_lossy(&e));
                }
            }
            Ok(Event::End(_)) => {
                let Some(current) = open.pop() else { continue };
                let value = if current.is_container() {
                    DbxValue::Container(current.children)
                } else {
                    classify_leaf(&current.attributes, &current.text)?
                };
                let element = DbxElement {
                    tag: current.tag,
                    attributes: current.attributes,
                    value,
                };
                attach(&mut open, &mut elements, element);
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::XmlError(e)),
            _ => {}
        }
        buf.clear();
    }

    if !open.is_empty() {
        return Err(Error::UnbalancedDbx(reader.buffer_position() as u64));
    }

    Ok(DbxDocument { elements })
}

fn read_attributes(e: &BytesStart) -> Result<Vec<(String, String)>> {
    let mut attributes = Vec::new();
    for attr in e.attributes() {
        let attr = attr?;
        let value = match attr.unescape_value() {
            Ok(value) => value.into_owned(),
            Err(err) => {
                tracing::debug!("Keeping unescaped attribute value: {err}");
                String::from_utf8_lossy(&attr.value).into_owned()
            }
        };
        attributes.push((
            String::from_utf8_lossy(attr.key.as_ref()).into_owned(),
            value,
        ));
    }
    Ok(attributes)
}

fn attach(open: &mut [OpenElement], elements: &mut Vec<DbxElement>, element: DbxElement) {
    match open.last_mut() {
        Some(parent) => parent.children.push(element),
        None => elements.push(element),
    }
}

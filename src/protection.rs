//! Streaming removal of the `documentProtection` element.
//!
//! The settings part is decoded event by event with quick-xml and every
//! event outside the protection subtree is written back unchanged. Tags are
//! re-emitted from their raw bytes, so attribute order, quoting and
//! whitespace survive the round trip.
//!
//! UTF-16 documents (marked by a byte order mark) are decoded first and
//! written back as UTF-8 with a matching XML declaration.

use crate::error::{Error, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::{Reader, Writer};

/// Local name of the element that enables editing restrictions.
pub const PROTECTION_ELEMENT: &str = "documentProtection";

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];
const UTF16_LE_BOM: &[u8] = &[0xFF, 0xFE];
const UTF16_BE_BOM: &[u8] = &[0xFE, 0xFF];

/// Result of stripping a settings document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stripped {
    /// The document without protection, or the untouched input when
    /// nothing was removed.
    pub xml: Vec<u8>,
    /// Whether at least one protection element was removed.
    pub found: bool,
}

/// Remove every `documentProtection` element from an XML document.
///
/// Elements are matched by local name, so any namespace prefix (or none)
/// is accepted. When no element is found the original bytes are returned
/// as-is rather than a re-serialization.
///
/// A UTF-16 document that loses its protection comes back as UTF-8, with
/// the `encoding` of its XML declaration set to `UTF-8`.
///
/// # Example
///
/// ```
/// use docxfree::strip_protection;
///
/// let xml = br#"<w:settings xmlns:w="ns"><w:documentProtection w:edit="readOnly"/><w:other/></w:settings>"#;
/// let stripped = strip_protection(xml)?;
/// assert!(stripped.found);
/// assert_eq!(stripped.xml, br#"<w:settings xmlns:w="ns"><w:other/></w:settings>"#);
/// # Ok::<(), docxfree::Error>(())
/// ```
pub fn strip_protection(xml: &[u8]) -> Result<Stripped> {
    let Some(decoded) = decode_utf16(xml)? else {
        return strip_utf8(xml);
    };

    let stripped = strip_utf8(fix_encoding_declaration(&decoded).as_bytes())?;
    if !stripped.found {
        return Ok(Stripped {
            xml: xml.to_vec(),
            found: false,
        });
    }
    Ok(stripped)
}

fn strip_utf8(xml: &[u8]) -> Result<Stripped> {
    // The BOM is kept out of the reader and restored verbatim on output.
    let (bom, body) = match xml.strip_prefix(UTF8_BOM) {
        Some(rest) => (UTF8_BOM, rest),
        None => (&[][..], xml),
    };

    let mut reader = Reader::from_reader(body);
    let mut output = Vec::with_capacity(xml.len());
    output.extend_from_slice(bom);
    let mut writer = Writer::new(output);

    let mut found = false;
    let mut open_elements = 0usize;

    loop {
        let event = match reader.read_event() {
            Ok(event) => event,
            Err(e) => return Err(decode_error(&reader, e)),
        };

        match event {
            Event::Start(ref e) if is_protection(e) => {
                found = true;
                skip_subtree(&mut reader)?;
            }
            Event::Empty(ref e) if is_protection(e) => {
                found = true;
            }
            Event::Eof => break,
            event => {
                match event {
                    Event::Start(_) => open_elements += 1,
                    Event::End(_) => open_elements = open_elements.saturating_sub(1),
                    _ => {}
                }
                writer
                    .write_event(event)
                    .map_err(|e| Error::XmlEncode(e.to_string()))?;
            }
        }
    }

    if open_elements > 0 {
        return Err(Error::XmlDecode(format!(
            "unexpected end of document with {} unclosed element(s)",
            open_elements
        )));
    }

    if !found {
        return Ok(Stripped {
            xml: xml.to_vec(),
            found: false,
        });
    }

    Ok(Stripped {
        xml: writer.into_inner(),
        found: true,
    })
}

/// Decode a document that starts with a UTF-16 byte order mark. Returns
/// `None` for anything else.
fn decode_utf16(xml: &[u8]) -> Result<Option<String>> {
    let (body, from_bytes): (&[u8], fn([u8; 2]) -> u16) =
        if let Some(body) = xml.strip_prefix(UTF16_LE_BOM) {
            (body, u16::from_le_bytes)
        } else if let Some(body) = xml.strip_prefix(UTF16_BE_BOM) {
            (body, u16::from_be_bytes)
        } else {
            return Ok(None);
        };

    if body.len() % 2 != 0 {
        return Err(Error::XmlDecode(format!(
            "UTF-16 document has an odd number of bytes ({})",
            xml.len()
        )));
    }

    let units = body.chunks_exact(2).map(|pair| from_bytes([pair[0], pair[1]]));
    char::decode_utf16(units)
        .collect::<std::result::Result<String, _>>()
        .map(Some)
        .map_err(|e| Error::XmlDecode(format!("invalid UTF-16 document: {}", e)))
}

/// Point the XML declaration's `encoding` at UTF-8 once the content has
/// been transcoded.
fn fix_encoding_declaration(content: &str) -> String {
    if !content.starts_with("<?xml") {
        return content.to_string();
    }
    let Some(end) = content.find("?>") else {
        return content.to_string();
    };
    let (decl, rest) = content.split_at(end);
    let Some(attr) = decl.find("encoding=") else {
        return content.to_string();
    };

    let quote_at = attr + "encoding=".len();
    let quote = match decl.as_bytes().get(quote_at) {
        Some(&q @ (b'"' | b'\'')) => q as char,
        _ => return content.to_string(),
    };
    let value_start = quote_at + 1;
    match decl[value_start..].find(quote) {
        Some(len) => format!(
            "{}UTF-8{}{}",
            &decl[..value_start],
            &decl[value_start + len..],
            rest
        ),
        None => content.to_string(),
    }
}

fn is_protection(start: &BytesStart<'_>) -> bool {
    start.local_name().as_ref() == PROTECTION_ELEMENT.as_bytes()
}

/// Consume events up to and including the end tag matching an already
/// consumed start tag. Uses a depth counter instead of recursion.
fn skip_subtree(reader: &mut Reader<&[u8]>) -> Result<()> {
    let mut depth = 1usize;
    while depth > 0 {
        let event = match reader.read_event() {
            Ok(event) => event,
            Err(e) => return Err(decode_error(reader, e)),
        };
        match event {
            Event::Start(_) => depth += 1,
            Event::End(_) => depth -= 1,
            Event::Eof => {
                return Err(Error::XmlDecode(format!(
                    "unexpected end of document inside <{}>",
                    PROTECTION_ELEMENT
                )));
            }
            _ => {}
        }
    }
    Ok(())
}

fn decode_error(reader: &Reader<&[u8]>, err: quick_xml::Error) -> Error {
    Error::XmlDecode(format!("{} at byte {}", err, reader.error_position()))
}

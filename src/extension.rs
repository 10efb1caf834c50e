use std::io::{Cursor, Write};
use std::str::from_utf8;

use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use serde::{Deserialize, Serialize};

use crate::error::{Result, VastError};
use crate::models::Tracking;

/// Arbitrary XML provided by the platform to extend the VAST response or
/// by custom trackers.
///
/// The payload is either a list of named tracking callbacks or an opaque
/// XML fragment, never both. Untyped document authors rely on this
/// either/or to pass vendor trackers and arbitrary vendor XML through the
/// same element, so the codec enforces it structurally.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Extension {
    /// The extension type label
    pub r#type: Option<String>,

    pub payload: ExtensionPayload,
}

/// The mutually exclusive payload of an [`Extension`]
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub enum ExtensionPayload {
    /// Named tracking callbacks nested under `<CustomTracking>`
    CustomTracking(Vec<Tracking>),
    /// The raw inner markup, preserved byte-for-byte
    Data(String),
}

impl Extension {
    /// An extension carrying only tracking callbacks
    pub fn custom_tracking(r#type: impl Into<String>, events: Vec<Tracking>) -> Self {
        Extension {
            r#type: Some(r#type.into()),
            payload: ExtensionPayload::CustomTracking(events),
        }
    }

    /// An extension carrying an opaque XML fragment
    pub fn data(r#type: impl Into<String>, fragment: impl Into<String>) -> Self {
        Extension {
            r#type: Some(r#type.into()),
            payload: ExtensionPayload::Data(fragment.into()),
        }
    }

    /// Decode a standalone `<Extension>` element.
    pub fn from_xml(xml: &str) -> Result<Extension> {
        let mut reader = Reader::from_str(xml);
        reader.trim_text(true);
        let mut buf = Vec::new();
        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(ref e)) => return parse_extension(&mut reader, e),
                Ok(Event::Empty(ref e)) => return Ok(extension_from_attrs(e)),
                Ok(Event::Eof) => {
                    return Err(VastError::MissingField("Extension element".to_string()));
                }
                Err(e) => return Err(VastError::XmlParseError(e)),
                _ => (),
            }
            buf.clear();
        }
    }

    /// Encode as a standalone `<Extension>` element.
    pub fn to_xml(&self) -> Result<String> {
        let mut writer = Writer::new(Cursor::new(Vec::new()));
        write_extension(&mut writer, "Extension", self)?;
        let bytes = writer.into_inner().into_inner();
        String::from_utf8(bytes).map_err(|e| VastError::Other(format!("invalid UTF-8: {e}")))
    }
}

/// Build an extension from a start tag alone (used for self-closing tags)
pub(crate) fn extension_from_attrs(start: &BytesStart) -> Extension {
    let mut r#type = None;
    for attr in start.attributes().flatten() {
        if attr.key.as_ref() == b"type" {
            if let Ok(value) = from_utf8(&attr.value) {
                r#type = Some(value.to_string());
            }
        }
    }
    Extension {
        r#type,
        payload: ExtensionPayload::Data(String::new()),
    }
}

/// Decode an extension element the reader is positioned inside of.
///
/// The raw inner markup is captured verbatim first; if its top level holds
/// a `<CustomTracking>` block with any `<Tracking>` entries, the callbacks
/// win and the fragment is discarded. Otherwise the fragment is retained
/// unmodified, interior whitespace and comments included.
pub(crate) fn parse_extension(reader: &mut Reader<&[u8]>, start: &BytesStart) -> Result<Extension> {
    let mut extension = extension_from_attrs(start);
    let inner = reader.read_text(start.name())?.into_owned();
    let trackings = scan_custom_tracking(&inner)?;
    extension.payload = if trackings.is_empty() {
        ExtensionPayload::Data(inner)
    } else {
        ExtensionPayload::CustomTracking(trackings)
    };
    Ok(extension)
}

/// Collect `<Tracking>` entries from any top-level `<CustomTracking>`
/// blocks of the captured fragment.
fn scan_custom_tracking(fragment: &str) -> Result<Vec<Tracking>> {
    let mut trackings = Vec::new();
    let mut reader = Reader::from_str(fragment);
    reader.trim_text(true);
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                if e.name().as_ref() == b"CustomTracking" {
                    collect_trackings(&mut reader, &mut trackings)?;
                } else {
                    let end = e.to_end().into_owned();
                    reader.read_to_end(end.name())?;
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(VastError::XmlParseError(e)),
            _ => (),
        }
        buf.clear();
    }
    Ok(trackings)
}

fn collect_trackings(reader: &mut Reader<&[u8]>, trackings: &mut Vec<Tracking>) -> Result<()> {
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) if e.name().as_ref() == b"Tracking" => {
                trackings.push(crate::parser::parse_tracking(reader, e)?);
            }
            Ok(Event::Empty(ref e)) if e.name().as_ref() == b"Tracking" => {
                trackings.push(crate::parser::tracking_from_attrs(e)?);
            }
            Ok(Event::End(ref e)) if e.name().as_ref() == b"CustomTracking" => break,
            Ok(Event::Eof) => {
                return Err(VastError::Other("Unexpected end of file".to_string()));
            }
            Err(e) => return Err(VastError::XmlParseError(e)),
            _ => (),
        }
        buf.clear();
    }
    Ok(())
}

/// Encode an extension under the given tag name.
///
/// Mirrors decoding: callbacks emit only the type attribute and the
/// `<CustomTracking>` block; a fragment is written back raw, never
/// re-escaped.
pub(crate) fn write_extension<W: Write>(
    writer: &mut Writer<W>,
    tag: &str,
    extension: &Extension,
) -> Result<()> {
    let mut start = BytesStart::new(tag);
    if let Some(r#type) = &extension.r#type {
        start.push_attribute(("type", r#type.as_str()));
    }
    match &extension.payload {
        ExtensionPayload::CustomTracking(events) if !events.is_empty() => {
            writer.write_event(Event::Start(start))?;
            writer.write_event(Event::Start(BytesStart::new("CustomTracking")))?;
            for tracking in events {
                crate::serializer::write_tracking(writer, "Tracking", tracking)?;
            }
            writer.write_event(Event::End(BytesEnd::new("CustomTracking")))?;
            writer.write_event(Event::End(BytesEnd::new(tag)))?;
        }
        ExtensionPayload::Data(data) if !data.is_empty() => {
            writer.write_event(Event::Start(start))?;
            writer.write_event(Event::Text(BytesText::from_escaped(data.as_str())))?;
            writer.write_event(Event::End(BytesEnd::new(tag)))?;
        }
        _ => {
            writer.write_event(Event::Empty(start))?;
        }
    }
    Ok(())
}

//! Scan metadata from the XML packet of the base pyramid level.
//!
//! The packet looks like:
//!
//! ```xml
//! <EncodeInfo Ver="2">
//!   <SlideInfo>
//!     <iScan Magnification="20" ScanRes="0.25" UnitNumber="BI10N0001" ... />
//!   </SlideInfo>
//! </EncodeInfo>
//! ```
//!
//! Every property is an attribute of the single `iScan` element. Queries are
//! absolute element paths (`/EncodeInfo/SlideInfo/iScan`), the only form the
//! scan metadata needs; namespace prefixes are ignored when matching.

use std::borrow::Cow;

use encoding_rs::{Encoding, UTF_8};
use roxmltree::{Document, Node, ParsingOptions};
use tracing::debug;

use crate::error::SlideError;
use crate::slide::{
    duplicate_double_property, duplicate_int_property, PropertyMap, PROPERTY_NAME_MPP_X,
    PROPERTY_NAME_MPP_Y, PROPERTY_NAME_OBJECTIVE_POWER,
};

use super::description::find_value;
use super::{property_name, SCAN_INFO_PATH};

/// Vendor property suffixes and the `iScan` attributes they are read from.
pub const SCAN_INFO_ATTRIBUTES: &[(&str, &str)] = &[
    ("magnification", "Magnification"),
    ("resolution", "ScanRes"),
    ("device-model", "UnitNumber"),
    ("build-version", "BuildVersion"),
    ("build-date", "BuildDate"),
    ("slide-annotation", "SlideAnnotation"),
    ("show-label", "ShowLabel"),
    ("label-boundary", "LabelBoundary"),
    ("z-layers", "Z-layers"),
    ("z-spacing", "Z-spacing"),
    ("focus-mode", "FocusMode"),
    ("focus-quality", "FocusQuality"),
    ("scan-mode", "ScanMode"),
];

// =============================================================================
// MetadataDocument
// =============================================================================

/// A parsed XML packet with path queries that copy values into properties.
///
/// When built without a property sink every setter is a no-op, so the same
/// code path validates the packet in detection-only mode.
pub struct MetadataDocument<'input, 'props> {
    document: Document<'input>,
    properties: Option<&'props mut PropertyMap>,
}

impl<'input, 'props> MetadataDocument<'input, 'props> {
    /// Parse XML text, usually the output of [`decode_packet`].
    ///
    /// # Errors
    ///
    /// `FormatNotSupported` if the text is not well-formed XML.
    pub fn parse(
        text: &'input str,
        properties: Option<&'props mut PropertyMap>,
    ) -> Result<Self, SlideError> {
        let options = ParsingOptions {
            allow_dtd: true,
            ..ParsingOptions::default()
        };
        let document = Document::parse_with_options(text, options).map_err(|e| {
            debug!("XML packet does not parse: {}", e);
            not_xml()
        })?;

        Ok(Self {
            document,
            properties,
        })
    }

    /// Evaluate an absolute element path.
    ///
    /// Returns `None` rather than an empty list when nothing matches.
    pub fn evaluate(&self, query: &str) -> Option<Vec<Node<'_, 'input>>> {
        let mut steps = query.strip_prefix('/')?.split('/');
        let first = steps.next().filter(|s| !s.is_empty())?;

        let root = self.document.root_element();
        if root.tag_name().name() != first {
            return None;
        }

        let mut matched = vec![root];
        for step in steps {
            if step.is_empty() {
                return None;
            }
            matched = matched
                .iter()
                .flat_map(|node| node.children())
                .filter(|child| child.is_element() && child.tag_name().name() == step)
                .collect();
            if matched.is_empty() {
                return None;
            }
        }

        Some(matched)
    }

    /// Copy `attribute` of the first node matching `query` into `property`.
    ///
    /// Nothing happens when the query or the attribute has no match.
    pub fn set_property_from_attribute(&mut self, property: &str, query: &str, attribute: &str) {
        let value = self
            .evaluate(query)
            .and_then(|nodes| nodes.first().and_then(|n| n.attribute(attribute)))
            .map(str::to_string);
        self.set(property, value);
    }

    /// Copy the text content of the first node matching `query` into `property`.
    pub fn set_property_from_text(&mut self, property: &str, query: &str) {
        let value = self.evaluate(query).and_then(|nodes| {
            nodes.first().map(|node| {
                node.descendants()
                    .filter(|n| n.is_text())
                    .filter_map(|n| n.text())
                    .collect::<String>()
            })
        });
        self.set(property, value);
    }

    fn set(&mut self, property: &str, value: Option<String>) {
        if let (Some(properties), Some(value)) = (self.properties.as_deref_mut(), value) {
            properties.insert(property.to_string(), value);
        }
    }

    /// Copy the vendor magnification and resolution to the standard
    /// objective power and microns-per-pixel properties.
    fn derive_standard_properties(&mut self) {
        let Some(properties) = self.properties.as_deref_mut() else {
            return;
        };

        let magnification = property_name("magnification");
        let resolution = property_name("resolution");
        duplicate_int_property(properties, &magnification, PROPERTY_NAME_OBJECTIVE_POWER);
        duplicate_double_property(properties, &resolution, PROPERTY_NAME_MPP_X);
        duplicate_double_property(properties, &resolution, PROPERTY_NAME_MPP_Y);
    }
}

fn not_xml() -> SlideError {
    SlideError::FormatNotSupported("Could not parse XML".to_string())
}

/// Decode an XML packet to text. Only the bytes before the first NUL are used.
///
/// The encoding named in the XML declaration is honoured; without one the
/// packet must be UTF-8.
///
/// # Errors
///
/// `FormatNotSupported` for an unknown encoding label or bytes that are
/// invalid in the packet's encoding.
pub fn decode_packet(xml: &[u8]) -> Result<Cow<'_, str>, SlideError> {
    let end = xml.iter().position(|&b| b == 0).unwrap_or(xml.len());
    let bytes = &xml[..end];

    let encoding = match declared_encoding(bytes) {
        // A UTF-16 label on an ASCII-compatible stream decodes as UTF-8
        Some(label) => Encoding::for_label(label.as_bytes())
            .map(Encoding::output_encoding)
            .ok_or_else(|| {
                debug!("XML packet declares unknown encoding {:?}", label);
                not_xml()
            })?,
        None => UTF_8,
    };

    if encoding == UTF_8 {
        return std::str::from_utf8(bytes).map(Cow::Borrowed).map_err(|e| {
            debug!("XML packet is not UTF-8: {}", e);
            not_xml()
        });
    }

    encoding
        .decode_without_bom_handling_and_without_replacement(bytes)
        .ok_or_else(|| {
            debug!("XML packet is not valid {}", encoding.name());
            not_xml()
        })
}

/// The `encoding` pseudo-attribute of a leading XML declaration.
fn declared_encoding(bytes: &[u8]) -> Option<&str> {
    let declaration = bytes.strip_prefix(b"<?xml")?;
    let end = declaration.windows(2).position(|w| w == b"?>")?;
    let declaration = std::str::from_utf8(&declaration[..end]).ok()?;
    find_value(declaration, "encoding")
}

// =============================================================================
// Scan info
// =============================================================================

/// Read the `iScan` attributes of an XML packet into `properties`.
///
/// Missing attributes are left unset.
///
/// # Errors
///
/// - `FormatNotSupported` if the packet is not XML
/// - `BadData` unless exactly one `iScan` element exists at the expected path
pub fn parse_scan_info(xml: &[u8], properties: Option<&mut PropertyMap>) -> Result<(), SlideError> {
    let text = decode_packet(xml)?;
    let mut document = MetadataDocument::parse(&text, properties)?;

    let count = document.evaluate(SCAN_INFO_PATH).map_or(0, |nodes| nodes.len());
    if count != 1 {
        return Err(SlideError::BadData(format!(
            "Expected one iScan element, found {}",
            count
        )));
    }

    for (suffix, attribute) in SCAN_INFO_ATTRIBUTES {
        document.set_property_from_attribute(&property_name(suffix), SCAN_INFO_PATH, attribute);
    }
    document.derive_standard_properties();

    Ok(())
}

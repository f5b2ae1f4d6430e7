//! XRD document parser

use super::{XRD, XRD_NAMESPACE};
use std::fs;
use std::path::Path;
use webfinger_lookup_common::{Descriptor, DiscoveryError, Result};

/// XRD document parser
///
/// Stateless and deterministic: the same input always yields a structurally
/// equal [`Descriptor`]. Holds no resources, so one instance can be shared
/// freely across threads and lookups.
#[derive(Debug, Clone, Copy, Default)]
pub struct DocumentParser;

impl DocumentParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse an XRD document from raw bytes
    ///
    /// # Example
    /// ```rust,ignore
    /// let descriptor = DocumentParser::new().parse(
    ///     br#"<XRD xmlns="http://docs.oasis-open.org/ns/xri/xrd-1.0"/>"#
    /// )?;
    /// assert!(descriptor.links.is_empty());
    /// ```
    pub fn parse<B: AsRef<[u8]>>(&self, input: B) -> Result<Descriptor> {
        let bytes = input.as_ref();
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Err(DiscoveryError::Parse("Empty XRD document".to_string()));
        }

        let text = std::str::from_utf8(bytes).map_err(|e| {
            DiscoveryError::Parse(format!("XRD document is not valid UTF-8: {}", e))
        })?;

        self.parse_str(text)
    }

    /// Parse an XRD document from a string
    pub fn parse_str(&self, text: &str) -> Result<Descriptor> {
        let text = text.trim_start_matches('\u{feff}');
        if text.trim().is_empty() {
            return Err(DiscoveryError::Parse("Empty XRD document".to_string()));
        }

        let document = roxmltree::Document::parse(text)
            .map_err(|e| DiscoveryError::Parse(format!("Failed to parse XRD XML: {}", e)))?;

        let root = document.root_element();
        let tag = root.tag_name();
        if tag.name() != XRD || tag.namespace() != Some(XRD_NAMESPACE) {
            return Err(DiscoveryError::Parse(format!(
                "Root is not an <XRD/> element in the {} namespace: found <{}>",
                XRD_NAMESPACE,
                tag.name()
            )));
        }

        super::converter::convert_xrd_to_descriptor(root)
    }

    /// Read and parse an XRD document from a file
    pub fn parse_file<P: AsRef<Path>>(&self, path: P) -> Result<Descriptor> {
        let content = fs::read(path.as_ref()).map_err(|e| {
            DiscoveryError::Parse(format!(
                "Failed to read XRD file {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;

        self.parse(content)
    }
}

//! XRD 1.0 parser
//!
//! Parses Extensible Resource Descriptor documents into the `Descriptor` model.
//!
//! ## Document Format
//!
//! XRD is an OASIS XML format in the `http://docs.oasis-open.org/ns/xri/xrd-1.0`
//! namespace. Two link encodings exist in the wild and both are accepted:
//!
//! - Element-based (early drafts):
//!   `<Link priority="10"><Rel>describedby</Rel><URITemplate>..</URITemplate></Link>`
//! - Attribute-based (XRD 1.0):
//!   `<Link rel="lrdd" type="application/xrd+xml" template="..."/>`
//!
//! ## Usage
//! ```rust,ignore
//! use webfinger_lookup_parser::DocumentParser;
//!
//! let parser = DocumentParser::new();
//! let descriptor = parser.parse(body)?;
//! ```

mod converter;
mod parser;

pub use parser::DocumentParser;

/// XRD 1.0 namespace
pub const XRD_NAMESPACE: &str = "http://docs.oasis-open.org/ns/xri/xrd-1.0";

/// XML Schema instance namespace, for `xsi:nil`
pub const XSI_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema-instance";

/// Built-in `xml:` namespace, for `xml:lang`
pub const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";

// Local names of elements read from the XRD namespace
pub(crate) const XRD: &str = "XRD";
pub(crate) const EXPIRES: &str = "Expires";
pub(crate) const SUBJECT: &str = "Subject";
pub(crate) const ALIAS: &str = "Alias";
pub(crate) const TYPE: &str = "Type";
pub(crate) const PROPERTY: &str = "Property";
pub(crate) const LINK: &str = "Link";
pub(crate) const REL: &str = "Rel";
pub(crate) const MEDIA_TYPE: &str = "MediaType";
pub(crate) const URI: &str = "URI";
pub(crate) const URI_TEMPLATE: &str = "URITemplate";
pub(crate) const TITLE: &str = "Title";

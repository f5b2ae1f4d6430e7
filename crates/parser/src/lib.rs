//! XRD document parsing for webfinger-lookup
//!
//! This crate turns the raw bytes of an XRD 1.0 discovery document (a
//! host-meta file or a per-user service descriptor) into a
//! [`Descriptor`](webfinger_lookup_common::Descriptor).
//!
//! ## Parsing Strategy
//!
//! The document is parsed into a namespace-aware element tree and walked
//! directly. Only elements in the XRD namespace are read:
//! - `Subject`, `Expires` → first one wins
//! - `Alias` → `aliases`, in order
//! - `Type`, `Property` → `properties`, in order
//! - `Link` → `links`, each with its own `Rel`, `MediaType`, `URI`,
//!   `URITemplate`, and `Title` children

pub mod xrd;

pub use xrd::DocumentParser;

//! Host-meta discovery client for webfinger-lookup
//!
//! Resolves an email-like identifier to its service descriptor in two stages:
//!
//! 1. Fetch `http://<domain>/.well-known/host-meta` and parse it as XRD
//! 2. Pick the highest-precedence `describedby` link, interpolate the
//!    identifier into its URI template, fetch that URL, and parse the result
//!
//! HTTP is behind the [`HttpTransport`] trait so callers can swap in their own
//! client (with caching, retries, or a test double). [`ReqwestTransport`] is
//! the blocking default.

mod client;
mod identifier;
mod selection;
mod template;
mod transport;

pub use client::{DiscoveryClient, LookupState};
pub use identifier::Identifier;
pub use selection::{select_by_priority, select_service_uri, sort_by_priority, Prioritized};
pub use template::{interpolate_template, ESCAPED_URI_PLACEHOLDER, URI_PLACEHOLDER};
pub use transport::{HttpResponse, HttpTransport, ReqwestTransport, XRD_ACCEPT};

//! Common types and utilities for webfinger-lookup
//!
//! This crate contains the descriptor model produced by the XRD parser, the
//! error type shared by the parser, discovery client, and CLI, and the client
//! configuration file format.

pub mod config;
mod descriptor;

pub use config::ClientConfig;
pub use descriptor::{Descriptor, Link, Property, PropertyKind, UriEntry};

use thiserror::Error;

/// Errors that can occur while resolving an identifier
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DiscoveryError {
    /// Malformed identifier or malformed/unparseable document
    #[error("Parse error: {0}")]
    Parse(String),

    /// A fetch completed with a non-success HTTP status
    #[error("Fetch error: {url} returned HTTP {status}")]
    Fetch { url: String, status: u16 },

    /// The transport could not complete a fetch at all
    #[error("Fetch error: request to {url} failed: {reason}")]
    Transport { url: String, reason: String },

    /// Document is well-formed but lacks the expected discovery link or template
    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Config error: {0}")]
    Config(String),
}

/// Category of a [`DiscoveryError`], for callers that branch on failure type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Parse,
    Fetch,
    Protocol,
    Config,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::Parse => write!(f, "ParseError"),
            ErrorKind::Fetch => write!(f, "FetchError"),
            ErrorKind::Protocol => write!(f, "ProtocolError"),
            ErrorKind::Config => write!(f, "ConfigError"),
        }
    }
}

impl DiscoveryError {
    /// Error category. Transport failures are reported as fetch failures.
    pub fn kind(&self) -> ErrorKind {
        match self {
            DiscoveryError::Parse(_) => ErrorKind::Parse,
            DiscoveryError::Fetch { .. } | DiscoveryError::Transport { .. } => ErrorKind::Fetch,
            DiscoveryError::Protocol(_) => ErrorKind::Protocol,
            DiscoveryError::Config(_) => ErrorKind::Config,
        }
    }

    /// Whether retrying the same lookup could succeed
    ///
    /// Only fetch failures may be transient; everything else is a problem with
    /// the caller's input or the remote domain's configuration.
    pub fn is_retriable(&self) -> bool {
        self.kind() == ErrorKind::Fetch
    }
}

/// Result type for discovery operations
pub type Result<T> = std::result::Result<T, DiscoveryError>;

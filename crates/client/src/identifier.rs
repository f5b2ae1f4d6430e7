//! Email-like identifier parsing
//!
//! Identifiers are treated as RFC 2822 `addr-spec`s restricted to the
//! dot-atom form on both sides of the `@`.

use regex::Regex;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;
use webfinger_lookup_common::{DiscoveryError, Result};

/// Characters allowed in an atom
const ATEXT: &str = r"[A-Za-z0-9_!#$%&'*+\-/=?^`{|}~]";

fn addr_spec_regex() -> &'static Regex {
    static ADDR_SPEC: OnceLock<Regex> = OnceLock::new();
    ADDR_SPEC.get_or_init(|| {
        let dot_atom = format!(r"{ATEXT}+(?:\.{ATEXT}+)*");
        Regex::new(&format!("^({dot_atom})@({dot_atom})$")).expect("addr-spec pattern is valid")
    })
}

/// A parsed `local-part@domain` identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identifier {
    addr_spec: String,
    local_part: String,
    domain: String,
}

impl Identifier {
    /// Parse an identifier, dropping any `Display Name <...>` wrapper
    ///
    /// # Example
    /// ```
    /// use webfinger_lookup_client::Identifier;
    ///
    /// let id = Identifier::parse("Brad <bradfitz@gmail.com>").unwrap();
    /// assert_eq!(id.local_part(), "bradfitz");
    /// assert_eq!(id.domain(), "gmail.com");
    /// ```
    pub fn parse(input: &str) -> Result<Self> {
        let addr_spec = strip_display_name(input);

        let captures = addr_spec_regex()
            .captures(addr_spec)
            .ok_or_else(|| DiscoveryError::Parse(format!("bad identifier: {:?}", input)))?;

        Ok(Self {
            addr_spec: addr_spec.to_string(),
            local_part: captures[1].to_string(),
            domain: captures[2].to_string(),
        })
    }

    /// The bare `local-part@domain` form
    pub fn addr_spec(&self) -> &str {
        &self.addr_spec
    }

    pub fn local_part(&self) -> &str {
        &self.local_part
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }
}

impl FromStr for Identifier {
    type Err = DiscoveryError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.addr_spec)
    }
}

/// `"Name" <local@domain>` → `local@domain`; anything else is only trimmed
fn strip_display_name(input: &str) -> &str {
    let trimmed = input.trim();
    if let Some(open) = trimmed.rfind('<') {
        let inner = &trimmed[open + 1..];
        if let Some(close) = inner.find('>') {
            return inner[..close].trim();
        }
    }
    trimmed
}

//! XRD descriptor model
//!
//! Plain value records built in full by the parser. Every repeated element
//! maps to a `Vec` that keeps document order, since order carries priority
//! meaning for entries sharing the same type or relation.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One parsed discovery document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Descriptor {
    /// URI identifying the described entity
    #[serde(default)]
    pub subject: Option<String>,

    /// Expiry timestamp, kept verbatim
    #[serde(default)]
    pub expires: Option<String>,

    /// Equivalent identifiers for the subject
    #[serde(default)]
    pub aliases: Vec<String>,

    #[serde(default)]
    pub properties: Vec<Property>,

    #[serde(default)]
    pub links: Vec<Link>,
}

/// A typed property (`<Property>`) or draft-format `<Type>` entry
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Property {
    /// Property type URI
    #[serde(rename = "type")]
    pub type_uri: String,

    /// Property value, absent for `<Type>` entries and nil properties
    #[serde(default)]
    pub value: Option<String>,

    /// Boolean flag: `xsi:nil` for properties, `required` for `<Type>` entries
    #[serde(default)]
    pub is_nil: bool,

    /// Element the entry was read from, which decides how `is_nil` reads
    #[serde(default)]
    pub kind: PropertyKind,
}

/// Source element of a [`Property`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyKind {
    #[default]
    Property,
    Type,
}

/// One relation entry within a descriptor
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    /// Relation types advertised by this link, without duplicates
    #[serde(default)]
    pub relations: Vec<String>,

    #[serde(default)]
    pub media_types: Vec<String>,

    #[serde(default)]
    pub uris: Vec<UriEntry>,

    #[serde(default)]
    pub uri_templates: Vec<UriEntry>,

    /// Human-readable titles keyed by language tag ("" when untagged)
    #[serde(default)]
    pub titles: BTreeMap<String, String>,

    /// Rank against sibling links, lower wins
    #[serde(default)]
    pub priority: Option<u64>,

    #[serde(default)]
    pub subject: Option<String>,
}

/// A URI or URI template with its own optional priority
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UriEntry {
    pub value: String,

    #[serde(default)]
    pub priority: Option<u64>,
}

impl Descriptor {
    /// Links advertising `rel`, in document order
    pub fn links_with_relation<'a, 'r>(
        &'a self,
        rel: &'r str,
    ) -> impl Iterator<Item = &'a Link> + 'r
    where
        'a: 'r,
    {
        self.links.iter().filter(move |link| link.has_relation(rel))
    }
}

impl Link {
    /// Check whether this link advertises the given relation
    pub fn has_relation(&self, rel: &str) -> bool {
        self.relations.iter().any(|r| r == rel)
    }

    /// Title for a language tag, falling back to the untagged title
    pub fn title(&self, lang: &str) -> Option<&str> {
        self.titles
            .get(lang)
            .or_else(|| self.titles.get(""))
            .map(String::as_str)
    }
}

impl UriEntry {
    pub fn new(value: impl Into<String>, priority: Option<u64>) -> Self {
        Self {
            value: value.into(),
            priority,
        }
    }
}

//! Priority-based selection among links, URIs, and URI templates
//!
//! Lower priority values win. Entries without a priority rank after every
//! explicit value, and ties keep document order.

use webfinger_lookup_common::{Link, UriEntry};

/// Anything carrying an optional XRD priority
pub trait Prioritized {
    fn priority(&self) -> Option<u64>;
}

impl Prioritized for Link {
    fn priority(&self) -> Option<u64> {
        self.priority
    }
}

impl Prioritized for UriEntry {
    fn priority(&self) -> Option<u64> {
        self.priority
    }
}

fn rank<T: Prioritized + ?Sized>(item: &T) -> (bool, u64) {
    match item.priority() {
        Some(priority) => (false, priority),
        None => (true, 0),
    }
}

/// Highest-precedence item, or `None` for an empty input
pub fn select_by_priority<'a, T, I>(items: I) -> Option<&'a T>
where
    T: Prioritized + 'a,
    I: IntoIterator<Item = &'a T>,
{
    // min_by_key returns the first of several equal minimums
    items.into_iter().min_by_key(|item| rank(*item))
}

/// All items in precedence order
pub fn sort_by_priority<'a, T, I>(items: I) -> Vec<&'a T>
where
    T: Prioritized + 'a,
    I: IntoIterator<Item = &'a T>,
{
    let mut sorted: Vec<&'a T> = items.into_iter().collect();
    sorted.sort_by_key(|item| rank(*item));
    sorted
}

/// Pick the service URI template from a link
///
/// Templates are preferred; plain URIs are the template-free fallback.
pub fn select_service_uri(link: &Link) -> Option<&UriEntry> {
    select_by_priority(&link.uri_templates).or_else(|| select_by_priority(&link.uris))
}

//! Converts an XRD element tree to the Descriptor model

use super::{
    ALIAS, EXPIRES, LINK, MEDIA_TYPE, PROPERTY, REL, SUBJECT, TITLE, TYPE, URI, URI_TEMPLATE,
    XML_NAMESPACE, XRD_NAMESPACE, XSI_NAMESPACE,
};
use roxmltree::Node;
use tracing::trace;
use webfinger_lookup_common::{
    Descriptor, DiscoveryError, Link, Property, PropertyKind, Result, UriEntry,
};

/// Literal attribute values that count as boolean true
const TRUE_VALUES: [&str; 2] = ["true", "1"];

/// Convert the `<XRD>` root element to a Descriptor
pub fn convert_xrd_to_descriptor(xrd: Node<'_, '_>) -> Result<Descriptor> {
    let mut descriptor = Descriptor::default();

    for element in xrd_children(xrd) {
        match element.tag_name().name() {
            SUBJECT => {
                if descriptor.subject.is_none() {
                    descriptor.subject = Some(element_text(element));
                }
            }
            EXPIRES => {
                if descriptor.expires.is_none() {
                    descriptor.expires = Some(element_text(element));
                }
            }
            ALIAS => descriptor.aliases.push(element_text(element)),
            TYPE => descriptor.properties.push(convert_type(element)),
            PROPERTY => descriptor.properties.push(convert_property(element)),
            LINK => descriptor.links.push(convert_link(element)?),
            other => trace!(element = other, "Skipping unknown XRD element"),
        }
    }

    Ok(descriptor)
}

/// Draft-format `<Type required="..">uri</Type>`
fn convert_type(element: Node<'_, '_>) -> Property {
    Property {
        type_uri: element_text(element),
        value: None,
        is_nil: is_true(element.attribute("required")),
        kind: PropertyKind::Type,
    }
}

/// XRD 1.0 `<Property type="uri" xsi:nil="..">value</Property>`
fn convert_property(element: Node<'_, '_>) -> Property {
    let is_nil = is_true(element.attribute((XSI_NAMESPACE, "nil")));
    let type_uri = element.attribute("type").unwrap_or_default().trim().to_string();
    if type_uri.is_empty() {
        trace!("<Property> element has no type attribute");
    }

    Property {
        type_uri,
        value: if is_nil { None } else { Some(element_text(element)) },
        is_nil,
        kind: PropertyKind::Property,
    }
}

/// Convert a `<Link>` element, accepting both attribute and child-element encodings
fn convert_link(element: Node<'_, '_>) -> Result<Link> {
    let mut link = Link {
        priority: parse_priority(element)?,
        ..Default::default()
    };

    // Attribute encoding goes first so it ranks ahead of child elements
    if let Some(rel) = element.attribute("rel") {
        add_relation(&mut link, rel);
    }
    if let Some(media_type) = non_empty(element.attribute("type")) {
        link.media_types.push(media_type);
    }
    if let Some(href) = non_empty(element.attribute("href")) {
        link.uris.push(UriEntry::new(href, None));
    }
    if let Some(template) = non_empty(element.attribute("template")) {
        link.uri_templates.push(UriEntry::new(template, None));
    }

    for child in xrd_children(element) {
        match child.tag_name().name() {
            REL => add_relation(&mut link, &element_text(child)),
            MEDIA_TYPE => link.media_types.push(element_text(child)),
            URI => link
                .uris
                .push(UriEntry::new(element_text(child), parse_priority(child)?)),
            URI_TEMPLATE => link
                .uri_templates
                .push(UriEntry::new(element_text(child), parse_priority(child)?)),
            TITLE => {
                let lang = child.attribute((XML_NAMESPACE, "lang")).unwrap_or_default();
                link.titles
                    .entry(lang.to_string())
                    .or_insert_with(|| element_text(child));
            }
            SUBJECT => {
                if link.subject.is_none() {
                    link.subject = Some(element_text(child));
                }
            }
            other => trace!(element = other, "Skipping unknown Link child element"),
        }
    }

    Ok(link)
}

/// Child elements in the XRD namespace; foreign extension elements are skipped
fn xrd_children<'a, 'input>(
    node: Node<'a, 'input>,
) -> impl Iterator<Item = Node<'a, 'input>> {
    node.children()
        .filter(|child| child.is_element())
        .filter(|child| {
            let in_namespace = child.tag_name().namespace() == Some(XRD_NAMESPACE);
            if !in_namespace {
                trace!(
                    element = child.tag_name().name(),
                    namespace = child.tag_name().namespace().unwrap_or_default(),
                    "Ignoring element outside the XRD namespace"
                );
            }
            in_namespace
        })
}

/// Concatenated, trimmed text content of an element
fn element_text(element: Node<'_, '_>) -> String {
    element
        .children()
        .filter(|child| child.is_text())
        .filter_map(|child| child.text())
        .collect::<String>()
        .trim()
        .to_string()
}

/// Optional non-negative integer `priority` attribute
fn parse_priority(element: Node<'_, '_>) -> Result<Option<u64>> {
    match element.attribute("priority") {
        None => Ok(None),
        Some(raw) => raw.trim().parse::<u64>().map(Some).map_err(|e| {
            DiscoveryError::Parse(format!(
                "Invalid priority {:?} on <{}> element: {}",
                raw,
                element.tag_name().name(),
                e
            ))
        }),
    }
}

/// Relations form an ordered set, so repeats are dropped
fn add_relation(link: &mut Link, rel: &str) {
    let rel = rel.trim();
    if !rel.is_empty() && !link.has_relation(rel) {
        link.relations.push(rel.to_string());
    }
}

fn is_true(value: Option<&str>) -> bool {
    value.is_some_and(|v| TRUE_VALUES.contains(&v))
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

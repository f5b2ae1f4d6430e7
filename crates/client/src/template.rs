//! URI template interpolation
//!
//! Only two placeholders exist: `{uri}` takes the identifier verbatim and
//! `{%uri}` takes it percent-encoded. Everything else is copied through.

/// Replaced by the identifier as-is
pub const URI_PLACEHOLDER: &str = "{uri}";

/// Replaced by the percent-encoded identifier
pub const ESCAPED_URI_PLACEHOLDER: &str = "{%uri}";

/// Substitute `identifier` into every placeholder in `template`
///
/// Single left-to-right pass, so placeholder-like text inside the identifier
/// is never expanded again.
pub fn interpolate_template(template: &str, identifier: &str) -> String {
    let escaped = urlencoding::encode(identifier);
    let mut output = String::with_capacity(template.len() + escaped.len());
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        output.push_str(&rest[..start]);
        let tail = &rest[start..];

        if let Some(after) = tail.strip_prefix(URI_PLACEHOLDER) {
            output.push_str(identifier);
            rest = after;
        } else if let Some(after) = tail.strip_prefix(ESCAPED_URI_PLACEHOLDER) {
            output.push_str(&escaped);
            rest = after;
        } else {
            output.push('{');
            rest = &tail[1..];
        }
    }

    output.push_str(rest);
    output
}

//! Designer name resolution
//!
//! Luminaires reference their designer by a free-text string that often
//! carries life dates, e.g. `"Jean Prouvé (1901-1984)"`. The part before the
//! first `(` is the *derived key*: it is what designers are matched on and
//! what slugs are built from.

/// Substring before the first `(`, trimmed
pub fn derived_key(designer: &str) -> &str {
    match designer.find('(') {
        Some(idx) => designer[..idx].trim(),
        None => designer.trim(),
    }
}

/// URL-safe slug for a designer string
///
/// Lowercased derived key, whitespace runs become a single `-`, anything that
/// is not alphanumeric or `-` is dropped. Accented letters are kept (they are
/// alphanumeric), so `"Jean Prouvé"` becomes `"jean-prouvé"`.
pub fn slugify(designer: &str) -> String {
    let key = derived_key(designer).to_lowercase();
    let mut slug = String::with_capacity(key.len());
    let mut pending_dash = false;

    for ch in key.chars() {
        if ch.is_whitespace() {
            pending_dash = !slug.is_empty();
        } else if ch.is_alphanumeric() || ch == '-' {
            if pending_dash {
                slug.push('-');
                pending_dash = false;
            }
            slug.push(ch);
        }
    }

    slug
}

/// Case-insensitive equality on derived keys
///
/// Exact match only: no fuzzy or edit-distance tolerance. Empty keys never
/// match anything.
pub fn same_designer(a: &str, b: &str) -> bool {
    let a = derived_key(a);
    let b = derived_key(b);
    !a.is_empty() && a.to_lowercase() == b.to_lowercase()
}

/// Check whether a lookup term (name, derived key or slug) designates the
/// given designer string
pub fn matches_lookup(designer: &str, lookup: &str) -> bool {
    same_designer(designer, lookup) || {
        let slug = slugify(designer);
        !slug.is_empty() && slug == lookup.trim().to_lowercase()
    }
}

//! Slug generation for named entities.

/// Build a URL-friendly slug from a display name.
///
/// Lowercases ASCII letters and keeps digits. Apostrophes are dropped and any
/// other run of characters becomes a single `-`, never leading or trailing.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;

    for c in name.chars() {
        if c == '\'' {
            continue;
        }

        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }

    slug
}

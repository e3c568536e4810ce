//! URL slugs for broker display names.
//!
//! "IC Markets Global" → "ic-markets-global". Only ASCII word characters,
//! whitespace and hyphens survive; a name written entirely in another script
//! slugifies to the empty string.

/// Convert a display name into a lowercase, hyphen-separated slug.
pub fn broker_name_to_slug(name: &str) -> String {
    let lowered = name.to_lowercase();
    let mut slug = String::with_capacity(lowered.len());
    let mut pending_hyphen = false;

    for c in lowered.trim().chars() {
        if c.is_whitespace() || c == '-' {
            pending_hyphen = true;
        } else if c.is_ascii_alphanumeric() || c == '_' {
            if pending_hyphen {
                slug.push('-');
                pending_hyphen = false;
            }
            slug.push(c);
        }
        // Anything else is dropped without breaking the current word.
    }
    if pending_hyphen {
        slug.push('-');
    }
    slug
}

/// Best-effort inverse of [`broker_name_to_slug`]: hyphens become spaces and
/// each word is capitalised.
pub fn slug_to_broker_name(slug: &str) -> String {
    slug.replace('-', " ")
        .split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

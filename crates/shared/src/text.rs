//! Text normalization for matching question titles and answers.
//!
//! Portuguese labels show up with and without accents ("Informação" vs
//! "Informacao") and with inconsistent casing, so every comparison in the
//! pipeline goes through [`fold`].

use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

/// Folds text for comparison.
///
/// - Unicode NFD decomposition with combining marks dropped (accent folding)
/// - Lowercase
/// - Whitespace trimmed and collapsed to single spaces
///
/// # Examples
///
/// ```
/// use shared::text::fold;
///
/// assert_eq!(fold("  Nome do  Cliente "), "nome do cliente");
/// assert_eq!(fold("Informação"), "informacao");
/// ```
pub fn fold(s: &str) -> String {
    let stripped: String = s
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect();

    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Returns true if both strings fold to the same value.
pub fn eq_folded(a: &str, b: &str) -> bool {
    fold(a) == fold(b)
}

/// Generates a URL-safe slug from a name.
pub fn slugify(name: &str) -> String {
    fold(name)
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect::<String>()
        .split('-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

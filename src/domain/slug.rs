//! Text folding for slug and category-name comparisons.
//!
//! Category slugs typed by editors ("politica") and display names stored by the
//! CMS ("Política") must compare equal. Folding applies NFD decomposition,
//! drops combining marks and lower-cases the rest.

use unicode_normalization::{UnicodeNormalization, char::is_combining_mark};

/// Fold `value` into its diacritic-free, lower-case comparison form.
pub fn fold(value: &str) -> String {
    value
        .trim()
        .nfd()
        .filter(|ch| !is_combining_mark(*ch))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Derive a WordPress-style slug from a permalink path segment.
///
/// The segment is percent-decoded and lower-cased, and every run of
/// characters other than letters and digits collapses into one `-`.
/// Non-ASCII letters survive and are re-encoded with lower-case hex, which is
/// the form WordPress stores in `slug`. Returns `None` when the decoded bytes
/// are not UTF-8 or nothing representable remains.
pub fn permalink_slug(segment: &str) -> Option<String> {
    let decoded = urlencoding::decode(segment).ok()?;

    let mut slug = String::with_capacity(decoded.len());
    let mut pending_dash = false;
    for ch in decoded.nfc().flat_map(char::to_lowercase) {
        if ch.is_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(ch);
        } else {
            pending_dash = true;
        }
    }

    if slug.is_empty() {
        return None;
    }
    Some(urlencoding::encode(&slug).to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fold_strips_diacritics_and_case() {
        assert_eq!(fold("Política"), "politica");
        assert_eq!(fold("ENGAÑADORES"), "enganadores");
        assert_eq!(fold("  Économie "), "economie");
    }

    #[test]
    fn fold_is_idempotent() {
        let once = fold("Cañón Ñandú");
        assert_eq!(fold(&once), once);
    }

    #[test]
    fn permalink_slug_normalizes_ascii_segments() {
        assert_eq!(permalink_slug("foo").as_deref(), Some("foo"));
        assert_eq!(permalink_slug("Hola Mundo").as_deref(), Some("hola-mundo"));
        assert_eq!(permalink_slug("Hola_Mundo").as_deref(), Some("hola-mundo"));
        assert_eq!(permalink_slug("--a--b--").as_deref(), Some("a-b"));
        assert!(permalink_slug("---").is_none());
    }

    #[test]
    fn permalink_slug_keeps_accents_in_wordpress_form() {
        assert_eq!(permalink_slug("engaño").as_deref(), Some("enga%c3%b1o"));
        assert_eq!(permalink_slug("enga%c3%b1o").as_deref(), Some("enga%c3%b1o"));
        assert_eq!(permalink_slug("ENGA%C3%91O").as_deref(), Some("enga%c3%b1o"));
        // Decomposed "n" + combining tilde composes before slugging.
        assert_eq!(permalink_slug("engan\u{303}o").as_deref(), Some("enga%c3%b1o"));
    }

    #[test]
    fn permalink_slug_rejects_invalid_utf8() {
        assert!(permalink_slug("%ff%fe").is_none());
    }
}

//! URL slugs for content names.
//!
//! Ministry detail pages live at `/ministries/{slug}`. Slugs are stored in the
//! base's `Slug` column; [`slugify`] derives one from a display name when the
//! column is empty, which the `seed add-slugs` command writes back.
//!
//! - `"727 Student Ministry"` → `727-student-ministry`
//! - `"Children's Ministry"` → `childrens-ministry` (apostrophes drop out)
//! - `"Men's Ministry (CFBC Fraternity)"` → `mens-ministry-cfbc-fraternity`

/// Lowercase ASCII words joined by single dashes.
///
/// Apostrophes are removed without splitting the word. Every other run of
/// non-alphanumeric characters becomes one dash, and leading or trailing
/// dashes are trimmed.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;
    for c in name.chars() {
        if c == '\'' || c == '\u{2019}' {
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

/// Whether `s` could have come out of [`slugify`].
pub fn is_slug(s: &str) -> bool {
    !s.is_empty()
        && !s.starts_with('-')
        && !s.ends_with('-')
        && !s.contains("--")
        && s
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_and_words() {
        assert_eq!(slugify("727 Student Ministry"), "727-student-ministry");
    }

    #[test]
    fn apostrophes_drop_out() {
        assert_eq!(slugify("Children's Ministry"), "childrens-ministry");
        assert_eq!(slugify("Women\u{2019}s Ministry"), "womens-ministry");
    }

    #[test]
    fn punctuation_runs_collapse() {
        assert_eq!(
            slugify("Men's Ministry (CFBC Fraternity)"),
            "mens-ministry-cfbc-fraternity"
        );
        assert_eq!(slugify("  --Helping   Hands--  "), "helping-hands");
    }

    #[test]
    fn non_ascii_is_a_separator() {
        assert_eq!(slugify("Café Night"), "caf-night");
    }

    #[test]
    fn empty_and_symbols_only() {
        assert_eq!(slugify(""), "");
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn slug_check() {
        assert!(is_slug("mens-ministry"));
        assert!(is_slug("727-student-ministry"));
        assert!(!is_slug("Mens-Ministry"));
        assert!(!is_slug("-lead"));
        assert!(!is_slug("a--b"));
        assert!(!is_slug(""));
        assert!(!is_slug("../etc"));
    }

    #[test]
    fn slugify_output_passes_check() {
        for name in ["Music Ministry", "Adult Bible Fellowship", "Helping Hands Food Pantry"] {
            assert!(is_slug(&slugify(name)), "{name}");
        }
    }
}

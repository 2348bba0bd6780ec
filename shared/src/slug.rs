//! URL slug generation

use regex_lite::Regex;
use std::sync::OnceLock;

fn separators() -> &'static Regex {
    static SEPARATORS: OnceLock<Regex> = OnceLock::new();
    SEPARATORS.get_or_init(|| Regex::new(r"[^a-z0-9]+").expect("slug pattern is valid"))
}

/// Derive a URL slug from a title
///
/// Lowercases the title, collapses every run of characters outside
/// `[a-z0-9]` into a single `-`, and trims leading and trailing dashes.
pub fn generate_slug(title: &str) -> String {
    let lowered = title.to_lowercase();
    separators()
        .replace_all(&lowered, "-")
        .trim_matches('-')
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    #[rstest]
    #[case("Hello World", "hello-world")]
    #[case("  Rust & Axum: 101!  ", "rust-axum-101")]
    #[case("already-a-slug", "already-a-slug")]
    #[case("Año nuevo", "a-o-nuevo")]
    #[case("!!!", "")]
    fn test_generate_slug(#[case] title: &str, #[case] want: &str) {
        assert_eq!(generate_slug(title), want);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Slugs only ever contain lowercase alphanumerics and single inner dashes
        #[test]
        fn prop_slug_is_url_safe(title in ".{0,80}") {
            let slug = generate_slug(&title);
            prop_assert!(slug.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'));
            prop_assert!(!slug.starts_with('-') && !slug.ends_with('-'));
            prop_assert!(!slug.contains("--"));
        }

        /// Slug generation is idempotent
        #[test]
        fn prop_slug_idempotent(title in ".{0,80}") {
            let slug = generate_slug(&title);
            prop_assert_eq!(generate_slug(&slug), slug);
        }
    }
}

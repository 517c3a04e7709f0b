//! [`FuzzPattern`] definition.

use derive_more::Display;
use itertools::Itertools as _;
use postgres_types::{FromSql, ToSql};

/// `SIMILAR TO` pattern matching any of the whitespace-separated words of a
/// search input, anywhere in a text.
#[derive(Clone, Debug, Display, Eq, FromSql, PartialEq, ToSql)]
#[postgres(transparent)]
pub struct FuzzPattern(String);

impl FuzzPattern {
    /// Characters having a special meaning in a `SIMILAR TO` pattern.
    const SPECIAL: &'static [char] = &[
        '\\', '%', '_', '|', '*', '+', '?', '{', '}', '(', ')', '[', ']',
    ];

    /// Creates a new [`FuzzPattern`] out of the given search `input`.
    #[must_use]
    pub fn new(input: &str) -> Self {
        let words = input.split_whitespace().format_with("|", |word, f| {
            f(&format_args!("%{}%", Self::escape(word)))
        });
        Self(format!("({words})"))
    }

    /// Escapes all the [`FuzzPattern::SPECIAL`] characters in the `word`.
    fn escape(word: &str) -> String {
        word.chars().fold(String::with_capacity(word.len()), |mut s, c| {
            if Self::SPECIAL.contains(&c) {
                s.push('\\');
            }
            s.push(c);
            s
        })
    }
}

#[cfg(test)]
mod tests {
    use super::FuzzPattern;

    #[test]
    fn matches_any_word() {
        assert_eq!(
            FuzzPattern::new("  Acme   cleaning ").to_string(),
            "(%Acme%|%cleaning%)",
        );
    }

    #[test]
    fn escapes_special_characters() {
        assert_eq!(
            FuzzPattern::new("50% (net)").to_string(),
            r"(%50\%%|%\(net\)%)",
        );
        assert_eq!(FuzzPattern::new("a_b|c").to_string(), r"(%a\_b\|c%)");
    }
}

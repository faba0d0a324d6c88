//! LIKE pattern construction
//!
//! User text is always a literal. `%`, `_` and the escape character itself
//! are escaped before the wildcards for the requested match kind are added,
//! so `x%` can only ever match the two characters `x%`.
//!
//! Case-insensitive text operators compare [`fold_case`]d values on both
//! sides: the stored column and the bound literal.

use std::fmt;

/// Escape character the evaluator must declare (`LIKE ? ESCAPE '\'`)
pub const LIKE_ESCAPE: char = '\\';

/// Where the literal must appear in the value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchKind {
    Contains,
    Prefix,
    Suffix,
}

/// A ready-to-bind LIKE pattern built from literal user text
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LikePattern(String);

impl LikePattern {
    pub fn new(kind: MatchKind, literal: &str) -> Self {
        let escaped = escape(literal);
        let pattern = match kind {
            MatchKind::Contains => format!("%{escaped}%"),
            MatchKind::Prefix => format!("{escaped}%"),
            MatchKind::Suffix => format!("%{escaped}"),
        };
        Self(pattern)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LikePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Full Unicode lowercase mapping used for every case-insensitive comparison
pub fn fold_case(text: &str) -> String {
    text.to_lowercase()
}

fn escape(literal: &str) -> String {
    let mut escaped = String::with_capacity(literal.len());
    for c in literal.chars() {
        if matches!(c, '%' | '_' | LIKE_ESCAPE) {
            escaped.push(LIKE_ESCAPE);
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wildcards_are_placed_by_kind() {
        assert_eq!(LikePattern::new(MatchKind::Contains, "abc").as_str(), "%abc%");
        assert_eq!(LikePattern::new(MatchKind::Prefix, "abc").as_str(), "abc%");
        assert_eq!(LikePattern::new(MatchKind::Suffix, "abc").as_str(), "%abc");
    }

    #[test]
    fn meta_characters_are_escaped() {
        assert_eq!(
            LikePattern::new(MatchKind::Contains, r"50%_off\").as_str(),
            r"%50\%\_off\\%"
        );
    }

    #[test]
    fn folding_covers_non_ascii_letters() {
        assert_eq!(fold_case("BJÖRK"), fold_case("Björk"));
        assert_eq!(fold_case("ÉMILIE SIMON"), "émilie simon");
        assert_eq!(fold_case(r"50%_OFF\"), r"50%_off\");
    }

    #[test]
    fn quotes_pass_through_untouched() {
        assert_eq!(
            LikePattern::new(MatchKind::Contains, "o'brien").as_str(),
            "%o'brien%"
        );
    }
}

//! Cohort levels: the leading digit of a module code

use std::collections::BTreeSet;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid level '{0}': expected a digit such as 1, 2nd or \"3rd year\"")]
pub struct LevelParseError(pub String);

/// Set of level prefixes a module code may start with
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LevelFilter {
    prefixes: BTreeSet<char>,
}

impl LevelFilter {
    pub fn new<I: IntoIterator<Item = char>>(prefixes: I) -> Self {
        Self {
            prefixes: prefixes.into_iter().collect(),
        }
    }

    /// 1st, 2nd and 3rd year
    pub fn all() -> Self {
        Self::new(['1', '2', '3'])
    }

    /// Parse level names such as `"2"`, `"2nd"` or `"2nd year"`
    pub fn parse_all<'a, I: IntoIterator<Item = &'a str>>(
        levels: I,
    ) -> Result<Self, LevelParseError> {
        let mut prefixes = BTreeSet::new();
        for level in levels {
            prefixes.insert(parse_level(level)?);
        }
        Ok(Self { prefixes })
    }

    pub fn prefixes(&self) -> impl Iterator<Item = char> + '_ {
        self.prefixes.iter().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.prefixes.is_empty()
    }

    /// Whether a module code starts with one of the levels
    pub fn matches(&self, module_code: &str) -> bool {
        module_code
            .chars()
            .next()
            .is_some_and(|c| self.prefixes.contains(&c))
    }
}

impl FromStr for LevelFilter {
    type Err = LevelParseError;

    /// Comma-separated levels, e.g. `"1,2nd"`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_all(s.split(',').map(str::trim).filter(|l| !l.is_empty()))
    }
}

fn parse_level(level: &str) -> Result<char, LevelParseError> {
    let trimmed = level.trim();
    let lower = trimmed.to_lowercase();
    let rest = lower.strip_suffix("year").unwrap_or(&lower).trim_end();
    let mut chars = rest.chars();
    let digit = chars
        .next()
        .filter(|c| c.is_ascii_digit() && *c != '0')
        .ok_or_else(|| LevelParseError(trimmed.to_string()))?;
    match chars.as_str() {
        "" | "st" | "nd" | "rd" | "th" => Ok(digit),
        _ => Err(LevelParseError(trimmed.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_levels() {
        assert_eq!(parse_level("2"), Ok('2'));
        assert_eq!(parse_level("1st"), Ok('1'));
        assert_eq!(parse_level("3rd year"), Ok('3'));
        assert_eq!(parse_level(" 2nd Year "), Ok('2'));
        assert!(parse_level("second").is_err());
        assert!(parse_level("12").is_err());
        assert!(parse_level("0").is_err());
        assert!(parse_level("").is_err());
    }

    #[test]
    fn test_matches_leading_digit() {
        let filter = LevelFilter::new(['2']);
        assert!(filter.matches("205"));
        assert!(!filter.matches("101"));
        assert!(!filter.matches("310"));
        assert!(!filter.matches(""));
        assert!(!LevelFilter::default().matches("205"));
    }

    #[test]
    fn test_from_str() {
        let filter: LevelFilter = "1, 3rd year".parse().unwrap();
        assert_eq!(filter.prefixes().collect::<Vec<_>>(), vec!['1', '3']);
        assert!("4th,x".parse::<LevelFilter>().is_err());
    }
}

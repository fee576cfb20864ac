//! Writer name and tag patterns
//!
//! Three pattern kinds, shared by name matching and tag matching:
//!
//! - **Exact**: case-sensitive string equality
//! - **Wildcard**: `*`/`?` glob semantics, anchored to the full string
//! - **Regex**: unanchored unless the pattern anchors itself
//!
//! Wildcards and regexes are compiled once when the pattern is built, so a
//! match in the activation engine allocates nothing.

use regex::Regex;

use crate::error::{LevelError, Result};

/// Pattern kind discriminant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternKind {
    /// Case-sensitive string equality
    Exact,
    /// `*`/`?` glob anchored to the full string
    Wildcard,
    /// Regular expression (unanchored)
    Regex,
}

/// A compiled writer name / tag pattern
#[derive(Debug, Clone)]
pub struct Pattern {
    kind: PatternKind,
    raw: String,
    /// Compiled matcher for wildcard and regex kinds
    compiled: Option<Regex>,
}

impl Pattern {
    /// Create an exact-match pattern
    pub fn exact(text: impl Into<String>) -> Self {
        Self {
            kind: PatternKind::Exact,
            raw: text.into(),
            compiled: None,
        }
    }

    /// Create a wildcard pattern (`*` matches any run, `?` a single char)
    ///
    /// # Errors
    ///
    /// Returns `LevelError::InvalidPattern` if the translated glob fails to
    /// compile (cannot happen for well-formed input but kept as a guard).
    pub fn wildcard(glob: impl Into<String>) -> Result<Self> {
        let raw = glob.into();
        let translated = wildcard_to_regex(&raw);
        let compiled = Regex::new(&translated)
            .map_err(|e| LevelError::invalid_pattern(&raw, e.to_string()))?;
        Ok(Self {
            kind: PatternKind::Wildcard,
            raw,
            compiled: Some(compiled),
        })
    }

    /// Create a regex pattern
    ///
    /// # Errors
    ///
    /// Returns `LevelError::InvalidPattern` for invalid regex syntax.
    pub fn regex(pattern: impl Into<String>) -> Result<Self> {
        let raw = pattern.into();
        let compiled =
            Regex::new(&raw).map_err(|e| LevelError::invalid_pattern(&raw, e.to_string()))?;
        Ok(Self {
            kind: PatternKind::Regex,
            raw,
            compiled: Some(compiled),
        })
    }

    /// Parse a pattern from its configuration spelling
    ///
    /// `exact:` and `regex:` prefixes select those kinds; anything else is a
    /// wildcard (a bare name without `*`/`?` degenerates to equality).
    pub fn parse(spec: &str) -> Result<Self> {
        if let Some(text) = spec.strip_prefix("exact:") {
            Ok(Self::exact(text))
        } else if let Some(pattern) = spec.strip_prefix("regex:") {
            Self::regex(pattern)
        } else {
            Self::wildcard(spec)
        }
    }

    /// The pattern kind
    #[inline]
    pub fn kind(&self) -> PatternKind {
        self.kind
    }

    /// The original pattern text (without any kind prefix)
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Test an input string against the pattern
    #[inline]
    pub fn matches(&self, input: &str) -> bool {
        match self.kind {
            PatternKind::Exact => self.raw == input,
            // compiled is always Some for these kinds
            PatternKind::Wildcard | PatternKind::Regex => self
                .compiled
                .as_ref()
                .is_some_and(|re| re.is_match(input)),
        }
    }
}

/// Translate a `*`/`?` glob into an anchored regex
fn wildcard_to_regex(glob: &str) -> String {
    let mut out = String::with_capacity(glob.len() + 8);
    out.push('^');
    for ch in glob.chars() {
        match ch {
            '*' => out.push_str(".*"),
            '?' => out.push('.'),
            c => out.push_str(&regex::escape(&c.to_string())),
        }
    }
    out.push('$');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_is_case_sensitive() {
        let p = Pattern::exact("Storage");
        assert!(p.matches("Storage"));
        assert!(!p.matches("storage"));
        assert!(!p.matches("StorageEngine"));
    }

    #[test]
    fn test_wildcard_anchored() {
        let p = Pattern::wildcard("Foo*").unwrap();
        assert!(p.matches("Foo"));
        assert!(p.matches("FooBar"));
        assert!(!p.matches("AFooBar"));

        let q = Pattern::wildcard("Net?ork").unwrap();
        assert!(q.matches("Network"));
        assert!(q.matches("Netzork"));
        assert!(!q.matches("Netork"));
    }

    #[test]
    fn test_wildcard_escapes_regex_metachars() {
        let p = Pattern::wildcard("a.b+c*").unwrap();
        assert!(p.matches("a.b+c"));
        assert!(p.matches("a.b+cxyz"));
        assert!(!p.matches("aXb+c"));
    }

    #[test]
    fn test_regex_unanchored() {
        let p = Pattern::regex("Foo").unwrap();
        assert!(p.matches("AFooB"));

        let anchored = Pattern::regex("^Foo$").unwrap();
        assert!(anchored.matches("Foo"));
        assert!(!anchored.matches("FooBar"));
    }

    #[test]
    fn test_invalid_regex_is_setup_error() {
        let err = Pattern::regex("[unclosed").unwrap_err();
        assert!(matches!(err, LevelError::InvalidPattern { .. }));
    }

    #[test]
    fn test_parse_prefixes() {
        assert_eq!(Pattern::parse("exact:Foo*").unwrap().kind(), PatternKind::Exact);
        assert_eq!(Pattern::parse("regex:^F").unwrap().kind(), PatternKind::Regex);
        assert_eq!(Pattern::parse("Foo*").unwrap().kind(), PatternKind::Wildcard);

        // exact keeps the glob chars literal
        let p = Pattern::parse("exact:Foo*").unwrap();
        assert!(p.matches("Foo*"));
        assert!(!p.matches("FooBar"));
    }
}

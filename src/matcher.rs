//! Composable name matchers.
//!
//! Primitive matchers (substring, suffix, regex) combined with `any`, `every`
//! and `negate`. All architecture, OS, archive and checksum heuristics are
//! built from these.

use regex::Regex;

pub trait Matcher: Send + Sync {
    fn matches(&self, name: &str) -> bool;
}

impl<F> Matcher for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn matches(&self, name: &str) -> bool {
        self(name)
    }
}

pub type BoxMatcher = Box<dyn Matcher>;

/// Matches when the name contains every one of `subs`.
pub fn substr(subs: &[&str]) -> BoxMatcher {
    let subs: Vec<String> = subs.iter().map(|s| s.to_string()).collect();
    Box::new(move |name: &str| subs.iter().all(|s| name.contains(s.as_str())))
}

pub fn ends_with(suffix: &str) -> BoxMatcher {
    let suffix = suffix.to_string();
    Box::new(move |name: &str| name.ends_with(suffix.as_str()))
}

/// Matches when the name matches every one of `patterns`.
///
/// Patterns are compile-time constants; an invalid one is a programming error.
pub fn regex(patterns: &[&str]) -> BoxMatcher {
    let rxs: Vec<Regex> = patterns
        .iter()
        .map(|p| Regex::new(p).unwrap_or_else(|e| panic!("invalid matcher regex {p:?}: {e}")))
        .collect();
    Box::new(move |name: &str| rxs.iter().all(|rx| rx.is_match(name)))
}

pub fn any(matchers: Vec<BoxMatcher>) -> BoxMatcher {
    Box::new(move |name: &str| matchers.iter().any(|m| m.matches(name)))
}

pub fn every(matchers: Vec<BoxMatcher>) -> BoxMatcher {
    Box::new(move |name: &str| matchers.iter().all(|m| m.matches(name)))
}

pub fn negate(matcher: BoxMatcher) -> BoxMatcher {
    Box::new(move |name: &str| !matcher.matches(name))
}

/// Lower-cases `name` before testing it.
pub fn matches_lowercase(matcher: &dyn Matcher, name: &str) -> bool {
    matcher.matches(&name.to_lowercase())
}

//! Line classification for pipeline logs.
//!
//! Processing steps tag their log lines with the level name, so classification
//! is plain, case-sensitive substring search. A missing log is replaced by a
//! line starting with `NOT FOUND`, which classifies as a failure.

/// Substrings marking a failed step.
pub const FAILURE_MARKERS: [&str; 3] = ["ERROR", "CRITICAL", "NOT FOUND"];

/// Substrings marking a warning.
pub const WARNING_MARKERS: [&str; 1] = ["WARNING"];

pub fn is_failure(line: &str) -> bool {
    FAILURE_MARKERS.iter().any(|m| line.contains(m))
}

pub fn is_warning(line: &str) -> bool {
    WARNING_MARKERS.iter().any(|m| line.contains(m))
}

/// Worth showing in a text digest: a failure or a warning.
pub fn is_alertable(line: &str) -> bool {
    is_failure(line) || is_warning(line)
}

/// A test applied to every line of a log.
///
/// Implemented for any `Fn(&str) -> bool`, so the classifier functions above
/// and ad-hoc closures can both be passed where a predicate is expected.
pub trait LinePredicate {
    fn matches(&self, line: &str) -> bool;
}

impl<F> LinePredicate for F
where
    F: Fn(&str) -> bool,
{
    fn matches(&self, line: &str) -> bool {
        self(line)
    }
}

/// Lines matching `predicate`, in their original order.
pub fn select_lines<'a, P>(lines: &'a [String], predicate: &P) -> Vec<&'a str>
where
    P: LinePredicate + ?Sized,
{
    lines
        .iter()
        .map(String::as_str)
        .filter(|l| predicate.matches(l))
        .collect()
}

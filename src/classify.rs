use crate::normalize::CanonicalForm;
use serde::Serialize;

pub const FULL_SCORE: i64 = 100;
pub const PARTIAL_SCORE: i64 = 50;
pub const NO_SCORE: i64 = 0;

/// Which rule decided the score. Rules are tried in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchTier {
    /// Query text matches the answer key ignoring case and surrounding whitespace.
    ExactText,
    /// Different text, identical output including row order.
    ExactResult,
    /// Same rows in a different order.
    UnorderedResult,
    NoMatch,
}

impl MatchTier {
    /// Both result tiers share the partial score.
    pub fn score(self) -> i64 {
        match self {
            Self::ExactText => FULL_SCORE,
            Self::ExactResult | Self::UnorderedResult => PARTIAL_SCORE,
            Self::NoMatch => NO_SCORE,
        }
    }
}

pub fn match_tier(
    student_sql: &str,
    answer_sql: &str,
    student: &CanonicalForm,
    answer: &CanonicalForm,
) -> MatchTier {
    if texts_match(student_sql, answer_sql) {
        return MatchTier::ExactText;
    }
    if student == answer {
        return MatchTier::ExactResult;
    }
    if sort_lines(student.as_str()) == sort_lines(answer.as_str()) {
        return MatchTier::UnorderedResult;
    }
    MatchTier::NoMatch
}

pub fn classify(
    student_sql: &str,
    answer_sql: &str,
    student: &CanonicalForm,
    answer: &CanonicalForm,
) -> i64 {
    match_tier(student_sql, answer_sql, student, answer).score()
}

fn texts_match(a: &str, b: &str) -> bool {
    let (a, b) = (a.trim(), b.trim());
    a.chars().count() == b.chars().count()
        && a.chars().zip(b.chars()).all(|(x, y)| chars_eq_ignore_case(x, y))
}

fn chars_eq_ignore_case(x: char, y: char) -> bool {
    x == y || x.to_uppercase().eq(y.to_uppercase()) || x.to_lowercase().eq(y.to_lowercase())
}

/// Trailing empty lines are dropped before sorting, so a stray final newline does not
/// change the multiset of rows.
fn sort_lines(s: &str) -> String {
    let mut lines: Vec<&str> = s.split('\n').collect();
    while lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }
    lines.sort_unstable();
    lines.join("\n")
}

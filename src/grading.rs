use crate::classify::{match_tier, MatchTier, NO_SCORE};
use crate::db::{Store, StoreError};
use crate::executor::{ExecError, QueryExecutor};
use crate::ledger::{self, LedgerWrite};
use crate::normalize::normalize;
use serde::Serialize;
use thiserror::Error;

/// Everything needed to grade one submission.
#[derive(Debug, Clone, Copy)]
pub struct Submission<'a> {
    pub assignment_id: i64,
    pub student_id: i64,
    pub student_sql: &'a str,
    pub answer_sql: &'a str,
}

/// Student-facing result of a submission. A failing student query is an outcome,
/// not an error.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    Graded { score: i64, tier: MatchTier },
    QueryFailed { score: i64, message: String },
}

impl Outcome {
    pub fn score(&self) -> i64 {
        match self {
            Self::Graded { score, .. } | Self::QueryFailed { score, .. } => *score,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeReport {
    #[serde(flatten)]
    pub outcome: Outcome,
    pub ledger: LedgerWrite,
}

/// Failures that stop grading. None of them writes a grade except `Store`, which is
/// raised only after the ledger transaction has rolled back.
#[derive(Debug, Error)]
pub enum GradeError {
    #[error("submitted query is empty")]
    EmptyQuery,

    #[error("the answer key for this assignment is empty")]
    AnswerKeyEmpty,

    #[error("the answer key query failed: {0}")]
    AnswerKey(String),

    #[error("dataset unavailable: {0}")]
    DatasetUnavailable(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Runs the student query, then the answer key, classifies the two results and keeps the
/// best score in the ledger.
pub fn grade_submission<E>(
    store: &Store,
    executor: &E,
    submission: &Submission<'_>,
) -> Result<GradeReport, GradeError>
where
    E: QueryExecutor + ?Sized,
{
    if submission.student_sql.trim().is_empty() {
        return Err(GradeError::EmptyQuery);
    }
    if submission.answer_sql.trim().is_empty() {
        return Err(GradeError::AnswerKeyEmpty);
    }

    let student = match executor.execute(submission.student_sql) {
        Ok(r) => r,
        Err(ExecError::Unavailable(msg)) => return Err(GradeError::DatasetUnavailable(msg)),
        Err(ExecError::Query(message)) => {
            let ledger = ledger::record_if_higher(
                store,
                submission.assignment_id,
                submission.student_id,
                NO_SCORE,
            )?;
            tracing::info!(
                event = "submission_query_failed",
                assignment_id = submission.assignment_id,
                student_id = submission.student_id,
                best = ledger.best()
            );
            return Ok(GradeReport {
                outcome: Outcome::QueryFailed {
                    score: NO_SCORE,
                    message,
                },
                ledger,
            });
        }
    };

    let answer = match executor.execute(submission.answer_sql) {
        Ok(r) => r,
        Err(ExecError::Unavailable(msg)) => return Err(GradeError::DatasetUnavailable(msg)),
        Err(ExecError::Query(msg)) => {
            tracing::warn!(
                event = "answer_key_failed",
                assignment_id = submission.assignment_id,
                error = %msg
            );
            return Err(GradeError::AnswerKey(msg));
        }
    };

    let tier = match_tier(
        submission.student_sql,
        submission.answer_sql,
        &normalize(&student),
        &normalize(&answer),
    );
    let score = tier.score();
    let ledger = ledger::record_if_higher(
        store,
        submission.assignment_id,
        submission.student_id,
        score,
    )?;

    tracing::info!(
        event = "submission_graded",
        assignment_id = submission.assignment_id,
        student_id = submission.student_id,
        score,
        tier = ?tier,
        best = ledger.best()
    );
    Ok(GradeReport {
        outcome: Outcome::Graded { score, tier },
        ledger,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assignments::{Assignment, AssignmentInput};
    use crate::db::test_util::temp_store;
    use crate::normalize::QueryResult;
    use std::cell::RefCell;
    use std::collections::HashMap;

    /// Canned results keyed by lowercased query text; anything else fails as a query error.
    #[derive(Default)]
    struct FakeExecutor {
        results: HashMap<String, Vec<Vec<&'static str>>>,
        unavailable: bool,
        calls: RefCell<Vec<String>>,
    }

    impl FakeExecutor {
        fn with(mut self, sql: &'static str, rows: Vec<Vec<&'static str>>) -> Self {
            self.results.insert(sql.to_lowercase(), rows);
            self
        }
    }

    impl QueryExecutor for FakeExecutor {
        fn execute(&self, sql: &str) -> Result<QueryResult, ExecError> {
            self.calls.borrow_mut().push(sql.to_string());
            if self.unavailable {
                return Err(ExecError::Unavailable("offline".into()));
            }
            let rows = self
                .results
                .get(&sql.trim().to_lowercase())
                .ok_or_else(|| ExecError::Query(format!("no such query: {sql}")))?;
            Ok(QueryResult {
                columns: vec!["c".into(); rows.first().map(|r| r.len()).unwrap_or(1)],
                rows: rows
                    .iter()
                    .map(|r| r.iter().map(|v| Some(v.to_string())).collect())
                    .collect(),
            })
        }
    }

    fn setup(prefix: &str) -> (Store, i64) {
        let store = temp_store(prefix);
        let a = Assignment::create(
            &store,
            &AssignmentInput {
                name: "Employees".into(),
                instructions: "list names".into(),
                answer_key: "SELECT name FROM e ORDER BY name".into(),
            },
        )
        .expect("assignment");
        (store, a.id)
    }

    fn submit<'a>(assignment_id: i64, student_sql: &'a str, answer_sql: &'a str) -> Submission<'a> {
        Submission {
            assignment_id,
            student_id: 7,
            student_sql,
            answer_sql,
        }
    }

    #[test]
    fn same_text_scores_full() {
        let (store, a) = setup("sqltester-grade-text");
        let exec = FakeExecutor::default()
            .with("SELECT 1", vec![vec!["1"]])
            .with("SELECT 2", vec![vec!["2"]]);

        let report =
            grade_submission(&store, &exec, &submit(a, "  select 1 ", "SELECT 1")).expect("grade");
        assert_eq!(
            report.outcome,
            Outcome::Graded {
                score: 100,
                tier: MatchTier::ExactText
            }
        );
        assert_eq!(ledger::find(&store, a, 7).expect("find"), Some(100));
    }

    #[test]
    fn reordered_rows_score_partial_and_are_recorded() {
        let (store, a) = setup("sqltester-grade-unordered");
        let exec = FakeExecutor::default()
            .with("SELECT name FROM e", vec![vec!["bob"], vec!["ann"]])
            .with("SELECT name FROM e ORDER BY name", vec![vec!["ann"], vec!["bob"]]);

        let report = grade_submission(
            &store,
            &exec,
            &submit(a, "SELECT name FROM e", "SELECT name FROM e ORDER BY name"),
        )
        .expect("grade");
        assert_eq!(
            report.outcome,
            Outcome::Graded {
                score: 50,
                tier: MatchTier::UnorderedResult
            }
        );
        assert_eq!(report.ledger, LedgerWrite::Inserted { score: 50 });
        assert_eq!(ledger::find(&store, a, 7).expect("find"), Some(50));
    }

    #[test]
    fn failing_student_query_records_zero_without_running_the_answer_key() {
        let (store, a) = setup("sqltester-grade-student-fail");
        let exec = FakeExecutor::default().with("SELECT 1", vec![vec!["1"]]);

        let report =
            grade_submission(&store, &exec, &submit(a, "SELEC oops", "SELECT 1")).expect("grade");
        assert_eq!(report.outcome.score(), 0);
        assert!(matches!(report.outcome, Outcome::QueryFailed { .. }));
        assert_eq!(ledger::find(&store, a, 7).expect("find"), Some(0));
        assert_eq!(exec.calls.borrow().as_slice(), ["SELEC oops"]);
    }

    #[test]
    fn failing_student_query_never_lowers_a_recorded_score() {
        let (store, a) = setup("sqltester-grade-student-fail-kept");
        ledger::record_if_higher(&store, a, 7, 100).expect("seed grade");
        let exec = FakeExecutor::default();

        let report =
            grade_submission(&store, &exec, &submit(a, "SELEC oops", "SELECT 1")).expect("grade");
        assert_eq!(report.ledger, LedgerWrite::Kept { stored: 100 });
        assert_eq!(ledger::find(&store, a, 7).expect("find"), Some(100));
    }

    #[test]
    fn failing_answer_key_is_a_setup_error_and_writes_nothing() {
        let (store, a) = setup("sqltester-grade-key-fail");
        let exec = FakeExecutor::default().with("SELECT 1", vec![vec!["1"]]);

        let err = grade_submission(&store, &exec, &submit(a, "SELECT 1", "SELEC broken"))
            .expect_err("answer key must fail");
        assert!(matches!(err, GradeError::AnswerKey(_)));
        assert_eq!(ledger::find(&store, a, 7).expect("find"), None);
    }

    #[test]
    fn empty_texts_are_rejected_before_execution() {
        let (store, a) = setup("sqltester-grade-empty");
        let exec = FakeExecutor::default();

        let err = grade_submission(&store, &exec, &submit(a, "   ", "SELECT 1")).unwrap_err();
        assert!(matches!(err, GradeError::EmptyQuery));
        let err = grade_submission(&store, &exec, &submit(a, "SELECT 1", "\n")).unwrap_err();
        assert!(matches!(err, GradeError::AnswerKeyEmpty));

        assert!(exec.calls.borrow().is_empty());
        assert_eq!(ledger::find(&store, a, 7).expect("find"), None);
    }

    #[test]
    fn unavailable_dataset_is_not_blamed_on_the_student() {
        let (store, a) = setup("sqltester-grade-offline");
        let exec = FakeExecutor {
            unavailable: true,
            ..FakeExecutor::default()
        };

        let err = grade_submission(&store, &exec, &submit(a, "SELECT 1", "SELECT 1")).unwrap_err();
        assert!(matches!(err, GradeError::DatasetUnavailable(_)));
        assert_eq!(ledger::find(&store, a, 7).expect("find"), None);
    }

    #[test]
    fn garbage_dataset_file_is_a_system_error_with_no_grade() {
        use crate::db::test_util::temp_dir;
        use crate::executor::SqliteExecutor;

        let (store, a) = setup("sqltester-grade-garbage");
        let dataset = temp_dir("sqltester-grade-garbage-dataset").join("dataset.sqlite3");
        std::fs::write(&dataset, vec![b'x'; 8192]).expect("write garbage");
        let exec = SqliteExecutor::new(dataset);

        for sql in ["SELECT name FROM employees", "SELECT 2"] {
            let err = grade_submission(&store, &exec, &submit(a, sql, "SELECT 1")).unwrap_err();
            assert!(matches!(err, GradeError::DatasetUnavailable(_)), "{sql}: {err:?}");
        }
        assert_eq!(ledger::find(&store, a, 7).expect("find"), None);
    }

    #[test]
    fn lower_resubmission_keeps_best() {
        let (store, a) = setup("sqltester-grade-best");
        let exec = FakeExecutor::default()
            .with("SELECT 1", vec![vec!["1"]])
            .with("SELECT 2", vec![vec!["2"]]);

        let first =
            grade_submission(&store, &exec, &submit(a, "select 1", "SELECT 1")).expect("first");
        assert_eq!(first.outcome.score(), 100);

        let second =
            grade_submission(&store, &exec, &submit(a, "SELECT 2", "SELECT 1")).expect("second");
        assert_eq!(second.outcome.score(), 0);
        assert_eq!(second.ledger, LedgerWrite::Kept { stored: 100 });
        assert_eq!(ledger::find(&store, a, 7).expect("find"), Some(100));
    }
}

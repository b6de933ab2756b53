//! Grading engine for SQL assignments.
//!
//! A submission is graded by running the student's query and the assignment's answer key
//! against the same dataset, normalizing both result sets to text, classifying the pair
//! and keeping the best score per student in the ledger.

pub mod assignments;
pub mod classify;
pub mod config;
pub mod db;
pub mod executor;
pub mod grading;
pub mod ipc;
pub mod ledger;
pub mod normalize;
pub mod users;

pub use classify::{classify, match_tier, MatchTier};
pub use db::{Store, StoreError};
pub use executor::{ExecError, QueryExecutor, SqliteExecutor};
pub use grading::{grade_submission, GradeError, GradeReport, Outcome, Submission};
pub use ledger::{record_if_higher, LedgerWrite};
pub use normalize::{normalize, CanonicalForm, QueryResult};

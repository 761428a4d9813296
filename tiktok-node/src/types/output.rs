//! Batch output records.

use serde::Serialize;
use serde_json::Value;

/// How a failing item affects the rest of the batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExecutionMode {
    /// The first failure fails the whole batch.
    #[default]
    Abort,
    /// A failure becomes an error record and the next item runs.
    ContinueOnFail,
}

/// Result-or-error for one output record.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Outcome {
    Success(Value),
    Failure { error: String },
}

/// One output record, tagged with the index of the input item that produced it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutputRecord {
    pub json: Outcome,
    pub item: usize,
}

impl OutputRecord {
    pub fn success(item: usize, value: Value) -> Self {
        Self {
            json: Outcome::Success(value),
            item,
        }
    }

    pub fn failure(item: usize, error: String) -> Self {
        Self {
            json: Outcome::Failure { error },
            item,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self.json, Outcome::Failure { .. })
    }
}

//! Best-effort results for the pipeline stages.
//!
//! Every stage always produces a value. When it had to degrade (a series
//! failed to download, a baseline was zero, the table was empty) it returns
//! `Outcome::Degraded` carrying the warnings instead of an error, so callers
//! still get a table and can see exactly what went wrong.

use crate::data::provider::DataError;
use chrono::NaiveDate;
use thiserror::Error;

/// A recovered fault in one pipeline stage.
#[derive(Debug, Clone, Error)]
pub enum PipelineWarning {
    #[error("series {column} ({series_id}) failed to load: {source}")]
    FetchFailed {
        column: String,
        series_id: String,
        source: DataError,
    },

    #[error("column {column} has a zero or missing baseline value on {baseline_row}; left all-missing")]
    ZeroBaseline {
        column: String,
        baseline_row: NaiveDate,
    },

    #[error("{stage}: input table is empty; passed through unchanged")]
    EmptyTable { stage: &'static str },

    #[error("real wage unavailable; K_LOWER uses nominal wage ({column})")]
    NominalWageSubstituted { column: String },

    #[error("delinquency index is neutral (constant 100): {reason}")]
    NeutralDelinquency { reason: &'static str },

    #[error("composite {composite}: input '{input}' not present in table; averaged without it")]
    CompositeInputAbsent {
        composite: &'static str,
        input: &'static str,
    },
}

#[derive(Debug, Clone)]
pub enum Outcome<T> {
    Complete(T),
    Degraded {
        value: T,
        warnings: Vec<PipelineWarning>,
    },
}

impl<T> Outcome<T> {
    /// `Complete` when `warnings` is empty, `Degraded` otherwise.
    pub fn from_parts(value: T, warnings: Vec<PipelineWarning>) -> Self {
        if warnings.is_empty() {
            Outcome::Complete(value)
        } else {
            Outcome::Degraded { value, warnings }
        }
    }

    pub fn value(&self) -> &T {
        match self {
            Outcome::Complete(value) | Outcome::Degraded { value, .. } => value,
        }
    }

    pub fn into_value(self) -> T {
        self.into_parts().0
    }

    pub fn warnings(&self) -> &[PipelineWarning] {
        match self {
            Outcome::Complete(_) => &[],
            Outcome::Degraded { warnings, .. } => warnings,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Outcome::Degraded { .. })
    }

    pub fn into_parts(self) -> (T, Vec<PipelineWarning>) {
        match self {
            Outcome::Complete(value) => (value, Vec::new()),
            Outcome::Degraded { value, warnings } => (value, warnings),
        }
    }

    /// Move the value out, appending this stage's warnings to `sink`.
    pub fn collect_into(self, sink: &mut Vec<PipelineWarning>) -> T {
        let (value, warnings) = self.into_parts();
        sink.extend(warnings);
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_warnings_is_complete() {
        let outcome = Outcome::from_parts(5, Vec::new());
        assert!(!outcome.is_degraded());
        assert_eq!(*outcome.value(), 5);
        assert!(outcome.warnings().is_empty());
    }

    #[test]
    fn warnings_are_carried_and_collected() {
        let outcome = Outcome::from_parts(
            "table",
            vec![PipelineWarning::EmptyTable { stage: "align" }],
        );
        assert!(outcome.is_degraded());

        let mut sink = Vec::new();
        let value = outcome.collect_into(&mut sink);
        assert_eq!(value, "table");
        assert_eq!(sink.len(), 1);
        assert_eq!(
            sink[0].to_string(),
            "align: input table is empty; passed through unchanged"
        );
    }
}

//! Batch result types

use crate::transport::TransportReceipt;
use serde::Serialize;

/// Which rows a batch covers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowSelection {
    /// A single row
    Row(usize),
    /// Several rows, dispatched in the given order
    Rows(Vec<usize>),
    /// Every row, pairing the email column with the name column
    Column,
}

/// Result of dispatching one row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DispatchOutcome {
    Sent {
        row: usize,
        to: String,
        receipt: TransportReceipt,
    },
    Failed {
        row: usize,
        to: String,
        reason: String,
    },
    Skipped {
        row: usize,
        reason: String,
    },
}

impl DispatchOutcome {
    pub fn row(&self) -> usize {
        match self {
            DispatchOutcome::Sent { row, .. }
            | DispatchOutcome::Failed { row, .. }
            | DispatchOutcome::Skipped { row, .. } => *row,
        }
    }

    pub fn is_sent(&self) -> bool {
        matches!(self, DispatchOutcome::Sent { .. })
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, DispatchOutcome::Failed { .. })
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, DispatchOutcome::Skipped { .. })
    }
}

/// Counts per outcome kind
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub sent: usize,
    pub failed: usize,
    pub skipped: usize,
}

impl BatchSummary {
    pub fn from_outcomes(outcomes: &[DispatchOutcome]) -> Self {
        outcomes.iter().fold(Self::default(), |mut summary, outcome| {
            match outcome {
                DispatchOutcome::Sent { .. } => summary.sent += 1,
                DispatchOutcome::Failed { .. } => summary.failed += 1,
                DispatchOutcome::Skipped { .. } => summary.skipped += 1,
            }
            summary
        })
    }

    pub fn total(&self) -> usize {
        self.sent + self.failed + self.skipped
    }
}

impl std::fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} rows: {} sent, {} failed, {} skipped",
            self.total(),
            self.sent,
            self.failed,
            self.skipped
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_counts() {
        let outcomes = vec![
            DispatchOutcome::Sent {
                row: 0,
                to: "a@x.com".to_string(),
                receipt: TransportReceipt {
                    response: "250 OK".to_string(),
                },
            },
            DispatchOutcome::Failed {
                row: 1,
                to: "b@x.com".to_string(),
                reason: "rejected".to_string(),
            },
            DispatchOutcome::Skipped {
                row: 7,
                reason: "out of range".to_string(),
            },
        ];

        let summary = BatchSummary::from_outcomes(&outcomes);
        assert_eq!(summary.sent, 1);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.to_string(), "3 rows: 1 sent, 1 failed, 1 skipped");
        assert_eq!(outcomes[2].row(), 7);
    }

    #[test]
    fn test_outcome_serializes_with_status() {
        let outcome = DispatchOutcome::Skipped {
            row: 3,
            reason: "no email address".to_string(),
        };
        let json = serde_json::to_value(&outcome).unwrap();

        assert_eq!(json["status"], "skipped");
        assert_eq!(json["row"], 3);
    }
}

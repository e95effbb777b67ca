//! Pipeline-wide aggregation rule.

use chrono::Duration;

use crate::error::GrouperError;

/// How instrument samples are pooled into aggregation windows.
///
/// One rule value is chosen per analysis run and shared by the grouper, the
/// velocity fit engine and the moment estimator, so that all derived series
/// agree on window boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AggregationRule {
    /// Variable-length windows demarcated by gauge accumulation ticks.
    Adaptive,
    /// Fixed-duration windows on calendar boundaries, right-closed and
    /// right-labeled.
    Fixed(Duration),
}

impl AggregationRule {
    /// Returns `true` for tick-driven variable-interval grouping.
    pub fn is_adaptive(&self) -> bool {
        matches!(self, AggregationRule::Adaptive)
    }

    /// Stable label for cache keys and log lines, e.g. `adaptive` or
    /// `fixed-900s`.
    pub fn label(&self) -> String {
        match self {
            AggregationRule::Adaptive => "adaptive".to_string(),
            AggregationRule::Fixed(d) => format!("fixed-{}s", d.num_seconds()),
        }
    }

    /// Validates the rule (a fixed duration must be positive).
    pub fn validate(&self) -> Result<(), GrouperError> {
        if let AggregationRule::Fixed(d) = self {
            if d.num_seconds() <= 0 {
                return Err(GrouperError::InvalidRule {
                    seconds: d.num_seconds(),
                });
            }
        }
        Ok(())
    }
}

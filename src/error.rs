//! Error types for team sorting.

use thiserror::Error;

use crate::grouping::ConflictReport;

/// Errors raised by the engine and the dataset operations.
///
/// Data-quality findings (unresolved names, with/not-with contradictions)
/// are normally returned as [`ConflictReport`]s by the grouper. They only
/// become an error when a caller asks for a balancing run anyway.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TeamSortError {
    /// Team count below 1.
    #[error("team count must be at least 1, got {0}")]
    InvalidTeamCount(usize),

    /// Balancing refused because the grouper reported blocking conflicts.
    #[error("constraint conflict in {} group(s)", .0.len())]
    ConstraintConflict(Vec<ConflictReport>),

    /// The engine was handed groups that still violate a not-with relation.
    ///
    /// Unreachable when callers honor the grouper's report.
    #[error("internal invariant violated: {0}")]
    InternalInvariantViolation(String),

    /// A locked group could not be placed because every team already
    /// holds someone it refuses (or who refuses it).
    #[error("no team can take [{}] without seating refused members together", .0.join(", "))]
    NoFeasibleTeam(Vec<String>),

    /// Invalid [`BalanceConfig`](crate::balance::BalanceConfig).
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The run was cancelled before teams were published.
    #[error("balancing run was cancelled")]
    Cancelled,

    #[error("member '{0}' already exists")]
    DuplicateMember(String),

    #[error("discipline '{0}' already exists")]
    DuplicateDiscipline(String),

    #[error("team '{0}' already exists")]
    DuplicateTeam(String),

    #[error("unknown member '{0}'")]
    UnknownMember(String),

    #[error("unknown discipline '{0}'")]
    UnknownDiscipline(String),

    #[error("unknown team '{0}'")]
    UnknownTeam(String),

    /// A raw value could not be parsed for the discipline's value kind.
    #[error("value '{raw}' is not valid for discipline '{discipline}'")]
    InvalidValue {
        /// Discipline display name.
        discipline: String,
        /// The rejected raw text.
        raw: String,
    },
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, TeamSortError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        assert_eq!(
            TeamSortError::InvalidTeamCount(0).to_string(),
            "team count must be at least 1, got 0"
        );
        assert_eq!(
            TeamSortError::InvalidValue {
                discipline: "Speed".into(),
                raw: "fast".into(),
            }
            .to_string(),
            "value 'fast' is not valid for discipline 'Speed'"
        );
        assert_eq!(
            TeamSortError::ConstraintConflict(Vec::new()).to_string(),
            "constraint conflict in 0 group(s)"
        );
        assert_eq!(
            TeamSortError::NoFeasibleTeam(vec!["A".into(), "B".into()]).to_string(),
            "no team can take [A, B] without seating refused members together"
        );
    }
}

//! Score aggregation and balance reporting.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Total | Sum of available values |
//! | Average | Total / number of available values |
//! | Range | Observed (min, max) across a member set |
//! | Delta | max(team averages) − min(team averages) |
//! | Normalized score | 0–100, 100 = best for the sort direction |

mod aggregator;
mod report;

pub use aggregator::{
    average, discipline_delta, discipline_range, normalized_score, round2, team_averages,
    team_totals, total, total_scores,
};
pub use report::{BalanceReport, DisciplineDelta, TeamSummary};

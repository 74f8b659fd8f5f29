//! End-to-end sorting: group, refuse on conflicts, balance.

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::balance::{BalanceConfig, BalanceProblem, BalanceResult, BalanceRunner};
use crate::error::{Result, TeamSortError};
use crate::grouping::ConstraintGrouper;
use crate::models::{DisciplineInfo, Member};

/// Sorts members into balanced teams.
pub struct TeamSorter;

impl TeamSorter {
    /// Groups `members`, then balances the groups over `team_count` teams.
    ///
    /// Blocking grouping findings (unresolved "with" names, with/not-with
    /// contradictions, duplicate names) refuse the run with
    /// [`TeamSortError::ConstraintConflict`] carrying every blocking report.
    /// Not-with relations between different groups are honored during
    /// placement; [`TeamSortError::NoFeasibleTeam`] is returned when no team
    /// can take a group.
    ///
    /// # Examples
    ///
    /// ```
    /// use u_teamsort::balance::BalanceConfig;
    /// use u_teamsort::models::{DisciplineId, DisciplineInfo, Member};
    /// use u_teamsort::sorter::TeamSorter;
    /// use u_teamsort::TeamSortError;
    ///
    /// let speed = DisciplineInfo::new(DisciplineId(1), "Speed");
    /// let members = vec![
    ///     Member::new("A").with_value(speed.id, 10.0).with_member("B"),
    ///     Member::new("B").with_value(speed.id, 20.0).not_with_member("A"),
    /// ];
    /// let err = TeamSorter::sort(&members, &[speed], 2, &BalanceConfig::default()).unwrap_err();
    /// assert!(matches!(err, TeamSortError::ConstraintConflict(_)));
    /// ```
    pub fn sort(
        members: &[Member],
        disciplines: &[DisciplineInfo],
        team_count: usize,
        config: &BalanceConfig,
    ) -> Result<BalanceResult> {
        Self::sort_with_cancel(members, disciplines, team_count, config, None)
    }

    /// [`sort`](Self::sort) with an optional cancellation token.
    pub fn sort_with_cancel(
        members: &[Member],
        disciplines: &[DisciplineInfo],
        team_count: usize,
        config: &BalanceConfig,
        cancel: Option<Arc<AtomicBool>>,
    ) -> Result<BalanceResult> {
        if team_count < 1 {
            return Err(TeamSortError::InvalidTeamCount(team_count));
        }

        let report = ConstraintGrouper::group(members);
        let blocking = report.blocking_conflicts();
        if !blocking.is_empty() {
            warn!(
                event = "sort_refused",
                conflicts = blocking.len(),
                first = %blocking[0].message,
            );
            return Err(TeamSortError::ConstraintConflict(blocking));
        }
        for issue in report.conflicts.iter().filter(|c| !c.is_blocking()) {
            debug!(event = "grouping_issue", message = %issue.message);
        }

        let problem = BalanceProblem::new(report.groups, disciplines.to_vec(), team_count);
        BalanceRunner::run_with_cancel(&problem, config, cancel)
    }
}

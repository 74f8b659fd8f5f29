//! Balancing execution.
//!
//! # Algorithm
//!
//! 1. Build the seeded generator (or draw a seed and report it)
//! 2. Weigh each locked group per discipline
//! 3. Shuffle the group order with the seeded generator, then move groups
//!    with the most refusals to the front (stable)
//! 4. Greedy placement: each group goes to the team minimizing the worst
//!    per-discipline spread (ties: fewer members, then lower index),
//!    skipping teams that hold a group it refuses
//! 5. Local improvement between the heaviest and lightest team: the best
//!    swap or single-group relocation is applied while it strictly lowers
//!    `(worst spread, member-count spread)`, up to a fixed iteration budget
//!
//! # Reference
//!
//! Graham, R. L. (1969). "Bounds on Multiprocessing Timing Anomalies",
//! *SIAM Journal on Applied Mathematics* 17(2), 416-429.

use std::cmp::Reverse;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{debug, info};

use super::config::BalanceConfig;
use super::search::{group_refusals, group_weights, LoadTable};
use super::types::{BalanceProblem, BalanceResult};
use crate::error::{Result, TeamSortError};
use crate::grouping::LockedGroup;
use crate::models::{DisciplineInfo, Team};
use crate::random::SeededRng;

/// Assigns locked groups to teams.
pub struct BalanceRunner;

impl BalanceRunner {
    /// Balances `groups` over `team_count` teams with an optional seed.
    ///
    /// Shorthand for [`run`](Self::run) with default settings.
    ///
    /// # Examples
    ///
    /// ```
    /// use u_teamsort::balance::BalanceRunner;
    /// use u_teamsort::grouping::ConstraintGrouper;
    /// use u_teamsort::models::{DisciplineId, DisciplineInfo, Member};
    ///
    /// let speed = DisciplineInfo::new(DisciplineId(1), "Speed");
    /// let members = vec![
    ///     Member::new("A").with_value(speed.id, 10.0).with_member("B"),
    ///     Member::new("B").with_value(speed.id, 20.0),
    ///     Member::new("C").with_value(speed.id, 5.0),
    ///     Member::new("D").with_value(speed.id, 25.0),
    /// ];
    /// let report = ConstraintGrouper::group(&members);
    /// let result = BalanceRunner::assign(&report.groups, &[speed], 2, Some("seed123")).unwrap();
    ///
    /// assert_eq!(result.seed_used, "seed123");
    /// assert_eq!(result.team_of("A"), result.team_of("B"));
    /// ```
    pub fn assign(
        groups: &[LockedGroup],
        disciplines: &[DisciplineInfo],
        team_count: usize,
        seed: Option<&str>,
    ) -> Result<BalanceResult> {
        let problem = BalanceProblem::new(groups.to_vec(), disciplines.to_vec(), team_count);
        let config = BalanceConfig {
            seed: seed.map(str::to_string),
            ..BalanceConfig::default()
        };
        Self::run(&problem, &config)
    }

    /// Runs balancing.
    pub fn run(problem: &BalanceProblem, config: &BalanceConfig) -> Result<BalanceResult> {
        Self::run_with_cancel(problem, config, None)
    }

    /// Runs balancing with an optional cancellation token.
    ///
    /// The flag is checked between placements and between improvement
    /// iterations. A cancelled run returns [`TeamSortError::Cancelled`]
    /// and publishes no teams.
    pub fn run_with_cancel(
        problem: &BalanceProblem,
        config: &BalanceConfig,
        cancel: Option<Arc<AtomicBool>>,
    ) -> Result<BalanceResult> {
        config.validate()?;
        if problem.team_count < 1 {
            return Err(TeamSortError::InvalidTeamCount(problem.team_count));
        }
        check_groups(&problem.groups)?;

        let is_cancelled = || cancel.as_ref().is_some_and(|f| f.load(Ordering::Relaxed));

        let mut rng = SeededRng::new(config.seed.as_deref());
        info!(
            event = "balance_start",
            groups = problem.groups.len(),
            members = problem.member_count(),
            teams = problem.team_count,
            disciplines = problem.disciplines.len(),
            seed = rng.seed(),
        );

        let weights = group_weights(&problem.groups, &problem.disciplines, config.normalize);
        let sizes: Vec<usize> = problem.groups.iter().map(LockedGroup::len).collect();
        let refused = group_refusals(&problem.groups);

        let mut order: Vec<usize> = (0..problem.groups.len()).collect();
        rng.shuffle(&mut order);
        order.sort_by_key(|&g| Reverse(refused[g].len()));

        let mut table = LoadTable::new(
            problem.team_count,
            problem.disciplines.len(),
            &weights,
            &sizes,
            &refused,
            config.epsilon,
        );

        for &group in &order {
            if is_cancelled() {
                debug!(event = "balance_cancelled", phase = "greedy");
                return Err(TeamSortError::Cancelled);
            }
            let Some(team) = table.best_team(group) else {
                let names: Vec<String> = problem.groups[group]
                    .names()
                    .into_iter()
                    .map(String::from)
                    .collect();
                debug!(event = "balance_infeasible", group = %names.join(", "));
                return Err(TeamSortError::NoFeasibleTeam(names));
            };
            table.place(group, team);
        }

        let greedy_spread = table.spread();
        let mut swaps_applied = 0;
        let mut swap_iterations = 0;

        if config.local_search {
            while swap_iterations < config.max_swap_iterations {
                if is_cancelled() {
                    debug!(event = "balance_cancelled", phase = "swap");
                    return Err(TeamSortError::Cancelled);
                }
                swap_iterations += 1;

                let (hi, lo) = table.extremes();
                if hi == lo {
                    break;
                }
                let spread = table.spread();
                let count_spread = table.count_spread();
                match table.best_step(hi, lo, config.parallel) {
                    Some(c) if c.improves(spread, count_spread, config.epsilon) => {
                        table.apply(c.step);
                        swaps_applied += 1;
                        debug!(
                            event = "step_applied",
                            iteration = swap_iterations,
                            step = ?c.step,
                            spread = c.spread,
                            count_spread = c.count_spread,
                        );
                    }
                    _ => break,
                }
            }
        }

        let final_spread = table.spread();
        let teams = build_teams(problem, config, table.into_placement());

        info!(
            event = "balance_end",
            greedy_spread,
            final_spread,
            swaps_applied,
            swap_iterations,
        );

        Ok(BalanceResult {
            teams,
            seed_used: rng.seed().to_string(),
            greedy_spread,
            final_spread,
            swaps_applied,
            swap_iterations,
        })
    }
}

/// Rejects groups that overlap each other or still hold a not-with pair.
fn check_groups(groups: &[LockedGroup]) -> Result<()> {
    let mut seen: HashSet<&str> = HashSet::new();
    for group in groups {
        for name in group.names() {
            if !seen.insert(name) {
                return Err(TeamSortError::InternalInvariantViolation(format!(
                    "member '{name}' appears in more than one locked group"
                )));
            }
        }
        if let Some((a, b)) = group.internal_refusals().into_iter().next() {
            return Err(TeamSortError::InternalInvariantViolation(format!(
                "locked group [{}] contains refused pair {a} / {b}",
                group.names().join(", ")
            )));
        }
    }
    Ok(())
}

fn build_teams(
    problem: &BalanceProblem,
    config: &BalanceConfig,
    placement: Vec<Vec<usize>>,
) -> Vec<Team> {
    placement
        .into_iter()
        .enumerate()
        .map(|(t, groups)| {
            let name = problem
                .team_names
                .get(t)
                .cloned()
                .unwrap_or_else(|| config.team_name(t));
            Team::new(name).with_members(
                groups
                    .into_iter()
                    .flat_map(|g| problem.groups[g].members.iter().cloned()),
            )
        })
        .collect()
}

//! Balancing input and output.

use crate::grouping::LockedGroup;
use crate::models::{DisciplineInfo, Team};

/// What the engine is asked to partition.
#[derive(Debug, Clone)]
pub struct BalanceProblem {
    /// Pairwise disjoint, conflict-free locked groups.
    pub groups: Vec<LockedGroup>,
    /// Disciplines to balance, in reporting order.
    pub disciplines: Vec<DisciplineInfo>,
    /// Number of teams to fill.
    pub team_count: usize,
    /// Names of caller-created team shells, reused in order.
    pub team_names: Vec<String>,
}

impl BalanceProblem {
    /// Creates a problem with synthesized team names.
    pub fn new(groups: Vec<LockedGroup>, disciplines: Vec<DisciplineInfo>, team_count: usize) -> Self {
        Self {
            groups,
            disciplines,
            team_count,
            team_names: Vec::new(),
        }
    }

    /// Reuses the names and order of pre-created teams.
    ///
    /// The team count becomes the number of shells. Members already on
    /// the shells are not carried over; the result holds fresh teams.
    pub fn with_team_shells(mut self, shells: &[Team]) -> Self {
        self.team_names = shells.iter().map(|t| t.name.clone()).collect();
        self.team_count = shells.len();
        self
    }

    /// Total number of members across all groups.
    pub fn member_count(&self) -> usize {
        self.groups.iter().map(LockedGroup::len).sum()
    }
}

/// Result of a balancing run.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BalanceResult {
    /// Final teams, in team order.
    pub teams: Vec<Team>,
    /// Seed that reproduces this exact run.
    pub seed_used: String,
    /// Worst-discipline spread after greedy placement (engine units).
    pub greedy_spread: f64,
    /// Worst-discipline spread of the returned teams (engine units).
    pub final_spread: f64,
    /// Number of swaps and relocations accepted by the improvement pass.
    pub swaps_applied: usize,
    /// Number of improvement iterations executed.
    pub swap_iterations: usize,
}

impl BalanceResult {
    /// Name of the team holding a member.
    pub fn team_of(&self, member: &str) -> Option<&str> {
        self.teams
            .iter()
            .find(|t| t.contains(member))
            .map(|t| t.name.as_str())
    }
}

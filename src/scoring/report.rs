//! Display-ready balance report.
//!
//! Collects per-team totals/averages and per-discipline deltas for the
//! presentation layer. Values are rounded to two decimals here and only
//! here; nothing in this report is fed back into balancing.

use super::aggregator::{average, discipline_delta, round2, total};
use crate::models::{DisciplineId, DisciplineInfo, Team};

/// Summary of one team.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TeamSummary {
    /// Team name.
    pub name: String,
    /// Number of members.
    pub member_count: usize,
    /// Rounded totals, in discipline order.
    pub totals: Vec<(DisciplineId, f64)>,
    /// Rounded averages, in discipline order.
    pub averages: Vec<(DisciplineId, f64)>,
    /// Whether all relations inside the team hold.
    pub is_valid: bool,
}

/// Spread of one discipline's team averages.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DisciplineDelta {
    pub discipline_id: DisciplineId,
    pub name: String,
    /// `max - min` of team averages, rounded.
    pub delta: f64,
}

/// Balance overview of a team assignment.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BalanceReport {
    /// One summary per team, in team order.
    pub teams: Vec<TeamSummary>,
    /// One delta per discipline, in discipline order.
    pub deltas: Vec<DisciplineDelta>,
}

impl BalanceReport {
    /// Builds the report for a set of teams.
    pub fn from_teams(teams: &[Team], disciplines: &[DisciplineInfo]) -> Self {
        let summaries = teams
            .iter()
            .map(|team| TeamSummary {
                name: team.name.clone(),
                member_count: team.member_count(),
                totals: disciplines
                    .iter()
                    .map(|d| (d.id, round2(total(&team.members, d))))
                    .collect(),
                averages: disciplines
                    .iter()
                    .map(|d| (d.id, round2(average(&team.members, d))))
                    .collect(),
                is_valid: team.is_valid(),
            })
            .collect();

        let deltas = disciplines
            .iter()
            .map(|d| DisciplineDelta {
                discipline_id: d.id,
                name: d.name.clone(),
                delta: round2(discipline_delta(teams, d)),
            })
            .collect();

        Self {
            teams: summaries,
            deltas,
        }
    }

    /// Delta for a discipline.
    pub fn delta(&self, discipline_id: DisciplineId) -> Option<f64> {
        self.deltas
            .iter()
            .find(|d| d.discipline_id == discipline_id)
            .map(|d| d.delta)
    }

    /// Largest delta across disciplines (`0.0` with no disciplines).
    pub fn max_delta(&self) -> f64 {
        self.deltas.iter().map(|d| d.delta).fold(0.0, f64::max)
    }

    /// Whether every team passes its relation check.
    pub fn all_teams_valid(&self) -> bool {
        self.teams.iter().all(|t| t.is_valid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Member, SortOrder};

    #[test]
    fn test_report() {
        let speed = DisciplineInfo::new(DisciplineId(1), "Speed");
        let power = DisciplineInfo::new(DisciplineId(2), "Power").with_sort_order(SortOrder::Desc);
        let m = |name: &str, s: f64, p: f64| {
            Member::new(name)
                .with_value(speed.id, s)
                .with_value(power.id, p)
        };
        let teams = vec![
            Team::new("Team 1").with_members([m("A", 10.0, 3.0), m("B", 20.0, 4.0)]),
            Team::new("Team 2").with_members([m("C", 5.0, 1.0), m("D", 25.0, 1.0)]),
        ];
        let report = BalanceReport::from_teams(&teams, &[speed.clone(), power.clone()]);

        assert_eq!(report.teams.len(), 2);
        assert_eq!(report.teams[0].totals, vec![(speed.id, 30.0), (power.id, 7.0)]);
        assert_eq!(report.teams[1].averages, vec![(speed.id, 15.0), (power.id, 1.0)]);
        assert_eq!(report.delta(speed.id), Some(0.0));
        assert_eq!(report.delta(power.id), Some(2.5));
        assert_eq!(report.max_delta(), 2.5);
        assert!(report.all_teams_valid());
    }

    #[test]
    fn test_report_flags_invalid_team() {
        let teams = vec![
            Team::new("Team 1").with_members([Member::new("A").with_member("B")]),
            Team::new("Team 2").with_members([Member::new("B")]),
        ];
        let report = BalanceReport::from_teams(&teams, &[]);
        assert!(!report.teams[0].is_valid);
        assert!(report.teams[1].is_valid);
        assert!(!report.all_teams_valid());
        assert_eq!(report.max_delta(), 0.0);
    }
}

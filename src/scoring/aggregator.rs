//! Per-discipline aggregation over members and teams.
//!
//! Records without a numeric value are excluded from every aggregate.
//! All functions work at full precision; use [`round2`] only when
//! presenting a value.

use crate::models::{DisciplineId, DisciplineInfo, Member, SortOrder, Team};

/// Rounds to two decimal places for display.
#[inline]
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Sum of the available values.
pub fn total<'a, I>(members: I, discipline: &DisciplineInfo) -> f64
where
    I: IntoIterator<Item = &'a Member>,
{
    values(members, discipline.id).iter().sum()
}

/// Mean of the available values; `0.0` when none are available.
pub fn average<'a, I>(members: I, discipline: &DisciplineInfo) -> f64
where
    I: IntoIterator<Item = &'a Member>,
{
    let values = values(members, discipline.id);
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

/// Observed `(min, max)` of a discipline; `(0.0, 0.0)` when no values exist.
pub fn discipline_range<'a, I>(members: I, discipline: &DisciplineInfo) -> (f64, f64)
where
    I: IntoIterator<Item = &'a Member>,
{
    values(members, discipline.id)
        .into_iter()
        .fold(None, |acc: Option<(f64, f64)>, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
        .unwrap_or((0.0, 0.0))
}

/// Each team's total, in team order.
pub fn team_totals(teams: &[Team], discipline: &DisciplineInfo) -> Vec<f64> {
    teams
        .iter()
        .map(|t| total(&t.members, discipline))
        .collect()
}

/// Each team's average, in team order.
pub fn team_averages(teams: &[Team], discipline: &DisciplineInfo) -> Vec<f64> {
    teams
        .iter()
        .map(|t| average(&t.members, discipline))
        .collect()
}

/// Spread of team averages: `max - min`.
///
/// Teams with no value for the discipline (e.g. empty teams) are left out;
/// fewer than two contributing teams give `0.0`.
pub fn discipline_delta(teams: &[Team], discipline: &DisciplineInfo) -> f64 {
    let averages: Vec<f64> = teams
        .iter()
        .filter(|t| t.members.iter().any(|m| m.value(discipline.id).is_some()))
        .map(|t| average(&t.members, discipline))
        .collect();
    if averages.len() < 2 {
        return 0.0;
    }
    let lo = averages.iter().copied().fold(f64::INFINITY, f64::min);
    let hi = averages.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    hi - lo
}

/// Per-discipline totals, rounded for display, in discipline order.
pub fn total_scores(members: &[Member], disciplines: &[DisciplineInfo]) -> Vec<(DisciplineId, f64)> {
    disciplines
        .iter()
        .map(|d| (d.id, round2(total(members, d))))
        .collect()
}

/// Maps a member's value onto 0..=100 within `range`.
///
/// Ascending disciplines score the top of the range 100 and the bottom 0.
/// Descending disciplines invert that, so their lowest value scores 100.
///
/// Returns `None` when the member has no value. A degenerate range
/// (`min == max`) scores everyone 100.
pub fn normalized_score(member: &Member, discipline: &DisciplineInfo, range: (f64, f64)) -> Option<f64> {
    let value = member.value(discipline.id)?;
    let (lo, hi) = range;
    let span = hi - lo;
    if span.abs() < f64::EPSILON {
        return Some(100.0);
    }
    let fraction = ((value - lo) / span).clamp(0.0, 1.0);
    let oriented = match discipline.sort_order {
        SortOrder::Asc => fraction,
        SortOrder::Desc => 1.0 - fraction,
    };
    Some(oriented * 100.0)
}

fn values<'a, I>(members: I, id: DisciplineId) -> Vec<f64>
where
    I: IntoIterator<Item = &'a Member>,
{
    members.into_iter().filter_map(|m| m.value(id)).collect()
}

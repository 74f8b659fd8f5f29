//! Team load bookkeeping for greedy placement and local improvement.
//!
//! Loads are kept per team and per discipline as sums of group weights.
//! The objective everywhere is the worst spread: the largest
//! `max(team load) - min(team load)` over all disciplines, with the
//! member-count spread as the secondary key.
//!
//! Groups that refuse each other (a "not-with" name pointing into the
//! other group) are never placed on the same team.

use std::collections::HashMap;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::grouping::LockedGroup;
use crate::models::DisciplineInfo;
use crate::scoring::discipline_range;

/// Per-group, per-discipline weights.
///
/// A weight is the group's total for the discipline, negated for
/// ascending disciplines and optionally divided by the discipline's
/// observed range across all grouped members.
pub(crate) fn group_weights(
    groups: &[LockedGroup],
    disciplines: &[DisciplineInfo],
    normalize: bool,
) -> Vec<Vec<f64>> {
    let scales: Vec<f64> = disciplines
        .iter()
        .map(|d| {
            if !normalize {
                return 1.0;
            }
            let (lo, hi) = discipline_range(groups.iter().flat_map(|g| g.members.iter()), d);
            let span = hi - lo;
            if span > f64::EPSILON {
                span
            } else {
                1.0
            }
        })
        .collect();

    groups
        .iter()
        .map(|g| {
            disciplines
                .iter()
                .zip(&scales)
                .map(|(d, scale)| d.oriented(g.total(d.id)) / scale)
                .collect()
        })
        .collect()
}

/// Symmetric group-to-group refusal lists, sorted and de-duplicated.
///
/// Group `a` refuses group `b` when any member of either lists a member
/// of the other as "not-with". Names that match no grouped member are
/// ignored.
pub(crate) fn group_refusals(groups: &[LockedGroup]) -> Vec<Vec<usize>> {
    let mut owner: HashMap<&str, usize> = HashMap::new();
    for (g, group) in groups.iter().enumerate() {
        for name in group.names() {
            owner.entry(name).or_insert(g);
        }
    }

    let mut refused = vec![Vec::new(); groups.len()];
    for (g, group) in groups.iter().enumerate() {
        for name in group.members.iter().flat_map(|m| m.not_with.iter()) {
            if let Some(&other) = owner.get(name.as_str()) {
                if other != g {
                    refused[g].push(other);
                    refused[other].push(g);
                }
            }
        }
    }
    for list in &mut refused {
        list.sort_unstable();
        list.dedup();
    }
    refused
}

/// Worst spread over disciplines for loads given by `load(team, discipline)`.
fn worst_spread<F>(team_count: usize, discipline_count: usize, load: F) -> f64
where
    F: Fn(usize, usize) -> f64,
{
    let mut worst: f64 = 0.0;
    for d in 0..discipline_count {
        let mut lo = f64::INFINITY;
        let mut hi = f64::NEG_INFINITY;
        for t in 0..team_count {
            let v = load(t, d);
            lo = lo.min(v);
            hi = hi.max(v);
        }
        if team_count > 0 {
            worst = worst.max(hi - lo);
        }
    }
    worst
}

fn count_spread<F>(team_count: usize, count: F) -> usize
where
    F: Fn(usize) -> usize,
{
    let mut lo = usize::MAX;
    let mut hi = 0;
    for t in 0..team_count {
        let c = count(t);
        lo = lo.min(c);
        hi = hi.max(c);
    }
    hi.saturating_sub(lo)
}

/// One local improvement move between two teams.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Step {
    /// Exchange the group at `hi_pos` on `hi` with the group at `lo_pos` on `lo`.
    Swap {
        hi: usize,
        lo: usize,
        hi_pos: usize,
        lo_pos: usize,
    },
    /// Move the group at `pos` on `from` onto `to`.
    Relocate { from: usize, to: usize, pos: usize },
}

/// A feasible step and the objective it would reach.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Candidate {
    pub(crate) step: Step,
    pub(crate) spread: f64,
    pub(crate) count_spread: usize,
}

impl Candidate {
    /// Lexicographic comparison on `(spread, count_spread)` with tolerance.
    fn better_than(&self, other: &Candidate, epsilon: f64) -> bool {
        if self.spread < other.spread - epsilon {
            return true;
        }
        (self.spread - other.spread).abs() <= epsilon && self.count_spread < other.count_spread
    }

    /// Whether applying the step strictly improves on the current state.
    pub(crate) fn improves(&self, spread: f64, count_spread: usize, epsilon: f64) -> bool {
        self.spread < spread - epsilon
            || (self.spread <= spread + epsilon && self.count_spread < count_spread)
    }
}

/// Mutable assignment state: which groups sit on which team, and the
/// resulting loads and member counts.
pub(crate) struct LoadTable<'a> {
    weights: &'a [Vec<f64>],
    sizes: &'a [usize],
    refused: &'a [Vec<usize>],
    discipline_count: usize,
    epsilon: f64,
    loads: Vec<Vec<f64>>,
    counts: Vec<usize>,
    placed: Vec<Vec<usize>>,
}

impl<'a> LoadTable<'a> {
    pub(crate) fn new(
        team_count: usize,
        discipline_count: usize,
        weights: &'a [Vec<f64>],
        sizes: &'a [usize],
        refused: &'a [Vec<usize>],
        epsilon: f64,
    ) -> Self {
        Self {
            weights,
            sizes,
            refused,
            discipline_count,
            epsilon,
            loads: vec![vec![0.0; discipline_count]; team_count],
            counts: vec![0; team_count],
            placed: vec![Vec::new(); team_count],
        }
    }

    fn team_count(&self) -> usize {
        self.loads.len()
    }

    /// Group indices per team, in placement order.
    pub(crate) fn into_placement(self) -> Vec<Vec<usize>> {
        self.placed
    }

    /// Current worst spread.
    pub(crate) fn spread(&self) -> f64 {
        worst_spread(self.team_count(), self.discipline_count, |t, d| {
            self.loads[t][d]
        })
    }

    /// Current member-count spread.
    pub(crate) fn count_spread(&self) -> usize {
        count_spread(self.team_count(), |t| self.counts[t])
    }

    /// Whether `group` may join `team`, ignoring the group at `leaving`.
    fn accepts(&self, team: usize, group: usize, leaving: Option<usize>) -> bool {
        self.placed[team]
            .iter()
            .filter(|&&g| Some(g) != leaving)
            .all(|g| self.refused[group].binary_search(g).is_err())
    }

    /// Worst spread if `group` were added to `team`.
    fn spread_with(&self, group: usize, team: usize) -> f64 {
        let w = &self.weights[group];
        worst_spread(self.team_count(), self.discipline_count, |t, d| {
            if t == team {
                self.loads[t][d] + w[d]
            } else {
                self.loads[t][d]
            }
        })
    }

    /// Team that minimizes the worst spread after adding `group`, among
    /// teams holding no group it refuses.
    ///
    /// Ties go to the team with fewer members, then the lower index.
    /// `None` when every team holds a refused group.
    pub(crate) fn best_team(&self, group: usize) -> Option<usize> {
        let mut best: Option<(usize, f64, usize)> = None;
        for team in 0..self.team_count() {
            if !self.accepts(team, group, None) {
                continue;
            }
            let spread = self.spread_with(group, team);
            let count = self.counts[team];
            let better = match best {
                None => true,
                Some((_, best_spread, best_count)) => {
                    spread < best_spread - self.epsilon
                        || ((spread - best_spread).abs() <= self.epsilon && count < best_count)
                }
            };
            if better {
                best = Some((team, spread, count));
            }
        }
        best.map(|(team, _, _)| team)
    }

    pub(crate) fn place(&mut self, group: usize, team: usize) {
        for (load, w) in self.loads[team].iter_mut().zip(&self.weights[group]) {
            *load += w;
        }
        self.counts[team] += self.sizes[group];
        self.placed[team].push(group);
    }

    /// Teams with the largest and smallest aggregate load (first index on ties).
    pub(crate) fn extremes(&self) -> (usize, usize) {
        let aggregate = |t: usize| self.loads[t].iter().sum::<f64>();
        let mut hi = 0;
        let mut lo = 0;
        for t in 1..self.team_count() {
            if aggregate(t) > aggregate(hi) + self.epsilon {
                hi = t;
            }
            if aggregate(t) < aggregate(lo) - self.epsilon {
                lo = t;
            }
        }
        (hi, lo)
    }

    /// Steps between `hi` and `lo` in enumeration order: all swaps, then
    /// relocations from `hi` to `lo`, then from `lo` to `hi`.
    fn steps(&self, hi: usize, lo: usize) -> Vec<Step> {
        let mut steps: Vec<Step> = (0..self.placed[hi].len())
            .flat_map(|hi_pos| {
                (0..self.placed[lo].len()).map(move |lo_pos| Step::Swap {
                    hi,
                    lo,
                    hi_pos,
                    lo_pos,
                })
            })
            .collect();
        for (from, to) in [(hi, lo), (lo, hi)] {
            steps.extend((0..self.placed[from].len()).map(|pos| Step::Relocate { from, to, pos }));
        }
        steps
    }

    /// Objective after `step`, or `None` when it would seat refused
    /// groups together.
    fn evaluate(&self, step: Step) -> Option<Candidate> {
        // team `a` loses `leaving` and gains `arriving`; team `b` the reverse
        let (a, b, leaving, arriving) = match step {
            Step::Swap {
                hi,
                lo,
                hi_pos,
                lo_pos,
            } => {
                let ga = self.placed[hi][hi_pos];
                let gb = self.placed[lo][lo_pos];
                if !self.accepts(lo, ga, Some(gb)) || !self.accepts(hi, gb, Some(ga)) {
                    return None;
                }
                (hi, lo, Some(ga), Some(gb))
            }
            Step::Relocate { from, to, pos } => {
                let g = self.placed[from][pos];
                if !self.accepts(to, g, None) {
                    return None;
                }
                (from, to, Some(g), None)
            }
        };

        // Net change per discipline on team `a`; team `b` gets the negation.
        let delta = |d: usize| {
            let gone = leaving.map_or(0.0, |g| self.weights[g][d]);
            let came = arriving.map_or(0.0, |g| self.weights[g][d]);
            came - gone
        };
        let spread = worst_spread(self.team_count(), self.discipline_count, |t, d| {
            if t == a {
                self.loads[t][d] + delta(d)
            } else if t == b {
                self.loads[t][d] - delta(d)
            } else {
                self.loads[t][d]
            }
        });

        let size_out = leaving.map_or(0, |g| self.sizes[g]);
        let size_in = arriving.map_or(0, |g| self.sizes[g]);
        let count_spread = count_spread(self.team_count(), |t| {
            if t == a {
                self.counts[t] - size_out + size_in
            } else if t == b {
                self.counts[t] + size_out - size_in
            } else {
                self.counts[t]
            }
        });

        Some(Candidate {
            step,
            spread,
            count_spread,
        })
    }

    /// Best feasible step between `hi` and `lo`.
    ///
    /// Candidates are ranked by spread, then member-count spread, then
    /// enumeration order, so the pick is the same whether evaluated
    /// serially or in parallel.
    #[cfg_attr(not(feature = "parallel"), allow(unused_variables))]
    pub(crate) fn best_step(&self, hi: usize, lo: usize, parallel: bool) -> Option<Candidate> {
        let steps = self.steps(hi, lo);

        #[cfg(feature = "parallel")]
        let evaluated: Vec<Option<Candidate>> = if parallel {
            steps.par_iter().map(|&s| self.evaluate(s)).collect()
        } else {
            steps.iter().map(|&s| self.evaluate(s)).collect()
        };
        #[cfg(not(feature = "parallel"))]
        let evaluated: Vec<Option<Candidate>> = steps.iter().map(|&s| self.evaluate(s)).collect();

        let mut best: Option<Candidate> = None;
        for candidate in evaluated.into_iter().flatten() {
            match best {
                Some(ref b) if !candidate.better_than(b, self.epsilon) => {}
                _ => best = Some(candidate),
            }
        }
        best
    }

    pub(crate) fn apply(&mut self, step: Step) {
        match step {
            Step::Swap {
                hi,
                lo,
                hi_pos,
                lo_pos,
            } => {
                let ga = self.placed[hi][hi_pos];
                let gb = self.placed[lo][lo_pos];
                for d in 0..self.discipline_count {
                    let delta = self.weights[gb][d] - self.weights[ga][d];
                    self.loads[hi][d] += delta;
                    self.loads[lo][d] -= delta;
                }
                self.counts[hi] = self.counts[hi] - self.sizes[ga] + self.sizes[gb];
                self.counts[lo] = self.counts[lo] - self.sizes[gb] + self.sizes[ga];
                self.placed[hi][hi_pos] = gb;
                self.placed[lo][lo_pos] = ga;
            }
            Step::Relocate { from, to, pos } => {
                let g = self.placed[from].remove(pos);
                for d in 0..self.discipline_count {
                    self.loads[from][d] -= self.weights[g][d];
                    self.loads[to][d] += self.weights[g][d];
                }
                self.counts[from] -= self.sizes[g];
                self.counts[to] += self.sizes[g];
                self.placed[to].push(g);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DisciplineId, Member, SortOrder};

    fn speed() -> DisciplineInfo {
        DisciplineInfo::new(DisciplineId(1), "Speed")
    }

    fn group(values: &[(&str, f64)]) -> LockedGroup {
        LockedGroup::new(
            values
                .iter()
                .map(|&(n, v)| Member::new(n).with_value(DisciplineId(1), v))
                .collect(),
        )
    }

    fn no_refusals(n: usize) -> Vec<Vec<usize>> {
        vec![Vec::new(); n]
    }

    #[test]
    fn test_weights_orientation_and_scale() {
        let groups = vec![group(&[("A", 10.0), ("B", 20.0)]), group(&[("C", 5.0)]), group(&[("D", 25.0)])];
        let raw = group_weights(&groups, &[speed()], false);
        assert_eq!(raw, vec![vec![-30.0], vec![-5.0], vec![-25.0]]);

        let scaled = group_weights(&groups, &[speed()], true);
        // range 5..25 → scale 20
        assert!((scaled[0][0] + 1.5).abs() < 1e-12);

        let desc = speed().with_sort_order(SortOrder::Desc);
        let raw_desc = group_weights(&groups, &[desc], false);
        assert_eq!(raw_desc[1], vec![5.0]);
    }

    #[test]
    fn test_weights_skip_missing_values() {
        let groups = vec![LockedGroup::new(vec![Member::new("X")])];
        assert_eq!(group_weights(&groups, &[speed()], true), vec![vec![0.0]]);
    }

    #[test]
    fn test_refusals_are_symmetric() {
        let groups = vec![
            LockedGroup::new(vec![
                Member::new("A").with_member("B").not_with_member("C"),
                Member::new("B"),
            ]),
            LockedGroup::new(vec![Member::new("C")]),
            LockedGroup::new(vec![Member::new("D").not_with_member("B").not_with_member("Ghost")]),
        ];
        assert_eq!(group_refusals(&groups), vec![vec![1, 2], vec![0], vec![0]]);
    }

    #[test]
    fn test_best_team_tie_breaks() {
        let weights = vec![vec![1.0], vec![0.0]];
        let sizes = vec![3, 1];
        let refused = no_refusals(2);
        let mut table = LoadTable::new(3, 1, &weights, &sizes, &refused, 1e-9);
        // all empty: tie on spread and count → lowest index
        assert_eq!(table.best_team(0), Some(0));
        table.place(0, 0);
        // a zero-weight group: spread 1.0 anywhere, fewer members wins → team 1
        assert_eq!(table.best_team(1), Some(1));
    }

    #[test]
    fn test_best_team_skips_refused() {
        let weights = vec![vec![0.0], vec![0.0], vec![0.0]];
        let sizes = vec![1, 1, 1];
        let refused = vec![vec![1, 2], vec![0], vec![0]];
        let mut table = LoadTable::new(2, 1, &weights, &sizes, &refused, 1e-9);
        table.place(0, 0);
        assert_eq!(table.best_team(1), Some(1));
        table.place(1, 1);
        assert_eq!(table.best_team(2), Some(1));

        let refused = vec![vec![1, 2], vec![0, 2], vec![0, 1]];
        let mut table = LoadTable::new(2, 1, &weights, &sizes, &refused, 1e-9);
        table.place(0, 0);
        table.place(1, 1);
        assert_eq!(table.best_team(2), None);
    }

    #[test]
    fn test_swap_improves() {
        // team 0: weights 4 and 3, team 1: weights 2 and 1
        let weights = vec![vec![4.0], vec![3.0], vec![2.0], vec![1.0]];
        let sizes = vec![1, 1, 1, 1];
        let refused = no_refusals(4);
        let mut table = LoadTable::new(2, 1, &weights, &sizes, &refused, 1e-9);
        table.place(0, 0);
        table.place(1, 0);
        table.place(2, 1);
        table.place(3, 1);
        assert!((table.spread() - 4.0).abs() < 1e-12);

        let (hi, lo) = table.extremes();
        assert_eq!((hi, lo), (0, 1));
        let best = table.best_step(hi, lo, false).unwrap();
        assert!(best.spread.abs() < 1e-12);
        assert!(best.improves(table.spread(), table.count_spread(), 1e-9));
        table.apply(best.step);
        assert!(table.spread().abs() < 1e-12);

        let placement = table.into_placement();
        assert_eq!(placement, vec![vec![2, 1], vec![0, 3]]);
    }

    #[test]
    fn test_relocation_fixes_lopsided_split() {
        // {D} vs {C, A, B}: only moving C across reaches zero spread
        let weights = vec![vec![-10.0], vec![-10.0], vec![-1.0], vec![-19.0]];
        let sizes = vec![1, 1, 1, 1];
        let refused = no_refusals(4);
        let mut table = LoadTable::new(2, 1, &weights, &sizes, &refused, 1e-9);
        table.place(3, 0);
        table.place(2, 1);
        table.place(0, 1);
        table.place(1, 1);
        assert_eq!(table.count_spread(), 2);

        let (hi, lo) = table.extremes();
        let best = table.best_step(hi, lo, false).unwrap();
        assert_eq!(best.step, Step::Relocate { from: 1, to: 0, pos: 0 });
        table.apply(best.step);
        assert!(table.spread().abs() < 1e-12);
        assert_eq!(table.count_spread(), 0);
        assert_eq!(table.into_placement(), vec![vec![3, 2], vec![0, 1]]);
    }

    #[test]
    fn test_steps_respect_refusals() {
        // team 0 {0, 1}, team 1 {2}; group 2 refuses group 0
        let weights = vec![vec![5.0], vec![1.0], vec![1.0]];
        let sizes = vec![1, 1, 1];
        let refused = vec![vec![2], vec![], vec![0]];
        let mut table = LoadTable::new(2, 1, &weights, &sizes, &refused, 1e-9);
        table.place(0, 0);
        table.place(1, 0);
        table.place(2, 1);

        // swapping 0 for 2 is allowed (they trade places), swapping 1 for 2 is not
        let swap_ok = Step::Swap { hi: 0, lo: 1, hi_pos: 0, lo_pos: 0 };
        let swap_bad = Step::Swap { hi: 0, lo: 1, hi_pos: 1, lo_pos: 0 };
        assert!(table.evaluate(swap_ok).is_some());
        assert!(table.evaluate(swap_bad).is_none());
        // moving group 0 onto team 1 would seat it with group 2
        assert!(table.evaluate(Step::Relocate { from: 0, to: 1, pos: 0 }).is_none());
        assert!(table.evaluate(Step::Relocate { from: 0, to: 1, pos: 1 }).is_some());
    }

    #[test]
    fn test_no_disciplines_zero_spread() {
        let weights = vec![Vec::new(), Vec::new()];
        let sizes = vec![1, 1];
        let refused = no_refusals(2);
        let table = LoadTable::new(2, 0, &weights, &sizes, &refused, 1e-9);
        assert_eq!(table.spread(), 0.0);
    }
}

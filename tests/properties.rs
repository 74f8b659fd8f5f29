//! Property tests for grouping, balancing and scoring.

use proptest::prelude::*;
use u_teamsort::balance::{BalanceConfig, BalanceProblem, BalanceRunner};
use u_teamsort::grouping::{ConflictKind, ConstraintGrouper};
use u_teamsort::models::{DisciplineId, DisciplineInfo, Member, SortOrder};
use u_teamsort::scoring::{discipline_delta, BalanceReport};
use u_teamsort::sorter::TeamSorter;
use u_teamsort::TeamSortError;

fn disciplines() -> Vec<DisciplineInfo> {
    vec![
        DisciplineInfo::new(DisciplineId(1), "Speed"),
        DisciplineInfo::new(DisciplineId(2), "Power").with_sort_order(SortOrder::Desc),
    ]
}

/// Members with unique names, optional values and "with" links that only
/// point backwards, so no not-with relation can contradict them.
fn roster() -> impl Strategy<Value = Vec<Member>> {
    prop::collection::vec(
        (
            prop::option::of(0.0f64..100.0),
            prop::option::of(0.0f64..50.0),
            prop::option::of(any::<prop::sample::Index>()),
        ),
        0..30,
    )
    .prop_map(|rows| {
        rows.into_iter()
            .enumerate()
            .map(|(i, (speed, power, link))| {
                let mut m = Member::new(format!("M{i:02}"));
                if let Some(v) = speed {
                    m = m.with_value(DisciplineId(1), v);
                }
                if let Some(v) = power {
                    m = m.with_value(DisciplineId(2), v);
                }
                if let (Some(link), true) = (link, i > 0) {
                    m = m.with_member(format!("M{:02}", link.index(i)));
                }
                m
            })
            .collect()
    })
}

/// [`roster`] plus a few not-with links between random pairs. Links that
/// land inside a locked group produce a blocking conflict.
fn roster_with_refusals() -> impl Strategy<Value = Vec<Member>> {
    (
        roster(),
        prop::collection::vec(
            (any::<prop::sample::Index>(), any::<prop::sample::Index>()),
            0..4,
        ),
    )
        .prop_map(|(mut members, links)| {
            if members.len() >= 2 {
                for (from, to) in links {
                    let (from, to) = (from.index(members.len()), to.index(members.len()));
                    if from != to {
                        let name = members[to].name.clone();
                        members[from].add_not_with_member(name);
                    }
                }
            }
            members
        })
}

fn sorted_names<'a>(names: impl Iterator<Item = &'a str>) -> Vec<&'a str> {
    let mut v: Vec<&str> = names.collect();
    v.sort_unstable();
    v
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn every_member_placed_exactly_once(
        members in roster(),
        teams in 1usize..7,
        seed in "[a-z0-9]{1,8}",
    ) {
        let config = BalanceConfig::default().with_seed(seed);
        let result = TeamSorter::sort(&members, &disciplines(), teams, &config).unwrap();

        prop_assert_eq!(result.teams.len(), teams);
        let placed = sorted_names(
            result.teams.iter().flat_map(|t| t.members.iter().map(|m| m.name.as_str())),
        );
        let expected = sorted_names(members.iter().map(|m| m.name.as_str()));
        prop_assert_eq!(placed, expected);
    }

    #[test]
    fn locked_groups_are_never_split(
        members in roster(),
        teams in 1usize..7,
        seed in "[a-z0-9]{1,8}",
    ) {
        let report = ConstraintGrouper::group(&members);
        let config = BalanceConfig::default().with_seed(seed);
        let result = TeamSorter::sort(&members, &disciplines(), teams, &config).unwrap();

        for group in &report.groups {
            let homes: Vec<Option<&str>> = group.names().iter().map(|n| result.team_of(n)).collect();
            prop_assert!(homes.iter().all(|h| h.is_some() && *h == homes[0]));
        }
        prop_assert!(result.teams.iter().all(|t| t.is_valid()));
    }

    #[test]
    fn refused_members_never_share_a_team(
        members in roster_with_refusals(),
        teams in 1usize..7,
        seed in "[a-z0-9]{1,8}",
    ) {
        let report = ConstraintGrouper::group(&members);
        prop_assume!(!report.has_blocking_conflicts());
        let config = BalanceConfig::default().with_seed(seed);
        match TeamSorter::sort(&members, &disciplines(), teams, &config) {
            Ok(result) => {
                for group in &report.groups {
                    let homes: Vec<Option<&str>> =
                        group.names().iter().map(|n| result.team_of(n)).collect();
                    prop_assert!(homes.iter().all(|h| h.is_some() && *h == homes[0]));
                }
                prop_assert!(result.teams.iter().all(|t| t.is_valid()));
            }
            Err(err) => {
                prop_assert!(matches!(err, TeamSortError::NoFeasibleTeam(_)), "unexpected error: {:?}", err);
            }
        }
    }

    #[test]
    fn same_seed_same_teams(
        members in roster(),
        teams in 1usize..7,
        seed in "[a-z0-9]{1,8}",
    ) {
        let config = BalanceConfig::default().with_seed(seed.clone());
        let a = TeamSorter::sort(&members, &disciplines(), teams, &config).unwrap();
        let b = TeamSorter::sort(&members, &disciplines(), teams, &config).unwrap();
        prop_assert_eq!(&a.teams, &b.teams);
        prop_assert_eq!(&a.seed_used, &seed);
        prop_assert_eq!(a.seed_used, b.seed_used);
    }

    #[test]
    fn surplus_teams_stay_empty(
        members in roster(),
        extra in 1usize..4,
        seed in "[a-z0-9]{1,8}",
    ) {
        let report = ConstraintGrouper::group(&members);
        let teams = report.groups.len() + extra;
        let config = BalanceConfig::default().with_seed(seed);
        let result = TeamSorter::sort(&members, &disciplines(), teams, &config).unwrap();
        let empty = result.teams.iter().filter(|t| t.is_empty()).count();
        prop_assert!(empty >= extra);
    }

    #[test]
    fn swaps_never_worsen_spread(
        members in roster(),
        teams in 1usize..7,
        seed in "[a-z0-9]{1,8}",
    ) {
        let report = ConstraintGrouper::group(&members);
        let problem = BalanceProblem::new(report.groups, disciplines(), teams);
        let result = BalanceRunner::run(&problem, &BalanceConfig::default().with_seed(seed)).unwrap();
        prop_assert!(result.final_spread <= result.greedy_spread + 1e-9);
    }

    #[test]
    fn scoring_is_idempotent(
        members in roster(),
        teams in 1usize..7,
        seed in "[a-z0-9]{1,8}",
    ) {
        let config = BalanceConfig::default().with_seed(seed);
        let result = TeamSorter::sort(&members, &disciplines(), teams, &config).unwrap();
        let first = BalanceReport::from_teams(&result.teams, &disciplines());
        let second = BalanceReport::from_teams(&result.teams, &disciplines());
        prop_assert_eq!(&first, &second);
        for d in disciplines() {
            prop_assert!(discipline_delta(&result.teams, &d) >= 0.0);
        }
    }

    #[test]
    fn refusal_is_detected_from_either_side(
        members in roster(),
        refuser_first in any::<bool>(),
    ) {
        prop_assume!(members.len() >= 2);
        let mut members = members;
        let (a, b) = (members[0].name.clone(), members[1].name.clone());
        members[1].add_with_member(a.clone());
        if refuser_first {
            members[0].add_not_with_member(b.clone());
        } else {
            members[1].add_not_with_member(a.clone());
        }

        let report = ConstraintGrouper::group(&members);
        let conflict = report
            .conflicts
            .iter()
            .find(|c| c.kind == ConflictKind::ConstraintConflict);
        prop_assert!(conflict.is_some());
        let conflict = conflict.unwrap();
        prop_assert!(conflict.members.contains(&a) && conflict.members.contains(&b));

        let err = TeamSorter::sort(&members, &disciplines(), 2, &BalanceConfig::default()).unwrap_err();
        prop_assert!(matches!(err, TeamSortError::ConstraintConflict(_)), "unexpected error: {:?}", err);
    }
}

#[test]
fn speed_scenario_balances_exactly() {
    let d = DisciplineId(1);
    let members = vec![
        Member::new("A").with_value(d, 10.0).with_member("B"),
        Member::new("B").with_value(d, 20.0),
        Member::new("C").with_value(d, 5.0),
        Member::new("D").with_value(d, 25.0),
    ];
    let speed = DisciplineInfo::new(d, "Speed");
    let config = BalanceConfig::default().with_seed("seed123");
    let result = TeamSorter::sort(&members, &[speed.clone()], 2, &config).unwrap();

    assert_eq!(result.team_of("A"), result.team_of("B"));
    assert_eq!(result.team_of("C"), result.team_of("D"));
    assert!(discipline_delta(&result.teams, &speed).abs() < 1e-9);

    let replay = TeamSorter::sort(&members, &[speed], 2, &config).unwrap();
    assert_eq!(result.teams, replay.teams);
}

#[test]
fn zero_teams_is_rejected() {
    let err = TeamSorter::sort(&[], &disciplines(), 0, &BalanceConfig::default()).unwrap_err();
    assert_eq!(err, TeamSortError::InvalidTeamCount(0));
}

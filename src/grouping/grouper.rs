//! Locked group construction and conflict detection.
//!
//! # Algorithm
//!
//! 1. Index members by name (first occurrence wins).
//! 2. Build an undirected adjacency list: A–B when either lists the other
//!    in "with".
//! 3. Breadth-first traversal from each unvisited member, in input order.
//!    Each component is one locked group.
//! 4. For each group, check whether any member's "not-with" names land
//!    inside the group.
//!
//! # Complexity
//! O(n + r) for n members and r relation entries, plus O(g²) per group
//! for the not-with check.

use std::collections::{HashMap, VecDeque};

use tracing::debug;

use super::types::{ConflictKind, ConflictReport, GroupingReport, LockedGroup, RelationKind};
use crate::models::Member;

/// Derives locked groups from member relations.
pub struct ConstraintGrouper;

impl ConstraintGrouper {
    /// Groups members and reports every finding.
    ///
    /// Never fails; callers inspect
    /// [`GroupingReport::has_blocking_conflicts`] before balancing.
    ///
    /// # Examples
    ///
    /// ```
    /// use u_teamsort::grouping::ConstraintGrouper;
    /// use u_teamsort::models::Member;
    ///
    /// let members = vec![
    ///     Member::new("A").with_member("B"),
    ///     Member::new("B"),
    ///     Member::new("C"),
    /// ];
    /// let report = ConstraintGrouper::group(&members);
    /// assert_eq!(report.groups.len(), 2);
    /// assert_eq!(report.groups[0].names(), vec!["A", "B"]);
    /// assert!(!report.has_blocking_conflicts());
    /// ```
    pub fn group(members: &[Member]) -> GroupingReport {
        let mut conflicts = Vec::new();

        let mut index: HashMap<&str, usize> = HashMap::with_capacity(members.len());
        for (i, member) in members.iter().enumerate() {
            if index.contains_key(member.name.as_str()) {
                conflicts.push(ConflictReport {
                    kind: ConflictKind::DuplicateMember,
                    members: vec![member.name.clone()],
                    group: None,
                    message: format!("Duplicate member name: {}", member.name),
                });
            } else {
                index.insert(&member.name, i);
            }
        }

        let mut adj: Vec<Vec<usize>> = vec![Vec::new(); members.len()];
        for (i, member) in members.iter().enumerate() {
            for name in &member.with {
                match index.get(name.as_str()) {
                    Some(&j) if j != i => {
                        adj[i].push(j);
                        adj[j].push(i);
                    }
                    Some(_) => {}
                    None => conflicts.push(unresolved(member, name, RelationKind::With)),
                }
            }
            for name in &member.not_with {
                if !index.contains_key(name.as_str()) {
                    conflicts.push(unresolved(member, name, RelationKind::NotWith));
                }
            }
        }

        let components = connected_components(&adj);
        let mut groups = Vec::with_capacity(components.len());

        for (g, component) in components.iter().enumerate() {
            let group = LockedGroup::new(component.iter().map(|&i| members[i].clone()).collect());
            let refusals = group.internal_refusals();
            if !refusals.is_empty() {
                let pairs: Vec<String> = refusals
                    .iter()
                    .map(|(a, b)| format!("{a} refuses {b}"))
                    .collect();
                conflicts.push(ConflictReport {
                    kind: ConflictKind::ConstraintConflict,
                    members: group.names().into_iter().map(String::from).collect(),
                    group: Some(g),
                    message: format!(
                        "Group [{}] must stay together but {}",
                        group.names().join(", "),
                        pairs.join(", ")
                    ),
                });
            }
            groups.push(group);
        }

        debug!(
            event = "grouping_done",
            members = members.len(),
            groups = groups.len(),
            conflicts = conflicts.len(),
        );

        GroupingReport { groups, conflicts }
    }
}

fn unresolved(member: &Member, missing: &str, relation: RelationKind) -> ConflictReport {
    let label = match relation {
        RelationKind::With => "with",
        RelationKind::NotWith => "not-with",
    };
    ConflictReport {
        kind: ConflictKind::UnresolvedRelation(relation),
        members: vec![member.name.clone(), missing.to_string()],
        group: None,
        message: format!(
            "Member '{}' lists unknown {label} member '{missing}'",
            member.name
        ),
    }
}

/// BFS components, ordered by smallest index; indices sorted within each.
fn connected_components(adj: &[Vec<usize>]) -> Vec<Vec<usize>> {
    let mut visited = vec![false; adj.len()];
    let mut components = Vec::new();
    let mut queue = VecDeque::new();

    for start in 0..adj.len() {
        if visited[start] {
            continue;
        }
        visited[start] = true;
        queue.push_back(start);
        let mut component = Vec::new();

        while let Some(node) = queue.pop_front() {
            component.push(node);
            for &next in &adj[node] {
                if !visited[next] {
                    visited[next] = true;
                    queue.push_back(next);
                }
            }
        }

        component.sort_unstable();
        components.push(component);
    }

    components
}

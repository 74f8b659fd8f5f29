//! Locked groups and conflict reports.

use crate::models::{DisciplineId, Member};

/// Members that must always share a team.
///
/// The transitive closure of the "with" relation around one member.
/// Members are kept in input order.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LockedGroup {
    /// Group members.
    pub members: Vec<Member>,
}

impl LockedGroup {
    /// Creates a group from members.
    pub fn new(members: Vec<Member>) -> Self {
        Self { members }
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether the group is empty.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Whether a member with this name belongs to the group.
    pub fn contains(&self, name: &str) -> bool {
        self.members.iter().any(|m| m.name == name)
    }

    /// Member names in input order.
    pub fn names(&self) -> Vec<&str> {
        self.members.iter().map(|m| m.name.as_str()).collect()
    }

    /// Sum of the available values for a discipline.
    pub fn total(&self, discipline_id: DisciplineId) -> f64 {
        self.members
            .iter()
            .filter_map(|m| m.value(discipline_id))
            .sum()
    }

    /// Pairs `(member, refused)` where both sides are inside the group.
    pub fn internal_refusals(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        for member in &self.members {
            for refused in &member.not_with {
                if self.contains(refused) {
                    pairs.push((member.name.clone(), refused.clone()));
                }
            }
        }
        pairs
    }
}

/// Which relation list a name came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RelationKind {
    With,
    NotWith,
}

/// Categories of grouping findings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ConflictKind {
    /// A relation names a member that does not exist.
    UnresolvedRelation(RelationKind),
    /// A group is required to be both together and apart.
    ConstraintConflict,
    /// Two members share a name.
    DuplicateMember,
}

/// A single grouping finding.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConflictReport {
    /// Finding category.
    pub kind: ConflictKind,
    /// Offending member names.
    ///
    /// For a constraint conflict: every member of the group. For an
    /// unresolved relation: the listing member followed by the missing name.
    pub members: Vec<String>,
    /// Index into [`GroupingReport::groups`] when the finding concerns a group.
    pub group: Option<usize>,
    /// Human-readable description.
    pub message: String,
}

impl ConflictReport {
    /// Whether this finding prevents balancing.
    ///
    /// Unresolved "not-with" names are harmless for placement and only
    /// reported as a data-quality issue.
    pub fn is_blocking(&self) -> bool {
        !matches!(
            self.kind,
            ConflictKind::UnresolvedRelation(RelationKind::NotWith)
        )
    }
}

/// Output of a grouping pass.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GroupingReport {
    /// Locked groups ordered by their first input member.
    pub groups: Vec<LockedGroup>,
    /// All findings, blocking or not.
    pub conflicts: Vec<ConflictReport>,
}

impl GroupingReport {
    /// Whether any finding prevents balancing.
    pub fn has_blocking_conflicts(&self) -> bool {
        self.conflicts.iter().any(ConflictReport::is_blocking)
    }

    /// The findings that prevent balancing.
    pub fn blocking_conflicts(&self) -> Vec<ConflictReport> {
        self.conflicts
            .iter()
            .filter(|c| c.is_blocking())
            .cloned()
            .collect()
    }

    /// The group containing a member.
    pub fn group_of(&self, name: &str) -> Option<&LockedGroup> {
        self.groups.iter().find(|g| g.contains(name))
    }

    /// Members of every group with a constraint conflict, in group order.
    pub fn conflicting_members(&self) -> Vec<&Member> {
        self.conflicts
            .iter()
            .filter(|c| c.kind == ConflictKind::ConstraintConflict)
            .filter_map(|c| c.group)
            .flat_map(|g| self.groups[g].members.iter())
            .collect()
    }
}

//! Team model.

use super::Member;

/// Prefix used for synthesized team names.
pub const DEFAULT_TEAM_PREFIX: &str = "Team";

/// Name of the team at `index` (0-based): `"{prefix} {index + 1}"`.
pub fn team_name(prefix: &str, index: usize) -> String {
    format!("{} {}", prefix, index + 1)
}

/// A named, ordered set of members.
///
/// Teams produced by the balancing engine always hold whole locked groups.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Team {
    /// Team name.
    pub name: String,
    /// Assigned members in placement order.
    pub members: Vec<Member>,
}

/// Relation problems found inside one member set.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InvalidMembers {
    /// "With" names that are not part of the set.
    pub invalid_with: Vec<String>,
    /// Names in the set that some member of the set refuses.
    pub invalid_not_with: Vec<String>,
}

impl InvalidMembers {
    /// Whether no problems were found.
    pub fn is_empty(&self) -> bool {
        self.invalid_with.is_empty() && self.invalid_not_with.is_empty()
    }
}

impl Team {
    /// Creates an empty team.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            members: Vec::new(),
        }
    }

    /// Adds members (builder style).
    pub fn with_members(mut self, members: impl IntoIterator<Item = Member>) -> Self {
        self.members.extend(members);
        self
    }

    /// Number of members.
    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    /// Whether the team has no members.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Whether a member with this name is on the team.
    pub fn contains(&self, name: &str) -> bool {
        self.members.iter().any(|m| m.name == name)
    }

    /// Member names in placement order.
    pub fn member_names(&self) -> Vec<&str> {
        self.members.iter().map(|m| m.name.as_str()).collect()
    }

    /// Removes a member by name and returns it.
    pub fn remove_member(&mut self, name: &str) -> Option<Member> {
        let idx = self.members.iter().position(|m| m.name == name)?;
        Some(self.members.remove(idx))
    }

    /// Whether every relation inside this team is satisfied.
    pub fn is_valid(&self) -> bool {
        Self::invalid_members(&self.members).is_empty()
    }

    /// Checks the relations of an arbitrary member set.
    ///
    /// A "with" name that is not in the set, or a member of the set that
    /// someone in the set lists as "not-with", is reported. Names appear
    /// once, in first-seen order.
    pub fn invalid_members(members: &[Member]) -> InvalidMembers {
        let mut result = InvalidMembers::default();
        let in_set = |name: &str| members.iter().any(|m| m.name == name);

        for name in members.iter().flat_map(|m| m.with.iter()) {
            if !in_set(name) && !result.invalid_with.contains(name) {
                result.invalid_with.push(name.clone());
            }
        }
        for member in members {
            let refused = members
                .iter()
                .any(|other| other.not_with.iter().any(|n| *n == member.name));
            if refused && !result.invalid_not_with.contains(&member.name) {
                result.invalid_not_with.push(member.name.clone());
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_team() {
        let team = Team::new("Team 1").with_members([
            Member::new("A").with_member("B"),
            Member::new("B"),
            Member::new("C").not_with_member("D"),
        ]);
        assert!(team.is_valid());
        assert_eq!(team.member_count(), 3);
        assert_eq!(team.member_names(), vec!["A", "B", "C"]);
    }

    #[test]
    fn test_missing_with_partner() {
        let members = vec![Member::new("A").with_member("B"), Member::new("C")];
        let invalid = Team::invalid_members(&members);
        assert_eq!(invalid.invalid_with, vec!["B".to_string()]);
        assert!(invalid.invalid_not_with.is_empty());
    }

    #[test]
    fn test_refused_member_present() {
        let members = vec![
            Member::new("A").not_with_member("B"),
            Member::new("B"),
            Member::new("C").not_with_member("B"),
        ];
        let invalid = Team::invalid_members(&members);
        assert!(invalid.invalid_with.is_empty());
        assert_eq!(invalid.invalid_not_with, vec!["B".to_string()]);
    }

    #[test]
    fn test_remove_member() {
        let mut team = Team::new("T").with_members([Member::new("A"), Member::new("B")]);
        assert_eq!(team.remove_member("A").map(|m| m.name), Some("A".to_string()));
        assert!(team.remove_member("A").is_none());
        assert!(!team.contains("A"));
        assert!(team.contains("B"));
    }

    #[test]
    fn test_team_name() {
        assert_eq!(team_name(DEFAULT_TEAM_PREFIX, 0), "Team 1");
        assert_eq!(team_name("Squad", 9), "Squad 10");
    }
}

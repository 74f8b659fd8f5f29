//! Long-lived member, discipline and team state.

use std::cmp::Ordering;
use std::collections::HashSet;

use tracing::debug;

use super::discipline::{DisciplineId, DisciplineInfo, DisciplineRecord, SortOrder, ValueKind};
use super::member::Member;
use super::team::{team_name, Team, DEFAULT_TEAM_PREFIX};
use crate::balance::{BalanceConfig, BalanceResult};
use crate::error::{Result, TeamSortError};
use crate::grouping::ConstraintGrouper;
use crate::scoring::{self, BalanceReport, DisciplineDelta};
use crate::sorter::TeamSorter;

/// Owns the disciplines, members and teams of one sorting session.
///
/// Every member holds exactly one record per known discipline; adding or
/// removing a discipline adds or removes a record on every member. Teams
/// hold copies of members and are kept in step when a member changes.
///
/// # Examples
///
/// ```
/// use u_teamsort::balance::BalanceConfig;
/// use u_teamsort::models::{Dataset, Member, SortOrder, ValueKind};
///
/// let mut data = Dataset::new();
/// let speed = data.add_discipline("Speed", ValueKind::Number, SortOrder::Asc).unwrap();
/// for (name, value) in [("A", "10"), ("B", "20"), ("C", "5"), ("D", "25")] {
///     data.add_member(Member::new(name)).unwrap();
///     data.set_record(name, speed, value).unwrap();
/// }
/// data.add_with_relation("A", "B").unwrap();
///
/// let result = data
///     .sort_into_teams(2, &BalanceConfig::default().with_seed("seed123"))
///     .unwrap();
/// assert_eq!(data.seed(), Some("seed123"));
/// assert_eq!(data.teams().len(), 2);
/// assert_eq!(result.team_of("A"), result.team_of("B"));
/// assert!(data.has_key_parity());
/// ```
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Dataset {
    disciplines: Vec<DisciplineInfo>,
    members: Vec<Member>,
    teams: Vec<Team>,
    seed: Option<String>,
    next_discipline_id: u64,
}

impl Dataset {
    /// Creates an empty dataset.
    pub fn new() -> Self {
        Self::default()
    }

    /// Known disciplines in insertion order.
    pub fn disciplines(&self) -> &[DisciplineInfo] {
        &self.disciplines
    }

    /// All members in insertion order.
    pub fn members(&self) -> &[Member] {
        &self.members
    }

    /// Current teams, as last sorted or edited.
    pub fn teams(&self) -> &[Team] {
        &self.teams
    }

    /// Seed of the last sort, if any.
    pub fn seed(&self) -> Option<&str> {
        self.seed.as_deref()
    }

    // ========================================================================
    // Disciplines
    // ========================================================================

    /// Adds a discipline with a fresh id and returns the id.
    pub fn add_discipline(
        &mut self,
        name: impl Into<String>,
        value_kind: ValueKind,
        sort_order: SortOrder,
    ) -> Result<DisciplineId> {
        let id = DisciplineId(self.next_discipline_id);
        let info = DisciplineInfo::new(id, name)
            .with_value_kind(value_kind)
            .with_sort_order(sort_order);
        self.insert_discipline(info)?;
        Ok(id)
    }

    /// Adds a discipline with a caller-chosen id.
    ///
    /// Every member receives a blank record for it.
    pub fn insert_discipline(&mut self, info: DisciplineInfo) -> Result<()> {
        if self.disciplines.iter().any(|d| d.name == info.name) {
            return Err(TeamSortError::DuplicateDiscipline(info.name));
        }
        if self.disciplines.iter().any(|d| d.id == info.id) {
            return Err(TeamSortError::DuplicateDiscipline(info.id.to_string()));
        }
        for member in &mut self.members {
            member.ensure_record(info.id);
        }
        for member in self.teams.iter_mut().flat_map(|t| t.members.iter_mut()) {
            member.ensure_record(info.id);
        }
        self.next_discipline_id = self.next_discipline_id.max(info.id.0 + 1);
        self.disciplines.push(info);
        Ok(())
    }

    /// Removes a discipline and its record on every member.
    pub fn remove_discipline(&mut self, id: DisciplineId) -> Result<DisciplineInfo> {
        let idx = self
            .disciplines
            .iter()
            .position(|d| d.id == id)
            .ok_or_else(|| TeamSortError::UnknownDiscipline(id.to_string()))?;
        let info = self.disciplines.remove(idx);
        for member in self
            .members
            .iter_mut()
            .chain(self.teams.iter_mut().flat_map(|t| t.members.iter_mut()))
        {
            member.remove_record(id);
        }
        Ok(info)
    }

    /// Looks up a discipline by display name.
    pub fn discipline_by_name(&self, name: &str) -> Option<&DisciplineInfo> {
        self.disciplines.iter().find(|d| d.name == name)
    }

    /// Looks up a discipline by id.
    pub fn discipline_by_id(&self, id: DisciplineId) -> Option<&DisciplineInfo> {
        self.disciplines.iter().find(|d| d.id == id)
    }

    fn discipline(&self, id: DisciplineId) -> Result<&DisciplineInfo> {
        self.discipline_by_id(id)
            .ok_or_else(|| TeamSortError::UnknownDiscipline(id.to_string()))
    }

    /// Changes the sort direction of a discipline.
    pub fn set_sort_order(&mut self, id: DisciplineId, order: SortOrder) -> Result<()> {
        let info = self
            .disciplines
            .iter_mut()
            .find(|d| d.id == id)
            .ok_or_else(|| TeamSortError::UnknownDiscipline(id.to_string()))?;
        info.sort_order = order;
        Ok(())
    }

    /// Changes the value kind of a discipline and re-parses every record.
    ///
    /// Returns the names of members whose raw text no longer parses; their
    /// records keep the raw text with no value.
    pub fn set_value_kind(&mut self, id: DisciplineId, kind: ValueKind) -> Result<Vec<String>> {
        let info = self
            .disciplines
            .iter_mut()
            .find(|d| d.id == id)
            .ok_or_else(|| TeamSortError::UnknownDiscipline(id.to_string()))?;
        info.value_kind = kind;
        let info = info.clone();

        let mut failed = Vec::new();
        for member in &mut self.members {
            let raw = member
                .record(id)
                .map(|r| r.raw_value.clone())
                .unwrap_or_default();
            if member.set_raw_value(&info, &raw).is_err() {
                failed.push(member.name.clone());
            }
        }
        let names: Vec<String> = self.members.iter().map(|m| m.name.clone()).collect();
        for name in &names {
            self.sync_team_copy(name);
        }
        if !failed.is_empty() {
            debug!(event = "reparse_failed", discipline = %info.name, members = failed.len());
        }
        Ok(failed)
    }

    // ========================================================================
    // Members
    // ========================================================================

    /// Adds a member, giving it a blank record for every discipline it
    /// lacks and dropping records for unknown disciplines.
    pub fn add_member(&mut self, mut member: Member) -> Result<()> {
        if self.members.iter().any(|m| m.name == member.name) {
            return Err(TeamSortError::DuplicateMember(member.name));
        }
        let known: HashSet<DisciplineId> = self.disciplines.iter().map(|d| d.id).collect();
        member.records.retain(|id, _| known.contains(id));
        for d in &self.disciplines {
            member.ensure_record(d.id);
        }
        self.members.push(member);
        Ok(())
    }

    /// Removes a member from the dataset and from any team holding it.
    ///
    /// Relation lists of other members are left untouched; names that no
    /// longer resolve show up as unresolved relations when grouping.
    pub fn remove_member(&mut self, name: &str) -> Result<Member> {
        let idx = self
            .members
            .iter()
            .position(|m| m.name == name)
            .ok_or_else(|| TeamSortError::UnknownMember(name.to_string()))?;
        for team in &mut self.teams {
            team.remove_member(name);
        }
        Ok(self.members.remove(idx))
    }

    /// Looks up a member by name.
    pub fn member_by_name(&self, name: &str) -> Option<&Member> {
        self.members.iter().find(|m| m.name == name)
    }

    /// Members whose names appear in `names`, in dataset order.
    pub fn members_by_name<S: AsRef<str>>(&self, names: &[S]) -> Vec<&Member> {
        self.members
            .iter()
            .filter(|m| names.iter().any(|n| n.as_ref() == m.name))
            .collect()
    }

    /// Member names in lexicographic order.
    pub fn sorted_member_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.members.iter().map(|m| m.name.as_str()).collect();
        names.sort_unstable();
        names
    }

    fn member_mut(&mut self, name: &str) -> Result<&mut Member> {
        self.members
            .iter_mut()
            .find(|m| m.name == name)
            .ok_or_else(|| TeamSortError::UnknownMember(name.to_string()))
    }

    /// Replaces the copy of a member held by a team with the current one.
    fn sync_team_copy(&mut self, name: &str) {
        let Some(current) = self.members.iter().find(|m| m.name == name) else {
            return;
        };
        for slot in self
            .teams
            .iter_mut()
            .flat_map(|t| t.members.iter_mut())
            .filter(|m| m.name == name)
        {
            *slot = current.clone();
        }
    }

    /// Stores raw text for a member's discipline record.
    ///
    /// Unparsable text is kept on the record (without a value) and
    /// reported as [`TeamSortError::InvalidValue`].
    pub fn set_record(&mut self, member: &str, discipline: DisciplineId, raw: &str) -> Result<()> {
        let info = self.discipline(discipline)?.clone();
        let result = self.member_mut(member)?.set_raw_value(&info, raw);
        self.sync_team_copy(member);
        result
    }

    /// Records that `member` must be on the same team as `other`.
    ///
    /// Returns `false` if the relation already existed or names the member
    /// itself.
    pub fn add_with_relation(&mut self, member: &str, other: &str) -> Result<bool> {
        self.relation_target(other)?;
        let added = self.member_mut(member)?.add_with_member(other);
        self.sync_team_copy(member);
        Ok(added)
    }

    /// Records that `member` must not be on the same team as `other`.
    pub fn add_not_with_relation(&mut self, member: &str, other: &str) -> Result<bool> {
        self.relation_target(other)?;
        let added = self.member_mut(member)?.add_not_with_member(other);
        self.sync_team_copy(member);
        Ok(added)
    }

    /// Drops a "with" relation. Returns `false` if it was not recorded.
    pub fn remove_with_relation(&mut self, member: &str, other: &str) -> Result<bool> {
        let removed = self.member_mut(member)?.remove_with_member(other);
        self.sync_team_copy(member);
        Ok(removed)
    }

    /// Drops a "not-with" relation. Returns `false` if it was not recorded.
    pub fn remove_not_with_relation(&mut self, member: &str, other: &str) -> Result<bool> {
        let removed = self.member_mut(member)?.remove_not_with_member(other);
        self.sync_team_copy(member);
        Ok(removed)
    }

    fn relation_target(&self, name: &str) -> Result<()> {
        self.member_by_name(name)
            .map(|_| ())
            .ok_or_else(|| TeamSortError::UnknownMember(name.to_string()))
    }

    // ========================================================================
    // Relations
    // ========================================================================

    /// Everyone who must end up on the same team as `name`, excluding
    /// `name` itself, in dataset order.
    pub fn with_members(&self, name: &str) -> Result<Vec<&Member>> {
        self.relation_target(name)?;
        let report = ConstraintGrouper::group(&self.members);
        let names: Vec<&str> = report
            .group_of(name)
            .map(|g| g.names())
            .unwrap_or_default();
        Ok(self
            .members
            .iter()
            .filter(|m| m.name != name && names.contains(&m.name.as_str()))
            .collect())
    }

    /// Everyone `name` refuses, each together with that member's locked
    /// group, in dataset order.
    pub fn not_with_members(&self, name: &str) -> Result<Vec<&Member>> {
        let member = self
            .member_by_name(name)
            .ok_or_else(|| TeamSortError::UnknownMember(name.to_string()))?;
        let report = ConstraintGrouper::group(&self.members);
        let mut refused: HashSet<&str> = HashSet::new();
        for target in &member.not_with {
            if let Some(group) = report.group_of(target) {
                refused.extend(group.names());
            }
        }
        Ok(self
            .members
            .iter()
            .filter(|m| refused.contains(m.name.as_str()))
            .collect())
    }

    /// Every member of a locked group that contradicts itself.
    pub fn invalid_members_combination(&self) -> Vec<&Member> {
        let report = ConstraintGrouper::group(&self.members);
        let conflicted: HashSet<&str> = report
            .conflicting_members()
            .into_iter()
            .map(|m| m.name.as_str())
            .collect();
        self.members
            .iter()
            .filter(|m| conflicted.contains(m.name.as_str()))
            .collect()
    }

    /// Whether every member holds exactly the known discipline keys.
    pub fn has_key_parity(&self) -> bool {
        let known: HashSet<DisciplineId> = self.disciplines.iter().map(|d| d.id).collect();
        self.members.iter().all(|m| {
            m.records.len() == known.len() && m.records.keys().all(|id| known.contains(id))
        })
    }

    // ========================================================================
    // Scores
    // ========================================================================

    /// Observed `(min, max)` for a discipline, `(0, 0)` without values.
    pub fn discipline_range(&self, id: DisciplineId) -> Result<(f64, f64)> {
        let info = self.discipline(id)?;
        Ok(scoring::discipline_range(&self.members, info))
    }

    /// A member's 0-100 position in the discipline's range, oriented by its
    /// sort order (see [`scoring::normalized_score`]).
    ///
    /// `None` when the member has no value.
    pub fn member_score(&self, member: &str, id: DisciplineId) -> Result<Option<f64>> {
        let info = self.discipline(id)?;
        let m = self
            .member_by_name(member)
            .ok_or_else(|| TeamSortError::UnknownMember(member.to_string()))?;
        let range = scoring::discipline_range(&self.members, info);
        Ok(scoring::normalized_score(m, info, range))
    }

    /// Records for a discipline, best first. Records without a value come
    /// last, in dataset order.
    pub fn sorted_records_by_discipline(&self, id: DisciplineId) -> Result<Vec<(&str, &DisciplineRecord)>> {
        let info = self.discipline(id)?;
        let mut records: Vec<(&str, &DisciplineRecord)> = self
            .members
            .iter()
            .filter_map(|m| m.record(id).map(|r| (m.name.as_str(), r)))
            .collect();
        records.sort_by(|(_, a), (_, b)| match (a.value, b.value) {
            (Some(x), Some(y)) => match info.sort_order {
                SortOrder::Asc => x.total_cmp(&y),
                SortOrder::Desc => y.total_cmp(&x),
            },
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        });
        Ok(records)
    }

    /// Teams paired with their average for a discipline, lowest first.
    pub fn teams_by_average(&self, id: DisciplineId) -> Result<Vec<(&str, f64)>> {
        let info = self.discipline(id)?;
        let mut ranked: Vec<(&str, f64)> = self
            .teams
            .iter()
            .zip(scoring::team_averages(&self.teams, info))
            .map(|(t, avg)| (t.name.as_str(), avg))
            .collect();
        ranked.sort_by(|a, b| a.1.total_cmp(&b.1));
        Ok(ranked)
    }

    /// Rounded delta per discipline over the current teams.
    pub fn discipline_deltas(&self) -> Vec<DisciplineDelta> {
        self.report().deltas
    }

    /// Balance report over the current teams.
    pub fn report(&self) -> BalanceReport {
        BalanceReport::from_teams(&self.teams, &self.disciplines)
    }

    // ========================================================================
    // Teams
    // ========================================================================

    /// Appends a team. Names must be unique.
    pub fn add_team(&mut self, team: Team) -> Result<()> {
        if self.teams.iter().any(|t| t.name == team.name) {
            return Err(TeamSortError::DuplicateTeam(team.name));
        }
        self.teams.push(team);
        Ok(())
    }

    /// Removes a team by name and returns it with its members.
    pub fn remove_team(&mut self, name: &str) -> Result<Team> {
        let idx = self
            .teams
            .iter()
            .position(|t| t.name == name)
            .ok_or_else(|| TeamSortError::UnknownTeam(name.to_string()))?;
        Ok(self.teams.remove(idx))
    }

    /// Replaces all teams with `count` empty ones named "Team 1".."Team n".
    pub fn create_teams(&mut self, count: usize) -> &[Team] {
        self.teams = (0..count)
            .map(|i| Team::new(team_name(DEFAULT_TEAM_PREFIX, i)))
            .collect();
        &self.teams
    }

    /// Orders the members of every team by name (`criteria = None`) or by
    /// their value for a discipline, in the given direction.
    ///
    /// Members without a value for the discipline go last, keeping their
    /// current order.
    pub fn sort_team_members(&mut self, criteria: Option<DisciplineId>, order: SortOrder) -> Result<()> {
        if let Some(id) = criteria {
            self.discipline(id)?;
        }
        for team in &mut self.teams {
            match criteria {
                None => team.members.sort_by(|a, b| match order {
                    SortOrder::Asc => a.name.cmp(&b.name),
                    SortOrder::Desc => b.name.cmp(&a.name),
                }),
                Some(id) => team.members.sort_by(|a, b| match (a.value(id), b.value(id)) {
                    (Some(x), Some(y)) => match order {
                        SortOrder::Asc => x.total_cmp(&y),
                        SortOrder::Desc => y.total_cmp(&x),
                    },
                    (Some(_), None) => Ordering::Less,
                    (None, Some(_)) => Ordering::Greater,
                    (None, None) => Ordering::Equal,
                }),
            }
        }
        Ok(())
    }

    /// Moves a member onto a team, taking it off any other team first.
    pub fn move_member_to_team(&mut self, member: &str, team: &str) -> Result<()> {
        let copy = self
            .member_by_name(member)
            .cloned()
            .ok_or_else(|| TeamSortError::UnknownMember(member.to_string()))?;
        let target = self
            .teams
            .iter()
            .position(|t| t.name == team)
            .ok_or_else(|| TeamSortError::UnknownTeam(team.to_string()))?;
        for t in &mut self.teams {
            t.remove_member(member);
        }
        self.teams[target].members.push(copy);
        Ok(())
    }

    /// Takes a member off whichever team holds it.
    pub fn remove_member_from_team(&mut self, member: &str) -> bool {
        self.teams
            .iter_mut()
            .any(|t| t.remove_member(member).is_some())
    }

    // ========================================================================
    // Sorting
    // ========================================================================

    /// Sorts all members into `team_count` teams and stores the teams and
    /// the seed used. On failure the current teams and seed are kept.
    pub fn sort_into_teams(&mut self, team_count: usize, config: &BalanceConfig) -> Result<BalanceResult> {
        let result = TeamSorter::sort(&self.members, &self.disciplines, team_count, config)?;
        self.teams = result.teams.clone();
        self.seed = Some(result.seed_used.clone());
        Ok(result)
    }
}

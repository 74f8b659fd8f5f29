//! Member model.
//!
//! Relations to other members are stored by name only. They are resolved
//! against a member list when grouping, never held as references.

use std::collections::BTreeMap;

use super::{DisciplineId, DisciplineInfo, DisciplineRecord};
use crate::error::Result;

/// A person to be placed on a team.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Member {
    /// Unique name within a dataset.
    pub name: String,
    /// One record per known discipline.
    pub records: BTreeMap<DisciplineId, DisciplineRecord>,
    /// Names this member must share a team with.
    pub with: Vec<String>,
    /// Names this member must never share a team with.
    pub not_with: Vec<String>,
}

impl Member {
    /// Creates a member with no records or relations.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            records: BTreeMap::new(),
            with: Vec::new(),
            not_with: Vec::new(),
        }
    }

    /// Adds a numeric value for a discipline.
    pub fn with_value(mut self, discipline_id: DisciplineId, value: f64) -> Self {
        self.records.insert(
            discipline_id,
            DisciplineRecord::from_value(discipline_id, value),
        );
        self
    }

    /// Adds a "with" relation.
    pub fn with_member(mut self, name: impl Into<String>) -> Self {
        self.add_with_member(name);
        self
    }

    /// Adds a "not-with" relation.
    pub fn not_with_member(mut self, name: impl Into<String>) -> Self {
        self.add_not_with_member(name);
        self
    }

    /// Adds a "with" relation. Returns `false` for the member's own name
    /// or a name already listed.
    pub fn add_with_member(&mut self, name: impl Into<String>) -> bool {
        let name = name.into();
        push_relation(&self.name, &mut self.with, name)
    }

    /// Adds a "not-with" relation. Returns `false` for the member's own name
    /// or a name already listed.
    pub fn add_not_with_member(&mut self, name: impl Into<String>) -> bool {
        let name = name.into();
        push_relation(&self.name, &mut self.not_with, name)
    }

    /// Removes a "with" relation.
    pub fn remove_with_member(&mut self, name: &str) -> bool {
        remove_relation(&mut self.with, name)
    }

    /// Removes a "not-with" relation.
    pub fn remove_not_with_member(&mut self, name: &str) -> bool {
        remove_relation(&mut self.not_with, name)
    }

    /// Record for a discipline, if present.
    pub fn record(&self, discipline_id: DisciplineId) -> Option<&DisciplineRecord> {
        self.records.get(&discipline_id)
    }

    /// Parsed value for a discipline; `None` when missing or blank.
    #[inline]
    pub fn value(&self, discipline_id: DisciplineId) -> Option<f64> {
        self.records.get(&discipline_id).and_then(|r| r.value)
    }

    /// Stores `raw` for a discipline.
    ///
    /// On a parse error the raw text is still kept (with no numeric value)
    /// so the entry can be corrected later, and the error is returned.
    pub fn set_raw_value(&mut self, discipline: &DisciplineInfo, raw: &str) -> Result<()> {
        match DisciplineRecord::parse(discipline, raw) {
            Ok(record) => {
                self.records.insert(discipline.id, record);
                Ok(())
            }
            Err(err) => {
                self.records.insert(
                    discipline.id,
                    DisciplineRecord {
                        discipline_id: discipline.id,
                        raw_value: raw.to_string(),
                        value: None,
                    },
                );
                Err(err)
            }
        }
    }

    /// Inserts a blank record unless one exists.
    pub(crate) fn ensure_record(&mut self, discipline_id: DisciplineId) {
        self.records
            .entry(discipline_id)
            .or_insert_with(|| DisciplineRecord::blank(discipline_id));
    }

    /// Drops the record for a discipline.
    pub(crate) fn remove_record(&mut self, discipline_id: DisciplineId) -> bool {
        self.records.remove(&discipline_id).is_some()
    }
}

fn push_relation(own: &str, list: &mut Vec<String>, name: String) -> bool {
    if name == own || list.contains(&name) {
        return false;
    }
    list.push(name);
    true
}

fn remove_relation(list: &mut Vec<String>, name: &str) -> bool {
    let before = list.len();
    list.retain(|n| n != name);
    list.len() != before
}

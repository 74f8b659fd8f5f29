//! Discipline (scored attribute) model.
//!
//! A discipline describes one scored attribute tracked for every member,
//! together with how its raw text is turned into a number and which
//! direction counts as "better".

use std::fmt;

use crate::error::{Result, TeamSortError};

/// Stable discipline identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DisciplineId(pub u64);

impl fmt::Display for DisciplineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "d{}", self.0)
    }
}

/// Which direction of a discipline's values is preferable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SortOrder {
    /// Lower is better (e.g. a sprint time).
    #[default]
    Asc,
    /// Higher is better (e.g. points scored).
    Desc,
}

/// How raw discipline text maps onto the numeric domain.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ValueKind {
    /// Decimal number. A comma is accepted as the decimal separator.
    #[default]
    Number,
    /// Duration written as `s`, `m:s` or `h:m:s`; parsed to seconds.
    Time,
    /// Ordered text labels; a label's value is its position in the list.
    ///
    /// Matching is case-insensitive.
    Ordinal(Vec<String>),
}

impl ValueKind {
    /// Parses non-empty raw text. Returns `None` when the text is not a
    /// valid value of this kind.
    pub fn parse(&self, text: &str) -> Option<f64> {
        let text = text.trim();
        match self {
            ValueKind::Number => parse_number(text),
            ValueKind::Time => parse_time(text),
            ValueKind::Ordinal(labels) => labels
                .iter()
                .position(|label| label.trim().eq_ignore_ascii_case(text))
                .map(|idx| idx as f64),
        }
    }
}

fn parse_number(text: &str) -> Option<f64> {
    let value: f64 = text.replace(',', ".").parse().ok()?;
    value.is_finite().then_some(value)
}

fn parse_time(text: &str) -> Option<f64> {
    let parts: Vec<&str> = text.split(':').collect();
    if parts.len() > 3 {
        return None;
    }
    let mut seconds = 0.0;
    for (i, part) in parts.iter().enumerate() {
        let value = parse_number(part)?;
        if value < 0.0 {
            return None;
        }
        // only the last component may carry a fraction
        if i + 1 < parts.len() && value.fract() != 0.0 {
            return None;
        }
        seconds = seconds * 60.0 + value;
    }
    Some(seconds)
}

/// A scored attribute tracked per member.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DisciplineInfo {
    /// Stable identifier.
    pub id: DisciplineId,
    /// Display name.
    pub name: String,
    /// Raw text interpretation.
    pub value_kind: ValueKind,
    /// Preferred direction.
    pub sort_order: SortOrder,
}

impl DisciplineInfo {
    /// Creates a numeric, ascending discipline.
    pub fn new(id: DisciplineId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            value_kind: ValueKind::Number,
            sort_order: SortOrder::Asc,
        }
    }

    /// Sets the value kind.
    pub fn with_value_kind(mut self, kind: ValueKind) -> Self {
        self.value_kind = kind;
        self
    }

    /// Sets the sort direction.
    pub fn with_sort_order(mut self, order: SortOrder) -> Self {
        self.sort_order = order;
        self
    }

    /// Parses raw text for this discipline.
    ///
    /// Blank text yields `Ok(None)` (no value recorded).
    pub fn parse_value(&self, raw: &str) -> Result<Option<f64>> {
        if raw.trim().is_empty() {
            return Ok(None);
        }
        self.value_kind
            .parse(raw)
            .map(Some)
            .ok_or_else(|| TeamSortError::InvalidValue {
                discipline: self.name.clone(),
                raw: raw.to_string(),
            })
    }

    /// Orients a value so that larger always means "better".
    #[inline]
    pub fn oriented(&self, value: f64) -> f64 {
        match self.sort_order {
            SortOrder::Asc => -value,
            SortOrder::Desc => value,
        }
    }
}

/// A member's value for one discipline.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DisciplineRecord {
    /// Discipline this record belongs to.
    pub discipline_id: DisciplineId,
    /// Text as entered.
    pub raw_value: String,
    /// Parsed value; `None` when blank or unparsable.
    pub value: Option<f64>,
}

impl DisciplineRecord {
    /// Creates a blank record.
    pub fn blank(discipline_id: DisciplineId) -> Self {
        Self {
            discipline_id,
            raw_value: String::new(),
            value: None,
        }
    }

    /// Parses `raw` for `discipline`.
    pub fn parse(discipline: &DisciplineInfo, raw: impl Into<String>) -> Result<Self> {
        let raw = raw.into();
        let value = discipline.parse_value(&raw)?;
        Ok(Self {
            discipline_id: discipline.id,
            raw_value: raw,
            value,
        })
    }

    /// Creates a record from an already numeric value.
    pub fn from_value(discipline_id: DisciplineId, value: f64) -> Self {
        Self {
            discipline_id,
            raw_value: value.to_string(),
            value: Some(value),
        }
    }
}

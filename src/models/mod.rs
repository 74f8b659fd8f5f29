//! Team sorting domain models.
//!
//! | Type | Role |
//! |------|------|
//! | `DisciplineInfo` | A scored attribute and its direction |
//! | `DisciplineRecord` | One member's raw and parsed value |
//! | `Member` | A person with records and with/not-with relations |
//! | `Team` | A named, ordered member list |
//! | `Dataset` | Long-lived members, disciplines and teams |

mod dataset;
mod discipline;
mod member;
mod team;

pub use dataset::Dataset;
pub use discipline::{DisciplineId, DisciplineInfo, DisciplineRecord, SortOrder, ValueKind};
pub use member::Member;
pub use team::{team_name, InvalidMembers, Team, DEFAULT_TEAM_PREFIX};

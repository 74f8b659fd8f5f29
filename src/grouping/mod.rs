//! Constraint grouping.
//!
//! Turns member-level "must be with" / "must not be with" name relations
//! into locked groups (connected components of the "with" graph) and
//! reports unsatisfiable configurations.
//!
//! # Reference
//! Cormen et al. (2009), "Introduction to Algorithms", Ch. 22.2 (Breadth-first search)

mod grouper;
mod types;

pub use grouper::ConstraintGrouper;
pub use types::{ConflictKind, ConflictReport, GroupingReport, LockedGroup, RelationKind};

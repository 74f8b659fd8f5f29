//! Balanced team assignment under social constraints.
//!
//! Splits a roster of members into a fixed number of teams so that the
//! per-discipline team scores are as even as possible, while honoring
//! "must be with" and "must not be with" relations between members:
//!
//! - **Models**: members, disciplines with typed values and a sort
//!   direction, teams, and a [`Dataset`](models::Dataset) that keeps them
//!   consistent.
//! - **Grouping**: resolves relations into locked groups that must share a
//!   team and reports contradictions before any balancing happens.
//! - **Scoring**: totals, averages, ranges, deltas and normalized scores
//!   for any member set or team list.
//! - **Balancing**: seeded greedy placement of whole groups followed by
//!   bounded swap improvement.
//! - **Random**: a portable generator driven by a seed string, so any run
//!   can be replayed from the seed it reports.
//! - **Sorter**: the end-to-end entry point (group, refuse on conflict,
//!   balance).
//!
//! # Features
//!
//! - `serde`: serialization for models, reports, results and config
//! - `parallel`: evaluate swap candidates with rayon
//! - `wasm`: a `wasm-bindgen` entry point
//!
//! # Logging
//!
//! Events are emitted through `tracing`. The crate installs no subscriber.

pub mod balance;
pub mod error;
pub mod grouping;
pub mod models;
pub mod random;
pub mod scoring;
pub mod sorter;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use error::{Result, TeamSortError};

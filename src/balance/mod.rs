//! Team balancing.
//!
//! Distributes locked groups over a fixed number of teams so that the
//! per-discipline team loads are as even as possible. Placement is a
//! greedy minimum-spread pass over a seeded shuffle of the groups,
//! followed by bounded swap and relocation improvement between the
//! heaviest and lightest team. Groups are never split, and groups that
//! refuse each other never share a team.
//!
//! # References
//!
//! - Graham (1969), "Bounds on Multiprocessing Timing Anomalies"
//! - Karmarkar & Karp (1982), "The Differencing Method of Set Partitioning"

mod config;
mod runner;
mod search;
mod types;

pub use config::BalanceConfig;
pub use runner::BalanceRunner;
pub use types::{BalanceProblem, BalanceResult};

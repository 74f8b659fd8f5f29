//! Balancing configuration.

use crate::error::{Result, TeamSortError};
use crate::models::{self, DEFAULT_TEAM_PREFIX};

/// Configuration for [`BalanceRunner`](super::BalanceRunner).
///
/// # Examples
///
/// ```
/// use u_teamsort::balance::BalanceConfig;
///
/// let config = BalanceConfig::default()
///     .with_seed("seed123")
///     .with_max_swap_iterations(50)
///     .with_team_name_prefix("Squad");
/// assert_eq!(config.seed.as_deref(), Some("seed123"));
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BalanceConfig {
    /// Reproducibility seed. `None` (or blank) draws a fresh one.
    pub seed: Option<String>,

    /// Whether to run the swap/relocation improvement pass after greedy placement.
    pub local_search: bool,

    /// Hard budget for improvement iterations.
    pub max_swap_iterations: usize,

    /// Tolerance for treating two spreads as equal.
    pub epsilon: f64,

    /// Scale each discipline by its observed range so disciplines with
    /// large raw values do not dominate the worst-spread objective.
    pub normalize: bool,

    /// Prefix for synthesized team names ("Team" → "Team 1", "Team 2", ...).
    pub team_name_prefix: String,

    /// Evaluate improvement candidates in parallel with rayon.
    ///
    /// Only honored when the crate is built with the `parallel` feature.
    /// Results are identical either way.
    pub parallel: bool,
}

impl Default for BalanceConfig {
    fn default() -> Self {
        Self {
            seed: None,
            local_search: true,
            max_swap_iterations: 200,
            epsilon: 1e-9,
            normalize: true,
            team_name_prefix: DEFAULT_TEAM_PREFIX.to_string(),
            parallel: false,
        }
    }
}

impl BalanceConfig {
    /// Sets the seed.
    pub fn with_seed(mut self, seed: impl Into<String>) -> Self {
        self.seed = Some(seed.into());
        self
    }

    /// Enables or disables the swap/relocation improvement pass.
    pub fn with_local_search(mut self, enabled: bool) -> Self {
        self.local_search = enabled;
        self
    }

    /// Sets the improvement iteration budget. `0` keeps the greedy
    /// placement as is.
    pub fn with_max_swap_iterations(mut self, n: usize) -> Self {
        self.max_swap_iterations = n;
        self
    }

    /// Sets the minimum spread gain a step must bring to be accepted.
    pub fn with_epsilon(mut self, eps: f64) -> Self {
        self.epsilon = eps;
        self
    }

    /// Enables or disables per-discipline range scaling.
    pub fn with_normalize(mut self, normalize: bool) -> Self {
        self.normalize = normalize;
        self
    }

    /// Sets the prefix for synthesized team names.
    pub fn with_team_name_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.team_name_prefix = prefix.into();
        self
    }

    /// Evaluates improvement candidates on the rayon pool when the
    /// `parallel` feature is enabled. Results are identical either way.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        if !self.epsilon.is_finite() || self.epsilon < 0.0 {
            return Err(TeamSortError::InvalidConfig(format!(
                "epsilon must be a non-negative finite number, got {}",
                self.epsilon
            )));
        }
        if self.team_name_prefix.trim().is_empty() {
            return Err(TeamSortError::InvalidConfig(
                "team_name_prefix must not be blank".into(),
            ));
        }
        Ok(())
    }

    /// Synthesized name for the team at `index` (0-based).
    pub fn team_name(&self, index: usize) -> String {
        models::team_name(&self.team_name_prefix, index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = BalanceConfig::default();
        assert!(config.seed.is_none());
        assert!(config.local_search);
        assert_eq!(config.max_swap_iterations, 200);
        assert!((config.epsilon - 1e-9).abs() < 1e-15);
        assert!(config.normalize);
        assert_eq!(config.team_name_prefix, "Team");
        assert!(!config.parallel);
        assert!(config.validate().is_ok());
        assert_eq!(config.team_name(2), models::team_name(DEFAULT_TEAM_PREFIX, 2));
    }

    #[test]
    fn test_builder() {
        let config = BalanceConfig::default()
            .with_seed("abc")
            .with_local_search(false)
            .with_max_swap_iterations(5)
            .with_epsilon(0.01)
            .with_normalize(false)
            .with_team_name_prefix("Group")
            .with_parallel(true);
        assert_eq!(config.seed.as_deref(), Some("abc"));
        assert!(!config.local_search);
        assert_eq!(config.max_swap_iterations, 5);
        assert!(!config.normalize);
        assert!(config.parallel);
        assert_eq!(config.team_name(0), "Group 1");
    }

    #[test]
    fn test_validate_bad_epsilon() {
        assert!(BalanceConfig::default().with_epsilon(-1.0).validate().is_err());
        assert!(BalanceConfig::default()
            .with_epsilon(f64::NAN)
            .validate()
            .is_err());
    }

    #[test]
    fn test_validate_blank_prefix() {
        let err = BalanceConfig::default()
            .with_team_name_prefix("  ")
            .validate()
            .unwrap_err();
        assert!(matches!(err, TeamSortError::InvalidConfig(_)));
    }
}

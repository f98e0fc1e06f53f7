//! Configuration for the allocation engine.
//!
//! `DispatchConfig` centralizes the policy selection and all numeric knobs
//! to avoid hardcoded constants scattered throughout the codebase.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// How the allocator handles the general case (several agents, at least as
/// many goals).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AllocationPolicy {
    /// One Hungarian solve over the full agent-by-goal distance matrix.
    Direct,
    /// Spectral bisection of the combined agent+goal set, recursing on each
    /// side; falls back to `Direct` when a split is degenerate.
    RecursiveBisection,
    /// Exemplar-cluster the goals, match agents to clusters, then pick the
    /// nearest goal inside each matched cluster.
    ClusterThenAssign,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    pub policy: AllocationPolicy,
    /// Seed for every randomized initialization inside the engine. Two runs
    /// with the same graph, sets, and config produce identical output.
    pub rng_seed: u64,
    /// Finite stand-in for unreachable distances in cost matrices.
    pub unreachable_cost: f64,
    /// Smallest combined agent+goal set a bisection is attempted on.
    pub min_bisection_size: usize,
    /// Iteration cap for the 2-means step of spectral bisection.
    pub kmeans_max_iterations: u32,
    /// Message damping factor for exemplar clustering, in `[0.5, 1.0)`.
    pub exemplar_damping: f64,
    /// Iteration cap for exemplar clustering message passing.
    pub exemplar_max_iterations: u32,
    /// Consecutive iterations the exemplar set must stay unchanged before
    /// the clustering is considered converged.
    pub exemplar_convergence_window: u32,
    /// Self-similarity (preference) for exemplar clustering. `None` uses
    /// the median pairwise similarity, which lets the cluster count emerge
    /// from the data.
    pub exemplar_preference: Option<f64>,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            policy: AllocationPolicy::RecursiveBisection,
            rng_seed: 0,
            unreachable_cost: 1e9,
            min_bisection_size: 3,
            kmeans_max_iterations: 32,
            exemplar_damping: 0.7,
            exemplar_max_iterations: 200,
            exemplar_convergence_window: 15,
            exemplar_preference: None,
        }
    }
}

impl DispatchConfig {
    /// Exact matching only; no partitioning. Optimal at any scale but cubic
    /// in the number of agents.
    pub fn direct() -> Self {
        Self {
            policy: AllocationPolicy::Direct,
            ..Default::default()
        }
    }

    pub fn balanced() -> Self {
        Self::default()
    }

    /// Goal clustering instead of recursive bisection.
    pub fn clustered() -> Self {
        Self {
            policy: AllocationPolicy::ClusterThenAssign,
            ..Default::default()
        }
    }

    pub fn builder() -> DispatchConfigBuilder {
        DispatchConfigBuilder {
            inner: DispatchConfig::default(),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.exemplar_damping.is_finite()
            || self.exemplar_damping < 0.5
            || self.exemplar_damping >= 1.0
        {
            return Err(ConfigError::InvalidDamping {
                value: self.exemplar_damping,
            });
        }

        if !self.unreachable_cost.is_finite() || self.unreachable_cost <= 0.0 {
            return Err(ConfigError::InvalidUnreachableCost {
                value: self.unreachable_cost,
            });
        }

        ensure_non_zero_u32(self.kmeans_max_iterations, "kmeans_max_iterations")?;
        ensure_non_zero_u32(self.exemplar_max_iterations, "exemplar_max_iterations")?;
        ensure_non_zero_u32(
            self.exemplar_convergence_window,
            "exemplar_convergence_window",
        )?;

        if self.min_bisection_size < 3 {
            return Err(ConfigError::BisectionSizeTooSmall {
                value: self.min_bisection_size,
            });
        }

        if let Some(preference) = self.exemplar_preference {
            if !preference.is_finite() {
                return Err(ConfigError::InvalidPreference { value: preference });
            }
        }

        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("exemplar_damping must be in [0.5, 1.0) and finite (got {value})")]
    InvalidDamping { value: f64 },
    #[error("unreachable_cost must be finite and positive (got {value})")]
    InvalidUnreachableCost { value: f64 },
    #[error("exemplar_preference must be finite (got {value})")]
    InvalidPreference { value: f64 },
    #[error(
        "min_bisection_size must be at least 3 (got {value}); a two-member set cannot split into two mixed sides"
    )]
    BisectionSizeTooSmall { value: usize },
    #[error("{field} must be greater than zero (got {value})")]
    NonPositiveLimit { field: &'static str, value: u64 },
}

fn ensure_non_zero_u32(value: u32, field: &'static str) -> Result<(), ConfigError> {
    if value == 0 {
        return Err(ConfigError::NonPositiveLimit {
            field,
            value: value as u64,
        });
    }
    Ok(())
}

#[derive(Debug, Clone, Default)]
pub struct DispatchConfigBuilder {
    inner: DispatchConfig,
}

impl DispatchConfigBuilder {
    pub fn new() -> Self {
        DispatchConfig::builder()
    }

    pub fn policy(mut self, value: AllocationPolicy) -> Self {
        self.inner.policy = value;
        self
    }

    pub fn rng_seed(mut self, value: u64) -> Self {
        self.inner.rng_seed = value;
        self
    }

    pub fn unreachable_cost(mut self, value: f64) -> Self {
        self.inner.unreachable_cost = value;
        self
    }

    pub fn min_bisection_size(mut self, value: usize) -> Self {
        self.inner.min_bisection_size = value;
        self
    }

    pub fn kmeans_max_iterations(mut self, value: u32) -> Self {
        self.inner.kmeans_max_iterations = value;
        self
    }

    pub fn exemplar_damping(mut self, value: f64) -> Self {
        self.inner.exemplar_damping = value;
        self
    }

    pub fn exemplar_max_iterations(mut self, value: u32) -> Self {
        self.inner.exemplar_max_iterations = value;
        self
    }

    pub fn exemplar_convergence_window(mut self, value: u32) -> Self {
        self.inner.exemplar_convergence_window = value;
        self
    }

    pub fn exemplar_preference(mut self, value: Option<f64>) -> Self {
        self.inner.exemplar_preference = value;
        self
    }

    pub fn build(self) -> Result<DispatchConfig, ConfigError> {
        self.inner.validate()?;
        Ok(self.inner)
    }
}

//! Engine configuration
//!
//! Defaults reproduce the production weighting: answered `+1/4`, skipped
//! `-1/8`, looked `+1/8`, followed `+1/4`, a view penalty of 10 per prior
//! view, and a five-candidate sampling window.

use crate::error::EngineError;
use serde::{Deserialize, Serialize};

/// Affinity engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Factor applied to a poll's tag profile when the user answers it
    pub answered_factor: f64,
    /// Factor applied to `author vector + poll profile` when the user skips a poll
    pub skipped_factor: f64,
    /// Factor applied to an account's vector when the user looks at it
    pub looked_factor: f64,
    /// Factor applied to an account's vector when the user follows it
    pub followed_factor: f64,
    /// Score subtracted per prior view of a poll
    pub view_penalty: f64,
    /// Candidates scored per recommendation
    pub sample_size: usize,
    /// Upper bound on candidate ids requested from the poll directory
    pub candidate_limit: usize,
}

impl EngineConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse configuration from TOML; missing keys take their defaults
    ///
    /// # Errors
    /// - `EngineError::Config` if the document is malformed or fails validation
    pub fn from_toml_str(source: &str) -> Result<Self, EngineError> {
        let config: Self =
            toml::from_str(source).map_err(|e| EngineError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Render configuration as TOML
    ///
    /// # Errors
    /// - `EngineError::Config` if serialization fails
    pub fn to_toml_string(&self) -> Result<String, EngineError> {
        toml::to_string_pretty(self).map_err(|e| EngineError::Config(e.to_string()))
    }

    /// With candidate sampling window
    #[inline]
    #[must_use]
    pub fn with_sample_size(mut self, sample_size: usize) -> Self {
        self.sample_size = sample_size;
        self
    }

    /// With candidate query bound
    #[inline]
    #[must_use]
    pub fn with_candidate_limit(mut self, limit: usize) -> Self {
        self.candidate_limit = limit;
        self
    }

    /// With per-view penalty
    #[inline]
    #[must_use]
    pub fn with_view_penalty(mut self, penalty: f64) -> Self {
        self.view_penalty = penalty;
        self
    }

    /// Check internal consistency
    ///
    /// # Errors
    /// - `EngineError::Config` on a zero window/limit or a non-finite weight
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.sample_size == 0 {
            return Err(EngineError::Config("sample_size must be at least 1".into()));
        }
        if self.candidate_limit == 0 {
            return Err(EngineError::Config("candidate_limit must be at least 1".into()));
        }

        let weights = [
            ("answered_factor", self.answered_factor),
            ("skipped_factor", self.skipped_factor),
            ("looked_factor", self.looked_factor),
            ("followed_factor", self.followed_factor),
            ("view_penalty", self.view_penalty),
        ];
        if let Some((name, _)) = weights.iter().find(|(_, w)| !w.is_finite()) {
            return Err(EngineError::Config(format!("{name} must be finite")));
        }

        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            answered_factor: 1.0 / 4.0,
            skipped_factor: -1.0 / 8.0,
            looked_factor: 1.0 / 8.0,
            followed_factor: 1.0 / 4.0,
            view_penalty: 10.0,
            sample_size: 5,
            candidate_limit: 1000,
        }
    }
}

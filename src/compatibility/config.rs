use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;

/// Per-factor weights for compatibility scoring.
/// Any subset may be supplied; missing factors keep their default individually.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompatibilityWeights {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bpm_difference: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_compatibility: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub energy_balance: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spectral_balance: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rhythmic_complexity: Option<f64>,
}

/// Weights with every factor filled in
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedWeights {
    pub bpm_difference: f64,
    pub key_compatibility: f64,
    pub energy_balance: f64,
    pub spectral_balance: f64,
    pub rhythmic_complexity: f64,
}

impl Default for ResolvedWeights {
    fn default() -> Self {
        Self {
            bpm_difference: 0.30,
            key_compatibility: 0.25,
            energy_balance: 0.20,
            spectral_balance: 0.15,
            rhythmic_complexity: 0.10,
        }
    }
}

impl ResolvedWeights {
    pub fn total(&self) -> f64 {
        self.bpm_difference
            + self.key_compatibility
            + self.energy_balance
            + self.spectral_balance
            + self.rhythmic_complexity
    }
}

impl CompatibilityWeights {
    /// Overlay the supplied weights on the defaults. No normalization is applied.
    pub fn resolve(&self) -> ResolvedWeights {
        let defaults = ResolvedWeights::default();
        ResolvedWeights {
            bpm_difference: self.bpm_difference.unwrap_or(defaults.bpm_difference),
            key_compatibility: self
                .key_compatibility
                .unwrap_or(defaults.key_compatibility),
            energy_balance: self.energy_balance.unwrap_or(defaults.energy_balance),
            spectral_balance: self.spectral_balance.unwrap_or(defaults.spectral_balance),
            rhythmic_complexity: self
                .rhythmic_complexity
                .unwrap_or(defaults.rhythmic_complexity),
        }
    }

    /// Load weights from a JSON object file, e.g. `{"bpmDifference": 0.5}`
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let weights: CompatibilityWeights = serde_json::from_str(&content)?;
        weights.validate()?;

        let total = weights.resolve().total();
        if (total - 1.0).abs() > 1e-6 {
            tracing::warn!(total, "Compatibility weights do not sum to 1.0; scores may leave 0-100");
        }
        Ok(weights)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let supplied = [
            ("bpmDifference", self.bpm_difference),
            ("keyCompatibility", self.key_compatibility),
            ("energyBalance", self.energy_balance),
            ("spectralBalance", self.spectral_balance),
            ("rhythmicComplexity", self.rhythmic_complexity),
        ];
        for (name, value) in supplied {
            if let Some(value) = value {
                if !value.is_finite() || value < 0.0 {
                    return Err(ConfigError::InvalidWeight { name, value });
                }
            }
        }
        Ok(())
    }
}

/// How two key labels are compared
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum KeyRule {
    /// 100 for identical labels, a flat 60 for everything else
    #[default]
    Exact,
    /// Distance on the Camelot wheel
    Camelot,
}

impl FromStr for KeyRule {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "exact" => Ok(KeyRule::Exact),
            "camelot" => Ok(KeyRule::Camelot),
            other => Err(ConfigError::UnknownKeyRule(other.to_string())),
        }
    }
}

use serde::{Deserialize, Serialize};

/// Outcome of comparing two songs: overall score plus diagnostics in evaluation order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompatibilityResult {
    pub score: i32,
    pub reasons: Vec<String>,
    pub suggestions: Vec<String>,
}

impl CompatibilityResult {
    /// Result for a comparison that could not be made
    pub fn unscored(reason: &str, suggestions: Vec<String>) -> Self {
        Self {
            score: 0,
            reasons: vec![reason.to_string()],
            suggestions,
        }
    }
}

/// Individual factor scores (0-100) before weighting
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FactorScores {
    pub bpm: f64,
    pub key: f64,
    pub energy: f64,
    pub spectral: f64,
    pub rhythm: f64,
}

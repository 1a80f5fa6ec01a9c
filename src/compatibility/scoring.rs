use super::config::{CompatibilityWeights, KeyRule, ResolvedWeights};
use super::harmony::{self, CamelotKey};
use super::result::{CompatibilityResult, FactorScores};
use crate::models::{AnalysisResult, RhythmicFeatures, SpectralFeatures};

/// BPM gaps above this are called out in the diagnostics
const LARGE_BPM_DIFFERENCE: f64 = 20.0;
/// Vocal presence gaps above this are called out in the diagnostics
const SIGNIFICANT_ENERGY_DIFFERENCE: f64 = 0.3;
const KEY_INCOMPATIBLE_BELOW: f64 = 50.0;

/// Brightness is expected in 0-8000 Hz
const BRIGHTNESS_RANGE_HZ: f64 = 8000.0;
/// Dynamic range differences are normalized against 100 dB
const DYNAMIC_RANGE_SPAN_DB: f64 = 100.0;

/// Compatibility scoring between analyzed songs
pub struct CompatibilityScoring;

impl CompatibilityScoring {
    /// Score how well the first two analyses mash together (0-100, not clamped).
    /// Further analyses are accepted but ignored.
    pub fn compute_compatibility(
        analyses: &[AnalysisResult],
        weights: Option<&CompatibilityWeights>,
    ) -> CompatibilityResult {
        Self::compute_with_key_rule(analyses, weights, KeyRule::Exact)
    }

    /// Same as `compute_compatibility` with a selectable key comparison rule
    pub fn compute_with_key_rule(
        analyses: &[AnalysisResult],
        weights: Option<&CompatibilityWeights>,
        key_rule: KeyRule,
    ) -> CompatibilityResult {
        let [song1, song2, rest @ ..] = analyses else {
            return CompatibilityResult::unscored(
                "Need at least 2 songs for compatibility analysis",
                vec!["Add more songs to analyze compatibility".to_string()],
            );
        };
        if !rest.is_empty() {
            tracing::debug!(ignored = rest.len(), "Only the first two analyses are compared");
        }

        let weights = weights.map(CompatibilityWeights::resolve).unwrap_or_default();
        let factors = Self::calculate_factor_scores(song1, song2, key_rule);
        let mut reasons = Vec::new();
        let mut suggestions = Vec::new();

        // 1. BPM
        let bpm_diff = (song1.rhythmic.bpm - song2.rhythmic.bpm).abs();
        if bpm_diff > LARGE_BPM_DIFFERENCE {
            reasons.push(format!("Large BPM difference: {bpm_diff:.1} BPM"));
            suggestions.push("Consider using tempo adjustment tools".to_string());
        }

        // 2. Key; unreachable with the exact rule, whose floor is 60
        if factors.key < KEY_INCOMPATIBLE_BELOW {
            reasons.push("Keys may not be harmonically compatible".to_string());
            suggestions.push("Consider key shifting one of the tracks".to_string());
        }

        // 3. Energy, with vocal presence as the proxy
        let energy_diff = (song1.vocal.vocal_presence - song2.vocal.vocal_presence).abs();
        if energy_diff > SIGNIFICANT_ENERGY_DIFFERENCE {
            reasons.push("Significant energy difference between tracks".to_string());
            suggestions.push(
                "Consider adjusting levels or choosing tracks with similar energy".to_string(),
            );
        }

        // Spectral and rhythmic factors only feed the score

        let total_score = Self::weighted_total(&factors, &weights);
        if !total_score.is_finite() {
            tracing::warn!(total_score, "Compatibility total is not finite; check the analysis data");
        }
        tracing::debug!(?factors, total_score, "Computed compatibility");

        CompatibilityResult {
            score: total_score.round() as i32,
            reasons,
            suggestions,
        }
    }

    /// All five factor scores for a pair of songs
    pub fn calculate_factor_scores(
        song1: &AnalysisResult,
        song2: &AnalysisResult,
        key_rule: KeyRule,
    ) -> FactorScores {
        FactorScores {
            bpm: Self::calculate_bpm_score(song1.rhythmic.bpm, song2.rhythmic.bpm),
            key: Self::calculate_key_score(
                &song1.harmonic.key_label(),
                &song2.harmonic.key_label(),
                key_rule,
            ),
            energy: Self::calculate_energy_score(
                song1.vocal.vocal_presence,
                song2.vocal.vocal_presence,
            ),
            spectral: Self::calculate_spectral_score(&song1.spectral, &song2.spectral),
            rhythm: Self::calculate_rhythm_score(&song1.rhythmic, &song2.rhythmic),
        }
    }

    /// Sum of factor scores times their weights, in evaluation order
    pub fn weighted_total(factors: &FactorScores, weights: &ResolvedWeights) -> f64 {
        let mut total = 0.0;
        total += factors.bpm * weights.bpm_difference;
        total += factors.key * weights.key_compatibility;
        total += factors.energy * weights.energy_balance;
        total += factors.spectral * weights.spectral_balance;
        total += factors.rhythm * weights.rhythmic_complexity;
        total
    }

    /// Two points lost per BPM of difference
    pub fn calculate_bpm_score(bpm1: f64, bpm2: f64) -> f64 {
        let bpm_diff = (bpm1 - bpm2).abs();
        floor_at_zero(100.0 - bpm_diff * 2.0)
    }

    /// Key compatibility score (0-100).
    /// The exact rule gives 100 for identical labels and a flat 60 otherwise.
    /// The Camelot rule scores wheel adjacency and falls back to the exact rule
    /// when either label cannot be read as a key.
    pub fn calculate_key_score(key1: &str, key2: &str, key_rule: KeyRule) -> f64 {
        match key_rule {
            KeyRule::Exact => Self::exact_key_score(key1, key2),
            KeyRule::Camelot => {
                match (CamelotKey::from_label(key1), CamelotKey::from_label(key2)) {
                    (Some(from), Some(to)) => harmony::key_axis_score(from, to) * 100.0,
                    _ => {
                        tracing::debug!(key1, key2, "Unreadable key label, using exact comparison");
                        Self::exact_key_score(key1, key2)
                    }
                }
            }
        }
    }

    fn exact_key_score(key1: &str, key2: &str) -> f64 {
        if key1 == key2 { 100.0 } else { 60.0 }
    }

    /// Vocal presence difference as an energy proxy; both inputs are 0.0 to 1.0
    pub fn calculate_energy_score(vocal_presence1: f64, vocal_presence2: f64) -> f64 {
        let energy_diff = (vocal_presence1 - vocal_presence2).abs();
        floor_at_zero(100.0 - energy_diff * 100.0)
    }

    /// Average of normalized brightness and dynamic range differences
    pub fn calculate_spectral_score(spec1: &SpectralFeatures, spec2: &SpectralFeatures) -> f64 {
        let brightness_diff = (spec1.brightness - spec2.brightness).abs();
        let dynamic_range_diff = (spec1.dynamic_range - spec2.dynamic_range).abs();

        let normalized_brightness_diff = brightness_diff / BRIGHTNESS_RANGE_HZ;
        let normalized_dynamic_diff = dynamic_range_diff / DYNAMIC_RANGE_SPAN_DB;

        let avg_diff = (normalized_brightness_diff + normalized_dynamic_diff) / 2.0;
        floor_at_zero(100.0 - avg_diff * 100.0)
    }

    /// Average difference of groove stability, swing and beat confidence
    pub fn calculate_rhythm_score(rhythm1: &RhythmicFeatures, rhythm2: &RhythmicFeatures) -> f64 {
        let groove_stability_diff = (rhythm1.groove_stability - rhythm2.groove_stability).abs();
        let swing_factor_diff = (rhythm1.swing_factor - rhythm2.swing_factor).abs();
        let beat_confidence_diff = (rhythm1.beat_confidence - rhythm2.beat_confidence).abs();

        let avg_diff = (groove_stability_diff + swing_factor_diff + beat_confidence_diff) / 3.0;
        floor_at_zero(100.0 - avg_diff * 100.0)
    }
}

/// Clamp negatives to zero; NaN passes through so bad input shows in the total
fn floor_at_zero(score: f64) -> f64 {
    if score < 0.0 { 0.0 } else { score }
}

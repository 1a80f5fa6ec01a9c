use serde::{Deserialize, Serialize};
use std::borrow::Cow;

use crate::error::AnalysisError;

/// Audio feature record for a single song, as produced by the analysis service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    pub harmonic: HarmonicFeatures,
    pub rhythmic: RhythmicFeatures,
    pub spectral: SpectralFeatures,
    pub vocal: VocalFeatures,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HarmonicFeatures {
    /// Key label, or only the root when `scale` is sent separately
    pub key: String,
    /// `major` or `minor`, when the service reports the mode apart from the root
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<String>,
    pub key_confidence: f64,
    pub chord_progression: Vec<String>,
    pub chord_complexity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RhythmicFeatures {
    pub bpm: f64,
    pub beat_confidence: f64,  // 0.0 to 1.0
    pub groove_stability: f64, // 0.0 to 1.0
    pub swing_factor: f64,     // 0.0 to 1.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpectralFeatures {
    pub mfccs: Vec<Vec<f64>>,
    pub dynamic_range: f64, // dB
    pub brightness: f64,    // Hz, typically 0-8000
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VocalFeatures {
    pub vocal_presence: f64, // 0.0 to 1.0, doubles as the energy proxy
}

impl HarmonicFeatures {
    /// Full key label, joining `key` and `scale` when both are present
    pub fn key_label(&self) -> Cow<'_, str> {
        match self.scale.as_deref().map(str::trim) {
            Some(scale) if !scale.is_empty() => Cow::Owned(format!("{} {scale}", self.key.trim())),
            _ => Cow::Borrowed(&self.key),
        }
    }
}

/// Response envelope of the analysis service's `POST /analyze`
#[derive(Debug, Deserialize)]
pub struct AnalyzeResponse {
    pub success: bool,
    pub analysis: Option<AnalysisResult>,
    pub detail: Option<String>,
}

impl AnalyzeResponse {
    /// Unwrap the analysis payload, turning a failed envelope into an error
    pub fn into_analysis(self) -> Result<AnalysisResult, AnalysisError> {
        match (self.success, self.analysis) {
            (true, Some(analysis)) => Ok(analysis),
            _ => Err(AnalysisError::Failed(
                self.detail.unwrap_or_else(|| "Analysis failed".to_string()),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "version": "1.0",
        "harmonic": {"key": "A", "key_confidence": 0.8, "chord_progression": ["Am", "F", "C", "G"], "chord_complexity": 0.4},
        "rhythmic": {"bpm": 124.0, "beat_confidence": 0.9, "groove_stability": 0.7, "swing_factor": 0.1},
        "spectral": {"mfccs": [[1.0, 2.0], [3.0, 4.0]], "dynamic_range": 12.5, "brightness": 2400.0},
        "vocal": {"vocal_presence": 0.6}
    }"#;

    #[test]
    fn test_parses_analysis_record() {
        let analysis: AnalysisResult = serde_json::from_str(SAMPLE).unwrap();
        assert_eq!(analysis.version.as_deref(), Some("1.0"));
        assert_eq!(analysis.harmonic.key, "A");
        assert!(analysis.harmonic.scale.is_none());
        assert_eq!(analysis.harmonic.key_label(), "A");
        assert_eq!(analysis.harmonic.chord_progression.len(), 4);
        assert_eq!(analysis.rhythmic.bpm, 124.0);
        assert_eq!(analysis.spectral.mfccs[1], vec![3.0, 4.0]);
    }

    #[test]
    fn test_missing_field_fails_fast() {
        let broken = SAMPLE.replace(r#""swing_factor": 0.1"#, r#""extra": 0.1"#);
        let result: Result<AnalysisResult, _> = serde_json::from_str(&broken);
        assert!(result.is_err(), "missing swing_factor should not deserialize");
    }

    #[test]
    fn test_envelope_success_and_failure() {
        let ok = format!(r#"{{"success": true, "analysis": {SAMPLE}}}"#);
        let response: AnalyzeResponse = serde_json::from_str(&ok).unwrap();
        assert!(response.into_analysis().is_ok());

        let failed: AnalyzeResponse =
            serde_json::from_str(r#"{"success": false, "detail": "decoder crashed"}"#).unwrap();
        match failed.into_analysis() {
            Err(AnalysisError::Failed(detail)) => assert_eq!(detail, "decoder crashed"),
            other => panic!("expected failure, got {other:?}"),
        }

        let bare: AnalyzeResponse = serde_json::from_str(r#"{"success": false}"#).unwrap();
        match bare.into_analysis() {
            Err(AnalysisError::Failed(detail)) => assert_eq!(detail, "Analysis failed"),
            other => panic!("expected failure, got {other:?}"),
        }
    }

    #[test]
    fn test_scale_joins_key_label() {
        let with_scale = SAMPLE.replace(r#""key": "A","#, r#""key": "A", "scale": "minor","#);
        let analysis: AnalysisResult = serde_json::from_str(&with_scale).unwrap();
        assert_eq!(analysis.harmonic.scale.as_deref(), Some("minor"));
        assert_eq!(analysis.harmonic.key_label(), "A minor");

        let round_trip = serde_json::to_value(&analysis).unwrap();
        assert_eq!(round_trip["harmonic"]["scale"], "minor");
    }
}

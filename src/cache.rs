use crate::compatibility::{CompatibilityResult, CompatibilityScoring, CompatibilityWeights, KeyRule};
use crate::error::AnalysisError;
use crate::models::{AnalysisResult, AnalyzeResponse};
use serde_json::Value;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::path::{Path, PathBuf};

/// Source of audio analyses, e.g. the remote analysis service
#[cfg_attr(test, mockall::automock)]
pub trait AnalysisProvider {
    fn analyze(&self, song_id: &str) -> Result<AnalysisResult, AnalysisError>;
}

/// Reads `<dir>/<song_id>.json`, either a bare analysis record or an
/// `/analyze` response envelope
pub struct JsonFileProvider {
    dir: PathBuf,
}

impl JsonFileProvider {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl AnalysisProvider for JsonFileProvider {
    fn analyze(&self, song_id: &str) -> Result<AnalysisResult, AnalysisError> {
        if !is_plain_song_id(song_id) {
            return Err(AnalysisError::InvalidSong(song_id.to_string()));
        }
        load_analysis_file(self.dir.join(format!("{song_id}.json")))
    }
}

/// Song ids become file names, so separators and parent references are refused
fn is_plain_song_id(song_id: &str) -> bool {
    !song_id.trim().is_empty()
        && !song_id.contains(['/', '\\'])
        && !song_id.contains("..")
}

/// Load one analysis file, unwrapping the service envelope when present
pub fn load_analysis_file(path: impl AsRef<Path>) -> Result<AnalysisResult, AnalysisError> {
    let path = path.as_ref();
    tracing::debug!(path = %path.display(), "Loading analysis");
    let content = std::fs::read_to_string(path)?;
    let value: Value = serde_json::from_str(&content)?;

    if value.get("success").is_some() {
        let response: AnalyzeResponse = serde_json::from_value(value)?;
        response.into_analysis()
    } else {
        Ok(serde_json::from_value(value)?)
    }
}

/// Memoization table from song id to analysis, populated on demand. Nothing is evicted.
pub struct AnalysisCache<P: AnalysisProvider> {
    provider: P,
    analyzed: HashMap<String, AnalysisResult>,
}

impl<P: AnalysisProvider> AnalysisCache<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            analyzed: HashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.analyzed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.analyzed.is_empty()
    }

    /// Return the cached analysis or ask the provider once. Failures are not cached.
    pub fn get_or_analyze(&mut self, song_id: &str) -> Result<&AnalysisResult, AnalysisError> {
        if song_id.trim().is_empty() {
            return Err(AnalysisError::InvalidSong(song_id.to_string()));
        }

        match self.analyzed.entry(song_id.to_string()) {
            Entry::Occupied(entry) => {
                tracing::debug!(song_id, "Using cached analysis");
                Ok(entry.into_mut())
            }
            Entry::Vacant(entry) => {
                tracing::info!(song_id, "Analyzing song");
                let analysis = self.provider.analyze(song_id).map_err(|e| {
                    tracing::error!(song_id, error = %e, "Analysis failed");
                    e
                })?;
                Ok(entry.insert(analysis))
            }
        }
    }

    /// Analyze every song (through the cache) and score the first two.
    /// Any analysis failure short-circuits to a zero score.
    pub fn analyze_mashup_compatibility(
        &mut self,
        song_ids: &[&str],
        weights: Option<&CompatibilityWeights>,
        key_rule: KeyRule,
    ) -> CompatibilityResult {
        let mut analyses = Vec::with_capacity(song_ids.len());
        for song_id in song_ids {
            match self.get_or_analyze(song_id) {
                Ok(analysis) => analyses.push(analysis.clone()),
                Err(_) => {
                    return CompatibilityResult::unscored(
                        "Analysis failed for one or more songs.",
                        Vec::new(),
                    );
                }
            }
        }

        if analyses.len() < 2 {
            return CompatibilityResult::unscored("Need at least 2 analyzed songs.", Vec::new());
        }

        let result = CompatibilityScoring::compute_with_key_rule(&analyses, weights, key_rule);
        tracing::info!(score = result.score, songs = song_ids.len(), "Mashup compatibility");
        result
    }
}

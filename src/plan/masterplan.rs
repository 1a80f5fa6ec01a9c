use crate::error::PlanError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use std::collections::BTreeMap;

/// One of the two source tracks in a mashup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stem {
    A,
    B,
}

impl Stem {
    pub fn as_str(self) -> &'static str {
        match self {
            Stem::A => "a",
            Stem::B => "b",
        }
    }
}

/// Sidechain ducking is either switched on/off or given as a settings object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Sidechain {
    Enabled(bool),
    Settings(Map<String, Value>),
}

impl Default for Sidechain {
    fn default() -> Self {
        Sidechain::Enabled(false)
    }
}

/// A span of the mashup timeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanSection {
    pub start_ms: u64,
    pub end_ms: u64,
    pub top_stem: Stem,
    pub gain_db: BTreeMap<Stem, f64>,
    #[serde(default)]
    pub eq: Map<String, Value>,
    #[serde(default)]
    pub sidechain: Sidechain,
    pub x_fade: Map<String, Value>,
    pub pitch_shift: BTreeMap<Stem, f64>,
    pub stretch_ratio: BTreeMap<Stem, f64>,
}

/// The masterplan: an ordered list of timeline sections
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MashPlan {
    pub sections: Vec<PlanSection>,
}

impl MashPlan {
    /// Structural checks plus every section inside the shorter of the two tracks
    pub fn validate(&self, dur_a_ms: u64, dur_b_ms: u64) -> Result<(), PlanError> {
        self.validate_structure()?;

        let max_ms = dur_a_ms.min(dur_b_ms);
        for (index, section) in self.sections.iter().enumerate() {
            if section.end_ms > max_ms {
                return Err(PlanError::SectionOutOfRange {
                    index,
                    start_ms: section.start_ms,
                    end_ms: section.end_ms,
                    max_ms,
                });
            }
        }
        Ok(())
    }

    /// Checks that do not need the track durations
    pub fn validate_structure(&self) -> Result<(), PlanError> {
        for (index, section) in self.sections.iter().enumerate() {
            if section.start_ms >= section.end_ms {
                return Err(PlanError::SectionOutOfRange {
                    index,
                    start_ms: section.start_ms,
                    end_ms: section.end_ms,
                    max_ms: section.end_ms,
                });
            }
            if let Some((stem, _)) = section.stretch_ratio.iter().find(|(_, ratio)| **ratio < 0.0) {
                return Err(PlanError::NegativeStretch {
                    index,
                    stem: stem.as_str().to_string(),
                });
            }
        }
        Ok(())
    }

    /// Total span covered by the plan
    pub fn duration_ms(&self) -> u64 {
        self.sections.iter().map(|s| s.end_ms).max().unwrap_or(0)
    }
}

/// Deterministic starting plan: track A on top for the length of the shorter
/// track, track B ducked by 3 dB, no pitch or tempo changes
pub fn generate_masterplan(dur_a_ms: u64, dur_b_ms: u64) -> Result<MashPlan, PlanError> {
    let total = dur_a_ms.min(dur_b_ms);
    let mut x_fade = Map::new();
    x_fade.insert("curve".to_string(), json!("linear"));

    let plan = MashPlan {
        sections: vec![PlanSection {
            start_ms: 0,
            end_ms: total,
            top_stem: Stem::A,
            gain_db: BTreeMap::from([(Stem::A, 0.0), (Stem::B, -3.0)]),
            eq: Map::new(),
            sidechain: Sidechain::default(),
            x_fade,
            pitch_shift: BTreeMap::from([(Stem::A, 0.0), (Stem::B, 0.0)]),
            stretch_ratio: BTreeMap::from([(Stem::A, 1.0), (Stem::B, 1.0)]),
        }],
    };
    plan.validate(dur_a_ms, dur_b_ms)?;
    tracing::debug!(duration_ms = total, "Generated default masterplan");
    Ok(plan)
}

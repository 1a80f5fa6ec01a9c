use crate::error::AlignmentError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Track {
    A,
    B,
}

/// Offset and stretch needed to bring two tracks to a common tempo
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Alignment {
    pub offset_ms: i64,
    pub stretch_cents: f64,
}

/// Which track gets stretched, by how much, and the resulting alignment
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TempoAlignment {
    pub stretched_track: Track,
    pub stretch_ratio: f64,
    pub alignment: Alignment,
}

/// Plan a tempo alignment between two tracks.
/// The track requiring the smaller stretch becomes the reference; ties keep A as reference.
pub fn align_tempo(bpm_a: f64, bpm_b: f64) -> Result<TempoAlignment, AlignmentError> {
    for bpm in [bpm_a, bpm_b] {
        if !bpm.is_finite() || bpm <= 0.0 {
            return Err(AlignmentError::InvalidBpm(bpm));
        }
    }

    let ratio_a = bpm_b / bpm_a;
    let ratio_b = bpm_a / bpm_b;
    let (stretched_track, stretch_ratio) = if (1.0 - ratio_a).abs() <= (1.0 - ratio_b).abs() {
        (Track::B, ratio_b)
    } else {
        (Track::A, ratio_a)
    };

    let stretch_cents = 1200.0 * stretch_ratio.log2();
    tracing::debug!(bpm_a, bpm_b, ?stretched_track, stretch_ratio, stretch_cents, "Planned tempo alignment");

    Ok(TempoAlignment {
        stretched_track,
        stretch_ratio,
        alignment: Alignment {
            offset_ms: 0,
            stretch_cents,
        },
    })
}

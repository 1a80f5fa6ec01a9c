use serde::{Deserialize, Serialize};

/// A stretch of a track in milliseconds, e.g. a detected verse or chorus
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionSpan {
    pub start_ms: u64,
    pub end_ms: u64,
}

impl SectionSpan {
    fn length_ms(&self) -> u64 {
        self.end_ms.saturating_sub(self.start_ms)
    }
}

/// The five mashability factors, each nominally in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MashabilityFactors {
    pub key: f64,
    pub tempo: f64,
    pub sections: f64,
    pub vocals: f64,
    pub energy: f64,
}

impl MashabilityFactors {
    fn mean(&self) -> f64 {
        (self.key + self.tempo + self.sections + self.vocals + self.energy) / 5.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MashabilityScore {
    pub score: f64,
    pub factors: MashabilityFactors,
}

/// Everything needed to score a pair of tracks, as read from a JSON request file
#[derive(Debug, Clone, Deserialize)]
pub struct MashabilityInput {
    pub key_confidence: f64,
    pub tempo_ratio: f64,
    #[serde(default)]
    pub sections_a: Vec<SectionSpan>,
    #[serde(default)]
    pub sections_b: Vec<SectionSpan>,
    pub vocal_density_a: f64,
    pub vocal_density_b: f64,
    #[serde(default)]
    pub energy_a: Vec<f64>,
    #[serde(default)]
    pub energy_b: Vec<f64>,
}

impl MashabilityInput {
    pub fn score(&self) -> MashabilityScore {
        mashability_score(
            self.key_confidence,
            self.tempo_ratio,
            section_overlap(&self.sections_a, &self.sections_b),
            self.vocal_density_a,
            self.vocal_density_b,
            &self.energy_a,
            &self.energy_b,
        )
    }
}

/// Overlapping time between two section lists, relative to the shorter total.
/// Zero when either side has no covered time.
pub fn section_overlap(sections_a: &[SectionSpan], sections_b: &[SectionSpan]) -> f64 {
    let total_a: u64 = sections_a.iter().map(SectionSpan::length_ms).sum();
    let total_b: u64 = sections_b.iter().map(SectionSpan::length_ms).sum();
    if total_a == 0 || total_b == 0 {
        return 0.0;
    }

    let mut overlap = 0u64;
    for a in sections_a {
        for b in sections_b {
            let start = a.start_ms.max(b.start_ms);
            let end = a.end_ms.min(b.end_ms);
            if end > start {
                overlap += end - start;
            }
        }
    }
    overlap as f64 / total_a.min(total_b) as f64
}

/// Combine key confidence, tempo ratio, section overlap, vocal density and energy
/// contour correlation into a score in [0, 1] (the clamped mean of the factors).
pub fn mashability_score(
    key_confidence: f64,
    tempo_ratio: f64,
    section_overlap: f64,
    vocal_density_a: f64,
    vocal_density_b: f64,
    energy_a: &[f64],
    energy_b: &[f64],
) -> MashabilityScore {
    let len = energy_a.len().min(energy_b.len());
    let energy_corr = pearson(&energy_a[..len], &energy_b[..len]);

    let factors = MashabilityFactors {
        key: key_confidence,
        tempo: (1.0 - (1.0 - tempo_ratio).abs()).max(0.0),
        sections: section_overlap,
        vocals: 1.0 - (vocal_density_a - vocal_density_b).abs(),
        energy: (energy_corr + 1.0) / 2.0,
    };
    let score = factors.mean().clamp(0.0, 1.0);
    tracing::debug!(?factors, score, "Computed mashability");

    MashabilityScore { score, factors }
}

// Pearson correlation; 0 for empty or constant input
fn pearson(xs: &[f64], ys: &[f64]) -> f64 {
    if xs.is_empty() {
        return 0.0;
    }
    let n = xs.len() as f64;
    let mean_x = xs.iter().sum::<f64>() / n;
    let mean_y = ys.iter().sum::<f64>() / n;

    let (mut cov, mut var_x, mut var_y) = (0.0, 0.0, 0.0);
    for (x, y) in xs.iter().zip(ys) {
        let (dx, dy) = (x - mean_x, y - mean_y);
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }
    if var_x == 0.0 || var_y == 0.0 {
        return 0.0;
    }
    cov / (var_x * var_y).sqrt()
}

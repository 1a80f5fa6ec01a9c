use serde::{Deserialize, Serialize};
use std::fmt;

/// The twelve pitch classes, spelled the way the analysis service reports them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PitchClass {
    #[serde(rename = "C")]
    C,
    #[serde(rename = "C#")]
    CSharp,
    #[serde(rename = "D")]
    D,
    #[serde(rename = "Eb")]
    EFlat,
    #[serde(rename = "E")]
    E,
    #[serde(rename = "F")]
    F,
    #[serde(rename = "F#")]
    FSharp,
    #[serde(rename = "G")]
    G,
    #[serde(rename = "Ab")]
    AFlat,
    #[serde(rename = "A")]
    A,
    #[serde(rename = "Bb")]
    BFlat,
    #[serde(rename = "B")]
    B,
}

const PITCHES: [PitchClass; 12] = [
    PitchClass::C,
    PitchClass::CSharp,
    PitchClass::D,
    PitchClass::EFlat,
    PitchClass::E,
    PitchClass::F,
    PitchClass::FSharp,
    PitchClass::G,
    PitchClass::AFlat,
    PitchClass::A,
    PitchClass::BFlat,
    PitchClass::B,
];

impl PitchClass {
    /// Transpose by a number of semitones, wrapping around the octave
    pub fn shifted(self, semitones: i32) -> PitchClass {
        let idx = (self as i32 + semitones).rem_euclid(12) as usize;
        PITCHES[idx]
    }

    /// Parse a root note such as `C`, `c#`, `Db` or `B♭`; enharmonics collapse
    /// onto the spelling used by `PITCHES`
    pub fn parse(root: &str) -> Option<PitchClass> {
        let stripped: String = root
            .replace('\u{266F}', "#")
            .replace('\u{266D}', "b")
            .chars()
            .filter(|ch| !ch.is_whitespace())
            .collect();
        let mut chars = stripped.chars();
        let letter = chars.next()?.to_ascii_uppercase();
        let natural: i32 = match letter {
            'C' => 0,
            'D' => 2,
            'E' => 4,
            'F' => 5,
            'G' => 7,
            'A' => 9,
            'B' => 11,
            _ => return None,
        };
        let offset: i32 = match chars.next() {
            None => 0,
            Some('#') => 1,
            Some('b') => -1,
            Some(_) => return None,
        };
        if chars.next().is_some() {
            return None;
        }
        Some(PITCHES[(natural + offset).rem_euclid(12) as usize])
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PitchClass::C => "C",
            PitchClass::CSharp => "C#",
            PitchClass::D => "D",
            PitchClass::EFlat => "Eb",
            PitchClass::E => "E",
            PitchClass::F => "F",
            PitchClass::FSharp => "F#",
            PitchClass::G => "G",
            PitchClass::AFlat => "Ab",
            PitchClass::A => "A",
            PitchClass::BFlat => "Bb",
            PitchClass::B => "B",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Major,
    Minor,
}

/// A musical key: root pitch class plus mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyInfo {
    pub pitch_class: PitchClass,
    pub mode: Mode,
}

impl KeyInfo {
    pub fn new(pitch_class: PitchClass, mode: Mode) -> Self {
        Self { pitch_class, mode }
    }

    /// Parse labels like `C`, `Am`, `F# minor`, `Ebmaj`, `A min`.
    /// A bare root is read as major.
    pub fn parse(label: &str) -> Option<KeyInfo> {
        let trimmed = label.trim();
        if trimmed.is_empty() {
            return None;
        }
        let lower = trimmed.to_ascii_lowercase();

        let suffixes: [(&str, Mode); 5] = [
            ("minor", Mode::Minor),
            ("major", Mode::Major),
            ("min", Mode::Minor),
            ("maj", Mode::Major),
            ("m", Mode::Minor),
        ];
        for (suffix, mode) in suffixes {
            if lower.ends_with(suffix) && trimmed.len() > suffix.len() {
                let root = &trimmed[..trimmed.len() - suffix.len()];
                if let Some(pitch_class) = PitchClass::parse(root) {
                    return Some(KeyInfo::new(pitch_class, mode));
                }
            }
        }
        PitchClass::parse(trimmed).map(|pitch_class| KeyInfo::new(pitch_class, Mode::Major))
    }

    pub fn camelot(&self) -> CamelotKey {
        let (number, letter) = match self.mode {
            Mode::Major => (
                match self.pitch_class {
                    PitchClass::B => 1,
                    PitchClass::FSharp => 2,
                    PitchClass::CSharp => 3,
                    PitchClass::AFlat => 4,
                    PitchClass::EFlat => 5,
                    PitchClass::BFlat => 6,
                    PitchClass::F => 7,
                    PitchClass::C => 8,
                    PitchClass::G => 9,
                    PitchClass::D => 10,
                    PitchClass::A => 11,
                    PitchClass::E => 12,
                },
                'B',
            ),
            Mode::Minor => (
                match self.pitch_class {
                    PitchClass::AFlat => 1,
                    PitchClass::EFlat => 2,
                    PitchClass::BFlat => 3,
                    PitchClass::F => 4,
                    PitchClass::C => 5,
                    PitchClass::G => 6,
                    PitchClass::D => 7,
                    PitchClass::A => 8,
                    PitchClass::E => 9,
                    PitchClass::B => 10,
                    PitchClass::FSharp => 11,
                    PitchClass::CSharp => 12,
                },
                'A',
            ),
        };
        CamelotKey { number, letter }
    }
}

impl fmt::Display for KeyInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mode = match self.mode {
            Mode::Major => "major",
            Mode::Minor => "minor",
        };
        write!(f, "{} {}", self.pitch_class.as_str(), mode)
    }
}

/// Position on the Camelot wheel: number 1-12, letter A (minor) or B (major)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CamelotKey {
    number: u8,
    letter: char,
}

impl CamelotKey {
    /// Parse Camelot notation such as `8A` or `12b`
    pub fn parse(raw: &str) -> Option<CamelotKey> {
        let trimmed = raw.trim().to_ascii_uppercase();
        if trimmed.len() < 2 {
            return None;
        }
        let letter = trimmed.chars().last()?;
        if letter != 'A' && letter != 'B' {
            return None;
        }
        let digits = &trimmed[..trimmed.len() - 1];
        if !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let number: u8 = digits.parse().ok()?;
        if !(1..=12).contains(&number) {
            return None;
        }
        Some(CamelotKey { number, letter })
    }

    /// Accept either Camelot notation or a standard key label
    pub fn from_label(raw: &str) -> Option<CamelotKey> {
        Self::parse(raw).or_else(|| KeyInfo::parse(raw).map(|key| key.camelot()))
    }
}

impl fmt::Display for CamelotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.number, self.letter)
    }
}

/// Suggested pitch shift to apply to the second track
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KeyStrategy {
    pub pitch_shift_semitones: f64,
}

/// Wheel steps between two keys plus a penalty for crossing modes:
/// 0.5 for relative major/minor, 1.0 for any other mode change
pub fn camelot_distance(a: CamelotKey, b: CamelotKey) -> f64 {
    let diff = (a.number as i32 - b.number as i32).abs();
    let wheel_dist = diff.min(12 - diff) as f64;
    let mode_penalty = if a.number == b.number && a.letter != b.letter {
        0.5
    } else if a.letter != b.letter {
        1.0
    } else {
        0.0
    };
    wheel_dist + mode_penalty
}

/// Find the pitch shift in -3..=3 semitones for `track_b` that best matches `track_a`.
/// Larger shifts are penalized one point per semitone. Returns the strategy and a
/// confidence in [0, 1].
pub fn suggest_key_strategy(track_a: KeyInfo, track_b: KeyInfo) -> (KeyStrategy, f64) {
    let code_a = track_a.camelot();
    let mut best_shift = 0;
    let mut best_penalty = f64::INFINITY;

    for shift in -3..=3 {
        let shifted = KeyInfo::new(track_b.pitch_class.shifted(shift), track_b.mode);
        let penalty = camelot_distance(code_a, shifted.camelot()) + shift.abs() as f64;
        if penalty < best_penalty {
            best_penalty = penalty;
            best_shift = shift;
        }
    }

    let confidence = (1.0 - best_penalty / 6.0).max(0.0);
    tracing::debug!(
        from = %track_a,
        to = %track_b,
        shift = best_shift,
        confidence,
        "Suggested key strategy"
    );
    (
        KeyStrategy {
            pitch_shift_semitones: best_shift as f64,
        },
        confidence,
    )
}

/// Mixing compatibility of a transition between two Camelot keys (0.0 to 1.0)
pub fn key_axis_score(from: CamelotKey, to: CamelotKey) -> f64 {
    if from == to {
        return 1.0;
    }
    if from.number == to.number {
        return 0.8; // relative major/minor
    }

    let clockwise = (to.number as i16 - from.number as i16).rem_euclid(12);
    let same_letter = from.letter == to.letter;
    match clockwise {
        1 | 11 if same_letter => 0.9,
        2 | 10 if same_letter => 0.5,
        1 | 11 => 0.4,
        _ => 0.1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn key(label: &str) -> KeyInfo {
        KeyInfo::parse(label).unwrap()
    }

    #[test]
    fn test_parses_key_labels() {
        assert_eq!(key("C"), KeyInfo::new(PitchClass::C, Mode::Major));
        assert_eq!(key("Am"), KeyInfo::new(PitchClass::A, Mode::Minor));
        assert_eq!(key("F# minor"), KeyInfo::new(PitchClass::FSharp, Mode::Minor));
        assert_eq!(key("Db major"), KeyInfo::new(PitchClass::CSharp, Mode::Major));
        assert_eq!(key("a min"), KeyInfo::new(PitchClass::A, Mode::Minor));
        assert_eq!(key("B\u{266D}"), KeyInfo::new(PitchClass::BFlat, Mode::Major));
        assert_eq!(key("Ebmaj"), KeyInfo::new(PitchClass::EFlat, Mode::Major));
        assert!(KeyInfo::parse("").is_none());
        assert!(KeyInfo::parse("H minor").is_none());
        assert!(KeyInfo::parse("C##").is_none());
    }

    #[test]
    fn test_camelot_codes() {
        assert_eq!(key("C").camelot().to_string(), "8B");
        assert_eq!(key("Am").camelot().to_string(), "8A");
        assert_eq!(key("E minor").camelot().to_string(), "9A");
        assert_eq!(key("B").camelot().to_string(), "1B");
        assert_eq!(CamelotKey::parse("12b").map(|k| k.to_string()), Some("12B".to_string()));
        assert!(CamelotKey::parse("13A").is_none());
        assert!(CamelotKey::parse("8C").is_none());
        assert!(CamelotKey::parse("+8A").is_none());
        assert!(CamelotKey::parse(" 8 A").is_none());
        assert_eq!(CamelotKey::from_label("G"), CamelotKey::parse("9B"));
    }

    #[test]
    fn test_shift_wraps_octave() {
        assert_eq!(PitchClass::B.shifted(1), PitchClass::C);
        assert_eq!(PitchClass::C.shifted(-1), PitchClass::B);
        assert_eq!(PitchClass::A.shifted(3), PitchClass::C);
    }

    #[test]
    fn test_camelot_distance() {
        let a8 = CamelotKey::parse("8A").unwrap();
        assert_relative_eq!(camelot_distance(a8, CamelotKey::parse("8B").unwrap()), 0.5);
        assert_relative_eq!(camelot_distance(a8, CamelotKey::parse("9A").unwrap()), 1.0);
        assert_relative_eq!(camelot_distance(a8, CamelotKey::parse("2A").unwrap()), 6.0);
        assert_relative_eq!(camelot_distance(CamelotKey::parse("1A").unwrap(), CamelotKey::parse("12B").unwrap()), 2.0);
    }

    #[test]
    fn test_known_compatible_pair() {
        let (strategy, confidence) = suggest_key_strategy(key("A minor"), key("E minor"));
        assert_relative_eq!(strategy.pitch_shift_semitones, 0.0);
        assert!(confidence > 0.6, "confidence was {confidence}");
    }

    #[test]
    fn test_incompatible_penalty() {
        let (strategy, confidence) = suggest_key_strategy(key("C major"), key("F# minor"));
        // A minor (relative of C major) is three semitones up
        assert_relative_eq!(strategy.pitch_shift_semitones, 3.0);
        assert!(confidence < 0.5, "confidence was {confidence}");
    }

    #[test]
    fn test_identical_keys_full_confidence() {
        let (strategy, confidence) = suggest_key_strategy(key("G"), key("G"));
        assert_relative_eq!(strategy.pitch_shift_semitones, 0.0);
        assert_relative_eq!(confidence, 1.0);
    }

    #[test]
    fn test_key_axis_scores() {
        let k = |s: &str| CamelotKey::parse(s).unwrap();
        assert_relative_eq!(key_axis_score(k("8A"), k("8A")), 1.0);
        assert_relative_eq!(key_axis_score(k("8A"), k("8B")), 0.8);
        assert_relative_eq!(key_axis_score(k("8A"), k("9A")), 0.9);
        assert_relative_eq!(key_axis_score(k("1A"), k("12A")), 0.9);
        assert_relative_eq!(key_axis_score(k("8A"), k("10A")), 0.5);
        assert_relative_eq!(key_axis_score(k("8A"), k("9B")), 0.4);
        assert_relative_eq!(key_axis_score(k("8A"), k("2B")), 0.1);
    }
}

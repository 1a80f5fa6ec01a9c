use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

mod cache;
mod compatibility;
mod config;
mod error;
mod models;
mod plan;


use crate::cache::{AnalysisCache, JsonFileProvider, load_analysis_file};
use crate::compatibility::harmony::{self, KeyInfo};
use crate::compatibility::mashability::MashabilityInput;
use crate::compatibility::tempo::align_tempo;
use crate::compatibility::{CompatibilityResult, CompatibilityScoring, CompatibilityWeights, KeyRule};
use crate::config::load_config;
use crate::plan::{MashPlan, PlanPatcher, generate_masterplan};

#[derive(Parser)]
#[command(name = "mashup-studio")]
#[command(about = "Compatibility scoring and mashup plan editing")]
#[command(version)]
struct Args {
    /// Print machine-readable JSON instead of a summary
    #[arg(long = "json", global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Score analysis files against each other (only the first two are compared)
    Score {
        /// Analysis JSON files (bare records or /analyze responses)
        #[arg(required = true)]
        analyses: Vec<PathBuf>,

        /// JSON file with weight overrides, e.g. {"bpmDifference": 0.4}
        #[arg(short = 'w', long = "weights")]
        weights: Option<PathBuf>,

        #[arg(short = 'k', long = "key-rule", value_enum)]
        key_rule: Option<KeyRule>,

        /// Also show the individual factor scores
        #[arg(short = 'f', long = "factors")]
        factors: bool,
    },

    /// Score songs by id, loading analyses through the cache
    Compare {
        #[arg(required = true)]
        song_ids: Vec<String>,

        /// Directory with <song_id>.json analysis files
        #[arg(short = 'd', long = "analysis-dir")]
        analysis_dir: Option<PathBuf>,

        #[arg(short = 'w', long = "weights")]
        weights: Option<PathBuf>,

        #[arg(short = 'k', long = "key-rule", value_enum)]
        key_rule: Option<KeyRule>,
    },

    /// Apply a JSON Patch (RFC 6902) operation list to a plan document
    Patch {
        plan: PathBuf,
        operations: PathBuf,

        /// Validate the result as a mashup masterplan
        #[arg(short = 'm', long = "masterplan")]
        masterplan: bool,

        /// Track A duration in ms, used with --masterplan
        #[arg(long = "duration-a", requires = "duration_b")]
        duration_a: Option<u64>,

        /// Track B duration in ms, used with --masterplan
        #[arg(long = "duration-b", requires = "duration_a")]
        duration_b: Option<u64>,

        /// Write the patched plan here instead of stdout
        #[arg(short = 'o', long = "output")]
        output: Option<PathBuf>,
    },

    /// Camelot codes and the suggested pitch shift between two keys
    Keys { key_a: String, key_b: String },

    /// Mashability (0-1) from a JSON file with key confidence, tempo ratio,
    /// sections, vocal densities and energy contours
    Mashability { input: PathBuf },

    /// Which track to time-stretch to match tempos
    Align { bpm_a: f64, bpm_b: f64 },

    /// Generate the default masterplan for two track durations (ms)
    Plan { duration_a: u64, duration_b: u64 },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = load_config()?;
    tracing::debug!(?config, "Loaded configuration");

    match args.command {
        Command::Score {
            analyses,
            weights,
            key_rule,
            factors,
        } => {
            let weights = load_weights(weights.as_deref().or(config.weights_file.as_deref()))?;
            let key_rule = key_rule.unwrap_or(config.key_rule);

            let analyses = analyses
                .iter()
                .map(|path| {
                    load_analysis_file(path)
                        .with_context(|| format!("Failed to load analysis '{}'", path.display()))
                })
                .collect::<Result<Vec<_>>>()?;

            if factors && !args.json {
                if let [song1, song2, ..] = analyses.as_slice() {
                    let scores =
                        CompatibilityScoring::calculate_factor_scores(song1, song2, key_rule);
                    println!(
                        "Factors: BPM {:.1} | Key {:.1} | Energy {:.1} | Spectral {:.1} | Rhythm {:.1}",
                        scores.bpm, scores.key, scores.energy, scores.spectral, scores.rhythm
                    );
                }
            }

            let result =
                CompatibilityScoring::compute_with_key_rule(&analyses, weights.as_ref(), key_rule);
            print_compatibility(&result, args.json)?;
        }

        Command::Compare {
            song_ids,
            analysis_dir,
            weights,
            key_rule,
        } => {
            let weights = load_weights(weights.as_deref().or(config.weights_file.as_deref()))?;
            let key_rule = key_rule.unwrap_or(config.key_rule);
            let dir = analysis_dir.unwrap_or(config.analysis_dir);

            let mut cache = AnalysisCache::new(JsonFileProvider::new(dir));
            let ids: Vec<&str> = song_ids.iter().map(String::as_str).collect();
            let result = cache.analyze_mashup_compatibility(&ids, weights.as_ref(), key_rule);
            tracing::debug!(cached = cache.len(), "Analyses loaded");
            print_compatibility(&result, args.json)?;
        }

        Command::Patch {
            plan,
            operations,
            masterplan,
            duration_a,
            duration_b,
            output,
        } => {
            let document = read_json(&plan)?;
            let raw_operations = read_json(&operations)?;

            let patched = if masterplan {
                let typed: MashPlan = serde_json::from_value(document)
                    .with_context(|| format!("'{}' is not a mashup plan", plan.display()))?;
                let operations = PlanPatcher::parse_operations(&raw_operations)?;
                let durations = duration_a.zip(duration_b);
                let patched = PlanPatcher::patch_masterplan(&typed, &operations, durations)?;
                tracing::info!(
                    sections = patched.sections.len(),
                    duration_ms = patched.duration_ms(),
                    "Masterplan patched"
                );
                serde_json::to_value(patched)?
            } else {
                PlanPatcher::patch_plan_from_json(&document, &raw_operations)?
            };

            let rendered = serde_json::to_string_pretty(&patched)?;
            match output {
                Some(path) => {
                    std::fs::write(&path, rendered)
                        .with_context(|| format!("Failed to write '{}'", path.display()))?;
                    if !args.json {
                        println!("✓ Patched plan written to {}", path.display());
                    }
                }
                None => println!("{rendered}"),
            }
        }

        Command::Keys { key_a, key_b } => {
            let parsed_a = KeyInfo::parse(&key_a)
                .with_context(|| format!("Unrecognized key '{key_a}'"))?;
            let parsed_b = KeyInfo::parse(&key_b)
                .with_context(|| format!("Unrecognized key '{key_b}'"))?;
            let (code_a, code_b) = (parsed_a.camelot(), parsed_b.camelot());
            let distance = harmony::camelot_distance(code_a, code_b);
            let (strategy, confidence) = harmony::suggest_key_strategy(parsed_a, parsed_b);

            if args.json {
                let report = serde_json::json!({
                    "key_a": parsed_a,
                    "key_b": parsed_b,
                    "camelot_a": code_a.to_string(),
                    "camelot_b": code_b.to_string(),
                    "distance": distance,
                    "key_strategy": strategy,
                    "confidence": confidence,
                });
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("{parsed_a} ({code_a}) -> {parsed_b} ({code_b})");
                println!("Camelot distance: {distance:.1}");
                println!(
                    "Suggested shift for track B: {:+} semitones (confidence {:.2})",
                    strategy.pitch_shift_semitones, confidence
                );
            }
        }

        Command::Mashability { input } => {
            let request: MashabilityInput = serde_json::from_value(read_json(&input)?)
                .with_context(|| format!("'{}' is not a mashability request", input.display()))?;
            let result = request.score();
            if args.json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                let f = result.factors;
                println!("Mashability: {:.3}", result.score);
                println!(
                    "Factors: Key {:.2} | Tempo {:.2} | Sections {:.2} | Vocals {:.2} | Energy {:.2}",
                    f.key, f.tempo, f.sections, f.vocals, f.energy
                );
            }
        }

        Command::Align { bpm_a, bpm_b } => {
            let plan = align_tempo(bpm_a, bpm_b)?;
            if args.json {
                println!("{}", serde_json::to_string_pretty(&plan)?);
            } else {
                println!(
                    "Stretch track {:?} by {:.4} ({:+.1} cents)",
                    plan.stretched_track, plan.stretch_ratio, plan.alignment.stretch_cents
                );
            }
        }

        Command::Plan {
            duration_a,
            duration_b,
        } => {
            let plan = generate_masterplan(duration_a, duration_b)?;
            println!("{}", serde_json::to_string_pretty(&plan)?);
        }
    }

    Ok(())
}

fn load_weights(path: Option<&Path>) -> Result<Option<CompatibilityWeights>> {
    path.map(|path| {
        CompatibilityWeights::load_from_file(path)
            .with_context(|| format!("Failed to load weights '{}'", path.display()))
    })
    .transpose()
}

fn read_json(path: &Path) -> Result<serde_json::Value> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read '{}'", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("'{}' is not valid JSON", path.display()))
}

fn print_compatibility(result: &CompatibilityResult, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(result)?);
        return Ok(());
    }

    println!("Compatibility Score: {}/100", result.score);
    for reason in &result.reasons {
        println!("  ✗ {reason}");
    }
    for suggestion in &result.suggestions {
        println!("  → {suggestion}");
    }
    Ok(())
}

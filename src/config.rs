use crate::compatibility::KeyRule;
use anyhow::Result;
use std::path::PathBuf;

/// Configuration loaded from environment variables
#[derive(Debug)]
pub struct Config {
    /// Directory holding `<song_id>.json` analysis files
    pub analysis_dir: PathBuf,
    /// Optional JSON file with compatibility weight overrides
    pub weights_file: Option<PathBuf>,
    pub key_rule: KeyRule,
}

/// Load configuration from `.env` and environment
pub fn load_config() -> Result<Config> {
    // Load `.env` file if present
    dotenv::dotenv().ok();
    config_from_lookup(|name| std::env::var(name).ok())
}

fn config_from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Config> {
    let analysis_dir = lookup("MASHUP_ANALYSIS_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("analyses"));
    let weights_file = lookup("MASHUP_WEIGHTS_FILE")
        .filter(|path| !path.trim().is_empty())
        .map(PathBuf::from);
    let key_rule = match lookup("MASHUP_KEY_RULE") {
        Some(rule) => rule.parse()?,
        None => KeyRule::default(),
    };

    Ok(Config {
        analysis_dir,
        weights_file,
        key_rule,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| vars.get(name).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = config_from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.analysis_dir, PathBuf::from("analyses"));
        assert!(config.weights_file.is_none());
        assert_eq!(config.key_rule, KeyRule::Exact);
    }

    #[test]
    fn test_reads_variables() {
        let config = config_from_lookup(lookup_from(&[
            ("MASHUP_ANALYSIS_DIR", "/srv/analyses"),
            ("MASHUP_WEIGHTS_FILE", "weights.json"),
            ("MASHUP_KEY_RULE", "camelot"),
        ]))
        .unwrap();
        assert_eq!(config.analysis_dir, PathBuf::from("/srv/analyses"));
        assert_eq!(config.weights_file, Some(PathBuf::from("weights.json")));
        assert_eq!(config.key_rule, KeyRule::Camelot);
    }

    #[test]
    fn test_rejects_unknown_key_rule() {
        assert!(config_from_lookup(lookup_from(&[("MASHUP_KEY_RULE", "fifths")])).is_err());
    }
}

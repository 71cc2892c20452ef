use std::{collections::BTreeMap, collections::HashSet, fs, path::Path, path::PathBuf};

use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use strsim::jaro_winkler;

/// Output mode for list-style commands, selected by the global `--json` flag.
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum OutputFmt {
    Text,
    Json,
}

/// Prints `rows` as pretty JSON, or runs the text renderer.
pub fn emit<T: Serialize>(fmt: OutputFmt, rows: &T, pretty: impl FnOnce()) {
    match fmt {
        OutputFmt::Json => println!(
            "{}",
            serde_json::to_string_pretty(rows).unwrap_or_else(|_| "[]".to_string())
        ),
        OutputFmt::Text => pretty(),
    }
}

pub static ALLOWED_MUSCLES: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    HashSet::from([
        "biceps",
        "triceps",
        "forearms",
        "chest",
        "shoulders",
        "back",
        "quads",
        "hamstrings",
        "glutes",
        "calves",
        "abs",
    ])
});

/// Returns the canonical lowercase muscle name or `None` if not recognised.
pub fn canonical_muscle<S: AsRef<str>>(m: S) -> Option<String> {
    let m = m.as_ref().trim().to_ascii_lowercase();
    if ALLOWED_MUSCLES.contains(m.as_str()) {
        Some(m)
    } else {
        None
    }
}

/// Return the closest known muscle for `input`
/// if similarity is high *and* clearly better than the runner-up.
/// Otherwise return `None` (no suggestion shown).
pub fn best_muscle_suggestion(input: &str) -> Option<&'static str> {
    let inp = input.trim().to_ascii_lowercase();
    if inp.is_empty() {
        return None;
    }

    let mut scores: Vec<(&'static str, f64)> = ALLOWED_MUSCLES
        .iter()
        .copied()
        .map(|m| (m, jaro_winkler(&inp, m)))
        .collect();

    // Highest score first.
    scores.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

    let (best, best_score) = scores[0];
    let second_score = scores.get(1).map(|(_, s)| *s).unwrap_or(0.0);

    const MIN_SCORE: f64 = 0.80;
    const GAP: f64 = 0.02;

    if best_score >= MIN_SCORE && best_score - second_score >= GAP {
        Some(best)
    } else {
        None
    }
}

/// Flat key/value config persisted as TOML under the user config dir.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(flatten)]
    pub map: BTreeMap<String, String>,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading config file `{}`", path.display()))?;
        toml::from_str(&raw).with_context(|| format!("parsing config file `{}`", path.display()))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating config directory `{}`", parent.display()))?;
        }

        let raw = toml::to_string_pretty(self)?;
        fs::write(path, raw).with_context(|| format!("writing config file `{}`", path.display()))
    }
}

/// Location of the TOML config file.
pub fn config_path() -> Result<PathBuf> {
    dirs::config_dir()
        .map(|d| d.join("gymscan").join("config"))
        .context("Could not determine config directory")
}

/// Resolves the Gemini API key: config key `gemini_api_key`, then the
/// GEMINI_API_KEY environment variable, then empty (soft paths degrade,
/// extraction reports a user-actionable error).
pub fn api_key() -> String {
    if let Ok(path) = config_path() {
        if let Ok(cfg) = Config::load(&path) {
            if let Some(key) = cfg.map.get("gemini_api_key") {
                if !key.trim().is_empty() {
                    return key.trim().to_string();
                }
            }
        }
    }

    std::env::var("GEMINI_API_KEY").unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_muscle_normalises_case_and_whitespace() {
        assert_eq!(canonical_muscle(" CHEST "), Some("chest".to_string()));
        assert_eq!(canonical_muscle("quads"), Some("quads".to_string()));
        assert_eq!(canonical_muscle("pecs"), None);
    }

    #[test]
    fn suggestion_catches_close_typos_only() {
        assert_eq!(best_muscle_suggestion("shulders"), Some("shoulders"));
        assert_eq!(best_muscle_suggestion("qauds"), Some("quads"));
        assert_eq!(best_muscle_suggestion(""), None);
        assert_eq!(best_muscle_suggestion("xyzzy"), None);
    }

    #[test]
    fn config_round_trips_through_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config");

        let mut cfg = Config::default();
        cfg.map.insert("gemini_api_key".into(), "abc123".into());
        cfg.save(&path).unwrap();

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded.map.get("gemini_api_key").map(String::as_str), Some("abc123"));
    }

    #[test]
    fn missing_config_loads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = Config::load(&dir.path().join("nope")).unwrap();
        assert!(cfg.map.is_empty());
    }
}

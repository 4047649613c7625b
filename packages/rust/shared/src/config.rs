//! Application configuration for Inkflow.
//!
//! User config lives at `~/.inkflow/inkflow.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{InkflowError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "inkflow.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".inkflow";

// ---------------------------------------------------------------------------
// Config structs (matching inkflow.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Global defaults.
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// Chat-completion API settings.
    #[serde(default)]
    pub completion: CompletionConfig,

    /// Web-search tool settings.
    #[serde(default)]
    pub search: SearchConfig,

    /// Research agent settings.
    #[serde(default)]
    pub research: ResearchConfig,

    /// Tone used when no rule matches.
    #[serde(default = "default_fallback_tone")]
    pub fallback_tone: Tone,

    /// Ordered tone rules, first match wins.
    #[serde(default = "default_tone_rules")]
    pub tones: Vec<ToneRule>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            defaults: DefaultsConfig::default(),
            completion: CompletionConfig::default(),
            search: SearchConfig::default(),
            research: ResearchConfig::default(),
            fallback_tone: default_fallback_tone(),
            tones: default_tone_rules(),
        }
    }
}

/// `[defaults]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Directory the three JSON artifacts are written to.
    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    /// Number of ideas requested from the model.
    #[serde(default = "default_idea_count")]
    pub idea_count: u32,

    /// 1-based ordinal of the idea that gets researched.
    #[serde(default = "default_selection")]
    pub selection: usize,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            idea_count: default_idea_count(),
            selection: default_selection(),
        }
    }
}

fn default_output_dir() -> String {
    "./output".into()
}
fn default_idea_count() -> u32 {
    5
}
fn default_selection() -> usize {
    2
}

/// `[completion]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionConfig {
    /// Name of the env var holding the API key (never store the key itself).
    #[serde(default = "default_completion_key_env")]
    pub api_key_env: String,

    /// Base URL of the OpenAI-compatible API.
    #[serde(default = "default_completion_base_url")]
    pub base_url: String,

    /// Model identifier used by every stage.
    #[serde(default = "default_model")]
    pub model: String,

    /// Sampling temperature for idea generation.
    #[serde(default = "default_idea_temperature")]
    pub idea_temperature: f64,

    /// Sampling temperature for the research agent.
    #[serde(default = "default_stage_temperature")]
    pub research_temperature: f64,

    /// Sampling temperature for article writing.
    #[serde(default = "default_stage_temperature")]
    pub writer_temperature: f64,

    /// Request timeout; unset means the HTTP client default (none).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            api_key_env: default_completion_key_env(),
            base_url: default_completion_base_url(),
            model: default_model(),
            idea_temperature: default_idea_temperature(),
            research_temperature: default_stage_temperature(),
            writer_temperature: default_stage_temperature(),
            timeout_secs: None,
        }
    }
}

fn default_completion_key_env() -> String {
    "GROQ_API_KEY".into()
}
fn default_completion_base_url() -> String {
    "https://api.groq.com/openai/v1/".into()
}
fn default_model() -> String {
    "llama3-70b-8192".into()
}
fn default_idea_temperature() -> f64 {
    0.9
}
fn default_stage_temperature() -> f64 {
    0.7
}

/// `[search]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Name of the env var holding the search API key.
    #[serde(default = "default_search_key_env")]
    pub api_key_env: String,

    /// Base URL of the Tavily API.
    #[serde(default = "default_search_base_url")]
    pub base_url: String,

    /// Results returned per query.
    #[serde(default = "default_max_results")]
    pub max_results: u32,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            api_key_env: default_search_key_env(),
            base_url: default_search_base_url(),
            max_results: default_max_results(),
        }
    }
}

fn default_search_key_env() -> String {
    "TAVILY_API_KEY".into()
}
fn default_search_base_url() -> String {
    "https://api.tavily.com/".into()
}
fn default_max_results() -> u32 {
    5
}

/// `[research]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResearchConfig {
    /// Upper bound on model turns in the tool-calling loop.
    #[serde(default = "default_max_steps")]
    pub max_steps: u32,
}

impl Default for ResearchConfig {
    fn default() -> Self {
        Self {
            max_steps: default_max_steps(),
        }
    }
}

fn default_max_steps() -> u32 {
    15
}

// ---------------------------------------------------------------------------
// Tone rules
// ---------------------------------------------------------------------------

/// A named writing style injected into the writer's system instruction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tone {
    /// Short label, e.g. "Professional".
    pub name: String,
    /// Style directive handed to the model.
    pub directive: String,
}

impl std::fmt::Display for Tone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.name, self.directive)
    }
}

/// `[[tones]]` entry: selects `tone` when any keyword occurs in the summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToneRule {
    /// Case-sensitive substrings; any one matching selects the tone.
    pub keywords: Vec<String>,
    #[serde(flatten)]
    pub tone: Tone,
}

impl ToneRule {
    fn new(keywords: &[&str], name: &str, directive: &str) -> Self {
        Self {
            keywords: keywords.iter().map(|k| (*k).to_string()).collect(),
            tone: Tone {
                name: name.into(),
                directive: directive.into(),
            },
        }
    }
}

fn default_fallback_tone() -> Tone {
    Tone {
        name: "Storytelling".into(),
        directive: "write in a narrative tone that captures emotions and paints vivid scenarios."
            .into(),
    }
}

fn default_tone_rules() -> Vec<ToneRule> {
    vec![
        ToneRule::new(
            &["FDA", "Medicare", "WHO"],
            "Professional",
            "write like a polished article from The Economist or Harvard Business Review.",
        ),
        ToneRule::new(
            &["infections", "RSV", "disease"],
            "Empowering Feminine Voice",
            "strong yet graceful, inspiring and articulate like Annalise Keating.",
        ),
        ToneRule::new(
            &["nomination", "debate"],
            "Bold & Witty",
            "make it sassy, punchy, with strong opinions and confidence.",
        ),
        ToneRule::new(
            &["vaccine", "healthcare"],
            "Conversational",
            "write like you're talking to a friend, engaging, casual but informative.",
        ),
    ]
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.inkflow/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| InkflowError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.inkflow/inkflow.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| InkflowError::io(path, e))?;

    let config: AppConfig = toml::from_str(&content).map_err(|e| {
        InkflowError::config(format!("failed to parse {}: {e}", path.display()))
    })?;
    validate_config(&config)?;
    Ok(config)
}

/// Reject settings no run could succeed with.
pub fn validate_config(config: &AppConfig) -> Result<()> {
    if config.defaults.idea_count == 0 {
        return Err(InkflowError::config("defaults.idea_count must be at least 1"));
    }
    if config.defaults.selection == 0 {
        return Err(InkflowError::config(
            "defaults.selection is a 1-based ordinal and must be at least 1",
        ));
    }
    if config.research.max_steps == 0 {
        return Err(InkflowError::config("research.max_steps must be at least 1"));
    }
    for base in [&config.completion.base_url, &config.search.base_url] {
        url::Url::parse(base)
            .map_err(|e| InkflowError::config(format!("invalid base_url '{base}': {e}")))?;
    }
    Ok(())
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| InkflowError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| InkflowError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| InkflowError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

/// Read a non-empty secret from the named env var.
pub fn read_secret(var_name: &str) -> Result<String> {
    match std::env::var(var_name) {
        Ok(val) if !val.is_empty() => Ok(val),
        _ => Err(InkflowError::config(format!(
            "API key not found. Set the {var_name} environment variable (or add it to .env)."
        ))),
    }
}

/// Check that the completion API key env var is set and non-empty.
pub fn validate_api_key(config: &AppConfig) -> Result<()> {
    read_secret(&config.completion.api_key_env).map(|_| ())
}

/// Check that the search API key env var is set and non-empty.
pub fn validate_search_key(config: &AppConfig) -> Result<()> {
    read_secret(&config.search.api_key_env).map(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("output_dir"));
        assert!(toml_str.contains("GROQ_API_KEY"));
        assert!(toml_str.contains("TAVILY_API_KEY"));
        assert!(!toml_str.contains("timeout_secs"));
    }

    #[test]
    fn config_roundtrip() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize");
        let parsed: AppConfig = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.defaults.selection, 2);
        assert_eq!(parsed.completion.model, "llama3-70b-8192");
        assert_eq!(parsed.tones, config.tones);
        assert_eq!(parsed.fallback_tone.name, "Storytelling");
    }

    #[test]
    fn empty_file_yields_defaults() {
        let config: AppConfig = toml::from_str("").expect("parse");
        assert_eq!(config.defaults.output_dir, "./output");
        assert_eq!(config.defaults.idea_count, 5);
        assert_eq!(config.research.max_steps, 15);
        assert_eq!(config.tones.len(), 4);
        assert!((config.completion.idea_temperature - 0.9).abs() < f64::EPSILON);
    }

    #[test]
    fn custom_tone_table_replaces_default() {
        let toml_str = r#"
[defaults]
selection = 1

[[tones]]
name = "Technical"
directive = "precise and dry."
keywords = ["Rust", "compiler"]
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.defaults.selection, 1);
        assert_eq!(config.tones.len(), 1);
        assert_eq!(config.tones[0].tone.name, "Technical");
        assert_eq!(config.tones[0].keywords, vec!["Rust", "compiler"]);
    }

    #[test]
    fn zero_selection_is_rejected() {
        let mut config = AppConfig::default();
        config.defaults.selection = 0;
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("1-based"));
    }

    #[test]
    fn bad_base_url_is_rejected() {
        let mut config = AppConfig::default();
        config.search.base_url = "not a url".into();
        assert!(validate_config(&config).is_err());
        assert!(validate_config(&AppConfig::default()).is_ok());
    }

    #[test]
    fn api_key_validation() {
        let mut config = AppConfig::default();
        // Use a unique env var name to avoid interfering with other tests
        config.completion.api_key_env = "INKFLOW_TEST_NONEXISTENT_KEY_12345".into();
        let result = validate_api_key(&config);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("API key not found"));

        config.search.api_key_env = "INKFLOW_TEST_NONEXISTENT_SEARCH_KEY_12345".into();
        assert!(validate_search_key(&config).is_err());
    }
}

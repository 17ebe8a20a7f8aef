use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

// ============================================================================
// CLI Argument Parsing (clap derive)
// ============================================================================

#[derive(Parser, Debug)]
#[command(
    name = "page-forge",
    version,
    about = "Generates self-healing UI test artifacts from natural-language instructions"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// LLM API endpoint for scenario generation
    #[arg(long, global = true)]
    pub llm_endpoint: Option<String>,

    /// LLM model name
    #[arg(long, global = true)]
    pub llm_model: Option<String>,

    /// Path to config file (default: page-forge.yaml in current dir)
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// DOM snapshot cache directory
    #[arg(long, global = true)]
    pub cache_dir: Option<String>,

    /// DOM snapshot cache entry lifetime in seconds
    #[arg(long, global = true)]
    pub cache_ttl_secs: Option<u64>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate test artifacts from an instruction set
    Generate {
        /// Path to the instruction set YAML/JSON file
        #[arg(long)]
        input: String,

        /// Output directory for generated artifacts
        #[arg(short, long, default_value = "generated")]
        output_dir: String,

        /// Scenario generator: mock or llm
        #[arg(long, default_value = "mock")]
        generator: String,

        /// Reuse cached DOM snapshots instead of launching a browser
        #[arg(long, default_value_t = false)]
        offline: bool,
    },

    /// Execute an instruction set's scenarios against a live browser
    Run {
        /// Path to the instruction set YAML/JSON file
        #[arg(long)]
        input: String,

        /// Per-candidate selector timeout in milliseconds
        #[arg(long)]
        timeout_ms: Option<u64>,

        /// Path for the healing event log (JSONL)
        #[arg(long, default_value = "healing_events.jsonl")]
        healing_log: String,
    },

    /// Delete expired entries from the DOM snapshot cache
    PurgeCache,
}

// ============================================================================
// Config File Model (optional YAML)
// ============================================================================

/// Optional YAML config file: `page-forge.yaml`
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub resolver: ResolverConfig,
    #[serde(default)]
    pub llm: LlmConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_cache_dir")]
    pub dir: String,

    /// Entry lifetime in seconds
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            dir: default_cache_dir(),
            ttl_secs: default_ttl_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Per-candidate wait during selector resolution
    #[serde(default = "default_timeout_ms")]
    pub timeout_per_candidate_ms: u64,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            timeout_per_candidate_ms: default_timeout_ms(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    pub endpoint: Option<String>,
    pub model: Option<String>,

    #[serde(default = "default_attempts")]
    pub max_attempts: u32,

    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            model: None,
            max_attempts: default_attempts(),
            retry_delay_ms: default_retry_delay_ms(),
        }
    }
}

// Serde default helpers
fn default_cache_dir() -> String { ".page-forge-cache".to_string() }
fn default_ttl_secs() -> u64 { 3600 }
fn default_timeout_ms() -> u64 { 2000 }
fn default_attempts() -> u32 { 3 }
fn default_retry_delay_ms() -> u64 { 1000 }

// ============================================================================
// Config File Loading
// ============================================================================

/// Load config from a YAML file. Returns defaults if the file is missing or
/// malformed.
pub fn load_config(path: Option<&str>) -> AppConfig {
    let config_path = path.unwrap_or("page-forge.yaml");
    match std::fs::read_to_string(config_path) {
        Ok(content) => serde_yaml::from_str(&content).unwrap_or_default(),
        Err(_) => AppConfig::default(),
    }
}

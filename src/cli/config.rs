// config.rs - Configuration file support

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Config {
    // Input/Output
    pub reference: Option<String>,
    pub samples: Option<Vec<String>>,
    pub outdir: Option<String>,

    // Thresholds
    pub min_gf: Option<f64>,
    pub min_cf: Option<f64>,
    pub min_pf: Option<f64>,
    pub min_pn: Option<usize>,

    // Core settings
    pub progressive: Option<bool>,
    pub ploidy: Option<usize>,

    // Performance
    pub chunk_size: Option<usize>,
    pub threads: Option<usize>,

    // Flags
    pub dry_run: Option<bool>,
    pub quiet: Option<bool>,
}

impl Config {
    /// Create a new empty configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file '{}': {}", path.display(), e))?;
        Self::from_toml(&content)
            .map_err(|e| format!("Failed to parse config file '{}': {}", path.display(), e))
    }

    pub fn from_toml(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|e| e.to_string())
    }

    /// Save configuration to TOML file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), String> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(self)
            .map_err(|e| format!("Failed to serialize config: {}", e))?;
        fs::write(path, content)
            .map_err(|e| format!("Failed to write config file '{}': {}", path.display(), e))
    }

    /// Generate a sample configuration file with comments
    pub fn generate_sample() -> String {
        r#"# polycore.toml - Configuration file for polycore
# Command line arguments will override these settings

# =============================================================================
# INPUT/OUTPUT
# =============================================================================

# Reference FASTA (first sequence, named "Reference" in outputs)
reference = "/path/to/reference.fasta"

# Sample FASTA files aligned to the reference
samples = ["/path/to/sample1.fasta", "/path/to/sample2.fasta"]

# Output directory
outdir = "results"

# =============================================================================
# THRESHOLDS
# =============================================================================

# Minimum genome fraction per sample (0.0-1.0)
min_gf = 0.9

# Minimum fraction of samples called for a site to be core (0.0-1.0)
min_cf = 0.95

# Minimum fraction of informative samples with a non-reference base (0.0-1.0)
min_pf = 0.0

# Minimum number of samples with a non-reference base
min_pn = 0

# =============================================================================
# CORE SETTINGS
# =============================================================================

# Add samples by decreasing genome fraction and record the core trajectory
progressive = false

# Ploidy (omit to infer from the largest ambiguity code in the data)
# ploidy = 4

# =============================================================================
# PERFORMANCE
# =============================================================================

# Sites per distance chunk (omit to derive from available memory)
# chunk_size = 100000

# Number of threads (omit for auto-detection)
# threads = 16

# =============================================================================
# FLAGS
# =============================================================================

# Validate inputs without computation (dry run)
dry_run = false

# Only print errors
quiet = false
"#
        .to_string()
    }
}

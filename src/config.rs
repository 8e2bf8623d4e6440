use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct VaultConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub embedding: EmbeddingConfig,
    pub scoring: ScoringConfig,
    pub tiers: TierConfig,
    pub retrieval: RetrievalConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub log_level: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct StorageConfig {
    pub db_path: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct EmbeddingConfig {
    pub provider: String,
    pub dimensions: usize,
}

/// Weights and curve constants for the cognitive score.
///
/// Weights must sum to 1 so the final score stays in `[0, 1]`.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ScoringConfig {
    pub semantic_weight: f64,
    pub recency_weight: f64,
    pub access_weight: f64,
    /// Days until the recency component halves.
    pub recency_half_life_days: f64,
    /// Access-count saturation constant for `1 - exp(-count/k)`.
    pub access_saturation: f64,
}

/// Lifecycle tier thresholds, checked in descending order.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct TierConfig {
    pub active_threshold: f64,
    pub contextual_threshold: f64,
    pub archived_threshold: f64,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Upper bound on the per-query `k` parameter.
    pub max_k: usize,
    /// Candidate over-fetch factor applied before re-ranking.
    pub overfetch_multiplier: usize,
    /// Hard cap on the candidate set regardless of `k`.
    pub candidate_cap: usize,
    /// Length of content snippets in search results.
    pub snippet_chars: usize,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            storage: StorageConfig::default(),
            embedding: EmbeddingConfig::default(),
            scoring: ScoringConfig::default(),
            tiers: TierConfig::default(),
            retrieval: RetrievalConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 8000,
            log_level: "info".into(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        let db_path = default_vault_dir()
            .join("neurovault.db")
            .to_string_lossy()
            .into_owned();
        Self { db_path }
    }
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: "hash".into(),
            dimensions: 384,
        }
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            semantic_weight: 0.5,
            recency_weight: 0.3,
            access_weight: 0.2,
            recency_half_life_days: 7.0,
            access_saturation: 5.0,
        }
    }
}

impl Default for TierConfig {
    fn default() -> Self {
        Self {
            active_threshold: 0.75,
            contextual_threshold: 0.50,
            archived_threshold: 0.25,
        }
    }
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            max_k: 100,
            overfetch_multiplier: 5,
            candidate_cap: 256,
            snippet_chars: 250,
        }
    }
}

/// Returns `~/.neurovault/`
pub fn default_vault_dir() -> PathBuf {
    dirs::home_dir()
        .expect("home directory must exist")
        .join(".neurovault")
}

/// Returns the default config file path: `~/.neurovault/config.toml`
pub fn default_config_path() -> PathBuf {
    default_vault_dir().join("config.toml")
}

impl VaultConfig {
    /// Load config from TOML file (if it exists) then apply env var overrides.
    pub fn load() -> Result<Self> {
        Self::load_from(default_config_path())
    }

    /// Load from a specific path, then apply env var overrides and validate.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            let contents =
                std::fs::read_to_string(path).context("failed to read config file")?;
            toml::from_str(&contents).context("failed to parse config TOML")?
        } else {
            info!("no config file at {}, using defaults", path.display());
            VaultConfig::default()
        };

        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Apply environment variable overrides (NEUROVAULT_DB, NEUROVAULT_PORT,
    /// NEUROVAULT_LOG_LEVEL).
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("NEUROVAULT_DB") {
            self.storage.db_path = val;
        }
        if let Ok(val) = std::env::var("NEUROVAULT_PORT") {
            if let Ok(port) = val.parse() {
                self.server.port = port;
            }
        }
        if let Ok(val) = std::env::var("NEUROVAULT_LOG_LEVEL") {
            self.server.log_level = val;
        }
    }

    /// Reject configurations that would break scoring invariants.
    pub fn validate(&self) -> Result<()> {
        let s = &self.scoring;
        let sum = s.semantic_weight + s.recency_weight + s.access_weight;
        if (sum - 1.0).abs() > 1e-6 {
            bail!("scoring weights must sum to 1.0 (got {sum})");
        }
        if s.recency_half_life_days <= 0.0 || s.access_saturation <= 0.0 {
            bail!("recency_half_life_days and access_saturation must be positive");
        }
        let t = &self.tiers;
        if !(t.archived_threshold < t.contextual_threshold
            && t.contextual_threshold < t.active_threshold)
        {
            bail!("tier thresholds must be strictly descending");
        }
        if self.retrieval.max_k == 0 || self.retrieval.overfetch_multiplier == 0 {
            bail!("retrieval.max_k and retrieval.overfetch_multiplier must be nonzero");
        }
        Ok(())
    }

    /// Resolve the database path, expanding `~` if needed.
    pub fn resolved_db_path(&self) -> PathBuf {
        expand_tilde(&self.storage.db_path)
    }
}

pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        dirs::home_dir()
            .expect("home directory must exist")
            .join(rest)
    } else {
        PathBuf::from(path)
    }
}

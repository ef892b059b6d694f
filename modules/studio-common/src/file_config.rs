use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::ranking::RankingConfig;
use crate::scoring::ScoringConfig;

/// TOML-backed tuning loaded from disk. Every section is optional and falls
/// back to the built-in defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub scoring: ScoringConfig,
    pub ranking: RankingConfig,
}

impl FileConfig {
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: FileConfig = toml::from_str(content).context("Failed to parse config")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.scoring.validate().context("Invalid [scoring] section")?;
        if self.ranking.default_limit == 0 {
            anyhow::bail!("ranking.default_limit must be at least 1");
        }
        if self.ranking.candidate_pool_size < self.ranking.default_limit {
            anyhow::bail!(
                "ranking.candidate_pool_size ({}) must be >= ranking.default_limit ({})",
                self.ranking.candidate_pool_size,
                self.ranking.default_limit
            );
        }
        Ok(())
    }
}

/// Load, parse and validate a TOML config file.
pub fn load_config(path: &Path) -> Result<FileConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    FileConfig::from_toml(&content)
        .with_context(|| format!("Failed to load config file: {}", path.display()))
}

/// Load the file at `path` if one is configured, otherwise use defaults.
pub fn load_or_default(path: Option<&Path>) -> Result<FileConfig> {
    match path {
        Some(path) => load_config(path),
        None => {
            tracing::info!("No STUDIO_CONFIG set, using default scoring and ranking tables");
            Ok(FileConfig::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_is_all_defaults() {
        assert_eq!(FileConfig::from_toml("").unwrap(), FileConfig::default());
    }

    #[test]
    fn partial_tables_override_defaults() {
        let config = FileConfig::from_toml(
            r#"
            [scoring]
            industry_fallback = 3

            [scoring.industry]
            saas = 25
            consulting = 20

            [ranking]
            default_limit = 5
            "#,
        )
        .unwrap();
        assert_eq!(config.scoring.industry_fallback, 3);
        assert_eq!(config.scoring.industry.len(), 10);
        assert_eq!(config.scoring.industry["consulting"], 20);
        assert_eq!(config.scoring.industry["fintech"], 22);
        assert_eq!(config.scoring.budget, ScoringConfig::default().budget);
        assert_eq!(config.ranking.default_limit, 5);
        assert_eq!(config.ranking.candidate_pool_size, 200);
    }

    #[test]
    fn unknown_section_is_rejected() {
        assert!(FileConfig::from_toml("[server]\nport = 1").is_err());
    }

    #[test]
    fn zero_limit_is_rejected() {
        assert!(FileConfig::from_toml("[ranking]\ndefault_limit = 0").is_err());
    }
}

//! Command-line arguments for the `parley` binary.

use std::path::PathBuf;

use clap::Parser;

use crate::config::{timeout_from_secs, ParleyConfig};
use crate::error::Result;

/// Chat with the tutor assistant in your terminal.
#[derive(Parser, Debug)]
#[command(name = "parley", version, about = "Parley: terminal tutor assistant")]
pub struct Cli {
    /// Model id served by the endpoint (overrides GEMINI_MODEL)
    #[arg(short, long)]
    pub model: Option<String>,

    /// OpenAI-compatible base URL (overrides GEMINI_BASE_URL)
    #[arg(long)]
    pub base_url: Option<String>,

    /// Per-turn timeout in seconds, 0 to wait forever (overrides PARLEY_TURN_TIMEOUT_SECS)
    #[arg(short, long)]
    pub timeout_secs: Option<u64>,

    /// Read variables from this file instead of ./.env
    #[arg(long)]
    pub env_file: Option<PathBuf>,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, default_value = "warn")]
    pub log_level: String,
}

impl Cli {
    /// Resolve configuration: environment first, then flag overrides.
    pub fn load_config(&self) -> Result<ParleyConfig> {
        let config = match self.env_file {
            Some(ref path) => ParleyConfig::from_env_file(path)?,
            None => ParleyConfig::from_env()?,
        };
        Ok(self.apply_overrides(config))
    }

    pub fn apply_overrides(&self, mut config: ParleyConfig) -> ParleyConfig {
        if let Some(ref model) = self.model {
            config = config.with_model_id(model.clone());
        }
        if let Some(ref url) = self.base_url {
            config = config.with_model_base_url(url.clone());
        }
        if let Some(secs) = self.timeout_secs {
            config = config.with_turn_timeout(timeout_from_secs(secs));
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn parse_with_defaults() {
        let cli = Cli::try_parse_from(["parley"]).unwrap();
        assert!(cli.model.is_none());
        assert!(cli.base_url.is_none());
        assert!(cli.timeout_secs.is_none());
        assert!(cli.env_file.is_none());
        assert_eq!(cli.log_level, "warn");
    }

    #[test]
    fn flags_override_config() {
        let cli = Cli::try_parse_from([
            "parley",
            "-m",
            "gemini-2.5-pro",
            "--base-url",
            "http://localhost:9000/v1",
            "-t",
            "0",
        ])
        .unwrap();

        let config = cli.apply_overrides(ParleyConfig::new("key"));
        assert_eq!(config.model_id(), "gemini-2.5-pro");
        assert_eq!(config.model_base_url(), "http://localhost:9000/v1");
        assert_eq!(config.turn_timeout(), None);
    }

    #[test]
    fn absent_flags_keep_config_values() {
        let cli = Cli::try_parse_from(["parley"]).unwrap();
        let config = cli.apply_overrides(
            ParleyConfig::new("key").with_turn_timeout(Some(Duration::from_secs(7))),
        );
        assert_eq!(config.model_id(), "gemini-2.0-flash");
        assert_eq!(config.turn_timeout(), Some(Duration::from_secs(7)));
    }

    #[test]
    fn rejects_non_numeric_timeout() {
        assert!(Cli::try_parse_from(["parley", "--timeout-secs", "soon"]).is_err());
    }
}

//! Command-line options shared by every subcommand

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;
use tally_core::Config;

#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// TOML configuration file
    #[arg(long, short = 'c', env = "TALLY_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Template file to render
    #[arg(long, short = 't', env = "TALLY_TEMPLATE", global = true)]
    pub template: Option<PathBuf>,

    /// Output file ("-" for stdout)
    #[arg(long, short = 'o', env = "TALLY_OUTPUT", global = true)]
    pub output: Option<PathBuf>,

    /// Docker daemon address (unix:// or tcp://)
    #[arg(long, env = "DOCKER_HOST", global = true)]
    pub docker_host: Option<String>,

    /// Quiet period before rendering, in milliseconds
    #[arg(long, global = true)]
    pub quiet_period_ms: Option<u64>,

    /// Longest a burst may delay a render, in milliseconds
    #[arg(long, global = true)]
    pub max_wait_ms: Option<u64>,

    /// Write logs to this file instead of stderr
    #[arg(long, env = "TALLY_LOG_FILE", global = true)]
    pub log_file: Option<PathBuf>,
}

impl GlobalArgs {
    /// Layer flags and environment over the config file, then validate
    pub fn resolve(&self) -> Result<Config> {
        let mut config = Config::load_or_default(self.config.as_deref())
            .context("Failed to load configuration")?;

        if let Some(template) = &self.template {
            config.template = template.clone();
        }
        if let Some(output) = &self.output {
            config.output = Some(output.clone());
        }
        if let Some(host) = &self.docker_host {
            config.docker_host = Some(host.clone());
        }
        if let Some(ms) = self.quiet_period_ms {
            config.debounce.quiet_period_ms = ms;
        }
        if let Some(ms) = self.max_wait_ms {
            config.debounce.max_wait_ms = ms;
        }

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    #[test]
    fn test_flags_override_config_file() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("tally.toml");
        fs::write(
            &config_path,
            "template = \"file.tmpl\"\noutput = \"file.out\"\n[debounce]\nquiet_period_ms = 500\n",
        )
        .unwrap();

        let args = GlobalArgs {
            config: Some(config_path),
            output: Some(PathBuf::from("-")),
            max_wait_ms: Some(2000),
            ..GlobalArgs::default()
        };

        let config = args.resolve().unwrap();
        assert_eq!(config.template, Path::new("file.tmpl"));
        assert!(config.output_path().is_none());
        assert_eq!(config.debounce.quiet_period_ms, 500);
        assert_eq!(config.debounce.max_wait_ms, 2000);
    }

    #[test]
    fn test_missing_template_fails_validation() {
        let args = GlobalArgs::default();
        assert!(args.resolve().is_err());
    }

    #[test]
    fn test_template_flag_without_config_file() {
        let args = GlobalArgs {
            template: Some(PathBuf::from("only.tmpl")),
            ..GlobalArgs::default()
        };

        let config = args.resolve().unwrap();
        assert_eq!(config.template, Path::new("only.tmpl"));
        assert_eq!(config.debounce.max_wait_ms, 10_000);
    }
}

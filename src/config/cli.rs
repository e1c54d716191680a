use crate::config::patch_config::PatchConfig;
use crate::config::presets;
use crate::core::engine::RunOptions;
use crate::utils::error::{PatchError, Result};
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "text-patcher")]
#[command(about = "Apply an ordered list of regex and block rules to a source file")]
pub struct CliArgs {
    /// Path to a TOML rule file
    #[arg(short, long, conflicts_with = "preset")]
    pub config: Option<PathBuf>,

    /// Use a rule file bundled with the binary
    #[arg(long)]
    pub preset: Option<String>,

    /// Override the target file named in the rule file
    #[arg(short, long)]
    pub target: Option<PathBuf>,

    /// Apply the rules in memory without writing the file
    #[arg(long)]
    pub dry_run: bool,

    /// Print a unified diff of the changes
    #[arg(long)]
    pub diff: bool,

    /// Fail when any rule matches nothing
    #[arg(long)]
    pub strict: bool,

    /// Copy the original file to a timestamped .bak before writing
    #[arg(long)]
    pub backup: bool,

    /// Print the run report as JSON
    #[arg(long)]
    pub json_report: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub json_logs: bool,

    /// List bundled presets and exit
    #[arg(long)]
    pub list_presets: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl CliArgs {
    /// Loads the rule file or preset and applies the `--target` override.
    pub fn load_config(&self) -> Result<PatchConfig> {
        let mut config = match (&self.config, &self.preset) {
            (Some(path), _) => {
                tracing::info!("📁 Loading rules from: {}", path.display());
                PatchConfig::from_file(path)?
            }
            (None, Some(name)) => {
                tracing::info!("📦 Using preset: {}", name);
                presets::load(name)?
            }
            (None, None) => {
                return Err(PatchError::MissingConfigError {
                    field: "--config or --preset".to_string(),
                })
            }
        };

        if let Some(target) = &self.target {
            tracing::info!("🔧 Target overridden to: {}", target.display());
            config.set_target(target);
        }

        Ok(config)
    }

    /// Rule-file options, with command-line flags taking precedence.
    pub fn run_options(&self, config: &PatchConfig) -> RunOptions {
        let base = RunOptions::from_provider(config);
        RunOptions {
            strict: self.strict || base.strict,
            backup: self.backup || base.backup,
            dry_run: self.dry_run,
            show_diff: self.diff,
            status_on_stderr: self.json_report,
            ..base
        }
    }
}

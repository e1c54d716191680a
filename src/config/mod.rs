#[cfg(feature = "cli")]
pub mod cli;
pub mod patch_config;
pub mod presets;

#[cfg(feature = "cli")]
pub use cli::CliArgs;
pub use patch_config::PatchConfig;

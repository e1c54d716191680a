use clap::Parser;
use std::fmt::Write;
use text_patcher::config::presets;
use text_patcher::core::ConfigProvider;
use text_patcher::utils::{logger, validation::Validate};
use text_patcher::{CliArgs, LocalStorage, PatchConfig, PatchEngine, PatchError};

fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();

    // 初始化日誌
    if args.json_logs {
        logger::init_json_logger(args.verbose);
    } else {
        logger::init_cli_logger(args.verbose);
    }

    if args.list_presets {
        for preset in presets::all() {
            println!("{:<24} {}", preset.name, preset.summary);
        }
        return Ok(());
    }

    tracing::info!("🚀 Starting text-patcher");

    if let Err(e) = run(&args) {
        tracing::error!(
            "❌ Patch failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());
        std::process::exit(e.exit_code());
    }

    Ok(())
}

fn run(args: &CliArgs) -> Result<(), PatchError> {
    // 載入並驗證規則設定
    let config = args.load_config()?;
    config.validate()?;
    tracing::info!("✅ Rule file loaded and validated");

    display_config_summary(&config, args);

    let rules = config.compile_rules()?;
    let engine = PatchEngine::with_options(LocalStorage::new(), args.run_options(&config));
    tracing::debug!("Run options: {:?}", engine.options());

    let report = engine.run(config.target_path(), &rules)?;

    if args.json_report {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }

    let unmatched: Vec<_> = report.unmatched_rules().map(|o| o.rule.as_str()).collect();
    if !unmatched.is_empty() {
        tracing::warn!("⚠️ Rules without matches: {}", unmatched.join(", "));
    }

    Ok(())
}

fn display_config_summary(config: &PatchConfig, args: &CliArgs) {
    let mut summary = String::new();
    let _ = writeln!(summary, "📋 Patch Summary:");
    let _ = writeln!(summary, "  Name: {}", config.patch.name);
    if let Some(description) = &config.patch.description {
        let _ = writeln!(summary, "  Description: {}", description);
    }
    let _ = writeln!(summary, "  Target: {}", config.target_path().display());
    let _ = writeln!(summary, "  Rules: {}", config.rules.len());
    for rule in &config.rules {
        let _ = writeln!(summary, "    [{}] {}", rule.kind(), rule.name());
    }
    if args.dry_run {
        let _ = writeln!(summary, "  🔍 DRY RUN MODE ENABLED");
    }

    // stdout 只保留 JSON 報告
    if args.json_report {
        eprintln!("{}", summary);
    } else {
        println!("{}", summary);
    }
}

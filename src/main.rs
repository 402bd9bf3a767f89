use clap::Parser;
use versedeck::config::toml_config::TomlConfig;
use versedeck::config::EffectiveConfig;
use versedeck::core::Pipeline;
use versedeck::utils::{logger, validation::Validate};
use versedeck::{CliConfig, DeckEngine, LocalStorage, LyricsPipeline};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliConfig::parse();

    // 初始化日誌
    logger::init_cli_logger(args.verbose);

    tracing::info!("🚀 Starting versedeck");
    if args.verbose {
        tracing::debug!("CLI config: {:?}", args);
    }

    // 載入 TOML 配置（可選）
    let file_config = match &args.config {
        Some(path) => match TomlConfig::from_file(path) {
            Ok(config) => {
                tracing::info!("📁 Loaded configuration from: {}", path);
                Some(config)
            }
            Err(e) => {
                eprintln!("❌ Failed to load config file '{}': {}", path, e);
                eprintln!("💡 Make sure the file exists and is valid TOML format");
                std::process::exit(1);
            }
        },
        None => None,
    };

    let config = EffectiveConfig::merge(&args, file_config.as_ref());

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    // 顯示配置摘要
    display_config_summary(&config, file_config.as_ref(), args.dry_run);

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - No deck will be written");
        perform_dry_run(&config)?;
        return Ok(());
    }

    let monitor_enabled = config.monitor;
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    // 創建存儲和管道
    let storage = LocalStorage::new();
    let pipeline = LyricsPipeline::new(storage, config);

    // 創建引擎並運行
    let engine = DeckEngine::new_with_monitoring(pipeline, monitor_enabled);

    match engine.run() {
        Ok(output_path) => {
            tracing::info!("✅ Deck build completed successfully!");
            tracing::info!("📁 Output saved to: {}", output_path);
            println!("✅ Deck build completed successfully!");
            println!("📁 Output saved to: {}", output_path);
        }
        Err(e) => {
            // 記錄詳細錯誤信息
            tracing::error!(
                "❌ Deck build failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            // 輸出用戶友好的錯誤信息
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 建議: {}", e.recovery_suggestion());

            // 根據錯誤嚴重程度決定退出碼
            let exit_code = match e.severity() {
                versedeck::utils::error::ErrorSeverity::Low => 0, // 警告，但成功
                versedeck::utils::error::ErrorSeverity::Medium => 2, // 輸出可能不完整
                versedeck::utils::error::ErrorSeverity::High => 1, // 處理錯誤
                versedeck::utils::error::ErrorSeverity::Critical => 3, // 系統錯誤
            };

            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }

    Ok(())
}

fn display_config_summary(config: &EffectiveConfig, file: Option<&TomlConfig>, dry_run: bool) {
    println!("📋 Configuration Summary:");

    if let Some(file) = file {
        match &file.deck.description {
            Some(description) => println!("  Deck: {} - {}", file.deck.name, description),
            None => println!("  Deck: {}", file.deck.name),
        }
    }

    println!("  Source: {}", config.source_dir);
    println!("  Output: {}/{}", config.output_path, config.output_file);
    println!("  Extensions: {}", config.extensions.join(", "));
    println!("  Monitoring: {}", config.monitor);

    if dry_run {
        println!("  🔍 DRY RUN MODE ENABLED");
    }

    println!();
}

fn perform_dry_run(config: &EffectiveConfig) -> Result<(), Box<dyn std::error::Error>> {
    println!("🔍 Dry Run Analysis:");
    println!();

    let storage = LocalStorage::new();
    let pipeline = LyricsPipeline::new(storage, config.clone());
    let songs = pipeline.extract()?;

    println!("🎵 Songs that would be processed:");
    for song in &songs {
        println!(
            "  {} ({} line(s), {} card(s) before dedup)",
            song.title,
            song.lines.len(),
            song.lines.len() + 1
        );
    }

    println!();
    println!(
        "💾 Deck would be written to: {}/{}",
        config.output_path, config.output_file
    );
    println!();
    println!("✅ Dry run analysis complete. Run without --dry-run to build the deck.");

    Ok(())
}

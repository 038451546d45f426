use clap::Parser;
use excel_to_api::utils::{logger, validation::Validate};
use excel_to_api::{AppConfig, CliConfig, ConversionEngine};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut cli = CliConfig::parse();

    // 初始化日誌
    logger::init_cli_logger(cli.verbose);

    tracing::info!("Starting excel-to-api");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    // 互動模式先補齊缺少的參數
    if cli.interactive {
        if let Err(e) = cli.fill_interactive() {
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(1);
        }
    }

    // 驗證 CLI 參數
    if let Err(e) = cli.validate() {
        tracing::error!("❌ Argument validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    // 載入並驗證設定檔
    let config = match &cli.config {
        Some(path) => match AppConfig::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("❌ Failed to load config file '{}': {}", path, e);
                eprintln!("💡 Make sure the file exists and is valid JSON");
                std::process::exit(1);
            }
        },
        None => AppConfig::default(),
    };

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    // 建立引擎並執行
    let engine = ConversionEngine::new(cli, config);

    match engine.run() {
        Ok(summary) => {
            tracing::info!("✅ Conversion completed successfully!");
            tracing::info!(
                "📊 {} records, {} documents, {} API calls",
                summary.records,
                summary.documents,
                summary.calls
            );
            println!("✅ Conversion completed successfully!");
            for output in &summary.outputs {
                println!("📁 Output saved to: {}", output);
            }
        }
        Err(e) => {
            // 記錄詳細錯誤信息
            tracing::error!(
                "❌ Conversion failed: {} (Category: {:?}, Severity: {:?})",
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
                excel_to_api::utils::error::ErrorSeverity::Low => 0,
                excel_to_api::utils::error::ErrorSeverity::Medium => 2,
                excel_to_api::utils::error::ErrorSeverity::High => 1,
                excel_to_api::utils::error::ErrorSeverity::Critical => 3,
            };

            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }

    Ok(())
}

use artikelstamm_deductible::config::cli::parse_args;
use artikelstamm_deductible::utils::{logger, validation::Validate};
use artikelstamm_deductible::{
    DeductiblePipeline, LocalStorage, ReconcileEngine, ReconcileError, Settings,
};

fn fail(e: &ReconcileError) -> ! {
    tracing::error!(
        "❌ Reconciliation failed: {} (Category: {:?})",
        e,
        e.category()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());
    std::process::exit(e.exit_code());
}

fn main() {
    let mut config = match parse_args(std::env::args()) {
        Ok(config) => config,
        Err(e) => {
            // 參數有誤時尚未知道是否 verbose
            logger::init_cli_logger(false);
            fail(&e);
        }
    };

    // 初始化日誌
    logger::init_cli_logger(config.verbose);
    tracing::debug!("CLI config: {:?}", config);

    config.settings = match Settings::load() {
        Ok(settings) => settings,
        Err(e) => fail(&e),
    };

    // 驗證配置
    if let Err(e) = config.validate() {
        fail(&e);
    }

    let catalog_path = config.catalog_path.clone();
    let pipeline = DeductiblePipeline::new(LocalStorage::default(), config);
    let engine = ReconcileEngine::new(pipeline);

    match engine.run() {
        Ok(summary) => {
            let report = &summary.report;
            tracing::info!("✅ Reconciliation completed successfully!");
            if report.written {
                tracing::info!("📁 Catalog updated: {}", catalog_path);
            }
            println!(
                "✅ {} of {} items set to the listed deductible, {} already set ({} GTINs listed, {} without DEDUCTIBLE)",
                report.modified.len(),
                report.items_seen,
                report.already_set,
                summary.qualifying_gtins,
                report.without_deductible
            );
        }
        Err(e) => fail(&e),
    }
}

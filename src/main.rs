use anyhow::Context;
use clap::Parser;
use mdreport::utils::error::ErrorSeverity;
use mdreport::utils::{logger, validation::Validate};
use mdreport::{
    CliConfig, ConversionEngine, ConversionOutcome, LocalStorage, PdfStatus, ReportPipeline,
    ReportSettings, SofficeRenderer, TomlConfig,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    if cli.log_json {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting mdreport");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    let file_config = match cli.config.as_deref().map(TomlConfig::from_file).transpose() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("❌ Failed to load configuration: {}", e);
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(1);
        }
    };

    let settings = ReportSettings::resolve(file_config.as_ref(), cli.overrides());

    if let Err(e) = settings.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    if cli.monitor {
        tracing::info!("🔍 System monitoring enabled");
    }

    let pdf = settings.pdf.clone();
    let storage = LocalStorage::default();
    let pipeline = ReportPipeline::new(storage, settings);

    let mut engine = ConversionEngine::new_with_monitoring(pipeline, cli.monitor);
    if let Some(pdf) = pdf {
        engine = engine.with_pdf(Box::new(SofficeRenderer::new(pdf.converter)), pdf.output);
    }

    match engine.run().await {
        Ok(outcome) => {
            report_outcome(&outcome);

            if let Some(path) = &cli.summary {
                let json = outcome.to_json()?;
                std::fs::write(path, json)
                    .with_context(|| format!("failed to write summary to {}", path.display()))?;
                tracing::info!("Summary written to {}", path.display());
            }
        }
        Err(e) => {
            tracing::error!(
                "❌ Conversion failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

            let exit_code = match e.severity() {
                ErrorSeverity::Low => 0,
                ErrorSeverity::Medium => 2,
                ErrorSeverity::High => 1,
                ErrorSeverity::Critical => 3,
            };

            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }

    Ok(())
}

fn report_outcome(outcome: &ConversionOutcome) {
    println!("✅ Word document created: {}", outcome.word_path.display());

    match &outcome.pdf {
        PdfStatus::NotRequested => {}
        PdfStatus::Created { path } => println!("✅ PDF created: {}", path.display()),
        PdfStatus::Failed { reason } => {
            println!("⚠️  PDF was not created: {}", reason);
            println!("💡 Open the Word document and export it as PDF manually");
        }
    }

    let summary = &outcome.summary;
    println!(
        "📄 {} heading(s), {} paragraph(s), {} list item(s), {} code block(s), {} table(s)",
        summary.headings,
        summary.paragraphs,
        summary.list_items,
        summary.code_blocks,
        summary.tables
    );
    if summary.skipped_lines > 0 {
        println!("ℹ️  {} line(s) skipped", summary.skipped_lines);
    }
}

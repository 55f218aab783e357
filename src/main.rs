use anyhow::{Context, Result, anyhow};
use brandgen::batch::{load_batch, sample_requests};
use brandgen::config::{Config, setup_logging};
use brandgen::notify::Notifier;
use brandgen::pipeline::Pipeline;
use brandgen::producer::Producer;
use brandgen::secrets::resolve_api_key;
use clap::Parser;
use tracing::{info, warn};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = brandgen::cli::CliOptions::parse();

    setup_logging(cli.debug).map_err(|err| anyhow!("Failed to initialize logging: {err}"))?;

    info!("Branded image generation workflow");

    let config = Config::load(&cli.config)
        .with_context(|| format!("Failed to load config {}", cli.config.display()))?;

    let requests = match &cli.batch {
        Some(path) => load_batch(path)
            .with_context(|| format!("Failed to load batch {}", path.display()))?,
        None => sample_requests(),
    };

    let api_key = resolve_api_key(
        cli.api_key.as_deref(),
        &cli.secrets_file,
        config.api.gemini_api_key.as_deref(),
    );
    let producer = Producer::from_config(&config, api_key)?;
    let notifier = Notifier::new(&config.notification)?;

    let pipeline = Pipeline::new(&config, producer);
    let report = pipeline.run_batch(&requests).await;

    notifier.notify(&report.results).await;

    for failure in &report.failures {
        match &failure.variant {
            Some(variant) => warn!(
                "{} / {} failed: {}",
                failure.request, variant, failure.reason
            ),
            None => warn!("{} failed: {}", failure.request, failure.reason),
        }
    }
    info!(
        "Processing complete! Generated {} image sets ({} files)",
        report.results.len(),
        report.file_count()
    );
    info!("Output directory: {}", pipeline.writer().root().display());
    Ok(())
}

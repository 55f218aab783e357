//! Writes a starter config.json, .env template, output tree and placeholder logo.

use anyhow::{Context, Result, anyhow};
use brandgen::composite::placeholder_logo;
use brandgen::config::{Config, setup_logging};
use brandgen::constants::{API_KEY_ENV, DEFAULT_CONFIG_PATH, DEFAULT_SECRETS_FILE};
use brandgen::writer::OutputWriter;
use clap::Parser;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Set up a brandgen working directory.
#[derive(Parser, Debug)]
#[command(name = "brandgen_setup")]
struct Args {
    /// Directory to set up
    #[arg(long, default_value = ".")]
    dir: PathBuf,

    /// Overwrite config.json, .env and the logo if they exist
    #[arg(long)]
    force: bool,

    /// Side length of the placeholder logo, in pixels
    #[arg(long, default_value_t = 200)]
    logo_size: u32,
}

fn env_template() -> String {
    format!(
        "# Gemini API Key\n{API_KEY_ENV}=your_gemini_api_key_here\n\n# Optional: Webhook URL for notifications\nWEBHOOK_URL=https://your-webhook-url.com/notify\n"
    )
}

/// Writes `contents` unless the file exists and `force` is off. Returns whether it wrote.
fn write_unless_present(path: &Path, contents: &[u8], force: bool) -> Result<bool> {
    if path.exists() && !force {
        info!("{} already exists, skipping", path.display());
        return Ok(false);
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    fs::write(path, contents).with_context(|| format!("Failed to write {}", path.display()))?;
    info!("Created {}", path.display());
    Ok(true)
}

fn main() -> Result<()> {
    let args = Args::parse();
    setup_logging(false).map_err(|err| anyhow!("Failed to initialize logging: {err}"))?;

    let config = Config::default();
    let config_json =
        serde_json::to_vec_pretty(&config).context("Failed to serialize default config")?;
    write_unless_present(&args.dir.join(DEFAULT_CONFIG_PATH), &config_json, args.force)?;
    write_unless_present(
        &args.dir.join(DEFAULT_SECRETS_FILE),
        env_template().as_bytes(),
        args.force,
    )?;

    let writer = OutputWriter::new(
        args.dir.join(&config.storage.output_directory),
        config.image_variants.format,
    );
    writer
        .prepare(&config.image_variants.sizes)
        .context("Failed to create output directories")?;
    info!("Created output directories under {}", writer.root().display());

    if let Some(logo_path) = &config.brand.logo_path {
        let logo_path = args.dir.join(logo_path);
        if logo_path.exists() && !args.force {
            info!("Logo {} already exists", logo_path.display());
        } else {
            if let Some(parent) = logo_path.parent() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
            placeholder_logo(args.logo_size, config.brand.primary_color())
                .save(&logo_path)
                .with_context(|| format!("Failed to write {}", logo_path.display()))?;
            info!("Created placeholder logo {}", logo_path.display());
        }
    }

    println!("Setup complete. Next steps:");
    println!(
        "1. Set {API_KEY_ENV} in {DEFAULT_SECRETS_FILE} or the environment (only needed for the imagen provider)"
    );
    if let Some(logo_path) = &config.brand.logo_path {
        println!("2. Replace {} with your brand logo", logo_path.display());
    }
    println!("3. Run: brandgen");
    Ok(())
}

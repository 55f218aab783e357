//! CLI parser
use clap::Parser;
use std::path::PathBuf;

use crate::constants::{API_KEY_ENV, DEFAULT_CONFIG_PATH, DEFAULT_SECRETS_FILE};

#[derive(Parser, Debug)]
#[command(name = "brandgen")]
/// Generate branded image variants. With no arguments, runs the sample prompts.
pub struct CliOptions {
    #[clap(long, help = "Enable debug logging", env = "BRANDGEN_DEBUG")]
    /// Enable debug logging. Env: BRANDGEN_DEBUG
    pub debug: bool,
    #[clap(long, short, default_value = DEFAULT_CONFIG_PATH, env = "BRANDGEN_CONFIG")]
    /// Config file, defaults to `config.json`.
    /// Env: BRANDGEN_CONFIG
    pub config: PathBuf,
    #[clap(long, short)]
    /// JSON batch file of `{"name", "prompt"}` objects or plain prompt strings.
    /// Runs the built-in sample prompts when omitted.
    pub batch: Option<PathBuf>,
    #[clap(long, env = API_KEY_ENV, hide_env_values = true)]
    /// Image API key. Env: GEMINI_API_KEY
    pub api_key: Option<String>,
    #[clap(long, default_value = DEFAULT_SECRETS_FILE)]
    /// Secrets file checked for GEMINI_API_KEY when it isn't in the environment
    pub secrets_file: PathBuf,
}

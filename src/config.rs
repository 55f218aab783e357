//! Config handling

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use image::{ImageFormat, Rgb};
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::log::LevelFilter;
use url::Url;

use crate::constants::{
    DEFAULT_ACCENT_HEIGHT, DEFAULT_IMAGEN_MODEL, DEFAULT_OUTPUT_DIR, PLACEHOLDER_API_KEYS,
};
use crate::error::BrandgenError;

#[allow(clippy::unwrap_used)]
static HEX_COLOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^#?([0-9A-Fa-f]{2})([0-9A-Fa-f]{2})([0-9A-Fa-f]{2})$").unwrap()
});

#[allow(clippy::unwrap_used)]
static VARIANT_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9_-]+$").unwrap()
});

/// Sets up logging based on the debug flag
pub fn setup_logging(debug: bool) -> Result<(), Box<std::io::Error>> {
    let level = if debug {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    let mut logger = simple_logger::SimpleLogger::new().with_level(level);
    if !debug {
        logger = logger
            .with_module_level("tracing", LevelFilter::Warn)
            .with_module_level("reqwest", LevelFilter::Warn)
            .with_module_level("rustls", LevelFilter::Info)
            .with_module_level("hyper_util", LevelFilter::Info)
            .with_module_level("h2", LevelFilter::Info);
    }
    logger.init().map_err(|err| {
        eprintln!("Failed to initialize logger: {}", err);
        Box::new(std::io::Error::other(err))
    })
}

/// Everything read from the config file.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct Config {
    /// Image provider settings
    #[serde(default)]
    pub api: ApiConfig,
    /// Brand identity applied to every variant
    pub brand: BrandConfig,
    /// Output format and the list of variants to render
    pub image_variants: VariantsConfig,
    /// Where the files go
    #[serde(default)]
    pub storage: StorageConfig,
    /// Completion notification
    #[serde(default)]
    pub notification: NotificationConfig,
}

impl Config {
    /// Reads, parses and validates a config file.
    pub fn load(path: &Path) -> Result<Self, BrandgenError> {
        let raw = std::fs::read_to_string(path).map_err(|err| BrandgenError::io(path, err))?;
        Self::from_json(&raw, path)
    }

    /// Parses and validates config JSON; `origin` is only used in error messages.
    pub fn from_json(raw: &str, origin: &Path) -> Result<Self, BrandgenError> {
        let config: Config =
            serde_json::from_str(raw).map_err(|source| BrandgenError::ConfigParse {
                path: origin.to_path_buf(),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects values the pipeline can't work with.
    pub fn validate(&self) -> Result<(), BrandgenError> {
        if self.brand.colors.is_empty() {
            return Err(BrandgenError::InvalidConfig(
                "brand.colors needs at least one color".to_string(),
            ));
        }
        for color in &self.brand.colors {
            if parse_hex_color(color).is_none() {
                return Err(BrandgenError::InvalidConfig(format!(
                    "brand color {color:?} is not a #RRGGBB hex color"
                )));
            }
        }

        if self.image_variants.sizes.is_empty() {
            return Err(BrandgenError::InvalidConfig(
                "image_variants.sizes is empty".to_string(),
            ));
        }
        let mut seen = HashSet::new();
        for spec in &self.image_variants.sizes {
            if !VARIANT_NAME.is_match(&spec.name) {
                return Err(BrandgenError::InvalidConfig(format!(
                    "variant name {:?} may only contain letters, digits, '_' and '-'",
                    spec.name
                )));
            }
            if spec.width == 0 || spec.height == 0 {
                return Err(BrandgenError::InvalidConfig(format!(
                    "variant {} has non-positive dimensions {}x{}",
                    spec.name, spec.width, spec.height
                )));
            }
            if !seen.insert(spec.name.as_str()) {
                return Err(BrandgenError::InvalidConfig(format!(
                    "variant {} is defined more than once",
                    spec.name
                )));
            }
        }

        self.notification.webhook()?;
        Ok(())
    }
}

/// Which image producer to use.
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// Deterministic gradient derived from the prompt, no network
    #[default]
    Placeholder,
    /// Google Imagen through the Generative Language API
    Imagen,
}

/// Image provider settings.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ApiConfig {
    /// Which producer renders the base image
    #[serde(default)]
    pub provider: ProviderKind,
    /// Fallback API key, used when neither the environment nor the secrets file has one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gemini_api_key: Option<String>,
    /// Imagen model name
    #[serde(default = "default_model")]
    pub model: String,
}

fn default_model() -> String {
    DEFAULT_IMAGEN_MODEL.to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::Placeholder,
            gemini_api_key: Some(PLACEHOLDER_API_KEYS[0].to_string()),
            model: default_model(),
        }
    }
}

/// Brand identity.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct BrandConfig {
    /// Display name of the brand
    pub name: String,
    /// Palette as `#RRGGBB` strings, primary color first
    pub colors: Vec<String>,
    /// Style words appended to every prompt
    #[serde(default)]
    pub style_keywords: String,
    /// Logo stamped in the bottom-right corner
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo_path: Option<PathBuf>,
    /// Height of the primary-color stripe drawn under the logo; 0 disables it
    #[serde(default = "default_accent_height")]
    pub accent_height: u32,
}

fn default_accent_height() -> u32 {
    DEFAULT_ACCENT_HEIGHT
}

impl BrandConfig {
    /// Parsed palette; invalid entries are skipped (validation rejects them up front).
    pub fn palette(&self) -> Vec<Rgb<u8>> {
        self.colors
            .iter()
            .filter_map(|color| parse_hex_color(color))
            .collect()
    }

    /// First palette color, or white for an empty palette.
    pub fn primary_color(&self) -> Rgb<u8> {
        self.palette()
            .first()
            .copied()
            .unwrap_or(Rgb([0xFF, 0xFF, 0xFF]))
    }
}

impl Default for BrandConfig {
    fn default() -> Self {
        Self {
            name: "TechBrand Inc.".to_string(),
            colors: vec![
                "#0066CC".to_string(),
                "#00A3E0".to_string(),
                "#FFFFFF".to_string(),
            ],
            style_keywords: "modern, clean, professional, minimalist".to_string(),
            logo_path: Some(PathBuf::from("assets/logo.png")),
            accent_height: DEFAULT_ACCENT_HEIGHT,
        }
    }
}

/// Parses `#RRGGBB` (leading `#` optional).
pub fn parse_hex_color(value: &str) -> Option<Rgb<u8>> {
    let caps = HEX_COLOR.captures(value.trim())?;
    let channel = |idx: usize| {
        caps.get(idx)
            .and_then(|m| u8::from_str_radix(m.as_str(), 16).ok())
    };
    Some(Rgb([channel(1)?, channel(2)?, channel(3)?]))
}

/// One fixed-size rendering target.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct VariantSpec {
    /// Unique key, also used as the output subdirectory
    pub name: String,
    /// Output width in pixels
    pub width: u32,
    /// Output height in pixels
    pub height: u32,
    /// What the variant is for
    #[serde(default)]
    pub description: String,
}

impl VariantSpec {
    /// Builds a variant
    pub fn new(name: &str, width: u32, height: u32, description: &str) -> Self {
        Self {
            name: name.to_string(),
            width,
            height,
            description: description.to_string(),
        }
    }

    /// The five variants shipped by default.
    pub fn defaults() -> Vec<Self> {
        vec![
            Self::new("social_square", 1080, 1080, "Instagram/Facebook square post"),
            Self::new("social_story", 1080, 1920, "Instagram/Facebook story"),
            Self::new("web_banner", 1920, 1080, "Website banner/hero image"),
            Self::new("email_header", 600, 200, "Email header image"),
            Self::new("thumbnail", 400, 400, "Thumbnail/preview"),
        ]
    }
}

/// File format written for every variant.
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// JPEG, `.jpg`
    #[default]
    #[serde(alias = "jpeg")]
    Jpg,
    /// PNG, `.png`
    Png,
}

impl OutputFormat {
    /// File extension, without the dot
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Jpg => "jpg",
            OutputFormat::Png => "png",
        }
    }

    /// Matching `image` crate format
    pub fn image_format(self) -> ImageFormat {
        match self {
            OutputFormat::Jpg => ImageFormat::Jpeg,
            OutputFormat::Png => ImageFormat::Png,
        }
    }
}

/// Variant list and output format.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct VariantsConfig {
    /// Output format for every variant
    #[serde(default)]
    pub format: OutputFormat,
    /// Variants rendered for each prompt, in order
    pub sizes: Vec<VariantSpec>,
}

impl Default for VariantsConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Jpg,
            sizes: VariantSpec::defaults(),
        }
    }
}

/// Output location.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct StorageConfig {
    /// Root of the `<variant>/<file>` tree
    #[serde(default = "default_output_dir")]
    pub output_directory: PathBuf,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(DEFAULT_OUTPUT_DIR)
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            output_directory: default_output_dir(),
        }
    }
}

/// Completion notification settings.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct NotificationConfig {
    /// Whether to notify at all
    #[serde(default)]
    pub enabled: bool,
    /// Webhook to POST the batch summary to; empty means log only
    #[serde(default)]
    pub webhook_url: String,
}

impl NotificationConfig {
    /// The webhook URL, if one is set. Errors on an unparseable or non-http(s) URL.
    pub fn webhook(&self) -> Result<Option<Url>, BrandgenError> {
        let raw = self.webhook_url.trim();
        if raw.is_empty() {
            return Ok(None);
        }
        let url = Url::parse(raw).map_err(|err| {
            BrandgenError::InvalidConfig(format!("notification.webhook_url {raw:?}: {err}"))
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(BrandgenError::InvalidConfig(format!(
                "notification.webhook_url must be http or https, got {}",
                url.scheme()
            )));
        }
        Ok(Some(url))
    }
}

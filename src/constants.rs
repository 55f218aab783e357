//! Shared constants/defaults for things
//!

use std::time::Duration;

/// Config file read when `--config` isn't given
pub const DEFAULT_CONFIG_PATH: &str = "config.json";

/// Local secrets file checked for the API key
pub const DEFAULT_SECRETS_FILE: &str = ".env";

/// Where finished variants go unless the config says otherwise
pub const DEFAULT_OUTPUT_DIR: &str = "generated_images";

/// Environment variable holding the image API key
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Values the setup tooling writes as stand-ins; treated as "no key".
pub const PLACEHOLDER_API_KEYS: &[&str] = &["YOUR_GEMINI_API_KEY_HERE", "your_gemini_api_key_here"];

/// Width and height of the base image the placeholder producer draws.
pub const BASE_IMAGE_SIZE: u32 = 1024;

/// Logo width as a fraction of the variant width (1/N).
pub const LOGO_WIDTH_DIVISOR: u32 = 10;

/// Gap between the logo and the bottom-right edges, in pixels.
pub const LOGO_MARGIN: u32 = 20;

/// Default height of the brand accent stripe, in pixels.
pub const DEFAULT_ACCENT_HEIGHT: u32 = 6;

/// JPEG encoder quality for written variants.
pub const JPEG_QUALITY: u8 = 95;

/// chrono format for the timestamp embedded in output file names.
pub const FILE_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Imagen model used when the config doesn't name one.
pub const DEFAULT_IMAGEN_MODEL: &str = "imagen-3.0-generate-002";

/// Base URL of the Generative Language model endpoints.
pub const IMAGEN_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Request timeout for image generation calls.
pub const IMAGEN_TIMEOUT: Duration = Duration::from_secs(120);

/// Request timeout for the completion webhook.
pub const WEBHOOK_TIMEOUT: Duration = Duration::from_secs(30);

/// Prompts run when no batch file is given, as `(name, prompt)`.
pub const SAMPLE_PROMPTS: &[(&str, &str)] = &[
    (
        "summer_sale",
        "Summer sale promotion with beach vibes and tropical elements",
    ),
    (
        "product_launch",
        "Modern tech product launch with futuristic design",
    ),
    (
        "social_media",
        "Engaging social media post with dynamic composition",
    ),
    (
        "email_header",
        "Professional email header with clean corporate aesthetic",
    ),
    ("web_banner", "Eye-catching web banner with bold typography"),
];

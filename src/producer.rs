//! Base image production.
//!
//! [`ImageProducer`] is the narrow seam between the pipeline and whatever draws
//! the base image: prompt in, one RGB bitmap out, or an error that only fails
//! that one request. Two producers exist: [`PlaceholderProducer`], a
//! deterministic gradient derived from the prompt, and [`ImagenProducer`],
//! which calls Google's Imagen model.

use base64::Engine;
use base64::engine::general_purpose;
use image::{Rgb, RgbImage};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info};

use crate::config::{Config, ProviderKind};
use crate::constants::{BASE_IMAGE_SIZE, IMAGEN_API_BASE, IMAGEN_TIMEOUT};
use crate::error::BrandgenError;
use crate::secrets::ApiKey;

/// Turns a prompt into a base bitmap.
#[allow(async_fn_in_trait)]
pub trait ImageProducer {
    /// Produces one base image for `prompt`.
    async fn produce(&self, prompt: &str) -> Result<RgbImage, BrandgenError>;
}

/// Expands a prompt with the brand's style keywords and palette.
pub fn enhance_prompt(prompt: &str, style_keywords: &str, colors: &[String]) -> String {
    let mut enhanced = prompt.trim().to_string();
    if !style_keywords.trim().is_empty() {
        enhanced.push_str(", ");
        enhanced.push_str(style_keywords.trim());
    }
    if !colors.is_empty() {
        enhanced.push_str(", using colors: ");
        enhanced.push_str(&colors.join(", "));
    }
    enhanced.push_str(", professional marketing image, high quality, detailed");
    enhanced
}

/// FNV-1a, stable across platforms and releases.
fn fnv1a(bytes: &[u8]) -> u64 {
    const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0100_0000_01b3;
    bytes.iter().fold(OFFSET, |hash, byte| {
        (hash ^ u64::from(*byte)).wrapping_mul(PRIME)
    })
}

fn mix(a: Rgb<u8>, b: Rgb<u8>, t: f32) -> Rgb<u8> {
    let channel = |x: u8, y: u8| {
        let value = f32::from(x) + (f32::from(y) - f32::from(x)) * t;
        value.round().clamp(0.0, 255.0) as u8
    };
    Rgb([
        channel(a[0], b[0]),
        channel(a[1], b[1]),
        channel(a[2], b[2]),
    ])
}

fn hash_color(hash: u64) -> Rgb<u8> {
    Rgb([
        (hash & 0xFF) as u8,
        ((hash >> 8) & 0xFF) as u8,
        ((hash >> 16) & 0xFF) as u8,
    ])
}

/// Draws a vertical two-color gradient picked from the prompt hash and the brand palette.
#[derive(Clone, Debug)]
pub struct PlaceholderProducer {
    palette: Vec<Rgb<u8>>,
    width: u32,
    height: u32,
}

impl PlaceholderProducer {
    /// Default-sized producer tinted towards `palette`.
    pub fn new(palette: Vec<Rgb<u8>>) -> Self {
        Self::with_size(palette, BASE_IMAGE_SIZE, BASE_IMAGE_SIZE)
    }

    /// Producer drawing `width`x`height` images.
    pub fn with_size(palette: Vec<Rgb<u8>>, width: u32, height: u32) -> Self {
        Self {
            palette,
            width,
            height,
        }
    }

    fn endpoints(&self, prompt: &str) -> (Rgb<u8>, Rgb<u8>) {
        let hash = fnv1a(prompt.as_bytes());
        let top_tint = hash_color(hash);
        let bottom_tint = hash_color(hash >> 24);
        if self.palette.is_empty() {
            return (top_tint, bottom_tint);
        }
        let len = self.palette.len() as u64;
        let top = self.palette[(hash % len) as usize];
        let bottom = self.palette[((hash >> 48) % len) as usize];
        (mix(top, top_tint, 0.35), mix(bottom, bottom_tint, 0.35))
    }

    /// Renders the gradient synchronously.
    pub fn render(&self, prompt: &str) -> RgbImage {
        let (top, bottom) = self.endpoints(prompt);
        let span = self.height.saturating_sub(1).max(1) as f32;
        RgbImage::from_fn(self.width, self.height, |_, y| {
            mix(top, bottom, y as f32 / span)
        })
    }
}

impl ImageProducer for PlaceholderProducer {
    async fn produce(&self, prompt: &str) -> Result<RgbImage, BrandgenError> {
        if self.width == 0 || self.height == 0 {
            return Err(BrandgenError::Producer(format!(
                "cannot draw a {}x{} placeholder",
                self.width, self.height
            )));
        }
        Ok(self.render(prompt))
    }
}

#[derive(Deserialize, Debug)]
struct PredictResponse {
    #[serde(default)]
    predictions: Vec<Prediction>,
}

#[derive(Deserialize, Debug)]
struct Prediction {
    #[serde(rename = "bytesBase64Encoded")]
    bytes_base64_encoded: Option<String>,
    #[serde(rename = "mimeType")]
    mime_type: Option<String>,
}

/// Calls the Imagen `:predict` endpoint and decodes the first returned image.
#[derive(Clone, Debug)]
pub struct ImagenProducer {
    client: reqwest::Client,
    api_key: ApiKey,
    model: String,
    api_base: String,
}

impl ImagenProducer {
    /// Producer for `model` on the public endpoint.
    pub fn new(api_key: ApiKey, model: &str) -> Result<Self, BrandgenError> {
        Self::with_api_base(api_key, model, IMAGEN_API_BASE)
    }

    /// Producer against a different base URL, eg a local stub.
    pub fn with_api_base(
        api_key: ApiKey,
        model: &str,
        api_base: &str,
    ) -> Result<Self, BrandgenError> {
        let client = reqwest::Client::builder().timeout(IMAGEN_TIMEOUT).build()?;
        Ok(Self {
            client,
            api_key,
            model: model.to_string(),
            api_base: api_base.trim_end_matches('/').to_string(),
        })
    }
}

impl ImageProducer for ImagenProducer {
    async fn produce(&self, prompt: &str) -> Result<RgbImage, BrandgenError> {
        let url = format!("{}/{}:predict", self.api_base, self.model);
        let body = json!({
            "instances": [{"prompt": prompt}],
            "parameters": {"sampleCount": 1}
        });

        let resp = self
            .client
            .post(&url)
            .header("x-goog-api-key", self.api_key.expose())
            .json(&body)
            .send()
            .await?;
        let status = resp.status();
        let bytes = resp.bytes().await?;
        if !status.is_success() {
            return Err(BrandgenError::Producer(format!(
                "Imagen API error {status}: {}",
                String::from_utf8_lossy(&bytes)
            )));
        }

        let parsed: PredictResponse = serde_json::from_slice(&bytes)
            .map_err(|err| BrandgenError::Producer(format!("unreadable Imagen response: {err}")))?;
        let first = parsed
            .predictions
            .into_iter()
            .find_map(|prediction| {
                prediction
                    .bytes_base64_encoded
                    .map(|data| (data, prediction.mime_type))
            })
            .ok_or_else(|| {
                BrandgenError::Producer("Imagen returned no image data".to_string())
            })?;
        let (data, mime_type) = first;
        debug!(
            "Imagen returned {} ({} base64 chars)",
            mime_type.as_deref().unwrap_or("unknown type"),
            data.len()
        );

        let raw = general_purpose::STANDARD
            .decode(data)
            .map_err(|err| BrandgenError::Producer(format!("bad base64 image: {err}")))?;
        Ok(image::load_from_memory(&raw)?.to_rgb8())
    }
}

/// The producer picked by the config file.
#[derive(Clone, Debug)]
pub enum Producer {
    /// See [`PlaceholderProducer`]
    Placeholder(PlaceholderProducer),
    /// See [`ImagenProducer`]
    Imagen(ImagenProducer),
}

impl Producer {
    /// Builds the configured producer. Imagen needs an API key; the placeholder doesn't.
    pub fn from_config(config: &Config, api_key: Option<ApiKey>) -> Result<Self, BrandgenError> {
        match config.api.provider {
            ProviderKind::Placeholder => {
                info!("Using placeholder image producer");
                Ok(Producer::Placeholder(PlaceholderProducer::new(
                    config.brand.palette(),
                )))
            }
            ProviderKind::Imagen => {
                let api_key = api_key.ok_or(BrandgenError::MissingApiKey)?;
                info!("Using Imagen model {}", config.api.model);
                Ok(Producer::Imagen(ImagenProducer::new(
                    api_key,
                    &config.api.model,
                )?))
            }
        }
    }
}

impl ImageProducer for Producer {
    async fn produce(&self, prompt: &str) -> Result<RgbImage, BrandgenError> {
        match self {
            Producer::Placeholder(producer) => producer.produce(prompt).await,
            Producer::Imagen(producer) => producer.produce(prompt).await,
        }
    }
}

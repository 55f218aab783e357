//! Logo and brand accent overlay.

use std::path::Path;

use image::imageops::{self, FilterType};
use image::{DynamicImage, Rgb, RgbImage, Rgba, RgbaImage};
use tracing::{debug, warn};

use crate::config::BrandConfig;
use crate::constants::{LOGO_MARGIN, LOGO_WIDTH_DIVISOR};

/// Stamps the brand logo in the bottom-right corner of each variant.
///
/// Without a logo this is a pass-through: the variant comes back untouched.
#[derive(Clone, Debug)]
pub struct BrandCompositor {
    logo: Option<RgbaImage>,
    accent: Rgb<u8>,
    accent_height: u32,
}

impl BrandCompositor {
    /// Loads the configured logo. A missing or unreadable logo is logged and skipped.
    pub fn from_brand(brand: &BrandConfig) -> Self {
        let logo = brand.logo_path.as_deref().and_then(load_logo);
        Self::new(logo, brand.primary_color(), brand.accent_height)
    }

    /// Compositor with an already-decoded logo.
    pub fn new(logo: Option<RgbaImage>, accent: Rgb<u8>, accent_height: u32) -> Self {
        Self {
            logo,
            accent,
            accent_height,
        }
    }

    /// Whether a logo will be applied.
    pub fn has_logo(&self) -> bool {
        self.logo.is_some()
    }

    /// Applies the logo and accent stripe to `variant`.
    pub fn apply(&self, variant: RgbImage) -> RgbImage {
        let Some(logo) = &self.logo else {
            return variant;
        };
        let (width, height) = variant.dimensions();
        if width == 0 || height == 0 || logo.width() == 0 || logo.height() == 0 {
            return variant;
        }

        let logo_width = (width / LOGO_WIDTH_DIVISOR).max(1);
        let logo_height = ((u64::from(logo.height()) * u64::from(logo_width)
            + u64::from(logo.width()) / 2)
            / u64::from(logo.width()))
        .clamp(1, u64::from(height)) as u32;
        let scaled = imageops::resize(logo, logo_width, logo_height, FilterType::Lanczos3);

        let mut canvas = DynamicImage::ImageRgb8(variant).to_rgba8();

        let stripe = self.accent_height.min(height);
        let accent = Rgba([self.accent[0], self.accent[1], self.accent[2], 255]);
        for y in height - stripe..height {
            for x in 0..width {
                canvas.put_pixel(x, y, accent);
            }
        }

        let x = (i64::from(width) - i64::from(logo_width) - i64::from(LOGO_MARGIN)).max(0);
        let y = (i64::from(height) - i64::from(logo_height) - i64::from(LOGO_MARGIN)).max(0);
        imageops::overlay(&mut canvas, &scaled, x, y);

        DynamicImage::ImageRgba8(canvas).to_rgb8()
    }
}

fn load_logo(path: &Path) -> Option<RgbaImage> {
    if !path.exists() {
        warn!(
            "Logo file {} not found, continuing without logo",
            path.display()
        );
        return None;
    }
    match image::open(path) {
        Ok(logo) => {
            debug!(
                "Loaded logo {} ({}x{})",
                path.display(),
                logo.width(),
                logo.height()
            );
            Some(logo.to_rgba8())
        }
        Err(err) => {
            warn!(
                "Failed to load logo {}: {}, continuing without logo",
                path.display(),
                err
            );
            None
        }
    }
}

/// Filled circle in `color` on a transparent square, used as a stand-in logo.
pub fn placeholder_logo(size: u32, color: Rgb<u8>) -> RgbaImage {
    let center = size as f32 / 2.0;
    let radius = center * 0.8;
    RgbaImage::from_fn(size, size, |x, y| {
        let dx = x as f32 + 0.5 - center;
        let dy = y as f32 + 0.5 - center;
        if dx * dx + dy * dy <= radius * radius {
            Rgba([color[0], color[1], color[2], 255])
        } else {
            Rgba([color[0], color[1], color[2], 0])
        }
    })
}

//! Writes finished variants to `<output_dir>/<variant>/<prompt>_<variant>_<timestamp>.<ext>`.

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use chrono::{DateTime, TimeZone};
use image::RgbImage;
use image::codecs::jpeg::JpegEncoder;
use regex::Regex;
use tracing::debug;

use crate::config::{OutputFormat, VariantSpec};
use crate::constants::{FILE_TIMESTAMP_FORMAT, JPEG_QUALITY};
use crate::error::BrandgenError;

#[allow(clippy::unwrap_used)]
static UNSAFE_NAME_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9_-]+").unwrap());

/// Makes a request name safe to use in a file name.
pub fn slug(name: &str) -> String {
    let cleaned = UNSAFE_NAME_CHARS.replace_all(name.trim(), "_");
    let cleaned = cleaned.trim_matches('_');
    if cleaned.is_empty() {
        "image".to_string()
    } else {
        cleaned.to_string()
    }
}

/// The timestamp embedded in output file names.
pub fn file_timestamp<Tz: TimeZone>(at: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    at.format(FILE_TIMESTAMP_FORMAT).to_string()
}

/// Saves bitmaps under the output tree.
#[derive(Clone, Debug)]
pub struct OutputWriter {
    root: PathBuf,
    format: OutputFormat,
}

impl OutputWriter {
    /// Writer rooted at `root`, encoding as `format`.
    pub fn new(root: impl Into<PathBuf>, format: OutputFormat) -> Self {
        Self {
            root: root.into(),
            format,
        }
    }

    /// The output root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Creates the output root and one directory per variant.
    pub fn prepare(&self, variants: &[VariantSpec]) -> Result<(), BrandgenError> {
        for spec in variants {
            let dir = self.root.join(&spec.name);
            fs::create_dir_all(&dir).map_err(|err| BrandgenError::io(&dir, err))?;
        }
        Ok(())
    }

    /// Where a variant for `prompt_name` written at `timestamp` goes.
    pub fn variant_path(&self, variant: &str, prompt_name: &str, timestamp: &str) -> PathBuf {
        let prompt_name = slug(prompt_name);
        self.root.join(variant).join(format!(
            "{prompt_name}_{variant}_{timestamp}.{}",
            self.format.extension()
        ))
    }

    /// Encodes and writes one variant, creating its directory if needed.
    pub fn write(
        &self,
        image: &RgbImage,
        variant: &str,
        prompt_name: &str,
        timestamp: &str,
    ) -> Result<PathBuf, BrandgenError> {
        let path = self.variant_path(variant, prompt_name, timestamp);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|err| BrandgenError::io(parent, err))?;
        }

        if let Err(err) = self.encode(image, &path) {
            let _ = fs::remove_file(&path);
            return Err(err);
        }
        debug!("Wrote {}", path.display());
        Ok(path)
    }

    fn encode(&self, image: &RgbImage, path: &Path) -> Result<(), BrandgenError> {
        match self.format {
            OutputFormat::Jpg => {
                let file = File::create(path).map_err(|err| BrandgenError::io(path, err))?;
                let mut writer = BufWriter::new(file);
                JpegEncoder::new_with_quality(&mut writer, JPEG_QUALITY).encode_image(image)?;
                std::io::Write::flush(&mut writer).map_err(|err| BrandgenError::io(path, err))?;
            }
            OutputFormat::Png => {
                image.save_with_format(path, self.format.image_format())?;
            }
        }
        Ok(())
    }
}

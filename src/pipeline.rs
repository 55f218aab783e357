//! produce -> render -> composite -> persist, one request at a time.

use std::path::PathBuf;

use chrono::Local;
use serde::Serialize;
use tracing::{error, info, instrument, warn};

use crate::batch::{GenerationRequest, with_distinct_names};
use crate::composite::BrandCompositor;
use crate::config::{BrandConfig, Config, VariantSpec};
use crate::error::BrandgenError;
use crate::producer::{ImageProducer, enhance_prompt};
use crate::render::render_variant;
use crate::writer::{OutputWriter, file_timestamp};

/// What one request produced.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct GenerationResult {
    /// The prompt as given, before brand enhancement
    pub prompt: String,
    /// Logical request name
    pub name: String,
    /// RFC 3339 time the request finished
    pub timestamp: String,
    /// Paths of the variants written
    pub variants: Vec<PathBuf>,
}

/// Something that went wrong without stopping the batch.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct Failure {
    /// Request name
    pub request: String,
    /// Variant name, when a single file failed
    pub variant: Option<String>,
    /// Error message
    pub reason: String,
}

/// Outcome of a whole batch.
#[derive(Clone, Debug, Default, Serialize)]
pub struct BatchReport {
    /// Results of requests that produced a base image, in batch order
    pub results: Vec<GenerationResult>,
    /// Requests or variants that failed
    pub failures: Vec<Failure>,
}

impl BatchReport {
    /// Total number of files written.
    pub fn file_count(&self) -> usize {
        self.results.iter().map(|result| result.variants.len()).sum()
    }

    /// True when nothing failed.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// The configured pipeline, generic over the image producer.
pub struct Pipeline<P> {
    producer: P,
    brand: BrandConfig,
    variants: Vec<VariantSpec>,
    compositor: BrandCompositor,
    writer: OutputWriter,
}

impl<P: ImageProducer> Pipeline<P> {
    /// Builds the pipeline from config; loads the logo once.
    pub fn new(config: &Config, producer: P) -> Self {
        Self {
            producer,
            brand: config.brand.clone(),
            variants: config.image_variants.sizes.clone(),
            compositor: BrandCompositor::from_brand(&config.brand),
            writer: OutputWriter::new(
                config.storage.output_directory.clone(),
                config.image_variants.format,
            ),
        }
    }

    /// The writer, for reporting where output goes.
    pub fn writer(&self) -> &OutputWriter {
        &self.writer
    }

    fn selected_variants(&self, request: &GenerationRequest) -> Vec<&VariantSpec> {
        let Some(wanted) = &request.overrides.variants else {
            return self.variants.iter().collect();
        };
        for name in wanted {
            if !self.variants.iter().any(|spec| &spec.name == name) {
                warn!(
                    "Request {} asks for unknown variant {}, ignoring it",
                    request.name, name
                );
            }
        }
        self.variants
            .iter()
            .filter(|spec| wanted.contains(&spec.name))
            .collect()
    }

    /// Runs one request. Production failure is an error; single-file failures are
    /// returned alongside the result.
    #[instrument(skip_all, fields(request = %request.name))]
    pub async fn process(
        &self,
        request: &GenerationRequest,
    ) -> Result<(GenerationResult, Vec<Failure>), BrandgenError> {
        let style = request
            .overrides
            .style_keywords
            .as_deref()
            .unwrap_or(&self.brand.style_keywords);
        let enhanced = enhance_prompt(&request.prompt, style, &self.brand.colors);
        info!("Generating image with prompt: {}", enhanced);

        let base = self.producer.produce(&enhanced).await?;
        let started = Local::now();
        let timestamp = file_timestamp(&started);

        let mut paths = Vec::new();
        let mut failures = Vec::new();
        for spec in self.selected_variants(request) {
            let rendered = render_variant(&base, spec);
            let branded = self.compositor.apply(rendered);
            match self
                .writer
                .write(&branded, &spec.name, &request.name, &timestamp)
            {
                Ok(path) => {
                    info!("Saved {} variant: {}", spec.name, path.display());
                    paths.push(path);
                }
                Err(err) => {
                    error!("Failed to save {} variant: {}", spec.name, err);
                    failures.push(Failure {
                        request: request.name.clone(),
                        variant: Some(spec.name.clone()),
                        reason: err.to_string(),
                    });
                }
            }
        }

        let result = GenerationResult {
            prompt: request.prompt.clone(),
            name: request.name.clone(),
            timestamp: Local::now().to_rfc3339(),
            variants: paths,
        };
        Ok((result, failures))
    }

    /// Runs every request in order. Nothing here aborts the batch.
    ///
    /// Requests whose names would share output files are renamed first.
    pub async fn run_batch(&self, requests: &[GenerationRequest]) -> BatchReport {
        let requests = with_distinct_names(requests);
        let mut report = BatchReport::default();
        for (idx, request) in requests.iter().enumerate() {
            info!(
                "Processing prompt {}/{} ({}): {}",
                idx + 1,
                requests.len(),
                request.name,
                request.prompt
            );
            match self.process(request).await {
                Ok((result, failures)) => {
                    report.results.push(result);
                    report.failures.extend(failures);
                }
                Err(err) => {
                    error!("Failed to generate image for {}: {}", request.name, err);
                    report.failures.push(Failure {
                        request: request.name.clone(),
                        variant: None,
                        reason: err.to_string(),
                    });
                }
            }
        }
        report
    }
}

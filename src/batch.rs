//! Generation requests and batch input files.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::constants::SAMPLE_PROMPTS;
use crate::error::BrandgenError;
use crate::writer::slug;

/// Per-request tweaks on top of the config.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct RequestOverrides {
    /// Replaces `brand.style_keywords` for this request
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style_keywords: Option<String>,
    /// Only render these variants, by name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variants: Option<Vec<String>>,
}

/// One prompt to run through the pipeline.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct GenerationRequest {
    /// Logical name, used in output file names
    pub name: String,
    /// The prompt text
    pub prompt: String,
    /// Optional per-request overrides
    #[serde(default)]
    pub overrides: RequestOverrides,
}

impl GenerationRequest {
    /// A request without overrides
    pub fn new(name: &str, prompt: &str) -> Self {
        Self {
            name: name.to_string(),
            prompt: prompt.to_string(),
            overrides: RequestOverrides::default(),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum BatchEntry {
    Bare(String),
    Full {
        #[serde(default)]
        name: Option<String>,
        prompt: String,
        #[serde(default)]
        overrides: RequestOverrides,
    },
}

/// The five built-in sample prompts.
pub fn sample_requests() -> Vec<GenerationRequest> {
    SAMPLE_PROMPTS
        .iter()
        .map(|(name, prompt)| GenerationRequest::new(name, prompt))
        .collect()
}

/// Reads a batch file.
pub fn load_batch(path: &Path) -> Result<Vec<GenerationRequest>, BrandgenError> {
    let raw = std::fs::read_to_string(path).map_err(|err| BrandgenError::io(path, err))?;
    parse_batch(&raw, path)
}

/// Parses a JSON array of `{name, prompt, overrides?}` objects or bare prompt strings.
///
/// Unnamed entries become `prompt_<n>` (1-based); names that would share a file name
/// get a `_<n>` suffix, see [`with_distinct_names`].
pub fn parse_batch(raw: &str, origin: &Path) -> Result<Vec<GenerationRequest>, BrandgenError> {
    let entries: Vec<BatchEntry> =
        serde_json::from_str(raw).map_err(|source| BrandgenError::BatchParse {
            path: origin.to_path_buf(),
            source,
        })?;

    let mut requests = Vec::with_capacity(entries.len());
    for (idx, entry) in entries.into_iter().enumerate() {
        let fallback = format!("prompt_{}", idx + 1);
        let (name, prompt, overrides) = match entry {
            BatchEntry::Bare(prompt) => (fallback, prompt, RequestOverrides::default()),
            BatchEntry::Full {
                name,
                prompt,
                overrides,
            } => {
                let name = name
                    .map(|name| name.trim().to_string())
                    .filter(|name| !name.is_empty())
                    .unwrap_or(fallback);
                (name, prompt, overrides)
            }
        };
        requests.push(GenerationRequest {
            name,
            prompt,
            overrides,
        });
    }
    Ok(with_distinct_names(&requests))
}

/// Renames requests whose names would land on the same file name, appending `_<n>`.
///
/// Names are compared after [`slug`], so `"summer sale"` and `"summer_sale"` count as
/// the same name.
pub fn with_distinct_names(requests: &[GenerationRequest]) -> Vec<GenerationRequest> {
    let mut seen = HashSet::new();
    requests
        .iter()
        .map(|request| {
            let mut unique = request.name.clone();
            let mut suffix = 2;
            while !seen.insert(slug(&unique)) {
                unique = format!("{}_{suffix}", request.name);
                suffix += 1;
            }
            if unique != request.name {
                warn!(
                    "Request name {} clashes with an earlier one, renamed to {unique}",
                    request.name
                );
            }
            GenerationRequest {
                name: unique,
                ..request.clone()
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn origin() -> PathBuf {
        PathBuf::from("batch.json")
    }

    #[test]
    fn samples_are_the_five_defaults() {
        let samples = sample_requests();
        let names: Vec<&str> = samples.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(
            names,
            [
                "summer_sale",
                "product_launch",
                "social_media",
                "email_header",
                "web_banner"
            ]
        );
    }

    #[test]
    fn parses_objects_and_bare_strings() {
        let raw = r#"[
            {"name": "launch", "prompt": "New phone"},
            "Just a prompt",
            {"prompt": "Nameless", "overrides": {"variants": ["thumbnail"], "style_keywords": "retro"}}
        ]"#;
        let requests = parse_batch(raw, &origin()).expect("parse batch");
        assert_eq!(requests.len(), 3);
        assert_eq!(requests[0], GenerationRequest::new("launch", "New phone"));
        assert_eq!(requests[1].name, "prompt_2");
        assert_eq!(requests[1].prompt, "Just a prompt");
        assert_eq!(requests[2].name, "prompt_3");
        assert_eq!(
            requests[2].overrides.variants,
            Some(vec!["thumbnail".to_string()])
        );
        assert_eq!(
            requests[2].overrides.style_keywords.as_deref(),
            Some("retro")
        );
    }

    #[test]
    fn repeated_names_are_made_unique() {
        let raw = r#"[
            {"name": "sale", "prompt": "a"},
            {"name": "sale", "prompt": "b"},
            {"name": "sale", "prompt": "c"}
        ]"#;
        let names: Vec<String> = parse_batch(raw, &origin())
            .expect("parse batch")
            .into_iter()
            .map(|r| r.name)
            .collect();
        assert_eq!(names, ["sale", "sale_2", "sale_3"]);
    }

    #[test]
    fn names_with_the_same_slug_are_made_unique() {
        let raw = r#"[
            {"name": "summer sale", "prompt": "a"},
            {"name": "summer_sale", "prompt": "b"},
            {"name": "summer/sale", "prompt": "c"}
        ]"#;
        let requests = parse_batch(raw, &origin()).expect("parse batch");
        let slugs: HashSet<String> = requests.iter().map(|r| slug(&r.name)).collect();
        assert_eq!(slugs.len(), 3);
        assert_eq!(requests[0].name, "summer sale");
        assert_eq!(requests[1].name, "summer_sale_2");
        assert_eq!(requests[2].name, "summer/sale_3");
    }

    #[test]
    fn distinct_names_leave_unique_requests_alone() {
        let requests = sample_requests();
        assert_eq!(with_distinct_names(&requests), requests);
    }

    #[test]
    fn rejects_non_arrays() {
        let err = parse_batch(r#"{"prompt": "x"}"#, &origin()).expect_err("object");
        assert!(matches!(err, BrandgenError::BatchParse { .. }));
    }

    #[test]
    fn loads_from_disk() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("batch.json");
        std::fs::write(&path, r#"["one", "two"]"#).expect("write batch");
        let requests = load_batch(&path).expect("load batch");
        assert_eq!(requests.len(), 2);
        assert!(load_batch(&dir.path().join("missing.json")).is_err());
    }
}

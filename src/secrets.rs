//! API key lookup: environment first, then a local `.env`-style file, then the config file.

use std::io::ErrorKind;
use std::path::Path;

use tracing::{debug, warn};

use crate::constants::{API_KEY_ENV, PLACEHOLDER_API_KEYS};

/// A secret API key. `Debug` never prints the value.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Wraps a key, ignoring blanks and the stand-in values the setup tool writes.
    pub fn new(value: &str) -> Option<Self> {
        let value = value.trim();
        if value.is_empty() || PLACEHOLDER_API_KEYS.contains(&value) {
            return None;
        }
        Some(Self(value.to_string()))
    }

    /// The raw key, for putting in a request header.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ApiKey(<redacted>)")
    }
}

/// Resolves the API key. `from_env` is the value clap picked up from the
/// command line or `GEMINI_API_KEY`.
pub fn resolve_api_key(
    from_env: Option<&str>,
    secrets_file: &Path,
    from_config: Option<&str>,
) -> Option<ApiKey> {
    if let Some(key) = from_env.and_then(ApiKey::new) {
        debug!("Using API key from the environment");
        return Some(key);
    }
    if let Some(key) = read_secrets_file(secrets_file).and_then(|value| ApiKey::new(&value)) {
        debug!("Using API key from {}", secrets_file.display());
        return Some(key);
    }
    let key = from_config.and_then(ApiKey::new);
    if key.is_some() {
        debug!("Using API key from the config file");
    }
    key
}

fn read_secrets_file(path: &Path) -> Option<String> {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(err) if err.kind() == ErrorKind::NotFound => return None,
        Err(err) => {
            warn!("Failed to read secrets file {}: {}", path.display(), err);
            return None;
        }
    };
    lookup_secret(&contents, API_KEY_ENV)
}

/// Finds `key` in `KEY=value` lines; `#` comments, `export ` prefixes and quotes are handled.
pub fn lookup_secret(contents: &str, key: &str) -> Option<String> {
    contents.lines().find_map(|line| {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return None;
        }
        let line = line.strip_prefix("export ").unwrap_or(line);
        let (name, value) = line.split_once('=')?;
        if name.trim() != key {
            return None;
        }
        let value = value.trim();
        let value = value
            .strip_prefix('"')
            .and_then(|v| v.strip_suffix('"'))
            .or_else(|| value.strip_prefix('\'').and_then(|v| v.strip_suffix('\'')))
            .unwrap_or(value);
        Some(value.to_string())
    })
}

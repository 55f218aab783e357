//! Batch completion notification.

use std::fmt::Write as _;
use std::path::Path;

use serde::Serialize;
use tracing::{error, info, warn};
use url::Url;

use crate::config::NotificationConfig;
use crate::constants::WEBHOOK_TIMEOUT;
use crate::error::BrandgenError;
use crate::pipeline::GenerationResult;

/// What happened when we tried to notify. Never an error: failures are logged and reported here.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NotificationOutcome {
    /// Notifications are switched off
    Disabled,
    /// Enabled, but no webhook is configured; the summary was only logged
    LoggedOnly,
    /// Webhook answered with a 2xx status
    Delivered(u16),
    /// Webhook answered with a non-2xx status
    Rejected(u16),
    /// The request never got a response
    Failed(String),
}

#[derive(Serialize)]
struct WebhookPayload<'a> {
    message: &'a str,
    results: &'a [GenerationResult],
}

/// Posts the batch summary to the configured webhook.
#[derive(Clone, Debug)]
pub struct Notifier {
    enabled: bool,
    webhook: Option<Url>,
    client: reqwest::Client,
}

impl Notifier {
    /// Builds a notifier from config.
    pub fn new(config: &NotificationConfig) -> Result<Self, BrandgenError> {
        let client = reqwest::Client::builder().timeout(WEBHOOK_TIMEOUT).build()?;
        Ok(Self {
            enabled: config.enabled,
            webhook: config.webhook()?,
            client,
        })
    }

    /// Sends (or logs) the summary for `results`.
    pub async fn notify(&self, results: &[GenerationResult]) -> NotificationOutcome {
        if !self.enabled {
            info!("Notifications disabled");
            return NotificationOutcome::Disabled;
        }

        let message = summary_message(results);
        info!("{}", message);

        let Some(webhook) = &self.webhook else {
            return NotificationOutcome::LoggedOnly;
        };

        let payload = WebhookPayload {
            message: &message,
            results,
        };
        match self.client.post(webhook.clone()).json(&payload).send().await {
            Ok(resp) if resp.status().is_success() => {
                info!("Webhook notification sent: {}", resp.status());
                NotificationOutcome::Delivered(resp.status().as_u16())
            }
            Ok(resp) => {
                warn!("Webhook {} rejected notification: {}", webhook, resp.status());
                NotificationOutcome::Rejected(resp.status().as_u16())
            }
            Err(err) => {
                error!("Error sending webhook to {}: {}", webhook, err);
                NotificationOutcome::Failed(err.to_string())
            }
        }
    }
}

fn file_url(path: &Path) -> String {
    std::path::absolute(path)
        .ok()
        .and_then(|absolute| Url::from_file_path(absolute).ok())
        .map(|url| url.to_string())
        .unwrap_or_else(|| path.display().to_string())
}

/// Human-readable summary of a batch.
pub fn summary_message(results: &[GenerationResult]) -> String {
    let mut message = String::from("Image Generation Complete!\n\n");
    for result in results {
        let _ = writeln!(message, "Prompt: {}", result.prompt);
        let _ = writeln!(message, "Generated at: {}", result.timestamp);
        message.push_str("Variants:\n");
        for path in &result.variants {
            let variant = path
                .parent()
                .and_then(Path::file_name)
                .map(|name| name.to_string_lossy().to_string())
                .unwrap_or_default();
            let _ = writeln!(message, "  - {}: {}", variant, file_url(path));
        }
        message.push('\n');
    }
    message
}

use tracing::debug;

use super::record::SubmissionRecord;

/// Fire-and-forget webhook sender
///
/// `send` spawns the POST and returns immediately; delivery outcome is
/// operational telemetry only and is never surfaced to the user. There is
/// no retry or queue: an unconfirmed delivery is not an error.
#[derive(Clone)]
pub struct WebhookClient {
    http: reqwest::Client,
    url: Option<String>,
}

impl WebhookClient {
    pub fn new(url: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            url: url.filter(|u| !u.is_empty()),
        }
    }

    /// Ship a submission record. Returns before any network activity.
    pub fn send(&self, record: SubmissionRecord) {
        let Some(url) = self.url.clone() else {
            debug!("no webhook url configured; submission record dropped");
            return;
        };

        let http = self.http.clone();

        tokio::spawn(async move {
            match http.post(&url).json(&record).send().await {
                Ok(response) => {
                    debug!(status = %response.status(), "submission record delivered");
                }
                Err(e) => {
                    debug!("submission delivery failed (fire-and-forget): {}", e);
                }
            }
        });
    }
}

//! Fire-and-forget webhook delivery (§4.7, §6 "Webhook envelope").
//!
//! POSTs the `WatchEvent` as JSON with a 10s timeout. Any 2xx is success;
//! anything else is logged and dropped — retries are explicitly out of
//! scope (§9 "Webhook retry": the next detected change produces a new
//! event regardless).

use riptide_types::model::WatchEvent;
use std::time::Duration;
use tracing::{debug, warn};

const WEBHOOK_TIMEOUT: Duration = Duration::from_secs(10);
const USER_AGENT: &str = concat!("riptide-workers/", env!("CARGO_PKG_VERSION"));

pub async fn deliver(client: &reqwest::Client, webhook_url: &str, event: &WatchEvent) {
    let result = client
        .post(webhook_url)
        .timeout(WEBHOOK_TIMEOUT)
        .header("User-Agent", USER_AGENT)
        .json(event)
        .send()
        .await;

    match result {
        Ok(response) if response.status().is_success() => {
            debug!(webhook_url, watch_id = %event.watch_id, "webhook delivered");
        }
        Ok(response) => {
            warn!(
                webhook_url,
                watch_id = %event.watch_id,
                status = response.status().as_u16(),
                "webhook delivery returned non-2xx, not retried"
            );
        }
        Err(err) => {
            warn!(
                webhook_url,
                watch_id = %event.watch_id,
                error = %err,
                "webhook delivery failed, not retried"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn sample_event() -> WatchEvent {
        WatchEvent {
            watch_id: uuid::Uuid::new_v4(),
            url: "https://example.com".to_string(),
            timestamp: chrono::Utc::now(),
            change_percent: 12.5,
            summary: "content changed".to_string(),
            previous_hash: Some("abc".to_string()),
            current_hash: "def".to_string(),
        }
    }

    #[tokio::test]
    async fn delivers_on_2xx() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/hook"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let client = reqwest::Client::new();
        deliver(&client, &format!("{}/hook", server.uri()), &sample_event()).await;
    }

    #[tokio::test]
    async fn does_not_panic_on_non_2xx() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/hook"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&server)
            .await;

        let client = reqwest::Client::new();
        deliver(&client, &format!("{}/hook", server.uri()), &sample_event()).await;
    }
}

// src/fetch/sheet.rs
use anyhow::{Context, Result};
use reqwest::{header::CACHE_CONTROL, Client};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, error, instrument, warn};
use url::Url;

use crate::config::FetchSettings;

pub fn build_client(settings: &FetchSettings) -> Result<Client> {
    Client::builder()
        .timeout(Duration::from_secs(settings.timeout_secs))
        .gzip(true)
        .user_agent(concat!("sheetcatalog/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("building HTTP client")
}

async fn get_text_core(client: &Client, url: &Url, cache_control: &str) -> Result<String> {
    debug!("Fetching CSV from {}", url);
    client
        .get(url.clone())
        .header(CACHE_CONTROL, cache_control)
        .send()
        .await
        .with_context(|| format!("GET {} failed", url))?
        .error_for_status()
        .with_context(|| format!("Non-success status {}", url))?
        .text()
        .await
        .with_context(|| format!("Reading text from {}", url))
}

/// Delay before retry number `attempt` (1-based): `initial_backoff_ms`
/// doubled per earlier retry, saturating instead of overflowing.
fn backoff_delay(settings: &FetchSettings, attempt: u32) -> Duration {
    let factor = 2u64.saturating_pow(attempt.saturating_sub(1));
    Duration::from_millis(settings.initial_backoff_ms.saturating_mul(factor))
}

/// Download the whole CSV payload.
///
/// Any failure (connect, timeout, non-2xx status, body read) is retried up to
/// `max_retries` times, so at most `max_retries + 1` requests go out. Retry
/// `n` waits `backoff_delay(n)` first. With `max_retries: 0` the first
/// error is returned as is; otherwise the last attempt's error is.
#[instrument(level = "info", skip(client, settings), fields(url = %url))]
pub async fn fetch_csv_text(client: &Client, url: &Url, settings: &FetchSettings) -> Result<String> {
    let mut attempts = 0;
    loop {
        match get_text_core(client, url, &settings.cache_control).await {
            Ok(text) => {
                debug!(bytes = text.len(), "fetched");
                return Ok(text);
            }
            Err(e) if attempts < settings.max_retries => {
                attempts += 1;
                let delay = backoff_delay(settings, attempts);
                warn!(
                    %url,
                    attempt = attempts,
                    delay_ms = delay.as_millis() as u64,
                    error = %e,
                    "Retrying"
                );
                sleep(delay).await;
            }
            Err(e) => {
                error!(%url, error = %e, "Exhausted retries");
                return Err(e);
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serves one canned `(status, body)` per connection, then stops.
    /// Returns the URL and the raw request heads received.
    pub(crate) async fn serve(
        responses: Vec<(u16, &'static str)>,
    ) -> Result<(Url, Arc<Mutex<Vec<String>>>)> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let requests = Arc::new(Mutex::new(Vec::new()));
        let seen = Arc::clone(&requests);

        tokio::spawn(async move {
            for (status, body) in responses {
                let Ok((mut sock, _)) = listener.accept().await else {
                    return;
                };
                let mut head = Vec::new();
                let mut buf = [0u8; 1024];
                loop {
                    let n = sock.read(&mut buf).await.unwrap_or(0);
                    if n == 0 {
                        break;
                    }
                    head.extend_from_slice(&buf[..n]);
                    if head.windows(4).any(|w| w == b"\r\n\r\n") {
                        break;
                    }
                }
                seen.lock()
                    .unwrap()
                    .push(String::from_utf8_lossy(&head).into_owned());

                let resp = format!(
                    "HTTP/1.1 {} X\r\nContent-Type: text/csv; charset=utf-8\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status,
                    body.len(),
                    body
                );
                let _ = sock.write_all(resp.as_bytes()).await;
                let _ = sock.shutdown().await;
            }
        });

        Ok((Url::parse(&format!("http://{}/sheet.csv", addr))?, requests))
    }

    fn quick(max_retries: u32) -> FetchSettings {
        FetchSettings {
            max_retries,
            initial_backoff_ms: 1,
            timeout_secs: 5,
            ..FetchSettings::default()
        }
    }

    #[test]
    fn backoff_doubles_and_saturates() {
        let settings = FetchSettings {
            initial_backoff_ms: 500,
            ..FetchSettings::default()
        };
        let delays: Vec<u128> = (1..=4)
            .map(|n| backoff_delay(&settings, n).as_millis())
            .collect();
        assert_eq!(delays, vec![500, 1000, 2000, 4000]);
        assert_eq!(backoff_delay(&settings, 0), Duration::from_millis(500));
        assert_eq!(backoff_delay(&settings, 80), Duration::from_millis(u64::MAX));
        assert_eq!(backoff_delay(&quick(1), 3), Duration::from_millis(4));
    }

    #[tokio::test]
    async fn fetches_body_with_cache_header() -> Result<()> {
        let (url, requests) = serve(vec![(200, "a,b\nc,d\n")]).await?;
        let settings = quick(0);
        let client = build_client(&settings)?;

        let text = fetch_csv_text(&client, &url, &settings).await?;
        assert_eq!(text, "a,b\nc,d\n");

        let head = requests.lock().unwrap()[0].to_ascii_lowercase();
        assert!(head.starts_with("get /sheet.csv"));
        assert!(head.contains("cache-control: public, max-age=3600"));
        Ok(())
    }

    #[tokio::test]
    async fn retries_after_server_error() -> Result<()> {
        let (url, requests) = serve(vec![(500, ""), (200, "ok")]).await?;
        let settings = quick(2);
        let client = build_client(&settings)?;

        assert_eq!(fetch_csv_text(&client, &url, &settings).await?, "ok");
        assert_eq!(requests.lock().unwrap().len(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn gives_up_after_max_retries() -> Result<()> {
        let (url, requests) = serve(vec![(404, ""), (404, "")]).await?;
        let settings = quick(1);
        let client = build_client(&settings)?;

        let err = fetch_csv_text(&client, &url, &settings).await.unwrap_err();
        assert!(format!("{:#}", err).contains("Non-success status"));
        assert_eq!(requests.lock().unwrap().len(), 2);
        Ok(())
    }
}

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use std::time::Duration;
use tracing::{info, instrument, warn};

use super::{fallback_label, local_label, GeoLocator, UNKNOWN_REGION_LABEL};

const MAX_ATTEMPTS: usize = 2;
const RETRY_DELAY: Duration = Duration::from_secs(1);

/// Fields of the ipinfo.io JSON response used to build the label
#[derive(Debug, Default, Deserialize)]
struct IpInfoResponse {
    #[serde(default)]
    city: String,
    #[serde(default)]
    region: String,
    #[serde(default)]
    country: String,
}

impl IpInfoResponse {
    /// "country, region, city" with empty parts dropped and the region
    /// omitted when it repeats the city
    fn label(&self) -> String {
        let city = self.city.trim();
        let region = self.region.trim();
        let country = self.country.trim();

        let mut parts = Vec::with_capacity(3);
        if !country.is_empty() {
            parts.push(country);
        }
        if !region.is_empty() && region != city {
            parts.push(region);
        }
        if !city.is_empty() {
            parts.push(city);
        }

        if parts.is_empty() {
            UNKNOWN_REGION_LABEL.to_string()
        } else {
            parts.join(", ")
        }
    }
}

enum Attempt {
    Resolved(String),
    GiveUp,
    Retry,
}

/// Geolocation via the ipinfo.io `/{ip}/json` endpoint
pub struct IpInfoLocator {
    client: reqwest::Client,
    base_url: String,
    retry_delay: Duration,
}

impl IpInfoLocator {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            retry_delay: RETRY_DELAY,
        })
    }

    pub fn with_retry_delay(mut self, retry_delay: Duration) -> Self {
        self.retry_delay = retry_delay;
        self
    }

    async fn attempt(&self, ip: &str) -> Attempt {
        let url = format!("{}/{}/json", self.base_url, ip);

        let response = match self
            .client
            .get(&url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                warn!(ip = %ip, error = %e, "IP lookup request failed");
                return Attempt::Retry;
            }
        };

        match response.status() {
            StatusCode::OK => match response.json::<IpInfoResponse>().await {
                Ok(body) => {
                    let label = body.label();
                    info!(ip = %ip, region = %label, "IP location resolved");
                    Attempt::Resolved(label)
                }
                Err(e) => {
                    warn!(ip = %ip, error = %e, "Failed to parse IP location response");
                    Attempt::GiveUp
                }
            },
            StatusCode::TOO_MANY_REQUESTS => {
                warn!(ip = %ip, "IP lookup rate limited");
                Attempt::GiveUp
            }
            status => {
                warn!(ip = %ip, status = %status, "IP lookup returned unexpected status");
                Attempt::Retry
            }
        }
    }
}

#[async_trait]
impl GeoLocator for IpInfoLocator {
    #[instrument(skip(self))]
    async fn locate(&self, ip: &str) -> String {
        if let Some(label) = local_label(ip) {
            info!(ip = %ip, "IP recognised as local network");
            return label.to_string();
        }

        for attempt in 1..=MAX_ATTEMPTS {
            match self.attempt(ip).await {
                Attempt::Resolved(label) => return label,
                Attempt::GiveUp => break,
                Attempt::Retry if attempt < MAX_ATTEMPTS => {
                    tokio::time::sleep(self.retry_delay).await;
                }
                Attempt::Retry => {}
            }
        }

        fallback_label(ip)
    }
}

//! Exchange rate oracle
//!
//! Scrapes the local-to-foreign rate from a public page. The lookup is
//! total: every failure degrades to the configured fallback rate.

use crate::config::RateConfig;
use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use thiserror::Error;

/// Source of the current local-to-foreign exchange rate
#[async_trait]
pub trait RateOracle: Send + Sync {
    /// Current rate; never fails
    async fn current_rate(&self) -> f64;
}

/// Why a live lookup produced no usable rate
#[derive(Debug, Error)]
pub enum OracleUnavailable {
    #[error("rate page request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("rate page returned HTTP {0}")]
    Status(reqwest::StatusCode),
    #[error("rate element #{0} not found on page")]
    MissingElement(String),
    #[error("rate value {0:?} is not a positive number")]
    Unparsable(String),
}

/// Oracle backed by a third-party HTML page
pub struct ScrapingOracle {
    client: Client,
    url: String,
    element: Regex,
    element_id: String,
    fallback: f64,
}

impl ScrapingOracle {
    pub fn new(config: &RateConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            client,
            url: config.url.clone(),
            element: span_pattern(&config.element_id),
            element_id: config.element_id.clone(),
            fallback: config.fallback,
        })
    }

    async fn fetch_rate(&self) -> Result<f64, OracleUnavailable> {
        let response = self.client.get(&self.url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(OracleUnavailable::Status(status));
        }
        let body = response.text().await?;
        extract_rate(&self.element, &self.element_id, &body)
    }
}

#[async_trait]
impl RateOracle for ScrapingOracle {
    async fn current_rate(&self) -> f64 {
        let start = std::time::Instant::now();
        match self.fetch_rate().await {
            Ok(rate) => {
                tracing::info!(
                    rate,
                    duration_ms = %start.elapsed().as_millis(),
                    "Exchange rate fetched"
                );
                rate
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    fallback = self.fallback,
                    duration_ms = %start.elapsed().as_millis(),
                    "Exchange rate unavailable, using fallback"
                );
                self.fallback
            }
        }
    }
}

fn span_pattern(element_id: &str) -> Regex {
    let id = regex::escape(element_id);
    Regex::new(&format!(
        r#"(?is)<span\b[^>]*\bid\s*=\s*["']{id}["'][^>]*>(.*?)</span>"#
    ))
    .expect("escaped element id always forms a valid pattern")
}

fn extract_rate(pattern: &Regex, element_id: &str, body: &str) -> Result<f64, OracleUnavailable> {
    let raw = pattern
        .captures(body)
        .and_then(|c| c.get(1))
        .ok_or_else(|| OracleUnavailable::MissingElement(element_id.to_string()))?
        .as_str()
        .trim();

    match raw.parse::<f64>() {
        Ok(rate) if rate.is_finite() && rate > 0.0 => Ok(rate),
        _ => Err(OracleUnavailable::Unparsable(raw.to_string())),
    }
}

/// Oracle with a settable rate
#[cfg(test)]
pub struct FixedRate {
    rate: std::sync::Mutex<f64>,
}

#[cfg(test)]
impl FixedRate {
    pub fn new(rate: f64) -> Self {
        Self {
            rate: std::sync::Mutex::new(rate),
        }
    }

    pub fn set(&self, rate: f64) {
        *self.rate.lock().unwrap() = rate;
    }
}

#[cfg(test)]
#[async_trait]
impl RateOracle for FixedRate {
    async fn current_rate(&self) -> f64 {
        *self.rate.lock().unwrap()
    }
}

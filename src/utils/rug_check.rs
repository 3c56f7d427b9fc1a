use {
    crate::models::token::{RiskReport, TokenDiscovery},
    anyhow::Result,
    async_trait::async_trait,
    log::{debug, warn},
    reqwest::{header, Client, StatusCode},
    serde_json::Value,
    std::time::Duration,
};

pub const DEFAULT_BASE_URL: &str = "https://api.rugcheck.xyz/v1";

/// Where the monitor gets new tokens and their risk summaries from.
///
/// Implementations never fail: transport problems surface as an empty list
/// or a missing report so the polling loop can simply try again next cycle.
#[async_trait]
pub trait TokenSource: Send + Sync {
    async fn fetch_new_tokens(&self) -> Vec<TokenDiscovery>;

    async fn fetch_token_summary(&self, mint: &str) -> Option<RiskReport>;
}

pub struct RugCheckClient {
    client: Client,
    base_url: String,
}

impl RugCheckClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<RugCheckClient> {
        let mut headers = header::HeaderMap::new();
        headers.insert(header::ACCEPT, header::HeaderValue::from_static("application/json"));
        let client = Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()?;
        Ok(RugCheckClient {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn new_tokens_url(&self) -> String {
        format!("{}/stats/new_tokens", self.base_url)
    }

    pub fn summary_url(&self, mint: &str) -> String {
        format!("{}/tokens/{}/report/summary", self.base_url, mint)
    }

    async fn get_json(&self, url: &str) -> Result<(StatusCode, Value)> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Ok((status, Value::Null));
        }
        Ok((status, response.json::<Value>().await?))
    }
}

#[async_trait]
impl TokenSource for RugCheckClient {
    async fn fetch_new_tokens(&self) -> Vec<TokenDiscovery> {
        let url = self.new_tokens_url();
        match self.get_json(&url).await {
            Ok((status, body)) if status.is_success() => parse_new_tokens(body),
            Ok((status, _)) => {
                warn!("Error fetching new tokens: HTTP {}", status);
                Vec::new()
            }
            Err(e) => {
                warn!("Error fetching new tokens: {:?}", e);
                Vec::new()
            }
        }
    }

    async fn fetch_token_summary(&self, mint: &str) -> Option<RiskReport> {
        let url = self.summary_url(mint);
        match self.get_json(&url).await {
            Ok((status, body)) if status == StatusCode::OK => parse_summary(body, mint),
            Ok((status, _)) => {
                debug!("Summary unavailable for {}: HTTP {}", mint, status);
                None
            }
            Err(e) => {
                debug!("Summary request failed for {}: {:?}", mint, e);
                None
            }
        }
    }
}

/// Decodes the discovery payload, dropping elements that don't look like tokens.
pub fn parse_new_tokens(body: Value) -> Vec<TokenDiscovery> {
    let Value::Array(items) = body else {
        warn!("Unexpected new tokens payload, expected a JSON array");
        return Vec::new();
    };
    items
        .into_iter()
        .filter_map(|item| match serde_json::from_value::<TokenDiscovery>(item) {
            Ok(token) => Some(token),
            Err(e) => {
                debug!("Skipping malformed token entry: {}", e);
                None
            }
        })
        .collect()
}

/// Decodes a summary body. Only a JSON object with at least one key counts
/// as a report; `{}` and non-object bodies mean the summary is unavailable.
pub fn parse_summary(body: Value, mint: &str) -> Option<RiskReport> {
    match body {
        Value::Object(ref fields) if fields.is_empty() => {
            debug!("Empty summary for {}", mint);
            None
        }
        Value::Object(_) => match serde_json::from_value::<RiskReport>(body) {
            Ok(report) => Some(report),
            Err(e) => {
                debug!("Malformed summary for {}: {}", mint, e);
                None
            }
        },
        _ => {
            debug!("Summary for {} is not a JSON object", mint);
            None
        }
    }
}

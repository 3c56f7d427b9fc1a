use {
    serde::{de::DeserializeOwned, Deserialize, Deserializer, Serialize},
    serde_json::Value,
    std::fmt,
};

/// A freshly minted token as listed by the discovery endpoint.
///
/// Only `mint` is required for processing; entries with an empty mint are
/// skipped by the monitor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenDiscovery {
    #[serde(default)]
    pub mint: String,
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub creator: Option<String>,
}

impl TokenDiscovery {
    pub fn new(mint: impl Into<String>) -> Self {
        TokenDiscovery {
            mint: mint.into(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenMeta {
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub symbol: Option<String>,
}

/// One risk finding from the summary report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RugRisk {
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub description: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub level: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<Value>,
}

/// Per-mint summary returned by `/tokens/{mint}/report/summary`.
///
/// Decoding never fails on a JSON object: fields with an unexpected type fall
/// back to their empty value so one odd field can't hide a whole report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RiskReport {
    #[serde(rename = "tokenProgram", default)]
    pub token_program: Option<Value>,
    #[serde(rename = "tokenType", default)]
    pub token_type: Option<Value>,
    #[serde(default)]
    pub score: Option<Value>,
    #[serde(default, deserialize_with = "lenient_score")]
    pub score_normalised: Option<i64>,
    #[serde(rename = "tokenMeta", default, deserialize_with = "lenient")]
    pub token_meta: TokenMeta,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub creator: Option<String>,
    #[serde(default, deserialize_with = "lenient_risks")]
    pub risks: Vec<RugRisk>,
}

fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    Ok(serde_json::from_value(Value::deserialize(deserializer)?).unwrap_or_default())
}

fn lenient_opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(Some(s)),
        _ => Ok(None),
    }
}

fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Null => Ok(String::new()),
        other => Ok(other.to_string()),
    }
}

/// Integers only; a whole-valued float like `90.0` is accepted as well.
fn lenient_score<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    if let Some(score) = value.as_i64() {
        return Ok(Some(score));
    }
    Ok(value
        .as_f64()
        .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
        .map(|f| f as i64))
}

fn lenient_risks<'de, D>(deserializer: D) -> Result<Vec<RugRisk>, D::Error>
where
    D: Deserializer<'de>,
{
    let Value::Array(items) = Value::deserialize(deserializer)? else {
        return Ok(Vec::new());
    };
    Ok(items
        .into_iter()
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskTier {
    Low,
    Medium,
    High,
    Unknown,
}

impl RiskTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskTier::Low => "LOW",
            RiskTier::Medium => "MEDIUM",
            RiskTier::High => "HIGH",
            RiskTier::Unknown => "UNKNOWN",
        }
    }

    pub fn recommendation(&self) -> &'static str {
        match self {
            RiskTier::Low => "SAFE_TO_BUY",
            RiskTier::Medium => "CAUTION_ADVISED",
            RiskTier::High => "HIGH_RISK_DONT_BUY",
            RiskTier::Unknown => "CAUTION_ADVISED",
        }
    }
}

impl fmt::Display for RiskTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Durable record of a qualifying token, one element of the record file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredEntry {
    pub mint: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub symbol: String,
    #[serde(default)]
    pub creator: String,
    #[serde(default)]
    pub score_normalised: Option<i64>,
    pub risk: RiskTier,
    #[serde(default)]
    pub risks: Vec<RugRisk>,
    pub detected_at: String,
}

impl StoredEntry {
    /// Merges discovery and summary data.
    ///
    /// `symbol` and `creator` prefer the discovery values and fall back to the
    /// summary; `name` only exists on the summary. Missing values become "".
    pub fn from_detection(
        token: &TokenDiscovery,
        report: &RiskReport,
        risk: RiskTier,
        detected_at: &str,
    ) -> Self {
        let symbol = non_empty(token.symbol.as_deref())
            .or_else(|| non_empty(report.token_meta.symbol.as_deref()))
            .unwrap_or_default();
        let creator = non_empty(token.creator.as_deref())
            .or_else(|| non_empty(report.creator.as_deref()))
            .unwrap_or_default();

        StoredEntry {
            mint: token.mint.clone(),
            name: report.token_meta.name.clone().unwrap_or_default(),
            symbol: symbol.to_string(),
            creator: creator.to_string(),
            score_normalised: report.score_normalised,
            risk,
            risks: report.risks.clone(),
            detected_at: detected_at.to_string(),
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

use {
    crate::models::token::StoredEntry,
    chrono::{DateTime, FixedOffset, Utc},
    std::fmt,
};

/// Detection times are reported in UTC+1 (West Africa Time).
pub const DETECTION_OFFSET_SECS: i32 = 3600;
const DETECTION_TZ_LABEL: &str = "UTC+01:00";

const RULE_WIDTH: usize = 80;

pub fn format_detected_at(now: DateTime<Utc>) -> String {
    let local = FixedOffset::east_opt(DETECTION_OFFSET_SECS)
        .map(|offset| now.with_timezone(&offset).naive_local())
        .unwrap_or_else(|| now.naive_utc());
    format!("{} {}", local.format("%Y-%m-%d %H:%M:%S"), DETECTION_TZ_LABEL)
}

/// Console report for one analysed token, emitted whether or not it was saved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenReport {
    pub entry: StoredEntry,
    /// Whether this detection added a new record to the store.
    pub stored: bool,
}

impl TokenReport {
    pub fn display_name(&self) -> &str {
        if !self.entry.name.is_empty() {
            &self.entry.name
        } else if !self.entry.symbol.is_empty() {
            &self.entry.symbol
        } else {
            "Unknown Token"
        }
    }
}

impl fmt::Display for TokenReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let entry = &self.entry;
        let rule = "=".repeat(RULE_WIDTH);
        let creator: &str = if entry.creator.is_empty() { "Unknown" } else { &entry.creator };

        writeln!(f, "{}", rule)?;
        writeln!(f, "🚀 NEW TOKEN DETECTED!")?;
        writeln!(f, "{}", rule)?;
        writeln!(f)?;
        writeln!(f, "📋 TOKEN INFORMATION:")?;
        writeln!(f, "✅ Token Name: {}", self.display_name())?;
        writeln!(f, "✅ Token Symbol: {}", entry.symbol)?;
        writeln!(f, "✅ Token Mint: {}", entry.mint)?;
        writeln!(f, "👤 Creator Wallet: {}", creator)?;
        writeln!(f, "🕒 Detection Time: {}", entry.detected_at)?;
        writeln!(f)?;
        writeln!(f, "📊 RUGCHECK ANALYSIS:")?;
        writeln!(f, "- Safety Score: {}/100", score_display(entry.score_normalised))?;
        writeln!(f, "- Risk Level: {}", entry.risk)?;
        write!(f, "- Recommendation: {}", entry.risk.recommendation())?;

        if !entry.risks.is_empty() {
            write!(f, "\n- Risk Reasons:")?;
            for risk in &entry.risks {
                let name: &str = if risk.name.is_empty() { "Unknown Risk" } else { &risk.name };
                write!(f, "\n    • {} ({}) - {}", name, risk.level, risk.description)?;
            }
        }
        Ok(())
    }
}

fn score_display(score: Option<i64>) -> String {
    score.map(|s| s.to_string()).unwrap_or_else(|| "N/A".to_string())
}

/// One block of the `history` listing; `index` is 1-based.
pub fn format_history_entry(index: usize, entry: &StoredEntry) -> String {
    let mut lines = vec![
        format!("{}. Token: {}", index, or_unknown(&entry.symbol)),
        format!("   Name: {}", or_unknown(&entry.name)),
        format!("   Mint: {}", entry.mint),
        format!("   Score: {}/100", score_display(entry.score_normalised)),
        format!("   Risk: {}", entry.risk),
        format!("   Detected: {}", entry.detected_at),
        format!("   Creator: {}", or_unknown(&entry.creator)),
    ];
    if !entry.risks.is_empty() {
        lines.push("   Risk Factors:".to_string());
        for risk in &entry.risks {
            lines.push(format!("     • {} ({})", or_unknown(&risk.name), or_unknown(&risk.level)));
        }
    }
    lines.join("\n")
}

fn or_unknown(value: &str) -> &str {
    if value.is_empty() {
        "Unknown"
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::models::token::{RiskTier, RugRisk},
        chrono::TimeZone,
    };

    fn entry(risks: Vec<RugRisk>) -> StoredEntry {
        StoredEntry {
            mint: "Mint111".into(),
            name: "Dog Coin".into(),
            symbol: "DOG".into(),
            creator: String::new(),
            score_normalised: Some(95),
            risk: RiskTier::Low,
            risks,
            detected_at: "2026-10-19 13:00:00 UTC+01:00".into(),
        }
    }

    #[test]
    fn detection_time_is_utc_plus_one() {
        let now = Utc.with_ymd_and_hms(2026, 10, 19, 23, 30, 5).unwrap();
        assert_eq!(format_detected_at(now), "2026-10-20 00:30:05 UTC+01:00");
    }

    #[test]
    fn report_layout() {
        let report = TokenReport {
            entry: entry(vec![RugRisk {
                name: "Mutable metadata".into(),
                description: "Token metadata can be changed".into(),
                level: "warn".into(),
                ..Default::default()
            }]),
            stored: true,
        };
        let text = report.to_string();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "=".repeat(80));
        assert_eq!(lines[1], "🚀 NEW TOKEN DETECTED!");
        assert!(lines.contains(&"✅ Token Name: Dog Coin"));
        assert!(lines.contains(&"👤 Creator Wallet: Unknown"));
        assert!(lines.contains(&"- Safety Score: 95/100"));
        assert!(lines.contains(&"- Risk Level: LOW"));
        assert!(lines.contains(&"- Recommendation: SAFE_TO_BUY"));
        assert_eq!(lines[lines.len() - 2], "- Risk Reasons:");
        assert_eq!(
            lines[lines.len() - 1],
            "    • Mutable metadata (warn) - Token metadata can be changed"
        );
    }

    #[test]
    fn report_without_score_or_risks() {
        let mut e = entry(Vec::new());
        e.score_normalised = None;
        e.risk = RiskTier::Unknown;
        e.name.clear();
        let text = TokenReport { entry: e, stored: false }.to_string();
        assert!(text.contains("✅ Token Name: DOG"));
        assert!(text.contains("- Safety Score: N/A/100"));
        assert!(text.ends_with("- Recommendation: CAUTION_ADVISED"));
        assert!(!text.contains("Risk Reasons"));
    }

    #[test]
    fn history_block() {
        let block = format_history_entry(3, &entry(vec![RugRisk {
            name: "Low Liquidity".into(),
            level: "danger".into(),
            ..Default::default()
        }]));
        assert!(block.starts_with("3. Token: DOG"));
        assert!(block.contains("   Creator: Unknown"));
        assert!(block.ends_with("     • Low Liquidity (danger)"));
    }
}

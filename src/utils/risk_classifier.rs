use crate::models::token::RiskTier;

/// Scores below this are always HIGH risk, whatever the threshold.
pub const HIGH_RISK_CEILING: i64 = 50;

/// Maps a normalised rugcheck score onto a risk tier.
///
/// LOW wins over HIGH, so a threshold below 50 leaves the MEDIUM band empty
/// instead of producing overlapping tiers.
pub fn classify_risk(score_normalised: Option<i64>, threshold: i64) -> RiskTier {
    match score_normalised {
        None => RiskTier::Unknown,
        Some(score) if score > threshold => RiskTier::Low,
        Some(score) if score >= HIGH_RISK_CEILING => RiskTier::Medium,
        Some(_) => RiskTier::High,
    }
}

/// Returns false when `threshold` leaves no room for a MEDIUM tier.
pub fn has_medium_band(threshold: i64) -> bool {
    threshold >= HIGH_RISK_CEILING
}

pub mod report;
pub mod risk_classifier;
pub mod rug_check;
pub mod token_filter;

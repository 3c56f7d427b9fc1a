//! Watches rugcheck.xyz for newly minted Solana tokens, scores each one and
//! keeps a record of the tokens that clear the configured risk threshold.

pub mod config;
pub mod managers;
pub mod models;
pub mod utils;

pub use {
    config::MonitorConfig,
    managers::{
        monitor_manager::{MonitorError, MonitorManager, MonitorStats},
        store_manager::{JsonFileStore, RecordStore},
    },
    utils::{report::TokenReport, rug_check::{RugCheckClient, TokenSource}},
};

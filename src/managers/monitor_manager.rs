use {
    crate::{
        config::MonitorConfig,
        managers::store_manager::{RecordStore, StoreError},
        models::token::{RiskTier, StoredEntry, TokenDiscovery},
        utils::{
            report::{format_detected_at, TokenReport},
            risk_classifier::{classify_risk, has_medium_band, HIGH_RISK_CEILING},
            rug_check::TokenSource,
            token_filter::{should_process, ProcessedMints},
        },
    },
    chrono::Utc,
    log::{debug, info, warn},
    std::{sync::Arc, time::Duration},
    thiserror::Error,
    tokio::sync::mpsc,
    tokio_util::sync::CancellationToken,
};

#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("failed to persist qualifying token {mint}: {source}")]
    Store {
        mint: String,
        #[source]
        source: StoreError,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorState {
    Polling,
    Stopped,
}

/// What happened during one poll.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CycleSummary {
    /// Entries returned by the discovery endpoint, including repeats.
    pub discovered: usize,
    /// New mints whose summary was fetched and reported.
    pub processed: usize,
    /// New mints whose summary could not be fetched.
    pub unavailable: usize,
    /// New records written to the store.
    pub stored: usize,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MonitorStats {
    pub cycles: u64,
    pub discovered: u64,
    pub processed: u64,
    pub unavailable: u64,
    pub stored: u64,
}

impl MonitorStats {
    fn record(&mut self, cycle: &CycleSummary) {
        self.cycles += 1;
        self.discovered += cycle.discovered as u64;
        self.processed += cycle.processed as u64;
        self.unavailable += cycle.unavailable as u64;
        self.stored += cycle.stored as u64;
    }
}

enum TokenOutcome {
    Unavailable,
    Reported { stored: bool },
}

/// Polls for new tokens, classifies them and saves the LOW risk ones.
///
/// Work is strictly sequential: one HTTP call at a time, tokens handled in
/// the order the source returns them. A report for every analysed token is
/// pushed to `event_sender`.
pub struct MonitorManager {
    source: Arc<dyn TokenSource>,
    store: Arc<dyn RecordStore>,
    processed: ProcessedMints,
    score_threshold: i64,
    polling_interval: Duration,
    event_sender: mpsc::Sender<TokenReport>,
    state: MonitorState,
    stats: MonitorStats,
}

impl MonitorManager {
    pub fn new(
        config: &MonitorConfig,
        source: Arc<dyn TokenSource>,
        store: Arc<dyn RecordStore>,
        event_sender: mpsc::Sender<TokenReport>,
    ) -> MonitorManager {
        MonitorManager {
            source,
            store,
            processed: ProcessedMints::new(),
            score_threshold: config.score_threshold,
            polling_interval: config.polling_interval(),
            event_sender,
            state: MonitorState::Polling,
            stats: MonitorStats::default(),
        }
    }

    pub fn state(&self) -> MonitorState {
        self.state
    }

    pub fn stats(&self) -> MonitorStats {
        self.stats
    }

    pub fn processed(&self) -> &ProcessedMints {
        &self.processed
    }

    /// Polls until `shutdown` fires or a record cannot be written.
    ///
    /// Cancellation is observed between tokens and during the sleep, never in
    /// the middle of a token's fetch/store/report sequence.
    pub async fn run(&mut self, shutdown: &CancellationToken) -> Result<(), MonitorError> {
        info!(
            "Starting monitoring with threshold: {}+, polling interval: {}s",
            self.score_threshold,
            self.polling_interval.as_secs()
        );
        if !has_medium_band(self.score_threshold) {
            warn!(
                "Threshold {} is below {}, the MEDIUM tier is empty and every score above the threshold is LOW",
                self.score_threshold, HIGH_RISK_CEILING
            );
        }
        self.state = MonitorState::Polling;

        let result = loop {
            if shutdown.is_cancelled() {
                break Ok(());
            }
            match self.run_cycle(shutdown).await {
                Ok(cycle) => {
                    debug!("Cycle finished: {:?}", cycle);
                    self.stats.record(&cycle);
                }
                Err(e) => break Err(e),
            }
            tokio::select! {
                _ = shutdown.cancelled() => break Ok(()),
                _ = tokio::time::sleep(self.polling_interval) => {}
            }
        };

        self.state = MonitorState::Stopped;
        match &result {
            Ok(()) => info!("Monitoring stopped"),
            Err(e) => warn!("Monitoring aborted: {}", e),
        }
        result
    }

    /// Runs a single discovery poll and processes every new mint in it.
    pub async fn run_cycle(&mut self, shutdown: &CancellationToken) -> Result<CycleSummary, MonitorError> {
        let tokens = self.source.fetch_new_tokens().await;
        let detected_at = format_detected_at(Utc::now());
        let mut cycle = CycleSummary {
            discovered: tokens.len(),
            ..Default::default()
        };

        for token in &tokens {
            if shutdown.is_cancelled() {
                debug!("Shutdown requested, leaving cycle early");
                break;
            }
            if !should_process(&self.processed, &token.mint) {
                continue;
            }
            match self.process_token(token, &detected_at).await? {
                TokenOutcome::Unavailable => cycle.unavailable += 1,
                TokenOutcome::Reported { stored } => {
                    cycle.processed += 1;
                    if stored {
                        cycle.stored += 1;
                    }
                }
            }
        }
        Ok(cycle)
    }

    async fn process_token(&mut self, token: &TokenDiscovery, detected_at: &str) -> Result<TokenOutcome, MonitorError> {
        let summary = self.source.fetch_token_summary(&token.mint).await;
        self.processed.add(&token.mint);
        let Some(summary) = summary else {
            debug!("No summary for {}, skipping", token.mint);
            return Ok(TokenOutcome::Unavailable);
        };

        let risk = classify_risk(summary.score_normalised, self.score_threshold);
        let entry = StoredEntry::from_detection(token, &summary, risk, detected_at);
        debug!(
            "Token {} ({}) - Score: {:?}, Threshold: {}, Risk: {}",
            entry.symbol, entry.mint, entry.score_normalised, self.score_threshold, risk
        );

        let stored = if risk == RiskTier::Low {
            info!(
                "Saving token {} ({}) with score {:?} (>{})",
                entry.symbol, entry.mint, entry.score_normalised, self.score_threshold
            );
            self.store
                .append_if_absent(&entry)
                .map_err(|source| MonitorError::Store {
                    mint: entry.mint.clone(),
                    source,
                })?
        } else {
            debug!("Not saving token {} (risk: {})", entry.mint, risk);
            false
        };

        self.emit(TokenReport { entry, stored }).await;
        Ok(TokenOutcome::Reported { stored })
    }

    async fn emit(&self, report: TokenReport) {
        if let Err(e) = self.event_sender.send(report).await {
            warn!("Report receiver closed, dropping report for {}", e.0.entry.mint);
        }
    }
}

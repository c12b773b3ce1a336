//! PagoExpiryWatcher processor.
//!
//! Wakes up every `expiry_scan_interval` and expires pending proposals older
//! than `pago_ttl`. Both values come from the betting rules; a config reload
//! restarts the interval with the new period.

use crate::config::{BettingRules, ConfigStore, ConfigWatcher};
use crate::entities::utc_now;
use crate::services::BetService;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::IntervalStream;
use tracing::{debug, error, info};

pub struct PagoExpiryWatcher {
    service: BetService,
    rules: ConfigStore<BettingRules>,
    rules_watcher: ConfigWatcher,
    shutdown_rx: watch::Receiver<bool>,
}

fn tick_stream(period: Duration) -> IntervalStream {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    IntervalStream::new(interval)
}

impl PagoExpiryWatcher {
    pub fn new(service: BetService, shutdown_rx: watch::Receiver<bool>) -> Self {
        let rules = service.rules().clone();
        let rules_watcher = rules.subscribe();
        Self {
            service,
            rules,
            rules_watcher,
            shutdown_rx,
        }
    }

    pub async fn run(mut self) {
        let mut period = self.rules.read().await.expiry_scan_interval;
        let mut ticks = tick_stream(period);
        info!(?period, "PagoExpiryWatcher started");

        loop {
            tokio::select! {
                biased;

                _ = self.shutdown_rx.changed() => {
                    if *self.shutdown_rx.borrow() {
                        info!("PagoExpiryWatcher received shutdown signal");
                        break;
                    }
                }

                changed = self.rules_watcher.changed() => {
                    if changed.is_err() {
                        info!("Betting rules store dropped");
                        break;
                    }
                    let new_period = self.rules.read().await.expiry_scan_interval;
                    if new_period != period {
                        debug!(?period, ?new_period, "Expiry scan interval changed");
                        period = new_period;
                        ticks = tick_stream(period);
                    }
                }

                Some(_) = ticks.next() => {
                    self.scan().await;
                }
            }
        }

        info!("PagoExpiryWatcher shutdown complete");
    }

    async fn scan(&self) {
        let ttl = self.rules.read().await.pago_ttl;
        let cutoff = utc_now() - ttl;
        match self.service.expire_pago_proposals(cutoff).await {
            Ok(0) => debug!("No stale pago proposals"),
            Ok(expired) => debug!(expired, "Pago expiry scan finished"),
            Err(e) => error!(error = %e, "Pago expiry scan failed"),
        }
    }
}

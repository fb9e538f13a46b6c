use crate::analyzer::Analyzer;
use crate::config;
use crate::store::SubscriberStore;
use crate::telegram::TelegramClient;
use chrono::{Datelike, Days, Local, NaiveDateTime, NaiveTime, Weekday};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Sleep duration until the next scheduled time. Picks the earliest time
/// today that is strictly in the future, else the first time tomorrow.
pub fn until_next(times: &[NaiveTime], now: NaiveDateTime) -> Duration {
    let mut sorted = times.to_vec();
    sorted.sort();

    let Some(&first) = sorted.first() else {
        // No schedule configured; check back in a day.
        return Duration::from_secs(24 * 60 * 60);
    };

    for &t in &sorted {
        if t > now.time() {
            return (now.date().and_time(t) - now).to_std().unwrap_or_default();
        }
    }

    let tomorrow = now.date() + Days::new(1);
    (tomorrow.and_time(first) - now).to_std().unwrap_or_default()
}

pub struct Scheduler {
    analyzer: Arc<Analyzer>,
    store: Arc<SubscriberStore>,
    telegram: Arc<TelegramClient>,
    times: Vec<NaiveTime>,
}

impl Scheduler {
    pub fn new(
        analyzer: Arc<Analyzer>,
        store: Arc<SubscriberStore>,
        telegram: Arc<TelegramClient>,
        times: Vec<NaiveTime>,
    ) -> Self {
        Self { analyzer, store, telegram, times }
    }

    /// Fixed-time loop. Each tick runs one batch; weekends are skipped
    /// because the market is closed.
    pub async fn run(&self) {
        info!(times = ?self.times, "daily report scheduler started");

        loop {
            let wait = until_next(&self.times, Local::now().naive_local());
            debug!(secs = wait.as_secs(), "sleeping until next scheduled report");
            tokio::time::sleep(wait).await;

            let weekday = Local::now().weekday();
            if matches!(weekday, Weekday::Sat | Weekday::Sun) {
                debug!(?weekday, "market closed, skipping scheduled run");
                continue;
            }

            self.run_batch().await;
        }
    }

    /// One report batch: every daily subscriber's symbols, sequentially,
    /// with a pacing delay between deliveries to respect Telegram's rate
    /// limits.
    pub async fn run_batch(&self) {
        let snapshot = self.store.daily_snapshot().await;
        info!(subscribers = snapshot.len(), "running daily report batch");

        for (chat_id, symbols) in snapshot {
            for symbol in symbols {
                let report = self.analyzer.analyze(&symbol).await;
                if let Err(e) = self.telegram.send_message(chat_id, &report).await {
                    warn!(chat_id, symbol = %symbol, error = %e, "daily report delivery failed");
                }
                tokio::time::sleep(Duration::from_millis(config::DELIVERY_PACING_MS)).await;
            }
        }
    }
}

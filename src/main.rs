use anyhow::Result;
use colored::Colorize;
use std::sync::Arc;
use std::time::Instant;

use nse_oc_bot::analyzer::Analyzer;
use nse_oc_bot::api_server::{self, AppState};
use nse_oc_bot::bot::BotHandler;
use nse_oc_bot::config;
use nse_oc_bot::fetcher::ChainFetcher;
use nse_oc_bot::logging;
use nse_oc_bot::scheduler::Scheduler;
use nse_oc_bot::session::SessionManager;
use nse_oc_bot::store::SubscriberStore;
use nse_oc_bot::telegram::{TelegramClient, TelegramConfig};

#[tokio::main]
async fn main() -> Result<()> {
    logging::init_logging();

    println!("{}", "=".repeat(60).blue());
    println!("{}", "NSE Option Chain Bot".green().bold());
    println!("{}", "=".repeat(60).blue());
    println!();

    let Some(tg_config) = TelegramConfig::from_env() else {
        eprintln!("TELEGRAM_BOT_TOKEN is not set.");
        eprintln!("Required environment:");
        eprintln!("  TELEGRAM_BOT_TOKEN   bot token from @BotFather");
        eprintln!("Optional:");
        eprintln!("  TELEGRAM_CHAT_ID     chat seeded with the daily report");
        eprintln!("  DEFAULT_SYMBOLS      comma-separated, default ONGC");
        eprintln!("  REPORT_TIMES         HH:MM,HH:MM local, default 09:20,15:45");
        eprintln!("  OC_PORT              status server port, default 3001");
        std::process::exit(1);
    };

    let session = Arc::new(SessionManager::new()?);
    let fetcher = ChainFetcher::new(Arc::clone(&session));
    let analyzer = Arc::new(Analyzer::new(fetcher));
    let store = Arc::new(SubscriberStore::new());
    let telegram = Arc::new(TelegramClient::new(tg_config.clone()));

    // Seed the configured chat so the daily report works out of the box.
    if let Some(chat_id) = tg_config.default_chat_id {
        for symbol in config::get_default_symbols() {
            store.watch(chat_id, &symbol).await;
        }
        store.set_daily(chat_id, true).await;
        println!("{} Default chat {} seeded for daily reports", "✓".green(), chat_id);
    }

    let scheduler = Arc::new(Scheduler::new(
        Arc::clone(&analyzer),
        Arc::clone(&store),
        Arc::clone(&telegram),
        config::get_report_times(),
    ));

    let port = config::get_port();
    println!("{} Status server: http://127.0.0.1:{}", "✓".green(), port);
    println!();

    let state = AppState {
        session: Arc::clone(&session),
        store: Arc::clone(&store),
        analyzer: Arc::clone(&analyzer),
        scheduler: Arc::clone(&scheduler),
        started: Instant::now(),
    };

    tokio::spawn({
        let scheduler = Arc::clone(&scheduler);
        async move { scheduler.run().await }
    });

    tokio::spawn(async move {
        if let Err(e) = api_server::start_server(port, state).await {
            tracing::error!(error = %e, "status server exited");
        }
    });

    // The bot loop owns the foreground and never returns.
    let bot = BotHandler::new(telegram, analyzer, store);
    bot.run().await;

    Ok(())
}

use crate::analyzer::Analyzer;
use crate::store::SubscriberStore;
use crate::telegram::TelegramClient;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

// -----------------------------------------------
// BOT COMMANDS
// -----------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BotCommand {
    /// On-demand analysis of one symbol.
    Analyze { symbol: String },
    Watch { symbol: String },
    Unwatch { symbol: String },
    List,
    Daily { enabled: bool },
    Help,
    Unknown,
}

impl BotCommand {
    pub fn parse(text: &str) -> Self {
        let text = text.trim();
        if !text.starts_with('/') {
            return BotCommand::Unknown;
        }

        let parts: Vec<&str> = text[1..].split_whitespace().collect();
        let command = parts.first().map(|s| s.to_lowercase());
        let arg = parts.get(1).map(|s| s.to_uppercase());

        match command.as_deref() {
            Some("oi") | Some("analyze") => match arg {
                Some(symbol) => BotCommand::Analyze { symbol },
                None => BotCommand::Help,
            },
            Some("watch") => match arg {
                Some(symbol) => BotCommand::Watch { symbol },
                None => BotCommand::Help,
            },
            Some("unwatch") => match arg {
                Some(symbol) => BotCommand::Unwatch { symbol },
                None => BotCommand::Help,
            },
            Some("list") => BotCommand::List,
            Some("daily") => match arg.as_deref() {
                Some("ON") | None => BotCommand::Daily { enabled: true },
                Some("OFF") => BotCommand::Daily { enabled: false },
                Some(_) => BotCommand::Help,
            },
            Some("help") | Some("start") => BotCommand::Help,
            _ => BotCommand::Unknown,
        }
    }
}

const HELP_TEXT: &str = "🤖 *NSE Option Chain Bot*\n\n\
/oi SYMBOL — option chain summary now\n\
/watch SYMBOL — add to your daily report\n\
/unwatch SYMBOL — remove from your daily report\n\
/list — your watched symbols\n\
/daily on|off — toggle the scheduled report\n\
/help — this message";

// -----------------------------------------------
// DISPATCH LOOP
// -----------------------------------------------

pub struct BotHandler {
    telegram: Arc<TelegramClient>,
    analyzer: Arc<Analyzer>,
    store: Arc<SubscriberStore>,
}

impl BotHandler {
    pub fn new(
        telegram: Arc<TelegramClient>,
        analyzer: Arc<Analyzer>,
        store: Arc<SubscriberStore>,
    ) -> Self {
        Self { telegram, analyzer, store }
    }

    /// Long-poll loop. Errors are logged and the loop keeps going.
    pub async fn run(&self) {
        info!("telegram bot loop started");
        let mut offset = 0i64;

        loop {
            match self.telegram.get_updates(offset).await {
                Ok(updates) => {
                    for update in updates {
                        offset = offset.max(update.update_id + 1);

                        let Some(message) = update.message else { continue };
                        let Some(text) = message.text.as_deref() else { continue };

                        let reply = self.handle(message.chat.id, text).await;
                        if let Err(e) = self.telegram.send_message(message.chat.id, &reply).await {
                            warn!(chat_id = message.chat.id, error = %e, "failed to deliver reply");
                        }
                    }
                }
                Err(e) => {
                    warn!(error = %e, "getUpdates failed, backing off");
                    tokio::time::sleep(Duration::from_secs(5)).await;
                }
            }
        }
    }

    pub async fn handle(&self, chat_id: i64, text: &str) -> String {
        match BotCommand::parse(text) {
            BotCommand::Analyze { symbol } => self.analyzer.analyze(&symbol).await,
            BotCommand::Watch { symbol } => {
                if self.store.watch(chat_id, &symbol).await {
                    format!("✅ Watching *{symbol}*. It will be part of your daily report.")
                } else {
                    format!("ℹ️ *{symbol}* is already on your watch list.")
                }
            }
            BotCommand::Unwatch { symbol } => {
                if self.store.unwatch(chat_id, &symbol).await {
                    format!("✅ Stopped watching *{symbol}*.")
                } else {
                    format!("ℹ️ *{symbol}* was not on your watch list.")
                }
            }
            BotCommand::List => {
                let sub = self.store.get(chat_id).await;
                if sub.symbols.is_empty() {
                    "Your watch list is empty. Add a symbol with /watch SYMBOL.".to_string()
                } else {
                    let daily = if sub.daily { "on" } else { "off" };
                    format!(
                        "👀 Watching: {}\n🗓️ Daily report: {daily}",
                        sub.symbols.iter().cloned().collect::<Vec<_>>().join(", ")
                    )
                }
            }
            BotCommand::Daily { enabled } => {
                self.store.set_daily(chat_id, enabled).await;
                if enabled {
                    "✅ Daily reports enabled.".to_string()
                } else {
                    "✅ Daily reports disabled.".to_string()
                }
            }
            BotCommand::Help | BotCommand::Unknown => HELP_TEXT.to_string(),
        }
    }
}

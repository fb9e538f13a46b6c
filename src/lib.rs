pub mod analyzer;
pub mod api_server;
pub mod bot;
pub mod config;
pub mod fetcher;
pub mod logging;
pub mod models;
pub mod scheduler;
pub mod session;
pub mod store;
pub mod telegram;

// Re-exports (public API)
pub use analyzer::{
    render_report, round2, summarize, Analyzer, MarketBias, OiLevel, OiSummary,
};
pub use config::ProviderConfig;
pub use fetcher::{endpoint_for, endpoint_on, ChainFetcher};
pub use models::{ChainResponse, OptionChain, OptionData, OptionSide, Security, SecurityType};
pub use session::SessionManager;
pub use store::SubscriberStore;

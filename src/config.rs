use chrono::NaiveTime;
use std::time::Duration;

// -----------------------------------------------
// NSE ENDPOINTS
// -----------------------------------------------
pub const NSE_BASE_URL: &str = "https://www.nseindia.com";
pub const OPTION_CHAIN_PATH: &str = "/option-chain";
pub const DERIVATIVES_WATCH_PATH: &str = "/market-data/equity-derivatives-watch";

/// Provider location and pacing. Defaults target NSE; the base URL and the
/// delays are injectable the same way the sentiment cutoffs are, so the
/// session machinery can be pointed at a local mirror.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub base_url: String,
    pub warmup_pause: Duration,
    pub bad_status_delay: Duration,
    pub error_delay: Duration,
    pub max_attempts: usize,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: NSE_BASE_URL.to_string(),
            warmup_pause: Duration::from_millis(WARMUP_PAUSE_MS),
            bad_status_delay: BOOTSTRAP_BAD_STATUS_DELAY,
            error_delay: BOOTSTRAP_ERROR_DELAY,
            max_attempts: BOOTSTRAP_MAX_ATTEMPTS,
        }
    }
}

impl ProviderConfig {
    /// Provider at an alternate base URL with all pacing delays removed.
    /// The human-pacing sleeps only matter against the real site.
    pub fn for_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            warmup_pause: Duration::ZERO,
            bad_status_delay: Duration::ZERO,
            error_delay: Duration::ZERO,
            ..Self::default()
        }
    }

    pub fn root_page(&self) -> String {
        self.base_url.clone()
    }

    pub fn warmup_pages(&self) -> [String; 2] {
        [
            format!("{}{}", self.base_url, OPTION_CHAIN_PATH),
            format!("{}{}", self.base_url, DERIVATIVES_WATCH_PATH),
        ]
    }

    pub fn option_chain_indices_url(&self, symbol: &str) -> String {
        format!(
            "{}/api/option-chain-indices?symbol={}",
            self.base_url,
            urlencoding::encode(symbol)
        )
    }

    pub fn option_chain_equities_url(&self, symbol: &str) -> String {
        format!(
            "{}/api/option-chain-equities?symbol={}",
            self.base_url,
            urlencoding::encode(symbol)
        )
    }
}

// -----------------------------------------------
// INDEX SYMBOLS (everything else is an equity)
// -----------------------------------------------
pub const NSE_INDICES: &[&str] = &["NIFTY", "BANKNIFTY", "FINNIFTY", "MIDCPNIFTY", "NIFTYNXT50"];

// -----------------------------------------------
// HTTP CLIENT CONFIG
// -----------------------------------------------
pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
                               AppleWebKit/537.36 (KHTML, like Gecko) \
                               Chrome/131.0.0.0 Safari/537.36";

pub const ACCEPT_LANGUAGES: &[&str] = &[
    "en-US,en;q=0.9",
    "en-GB,en;q=0.8",
    "en-IN,en;q=0.9",
];

pub const HTTP_TIMEOUT: Duration = Duration::from_secs(20);

// -----------------------------------------------
// SESSION BOOTSTRAP
// -----------------------------------------------
pub const WARMUP_PAUSE_MS: u64 = 1500;
pub const BOOTSTRAP_MAX_ATTEMPTS: usize = 3;
// Delay before the next attempt, depending on how the previous one died.
pub const BOOTSTRAP_BAD_STATUS_DELAY: Duration = Duration::from_secs(5);
pub const BOOTSTRAP_ERROR_DELAY: Duration = Duration::from_secs(10);

// -----------------------------------------------
// HTTP HEADERS
// -----------------------------------------------
pub const HEADER_REFERER: &str = "https://www.nseindia.com/option-chain";
pub const HEADER_X_REQUESTED_WITH: &str = "XMLHttpRequest";
pub const HEADER_ACCEPT_HTML: &str =
    "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";
pub const HEADER_ACCEPT_JSON: &str = "application/json, text/javascript, */*; q=0.01";

// -----------------------------------------------
// SENTIMENT CUTOFFS (bearish below, bullish above)
// -----------------------------------------------
pub const SENTIMENT_CUTOFFS: (f64, f64) = (0.7, 1.3);
// Earlier single-symbol deployments used this pair; kept selectable, not default.
pub const LEGACY_SENTIMENT_CUTOFFS: (f64, f64) = (0.5, 1.2);

// -----------------------------------------------
// TELEGRAM DELIVERY
// -----------------------------------------------
pub const DELIVERY_PACING_MS: u64 = 1500;
pub const TELEGRAM_POLL_TIMEOUT_SECS: u64 = 30;

pub const RETRY_BASE_DELAY_MS: u64 = 500;
pub const RETRY_FACTOR: u64 = 2;
pub const RETRY_MAX_DELAY_SECS: u64 = 10;
pub const RETRY_MAX_ATTEMPTS: usize = 3;

// -----------------------------------------------
// DAILY SCHEDULE
// -----------------------------------------------
pub const DEFAULT_REPORT_TIMES: &[&str] = &["09:20", "15:45"];

// -----------------------------------------------
// RUNTIME CONFIGURATION
// -----------------------------------------------

/// Port for the status/trigger HTTP server.
pub fn get_port() -> u16 {
    std::env::var("OC_PORT")
        .unwrap_or_else(|_| "3001".to_string())
        .parse::<u16>()
        .unwrap_or(3001)
}

/// Daily report times, local clock. `REPORT_TIMES="09:20,15:45"` overrides.
pub fn get_report_times() -> Vec<NaiveTime> {
    let raw = std::env::var("REPORT_TIMES")
        .unwrap_or_else(|_| DEFAULT_REPORT_TIMES.join(","));

    let mut times: Vec<NaiveTime> = raw
        .split(',')
        .filter_map(|s| NaiveTime::parse_from_str(s.trim(), "%H:%M").ok())
        .collect();

    if times.is_empty() {
        times = DEFAULT_REPORT_TIMES
            .iter()
            .filter_map(|s| NaiveTime::parse_from_str(s, "%H:%M").ok())
            .collect();
    }

    times.sort();
    times
}

/// Symbols seeded for the default chat's daily report.
pub fn get_default_symbols() -> Vec<String> {
    std::env::var("DEFAULT_SYMBOLS")
        .unwrap_or_else(|_| "ONGC".to_string())
        .split(',')
        .map(|s| s.trim().to_uppercase())
        .filter(|s| !s.is_empty())
        .collect()
}

use crate::config;
use crate::fetcher::ChainFetcher;
use crate::models::OptionChain;

// -----------------------------------------------
// OPEN INTEREST SUMMARY
// -----------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarketBias {
    Bearish,
    Neutral,
    Bullish,
}

impl MarketBias {
    /// Three-way threshold on PCR. Total over all reals: below the bearish
    /// cutoff, above the bullish cutoff, neutral in between (inclusive).
    pub fn classify(pcr: f64, cutoffs: (f64, f64)) -> Self {
        if pcr < cutoffs.0 {
            MarketBias::Bearish
        } else if pcr > cutoffs.1 {
            MarketBias::Bullish
        } else {
            MarketBias::Neutral
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            MarketBias::Bearish => "📉 Bearish or range-bound",
            MarketBias::Neutral => "⚖️ Neutral or balanced",
            MarketBias::Bullish => "📈 Bullish or potential reversal",
        }
    }
}

/// Strike holding the maximum OI on one side. `strike` stays `None` when
/// no strike on that side reported any open interest.
#[derive(Debug, Clone, Copy)]
pub struct OiLevel {
    pub strike: Option<f64>,
    pub oi: f64,
}

#[derive(Debug, Clone)]
pub struct OiSummary {
    pub underlying: f64,
    pub expiry: String,
    pub max_call: OiLevel,
    pub max_put: OiLevel,
    pub total_call_oi: f64,
    pub total_put_oi: f64,
    pub pcr: f64,
    pub bias: MarketBias,
}

pub fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// One pass over the strike collection: totals, and the max-OI strike per
/// side. Strikes with an absent or zero strike price are discarded; missing
/// OI counts as zero. Strict `>` keeps the first-seen strike on ties.
/// Returns `None` when no valid strikes remain after filtering.
pub fn summarize(chain: &OptionChain, cutoffs: (f64, f64)) -> Option<OiSummary> {
    let expiry = chain.expiry_dates.first()?.clone();

    let mut max_call = OiLevel { strike: None, oi: 0.0 };
    let mut max_put = OiLevel { strike: None, oi: 0.0 };
    let mut total_call_oi = 0.0;
    let mut total_put_oi = 0.0;
    let mut valid_strikes = 0usize;

    for item in &chain.data {
        let strike = match item.strike_price {
            Some(s) if s > 0.0 => s,
            _ => continue,
        };
        valid_strikes += 1;

        let ce_oi = item
            .call
            .as_ref()
            .and_then(|c| c.open_interest)
            .unwrap_or(0.0);
        let pe_oi = item
            .put
            .as_ref()
            .and_then(|p| p.open_interest)
            .unwrap_or(0.0);

        if ce_oi > max_call.oi {
            max_call = OiLevel { strike: Some(strike), oi: ce_oi };
        }
        if pe_oi > max_put.oi {
            max_put = OiLevel { strike: Some(strike), oi: pe_oi };
        }

        total_call_oi += ce_oi;
        total_put_oi += pe_oi;
    }

    if valid_strikes == 0 {
        return None;
    }

    let pcr = if total_call_oi > 0.0 {
        round2(total_put_oi / total_call_oi)
    } else {
        0.0
    };

    Some(OiSummary {
        underlying: chain.underlying_value,
        expiry,
        max_call,
        max_put,
        total_call_oi,
        total_put_oi,
        pcr,
        bias: MarketBias::classify(pcr, cutoffs),
    })
}

// -----------------------------------------------
// REPORT RENDERING
// -----------------------------------------------

pub fn render_report(symbol: &str, s: &OiSummary) -> String {
    let mut msg = format!("📈 Option Chain Summary for *{symbol}*\n");
    msg.push_str(&format!("🗓️ Expiry: `{}`\n", s.expiry));
    msg.push_str(&format!("💰 Spot: {:.2}\n", s.underlying));
    msg.push_str(&format!(
        "\n🔹 *Resistance* (Highest Call OI): ₹{} ({})",
        fmt_strike(s.max_call.strike),
        fmt_oi(s.max_call.oi)
    ));
    msg.push_str(&format!(
        "\n🔸 *Support* (Highest Put OI): ₹{} ({})",
        fmt_strike(s.max_put.strike),
        fmt_oi(s.max_put.oi)
    ));
    msg.push_str(&format!(
        "\n📊 Total Call OI: {} | Total Put OI: {}",
        fmt_oi(s.total_call_oi),
        fmt_oi(s.total_put_oi)
    ));
    msg.push_str(&format!("\n📊 *PCR (Put/Call Ratio)*: `{:.2}`", s.pcr));
    msg.push_str(&format!("\n\n🧭 *Market Bias:* {}", s.bias.label()));
    msg.push_str("\n\n⚠️ Data is near real-time. Not for trading advice.");
    msg
}

pub fn unreachable_report(symbol: &str) -> String {
    format!("⚠️ Could not reach the NSE data feed for *{symbol}*. Please try again in a few minutes.")
}

pub fn no_derivatives_report(symbol: &str) -> String {
    format!("ℹ️ No active derivatives trading found for *{symbol}*.")
}

pub fn no_strikes_report(symbol: &str) -> String {
    format!("ℹ️ The option chain for *{symbol}* has no valid strikes to analyze.")
}

fn fmt_strike(strike: Option<f64>) -> String {
    match strike {
        Some(s) if s.fract() == 0.0 => format!("{}", s as i64),
        Some(s) => format!("{s:.2}"),
        None => "-".to_string(),
    }
}

fn fmt_oi(oi: f64) -> String {
    let n = oi.round() as i64;
    let digits = n.abs().to_string();
    let mut grouped = String::new();
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    if n < 0 { format!("-{grouped}") } else { grouped }
}

// -----------------------------------------------
// ANALYZER
// -----------------------------------------------

pub struct Analyzer {
    fetcher: ChainFetcher,
    cutoffs: (f64, f64),
}

impl Analyzer {
    pub fn new(fetcher: ChainFetcher) -> Self {
        Self { fetcher, cutoffs: config::SENTIMENT_CUTOFFS }
    }

    pub fn with_cutoffs(fetcher: ChainFetcher, cutoffs: (f64, f64)) -> Self {
        Self { fetcher, cutoffs }
    }

    /// Analyze a symbol and produce a deliverable report. Every path ends
    /// in a renderable string; nothing propagates to the caller.
    pub async fn analyze(&self, symbol: &str) -> String {
        let symbol = symbol.trim().to_uppercase();
        match self.run(&symbol).await {
            Ok(text) => text,
            Err(e) => format!("❌ Analysis failed for {symbol}: {e}"),
        }
    }

    async fn run(&self, symbol: &str) -> anyhow::Result<String> {
        let Some(chain) = self.fetcher.fetch(symbol).await else {
            return Ok(unreachable_report(symbol));
        };

        if chain.expiry_dates.is_empty() {
            return Ok(no_derivatives_report(symbol));
        }

        match summarize(&chain, self.cutoffs) {
            Some(summary) => Ok(render_report(symbol, &summary)),
            None => Ok(no_strikes_report(symbol)),
        }
    }
}

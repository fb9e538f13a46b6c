use crate::config::ProviderConfig;
use crate::models::{ChainResponse, OptionChain, Security, SecurityType};
use crate::session::{api_headers, SessionManager};
use std::sync::Arc;
use tracing::{debug, warn};

/// Data endpoint for a symbol on a given provider. Index symbols hit the
/// indices template, everything else the equities template; both take only
/// the uppercased symbol.
pub fn endpoint_on(provider: &ProviderConfig, symbol: &str) -> String {
    let security = Security::resolve(symbol);
    match security.security_type {
        SecurityType::Indices => provider.option_chain_indices_url(&security.symbol),
        SecurityType::Equity => provider.option_chain_equities_url(&security.symbol),
    }
}

/// Same routing against the default NSE endpoints.
pub fn endpoint_for(symbol: &str) -> String {
    endpoint_on(&ProviderConfig::default(), symbol)
}

pub struct ChainFetcher {
    session: Arc<SessionManager>,
}

impl ChainFetcher {
    pub fn new(session: Arc<SessionManager>) -> Self {
        Self { session }
    }

    pub fn session(&self) -> &Arc<SessionManager> {
        &self.session
    }

    /// Fetch the option chain for a symbol. `None` uniformly covers network
    /// failure, bad status, undecodable body, and a missing records
    /// envelope. One re-bootstrap-and-retry cycle runs before giving up on
    /// the request.
    pub async fn fetch(&self, symbol: &str) -> Option<OptionChain> {
        if !self.session.ensure_valid().await {
            return None;
        }

        if let Some(chain) = self.fetch_once(symbol).await {
            return Some(chain);
        }

        debug!(symbol, "fetch returned no data, recycling session");
        self.session.invalidate().await;
        if !self.session.ensure_valid().await {
            return None;
        }

        match self.fetch_once(symbol).await {
            Some(chain) => Some(chain),
            None => {
                // Still nothing on a fresh session: the session earned no
                // trust, so the next fetch bootstraps again.
                self.session.invalidate().await;
                None
            }
        }
    }

    async fn fetch_once(&self, symbol: &str) -> Option<OptionChain> {
        let url = endpoint_on(self.session.provider(), symbol);
        let client = self.session.client().await;

        let res = match client.get(&url).headers(api_headers()).send().await {
            Ok(res) => res,
            Err(e) => {
                warn!(symbol, error = %e, "option chain request failed");
                return None;
            }
        };

        let status = res.status();
        if !status.is_success() {
            warn!(symbol, %status, "option chain request rejected");
            return None;
        }

        let text = match res.text().await {
            Ok(text) => text,
            Err(e) => {
                warn!(symbol, error = %e, "failed to read option chain body");
                return None;
            }
        };

        let parsed: ChainResponse = match serde_json::from_str(&text) {
            Ok(parsed) => parsed,
            Err(e) => {
                let preview: String = text.chars().take(120).collect();
                warn!(symbol, error = %e, preview, "option chain body is not valid JSON");
                return None;
            }
        };

        match parsed.validate() {
            Some(chain) => {
                debug!(
                    symbol,
                    strikes = chain.data.len(),
                    expiries = chain.expiry_dates.len(),
                    "option chain fetched"
                );
                Some(chain)
            }
            None => {
                warn!(symbol, "option chain payload missing records envelope");
                None
            }
        }
    }
}

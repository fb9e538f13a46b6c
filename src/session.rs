use crate::config::{self, ProviderConfig};
use anyhow::{Context, Result};
use rand::{seq::SliceRandom, thread_rng};
use reqwest::{header, Client, StatusCode};
use tokio::sync::RwLock;
use tracing::{error, info, warn};

// -----------------------------------------------
// SESSION MANAGER
//
// NSE rejects bare API clients, so every data call rides on a session
// that first browsed the site like a human: cookie jar, browser headers,
// a visit to the landing pages, and a short pause before the API calls
// start. The session is shared by all fetches in the process and is
// replaced wholesale whenever it goes stale.
// -----------------------------------------------

struct SessionState {
    client: Client,
    valid: bool,
}

pub struct SessionManager {
    provider: ProviderConfig,
    inner: RwLock<SessionState>,
}

enum BootstrapFailure {
    BadStatus(StatusCode),
    Transport(anyhow::Error),
}

impl SessionManager {
    pub fn new() -> Result<Self> {
        Self::with_provider(ProviderConfig::default())
    }

    /// Session bound to an explicit provider, for deployments that front
    /// NSE with a mirror and for exercising the bootstrap locally.
    pub fn with_provider(provider: ProviderConfig) -> Result<Self> {
        Ok(Self {
            provider,
            inner: RwLock::new(SessionState {
                client: build_client()?,
                valid: false,
            }),
        })
    }

    pub fn provider(&self) -> &ProviderConfig {
        &self.provider
    }

    /// Session liveness, exposed for the status endpoint.
    pub async fn is_valid(&self) -> bool {
        self.inner.read().await.valid
    }

    /// Clone of the current client. The clone shares the cookie jar, so a
    /// concurrent re-bootstrap can invalidate an in-flight request; callers
    /// treat any resulting failure as retryable no-data.
    pub async fn client(&self) -> Client {
        self.inner.read().await.client.clone()
    }

    /// Mark the session stale. Called by the fetcher after a fetch that
    /// produced no usable payload.
    pub async fn invalidate(&self) {
        self.inner.write().await.valid = false;
    }

    /// Bootstrap the session if it is not currently valid. Returns whether
    /// a valid session is available afterwards. Exhausting all attempts is
    /// reported, not fatal; callers keep running in a degraded state.
    pub async fn ensure_valid(&self) -> bool {
        if self.is_valid().await {
            return true;
        }

        let mut state = self.inner.write().await;
        if state.valid {
            // Another task finished bootstrapping while we waited.
            return true;
        }

        // Fresh client: the old cookie jar is discarded, not reused.
        state.client = match build_client() {
            Ok(client) => client,
            Err(e) => {
                error!(error = %e, "failed to build HTTP client");
                return false;
            }
        };

        for attempt in 1..=self.provider.max_attempts {
            let outcome = bootstrap_once(&state.client, &self.provider).await;
            match outcome {
                Ok(()) => {
                    state.valid = true;
                    info!(attempt, "NSE session bootstrapped");
                    return true;
                }
                Err(BootstrapFailure::BadStatus(status)) => {
                    warn!(attempt, %status, "NSE root page rejected the session");
                    if attempt < self.provider.max_attempts {
                        tokio::time::sleep(self.provider.bad_status_delay).await;
                    }
                }
                Err(BootstrapFailure::Transport(e)) => {
                    warn!(attempt, error = %e, "NSE bootstrap request failed");
                    if attempt < self.provider.max_attempts {
                        tokio::time::sleep(self.provider.error_delay).await;
                    }
                }
            }
        }

        state.valid = false;
        warn!("NSE session bootstrap exhausted all attempts, session stays invalid");
        false
    }
}

/// One bootstrap pass: the root page must succeed, the secondary pages are
/// best-effort cookie collectors, then a short pause to emulate human pacing.
async fn bootstrap_once(
    client: &Client,
    provider: &ProviderConfig,
) -> std::result::Result<(), BootstrapFailure> {
    let res = client
        .get(provider.root_page())
        .header(header::ACCEPT, config::HEADER_ACCEPT_HTML)
        .send()
        .await
        .map_err(|e| BootstrapFailure::Transport(e.into()))?;

    if !res.status().is_success() {
        return Err(BootstrapFailure::BadStatus(res.status()));
    }

    for page in provider.warmup_pages() {
        if let Err(e) = client
            .get(&page)
            .header(header::ACCEPT, config::HEADER_ACCEPT_HTML)
            .send()
            .await
        {
            warn!(page = %page, error = %e, "warmup page failed, continuing");
        }
    }

    tokio::time::sleep(provider.warmup_pause).await;
    Ok(())
}

// -----------------------------------------------
// HTTP CLIENT BUILDER
// -----------------------------------------------

/// Fresh client with browser-identity defaults. No network call happens
/// here; cookies accumulate once bootstrap starts browsing.
pub fn build_client() -> Result<Client> {
    let mut headers = header::HeaderMap::new();

    let lang = config::ACCEPT_LANGUAGES
        .choose(&mut thread_rng())
        .unwrap_or(&config::ACCEPT_LANGUAGES[0]);
    headers.insert(header::ACCEPT_LANGUAGE, header::HeaderValue::from_str(lang)?);
    headers.insert(header::ACCEPT, header::HeaderValue::from_static("*/*"));
    headers.insert(
        header::CACHE_CONTROL,
        header::HeaderValue::from_static("no-cache"),
    );

    Client::builder()
        .default_headers(headers)
        .cookie_store(true)
        .user_agent(config::USER_AGENT)
        .timeout(config::HTTP_TIMEOUT)
        .build()
        .context("Failed to build HTTP client")
}

/// Header set for the data API calls, swapped in after bootstrap. These
/// mimic the site's own XHR requests from the option chain page.
pub fn api_headers() -> header::HeaderMap {
    let mut headers = header::HeaderMap::new();
    headers.insert(
        header::ACCEPT,
        header::HeaderValue::from_static(config::HEADER_ACCEPT_JSON),
    );
    headers.insert(
        header::REFERER,
        header::HeaderValue::from_static(config::HEADER_REFERER),
    );
    headers.insert(
        "X-Requested-With",
        header::HeaderValue::from_static(config::HEADER_X_REQUESTED_WITH),
    );
    headers.insert("Sec-Fetch-Dest", header::HeaderValue::from_static("empty"));
    headers.insert("Sec-Fetch-Mode", header::HeaderValue::from_static("cors"));
    headers.insert(
        "Sec-Fetch-Site",
        header::HeaderValue::from_static("same-origin"),
    );
    headers
}

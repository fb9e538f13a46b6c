// Session bootstrap and fetch behavior against a local HTTP stand-in for
// the NSE site. The provider base URL is injectable, so these exercise the
// real reqwest paths end to end without touching the network.

#[cfg(test)]
mod tests {
    use nse_oc_bot::analyzer::{unreachable_report, Analyzer};
    use nse_oc_bot::config::ProviderConfig;
    use nse_oc_bot::fetcher::ChainFetcher;
    use nse_oc_bot::session::SessionManager;
    use std::sync::Arc;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::sync::Mutex;

    type RequestLog = Arc<Mutex<Vec<String>>>;

    const CHAIN_BODY: &str = r#"{
        "records": {
            "underlyingValue": 18050.0,
            "expiryDates": ["28-Nov-2024", "05-Dec-2024"],
            "data": [
                {"strikePrice": 18000.0,
                 "CE": {"openInterest": 500.0},
                 "PE": {"openInterest": 1200.0}},
                {"strikePrice": 18100.0,
                 "CE": {"openInterest": 900.0},
                 "PE": {"openInterest": 400.0}}
            ]
        }
    }"#;

    /// Minimal HTTP server. Every request gets `status_line`; successful
    /// responses serve `api_body` on `/api/...` paths and a stub page
    /// elsewhere. Request paths are appended to `log`.
    async fn spawn_site(status_line: &'static str, api_body: &'static str) -> (String, RequestLog) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let log: RequestLog = Arc::new(Mutex::new(Vec::new()));
        let task_log = Arc::clone(&log);

        tokio::spawn(async move {
            loop {
                let Ok((mut socket, _)) = listener.accept().await else {
                    break;
                };

                // Read request headers; GET requests arrive in one piece.
                let mut buf = Vec::new();
                let mut tmp = [0u8; 1024];
                let path = loop {
                    match socket.read(&mut tmp).await {
                        Ok(0) | Err(_) => break None,
                        Ok(n) => {
                            buf.extend_from_slice(&tmp[..n]);
                            if buf.windows(4).any(|w| w == b"\r\n\r\n") {
                                let head = String::from_utf8_lossy(&buf);
                                break head.split_whitespace().nth(1).map(str::to_string);
                            }
                        }
                    }
                };
                let Some(path) = path else { continue };

                task_log.lock().await.push(path.clone());

                let body = if path.starts_with("/api/") {
                    api_body
                } else {
                    "<html>ok</html>"
                };
                let response = format!(
                    "HTTP/1.1 {status_line}\r\nContent-Type: application/json\r\n\
                     Content-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            }
        });

        (format!("http://{addr}"), log)
    }

    fn session_on(base_url: &str) -> Arc<SessionManager> {
        let provider = ProviderConfig::for_base_url(base_url);
        Arc::new(SessionManager::with_provider(provider).unwrap())
    }

    #[tokio::test]
    async fn test_bootstrap_exhausts_attempts_when_root_page_rejects() {
        let (base, log) = spawn_site("503 Service Unavailable", "{}").await;
        let session = session_on(&base);

        assert!(!session.ensure_valid().await);
        assert!(!session.is_valid().await);

        // One root page hit per attempt, warmup pages never reached.
        let paths = log.lock().await;
        assert_eq!(paths.len(), ProviderConfig::default().max_attempts);
        assert!(paths.iter().all(|p| p == "/"));
    }

    #[tokio::test]
    async fn test_analyze_reports_unreachable_when_site_rejects() {
        let (base, _log) = spawn_site("503 Service Unavailable", "{}").await;
        let analyzer = Analyzer::new(ChainFetcher::new(session_on(&base)));

        let report = analyzer.analyze("ONGC").await;
        assert_eq!(report, unreachable_report("ONGC"));
    }

    #[tokio::test]
    async fn test_fetch_recycles_session_once_then_gives_up_invalid() {
        // Bootstrap succeeds but the data endpoint never yields a records
        // envelope, so each fetch attempt comes back empty.
        let (base, log) = spawn_site("200 OK", "{}").await;
        let session = session_on(&base);
        let fetcher = ChainFetcher::new(Arc::clone(&session));

        assert!(fetcher.fetch("ONGC").await.is_none());

        let paths = log.lock().await;
        let api_hits = paths.iter().filter(|p| p.starts_with("/api/")).count();
        let root_hits = paths.iter().filter(|p| *p == "/").count();
        // Exactly one recycle: two data attempts across two bootstraps.
        assert_eq!(api_hits, 2);
        assert_eq!(root_hits, 2);
        drop(paths);

        // A session that produced no data twice is not trusted.
        assert!(!session.is_valid().await);
    }

    #[tokio::test]
    async fn test_one_session_serves_index_and_equity_fetches() {
        let (base, log) = spawn_site("200 OK", CHAIN_BODY).await;
        let session = session_on(&base);
        let fetcher = ChainFetcher::new(Arc::clone(&session));

        let index_chain = fetcher.fetch("NIFTY").await.unwrap();
        let equity_chain = fetcher.fetch("ONGC").await.unwrap();
        assert_eq!(index_chain.underlying_value, 18050.0);
        assert_eq!(equity_chain.data.len(), 2);
        assert!(session.is_valid().await);

        let paths = log.lock().await;
        assert!(paths
            .iter()
            .any(|p| p.starts_with("/api/option-chain-indices?symbol=NIFTY")));
        assert!(paths
            .iter()
            .any(|p| p.starts_with("/api/option-chain-equities?symbol=ONGC")));
        // The second fetch rode the first fetch's session.
        assert_eq!(paths.iter().filter(|p| *p == "/").count(), 1);
    }

    #[tokio::test]
    async fn test_analyze_renders_full_report_over_http() {
        let (base, _log) = spawn_site("200 OK", CHAIN_BODY).await;
        let analyzer = Analyzer::new(ChainFetcher::new(session_on(&base)));

        let report = analyzer.analyze("ongc").await;
        assert!(report.contains("Option Chain Summary for *ONGC*"));
        assert!(report.contains("28-Nov-2024"));
        assert!(report.contains("18050.00"));
        assert!(report.contains("`1.14`"));
    }
}

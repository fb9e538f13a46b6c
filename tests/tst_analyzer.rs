use nse_oc_bot::{
    render_report, summarize, MarketBias, OptionChain, OptionData, OptionSide,
};

fn side(oi: Option<f64>) -> Option<OptionSide> {
    Some(OptionSide { open_interest: oi })
}

fn strike(price: Option<f64>, ce: Option<f64>, pe: Option<f64>) -> OptionData {
    OptionData {
        strike_price: price,
        call: side(ce),
        put: side(pe),
    }
}

fn sample_chain() -> OptionChain {
    OptionChain {
        underlying_value: 18050.0,
        expiry_dates: vec!["28-Nov-2024".to_string(), "05-Dec-2024".to_string()],
        data: vec![
            strike(Some(18000.0), Some(500.0), Some(1200.0)),
            strike(Some(18100.0), Some(900.0), Some(400.0)),
        ],
    }
}

const CUTOFFS: (f64, f64) = (0.7, 1.3);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_chain_summary() {
        let summary = summarize(&sample_chain(), CUTOFFS).unwrap();

        assert_eq!(summary.total_call_oi, 1400.0);
        assert_eq!(summary.total_put_oi, 1600.0);
        assert_eq!(summary.pcr, 1.14);
        assert_eq!(summary.max_call.strike, Some(18100.0));
        assert_eq!(summary.max_call.oi, 900.0);
        assert_eq!(summary.max_put.strike, Some(18000.0));
        assert_eq!(summary.max_put.oi, 1200.0);
        assert_eq!(summary.bias, MarketBias::Neutral);
        assert_eq!(summary.underlying, 18050.0);
        // First expiry in the list is used, order trusted as provided.
        assert_eq!(summary.expiry, "28-Nov-2024");
    }

    #[test]
    fn test_totals_bound_the_maxima() {
        let summary = summarize(&sample_chain(), CUTOFFS).unwrap();
        assert!(summary.total_call_oi >= summary.max_call.oi);
        assert!(summary.total_put_oi >= summary.max_put.oi);
    }

    #[test]
    fn test_zero_and_missing_strikes_are_discarded() {
        let chain = OptionChain {
            underlying_value: 100.0,
            expiry_dates: vec!["28-Nov-2024".to_string()],
            data: vec![
                strike(Some(0.0), Some(9999.0), Some(9999.0)),
                strike(None, Some(9999.0), Some(9999.0)),
                strike(Some(100.0), Some(10.0), Some(20.0)),
            ],
        };

        let summary = summarize(&chain, CUTOFFS).unwrap();
        assert_eq!(summary.total_call_oi, 10.0);
        assert_eq!(summary.total_put_oi, 20.0);
        assert_eq!(summary.max_call.strike, Some(100.0));
    }

    #[test]
    fn test_no_valid_strikes_yields_none() {
        let chain = OptionChain {
            underlying_value: 100.0,
            expiry_dates: vec!["28-Nov-2024".to_string()],
            data: vec![
                strike(Some(0.0), Some(500.0), Some(500.0)),
                strike(None, None, None),
            ],
        };
        assert!(summarize(&chain, CUTOFFS).is_none());
    }

    #[test]
    fn test_pcr_is_zero_without_call_oi() {
        let chain = OptionChain {
            underlying_value: 100.0,
            expiry_dates: vec!["28-Nov-2024".to_string()],
            data: vec![strike(Some(100.0), None, Some(750.0))],
        };

        let summary = summarize(&chain, CUTOFFS).unwrap();
        assert_eq!(summary.total_call_oi, 0.0);
        assert_eq!(summary.total_put_oi, 750.0);
        // Defined as exactly 0, not an error and not NaN.
        assert_eq!(summary.pcr, 0.0);
        assert_eq!(summary.bias, MarketBias::Bearish);
        // No call strike ever took the max slot.
        assert_eq!(summary.max_call.strike, None);
    }

    #[test]
    fn test_first_seen_wins_on_ties() {
        let chain = OptionChain {
            underlying_value: 100.0,
            expiry_dates: vec!["28-Nov-2024".to_string()],
            data: vec![
                strike(Some(100.0), Some(500.0), Some(300.0)),
                strike(Some(110.0), Some(500.0), Some(300.0)),
            ],
        };

        let summary = summarize(&chain, CUTOFFS).unwrap();
        assert_eq!(summary.max_call.strike, Some(100.0));
        assert_eq!(summary.max_put.strike, Some(100.0));
    }

    #[test]
    fn test_one_strike_can_hold_both_maxima() {
        let chain = OptionChain {
            underlying_value: 100.0,
            expiry_dates: vec!["28-Nov-2024".to_string()],
            data: vec![
                strike(Some(100.0), Some(900.0), Some(1200.0)),
                strike(Some(110.0), Some(100.0), Some(100.0)),
            ],
        };

        let summary = summarize(&chain, CUTOFFS).unwrap();
        assert_eq!(summary.max_call.strike, Some(100.0));
        assert_eq!(summary.max_put.strike, Some(100.0));
    }

    #[test]
    fn test_render_contains_every_field() {
        let summary = summarize(&sample_chain(), CUTOFFS).unwrap();
        let report = render_report("ONGC", &summary);

        assert!(report.contains("ONGC"));
        assert!(report.contains("28-Nov-2024"));
        assert!(report.contains("18050.00"));
        assert!(report.contains("₹18100 (900)"));
        assert!(report.contains("₹18000 (1,200)"));
        assert!(report.contains("1.14"));
        assert!(report.contains(MarketBias::Neutral.label()));
        assert!(report.contains("Not for trading advice"));
    }

    #[test]
    fn test_render_is_deterministic() {
        let chain = sample_chain();
        let a = render_report("ONGC", &summarize(&chain, CUTOFFS).unwrap());
        let b = render_report("ONGC", &summarize(&chain, CUTOFFS).unwrap());
        assert_eq!(a, b);
    }

    #[test]
    fn test_bias_monotonic_in_pcr() {
        let mut last = MarketBias::Bearish;
        for i in 0..60 {
            let pcr = i as f64 * 0.05;
            let bias = MarketBias::classify(pcr, CUTOFFS);
            let rank = |b: &MarketBias| match b {
                MarketBias::Bearish => 0,
                MarketBias::Neutral => 1,
                MarketBias::Bullish => 2,
            };
            assert!(rank(&bias) >= rank(&last), "bias flipped backwards at pcr {pcr}");
            last = bias;
        }
    }
}

//! End-to-end checks of the indicator -> scorer pipeline through the
//! public API, without network access.

use token_oracle::analysis::indicators::Indicators;
use token_oracle::analysis::prediction::{self, Confidence, Direction};
use token_oracle::models::{Candle, PriceSeries, SeriesSource};
use token_oracle::Error;

fn series(closes: &[f64], volumes: &[f64], source: SeriesSource) -> PriceSeries {
    let candles = closes
        .iter()
        .zip(volumes)
        .enumerate()
        .map(|(i, (&close, &volume))| {
            let open = if i == 0 { close } else { closes[i - 1] };
            Candle {
                timestamp: 1_700_000_000_000 + (i as i64) * 3_600_000,
                open,
                high: open.max(close) * 1.01,
                low: open.min(close) * 0.99,
                close,
                volume,
            }
        })
        .collect();
    PriceSeries { candles, source }
}

#[test]
fn nineteen_candles_fail_indicator_computation() {
    let closes: Vec<f64> = (1..=19).map(|i| i as f64).collect();
    let volumes = vec![100.0; 19];
    let err = Indicators::compute(&series(&closes, &volumes, SeriesSource::Observed)).unwrap_err();
    assert!(matches!(err, Error::InsufficientData(_)));
}

#[test]
fn oversold_dip_on_rising_volume_scores_bullish() {
    // A long uptrend followed by a sharp pullback: RSI drops while the
    // moving averages still point up.
    let mut closes: Vec<f64> = (0..55).map(|i| 100.0 + (i as f64) * 1.5).collect();
    for (step, close) in closes.iter_mut().skip(50).enumerate() {
        *close -= 12.0 * (step as f64 + 1.0);
    }
    let mut volumes = vec![1_000.0; 55];
    volumes[54] = 2_500.0;

    let series = series(&closes, &volumes, SeriesSource::Observed);
    let indicators = Indicators::compute(&series).unwrap();
    let current_price = closes[54];

    let result = prediction::score(&indicators, current_price);

    // Whatever the exact tally, the contract invariants must hold.
    assert!(result.score <= 100);
    assert!(!result.reasoning.is_empty());
    let target = result.price_target.expect("targets are always derived");
    assert!(target.short >= current_price * 0.1 && target.short <= current_price * 10.0);
    assert!(target.medium >= current_price * 0.1 && target.medium <= current_price * 10.0);

    // Identical inputs must reproduce the identical result.
    assert_eq!(result, prediction::score(&indicators, current_price));
}

#[test]
fn degenerate_result_has_fixed_shape() {
    let result = prediction::insufficient_data();
    assert_eq!(result.score, 50);
    assert_eq!(result.direction, Direction::Neutral);
    assert_eq!(result.confidence, Confidence::Low);
    assert_eq!(result.timeframe, "1-24 hours");
    assert_eq!(result.reasoning.len(), 1);
    assert!(result.price_target.is_none());
}

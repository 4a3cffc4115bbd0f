//! Technical indicator computation over a closing-price sequence.
//!
//! Pure functions, no I/O. Windows that a short series cannot satisfy
//! default to the latest close (moving averages, bands) or a neutral
//! value (RSI 50, MACD 0) so the scorer never sees an undefined input.

use crate::error::{Error, Result};
use crate::models::PriceSeries;
use serde::{Deserialize, Serialize};

/// Hard floor: below this the engine refuses to compute at all.
pub const MIN_CANDLES: usize = 20;

const RSI_PERIOD: usize = 14;
const MACD_FAST: usize = 12;
const MACD_SLOW: usize = 26;
const MACD_SIGNAL: usize = 9;
const SMA_SHORT: usize = 20;
const SMA_LONG: usize = 50;
const EMA_FAST: usize = 12;
const EMA_SLOW: usize = 26;
const BOLLINGER_PERIOD: usize = 20;
const BOLLINGER_STD: f64 = 2.0;
const VOLUME_WINDOW: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Macd {
    pub macd: f64,
    pub signal: f64,
    pub histogram: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BollingerBands {
    pub upper: f64,
    pub middle: f64,
    pub lower: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VolumeProfile {
    pub current: f64,
    pub average: f64,
    pub ratio: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Indicators {
    pub rsi: f64,
    pub macd: Macd,
    pub sma_20: f64,
    pub sma_50: f64,
    pub ema_12: f64,
    pub ema_26: f64,
    pub bollinger: BollingerBands,
    pub volume: VolumeProfile,
}

impl Indicators {
    pub fn compute(series: &PriceSeries) -> Result<Self> {
        if series.len() < MIN_CANDLES {
            return Err(Error::InsufficientData(format!(
                "{} candles, need at least {}",
                series.len(),
                MIN_CANDLES
            )));
        }

        let closes = series.closes();
        let volumes = series.volumes();
        let latest_close = closes[closes.len() - 1];

        let macd_series = macd_line_series(&closes, MACD_FAST, MACD_SLOW);
        let macd = match macd_series.last() {
            None => Macd {
                macd: 0.0,
                signal: 0.0,
                histogram: 0.0,
            },
            Some(&line) => match sma(&macd_series, MACD_SIGNAL) {
                Some(signal) => Macd {
                    macd: line,
                    signal,
                    histogram: line - signal,
                },
                None => Macd {
                    macd: line,
                    signal: 0.0,
                    histogram: 0.0,
                },
            },
        };

        let current_volume = volumes[volumes.len() - 1];
        let average_volume = sma(&volumes, VOLUME_WINDOW).unwrap_or_default();
        let ratio = if average_volume > 0.0 {
            current_volume / average_volume
        } else {
            0.0
        };

        let (upper, middle, lower) = bollinger(&closes, BOLLINGER_PERIOD, BOLLINGER_STD)
            .unwrap_or((latest_close, latest_close, latest_close));

        Ok(Self {
            rsi: rsi(&closes, RSI_PERIOD).unwrap_or(50.0),
            macd,
            sma_20: sma(&closes, SMA_SHORT).unwrap_or(latest_close),
            sma_50: sma(&closes, SMA_LONG).unwrap_or(latest_close),
            ema_12: ema(&closes, EMA_FAST).unwrap_or(latest_close),
            ema_26: ema(&closes, EMA_SLOW).unwrap_or(latest_close),
            bollinger: BollingerBands {
                upper,
                middle,
                lower,
            },
            volume: VolumeProfile {
                current: current_volume,
                average: average_volume,
                ratio,
            },
        })
    }
}

/// Simple moving average over the trailing `period` values.
pub(crate) fn sma(values: &[f64], period: usize) -> Option<f64> {
    if period == 0 || values.len() < period {
        return None;
    }
    Some(values[values.len() - period..].iter().sum::<f64>() / period as f64)
}

/// Rolling SMA, one output per complete window.
fn sma_series(values: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || values.len() < period {
        return Vec::new();
    }
    values
        .windows(period)
        .map(|w| w.iter().sum::<f64>() / period as f64)
        .collect()
}

/// Exponential moving average seeded with the SMA of the first
/// `period` values, multiplier `2 / (period + 1)`.
pub(crate) fn ema(values: &[f64], period: usize) -> Option<f64> {
    if period == 0 || values.len() < period {
        return None;
    }
    let k = 2.0 / (period as f64 + 1.0);
    let mut ema = values[..period].iter().sum::<f64>() / period as f64;
    for &value in &values[period..] {
        ema = value * k + ema * (1.0 - k);
    }
    Some(ema)
}

/// RSI with Wilder's smoothing (factor `1/period`).
pub(crate) fn rsi(values: &[f64], period: usize) -> Option<f64> {
    if period == 0 || values.len() < period + 1 {
        return None;
    }
    let changes: Vec<f64> = values.windows(2).map(|w| w[1] - w[0]).collect();
    let period_f = period as f64;

    let mut avg_gain = changes[..period]
        .iter()
        .map(|&c| if c > 0.0 { c } else { 0.0 })
        .sum::<f64>()
        / period_f;
    let mut avg_loss = changes[..period]
        .iter()
        .map(|&c| if c < 0.0 { -c } else { 0.0 })
        .sum::<f64>()
        / period_f;

    for &change in &changes[period..] {
        let (gain, loss) = if change > 0.0 {
            (change, 0.0)
        } else {
            (0.0, -change)
        };
        avg_gain = (avg_gain * (period_f - 1.0) + gain) / period_f;
        avg_loss = (avg_loss * (period_f - 1.0) + loss) / period_f;
    }

    if avg_loss == 0.0 {
        return Some(100.0);
    }
    let rs = avg_gain / avg_loss;
    Some(100.0 - 100.0 / (1.0 + rs))
}

/// MACD oscillator line series using simple moving averages for both
/// legs, aligned on the slow window.
fn macd_line_series(values: &[f64], fast: usize, slow: usize) -> Vec<f64> {
    let fast_series = sma_series(values, fast);
    let slow_series = sma_series(values, slow);
    if slow_series.is_empty() {
        return Vec::new();
    }
    let offset = slow - fast;
    slow_series
        .iter()
        .enumerate()
        .map(|(i, s)| fast_series[i + offset] - s)
        .collect()
}

/// Bollinger `(upper, middle, lower)` with a population standard
/// deviation envelope.
fn bollinger(values: &[f64], period: usize, num_std: f64) -> Option<(f64, f64, f64)> {
    if period == 0 || values.len() < period {
        return None;
    }
    let window = &values[values.len() - period..];
    let mean = window.iter().sum::<f64>() / period as f64;
    let variance = window.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / period as f64;
    let band = num_std * variance.sqrt();
    Some((mean + band, mean, mean - band))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::common::series_from_closes;

    #[test]
    fn test_fewer_than_twenty_candles_is_a_hard_failure() {
        let closes: Vec<f64> = (1..=19).map(|i| i as f64).collect();
        let err = Indicators::compute(&series_from_closes(&closes, 100.0)).unwrap_err();
        assert!(matches!(err, Error::InsufficientData(_)));
    }

    #[test]
    fn test_exactly_twenty_candles_uses_window_fallbacks() {
        let closes: Vec<f64> = (1..=20).map(|i| i as f64).collect();
        let indicators = Indicators::compute(&series_from_closes(&closes, 100.0)).unwrap();

        // SMA-50, EMA-26 and MACD windows cannot be satisfied by 20
        // samples; they must fall back, not crash.
        assert_eq!(indicators.sma_50, 20.0);
        assert_eq!(indicators.ema_26, 20.0);
        assert_eq!(indicators.macd.macd, 0.0);
        assert_eq!(indicators.macd.signal, 0.0);
        assert_eq!(indicators.macd.histogram, 0.0);

        // The 20-wide windows are fully defined.
        assert!((indicators.sma_20 - 10.5).abs() < 1e-9);
        assert!((indicators.bollinger.middle - 10.5).abs() < 1e-9);
        assert!(indicators.bollinger.upper > indicators.bollinger.middle);
        assert!(indicators.bollinger.lower < indicators.bollinger.middle);

        // Strictly rising closes max out Wilder's RSI.
        assert_eq!(indicators.rsi, 100.0);
    }

    #[test]
    fn test_macd_defined_on_long_series() {
        let closes: Vec<f64> = (0..60).map(|i| 100.0 + (i as f64) * 0.5).collect();
        let indicators = Indicators::compute(&series_from_closes(&closes, 100.0)).unwrap();
        // A steady uptrend keeps the fast average above the slow one.
        assert!(indicators.macd.macd > 0.0);
        assert!(indicators.macd.signal > 0.0);
        assert!(
            (indicators.macd.histogram - (indicators.macd.macd - indicators.macd.signal)).abs()
                < 1e-12
        );
    }

    #[test]
    fn test_sma_over_trailing_window() {
        assert_eq!(sma(&[1.0, 2.0, 3.0, 4.0, 5.0], 5), Some(3.0));
        assert_eq!(sma(&[1.0, 2.0, 3.0, 4.0, 5.0], 2), Some(4.5));
        assert_eq!(sma(&[1.0], 2), None);
    }

    #[test]
    fn test_ema_tracks_recent_values_more_closely() {
        let values: Vec<f64> = vec![10.0; 10]
            .into_iter()
            .chain(vec![20.0; 10])
            .collect();
        let ema_val = ema(&values, 5).unwrap();
        let sma_val = sma(&values, 20).unwrap();
        assert!(ema_val > sma_val);
        assert!(ema_val <= 20.0);
    }

    #[test]
    fn test_rsi_extremes() {
        let rising: Vec<f64> = (1..=30).map(|i| i as f64).collect();
        assert_eq!(rsi(&rising, 14), Some(100.0));

        let falling: Vec<f64> = (1..=30).rev().map(|i| i as f64).collect();
        let value = rsi(&falling, 14).unwrap();
        assert!(value < 1.0);
    }

    #[test]
    fn test_bollinger_is_symmetric_around_mean() {
        let values: Vec<f64> = (1..=20).map(|i| i as f64).collect();
        let (upper, middle, lower) = bollinger(&values, 20, 2.0).unwrap();
        assert!((middle - 10.5).abs() < 1e-9);
        assert!(((upper - middle) - (middle - lower)).abs() < 1e-9);
    }

    #[test]
    fn test_volume_ratio_against_trailing_average() {
        let closes: Vec<f64> = (1..=20).map(|i| i as f64).collect();
        let mut series = series_from_closes(&closes, 100.0);
        // Spike the most recent candle to twice the window average
        // of the remaining candles.
        let last = series.candles.len() - 1;
        series.candles[last].volume = 290.0;
        // Window sum: 19 * 100 + 290 = 2190, average 109.5.
        let indicators = Indicators::compute(&series).unwrap();
        assert!((indicators.volume.average - 109.5).abs() < 1e-9);
        assert!((indicators.volume.ratio - 290.0 / 109.5).abs() < 1e-9);
    }
}

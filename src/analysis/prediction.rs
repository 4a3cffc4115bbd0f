//! Heuristic scoring model: turns an indicator snapshot and the
//! current price into a bounded directional prediction.
//!
//! The rule order is a contract - reasoning strings are appended in
//! exactly the order the rules are listed here.

use crate::analysis::indicators::Indicators;
use serde::{Deserialize, Serialize};

pub const TIMEFRAME: &str = "1-24 hours";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Bullish,
    Bearish,
    Neutral,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceTarget {
    pub short: f64,
    pub medium: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// 0-100; 50 is neutral.
    pub score: u8,
    pub direction: Direction,
    pub confidence: Confidence,
    pub timeframe: String,
    pub reasoning: Vec<String>,
    pub price_target: Option<PriceTarget>,
    /// True when the underlying series was fabricated by the
    /// synthetic history fallback.
    pub synthetic: bool,
}

/// Deterministic additive scoring from a neutral baseline of 50.
pub fn score(indicators: &Indicators, current_price: f64) -> Prediction {
    let mut reasoning: Vec<String> = Vec::new();
    let mut score: i32 = 50;
    let mut bullish: u32 = 0;
    let mut bearish: u32 = 0;

    // RSI
    if indicators.rsi < 30.0 {
        score += 15;
        bullish += 1;
        reasoning.push(format!(
            "RSI oversold ({:.1}) - potential bounce",
            indicators.rsi
        ));
    } else if indicators.rsi > 70.0 {
        score -= 15;
        bearish += 1;
        reasoning.push(format!(
            "RSI overbought ({:.1}) - potential pullback",
            indicators.rsi
        ));
    } else if indicators.rsi > 50.0 {
        score += 5;
        bullish += 1;
        reasoning.push(format!("RSI bullish ({:.1})", indicators.rsi));
    } else {
        score -= 5;
        bearish += 1;
        reasoning.push(format!("RSI bearish ({:.1})", indicators.rsi));
    }

    // MACD crossover
    if indicators.macd.macd > indicators.macd.signal {
        score += 10;
        bullish += 1;
        reasoning.push("MACD bullish crossover".to_string());
    } else {
        score -= 10;
        bearish += 1;
        reasoning.push("MACD bearish crossover".to_string());
    }

    // MACD histogram
    if indicators.macd.histogram > 0.0 {
        score += 5;
        bullish += 1;
        reasoning.push("MACD histogram positive".to_string());
    } else {
        score -= 5;
        bearish += 1;
        reasoning.push("MACD histogram negative".to_string());
    }

    // Moving average trend
    if indicators.sma_20 > indicators.sma_50 {
        score += 10;
        bullish += 1;
        reasoning.push("SMA 20 > SMA 50 - uptrend".to_string());
    } else {
        score -= 10;
        bearish += 1;
        reasoning.push("SMA 20 < SMA 50 - downtrend".to_string());
    }

    // Price versus the short moving average
    if current_price > indicators.sma_20 {
        score += 8;
        bullish += 1;
        reasoning.push("Price above SMA 20".to_string());
    } else {
        score -= 8;
        bearish += 1;
        reasoning.push("Price below SMA 20".to_string());
    }

    // Bollinger Bands
    if current_price < indicators.bollinger.lower {
        score += 12;
        bullish += 1;
        reasoning.push("Price below lower Bollinger Band - oversold".to_string());
    } else if current_price > indicators.bollinger.upper {
        score -= 12;
        bearish += 1;
        reasoning.push("Price above upper Bollinger Band - overbought".to_string());
    } else if current_price > indicators.bollinger.middle {
        score += 5;
        bullish += 1;
        reasoning.push("Price above middle Bollinger Band".to_string());
    } else {
        score -= 5;
        bearish += 1;
        reasoning.push("Price below middle Bollinger Band".to_string());
    }

    // Volume
    if indicators.volume.ratio > 1.5 {
        score += 8;
        bullish += 1;
        reasoning.push(format!(
            "High volume ({:.1}x average) - strong interest",
            indicators.volume.ratio
        ));
    } else if indicators.volume.ratio < 0.5 {
        score -= 5;
        bearish += 1;
        reasoning.push(format!(
            "Low volume ({:.1}x average) - weak interest",
            indicators.volume.ratio
        ));
    }

    let (direction, confidence) = if bullish > bearish + 2 {
        (
            Direction::Bullish,
            if bullish > bearish + 4 {
                Confidence::High
            } else {
                Confidence::Medium
            },
        )
    } else if bearish > bullish + 2 {
        (
            Direction::Bearish,
            if bearish > bullish + 4 {
                Confidence::High
            } else {
                Confidence::Medium
            },
        )
    } else {
        (Direction::Neutral, Confidence::Low)
    };

    Prediction {
        score: score.clamp(0, 100) as u8,
        direction,
        confidence,
        timeframe: TIMEFRAME.to_string(),
        reasoning,
        price_target: Some(price_targets(current_price, indicators.rsi, direction)),
        synthetic: false,
    }
}

/// The fixed degenerate result for series under the indicator floor.
/// None of the scoring rules run.
pub fn insufficient_data() -> Prediction {
    Prediction {
        score: 50,
        direction: Direction::Neutral,
        confidence: Confidence::Low,
        timeframe: TIMEFRAME.to_string(),
        reasoning: vec!["Insufficient price history for technical analysis".to_string()],
        price_target: None,
        synthetic: false,
    }
}

/// Volatility heuristic banded by price magnitude, scaled by the RSI's
/// distance from neutral, applied at 30%/60% for the short and medium
/// targets. Targets never leave [0.1x, 10x] of the current price.
fn price_targets(current_price: f64, rsi: f64, direction: Direction) -> PriceTarget {
    let base_volatility = if current_price < 0.001 {
        0.15
    } else if current_price < 0.01 {
        0.10
    } else if current_price < 1.0 {
        0.08
    } else {
        0.05
    };

    let rsi_adjustment = (rsi - 50.0).abs() / 50.0;
    let adjusted_volatility = base_volatility * (0.5 + rsi_adjustment);

    let short_move = current_price * adjusted_volatility * 0.3;
    let medium_move = current_price * adjusted_volatility * 0.6;

    let (short, medium) = match direction {
        Direction::Bullish => (current_price + short_move, current_price + medium_move),
        Direction::Bearish => (current_price - short_move, current_price - medium_move),
        Direction::Neutral => (
            current_price + short_move * 0.5,
            current_price - short_move * 0.5,
        ),
    };

    PriceTarget {
        short: short.clamp(current_price * 0.1, current_price * 10.0),
        medium: medium.clamp(current_price * 0.1, current_price * 10.0),
    }
}

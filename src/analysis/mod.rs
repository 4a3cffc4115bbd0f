pub mod indicators;
pub mod prediction;

pub use indicators::{Indicators, MIN_CANDLES};
pub use prediction::{Confidence, Direction, Prediction, PriceTarget};

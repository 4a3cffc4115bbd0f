pub mod market;

pub use market::{Candle, Platform, PriceSeries, SeriesSource, TokenSnapshot};

//! Technical indicators computed over close-price series

mod rsi;

pub use rsi::{compute_rsi, DEFAULT_RSI_PERIOD};

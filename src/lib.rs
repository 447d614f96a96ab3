//! DivBot Library
//!
//! RSI pivot-divergence monitor for Binance futures candles

pub mod config;
pub mod divergence;
pub mod error;
pub mod indicators;
pub mod market_data;
pub mod monitor;
pub mod notify;
pub mod types;

//! Binance USDT-M futures REST client for historical klines

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use reqwest::StatusCode;
use serde_json::Value;
use std::time::Duration;

use crate::error::FetchError;
use crate::market_data::MarketData;
use crate::types::{PricePoint, Timeframe};

pub const DEFAULT_FUTURES_BASE_URL: &str = "https://fapi.binance.com";
const KLINES_PATH: &str = "/fapi/v1/klines";

#[derive(Debug, Clone)]
pub struct BinanceFuturesClient {
    client: reqwest::Client,
    base_url: String,
}

impl BinanceFuturesClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn klines_url(&self) -> String {
        format!("{}{}", self.base_url, KLINES_PATH)
    }
}

#[async_trait]
impl MarketData for BinanceFuturesClient {
    fn name(&self) -> &'static str {
        "Binance Futures"
    }

    async fn fetch_closes(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        limit: usize,
    ) -> Result<Vec<PricePoint>, FetchError> {
        let url = self.klines_url();

        tracing::debug!(
            symbol = %symbol,
            timeframe = %timeframe,
            limit,
            url = %url,
            "📥 Fetching klines from Binance..."
        );

        let response = self
            .client
            .get(&url)
            .query(&[
                ("symbol", symbol.to_string()),
                ("interval", timeframe.as_str().to_string()),
                ("limit", limit.to_string()),
            ])
            .send()
            .await
            .map_err(|source| FetchError::Transport {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|source| FetchError::Transport {
                url: url.clone(),
                source,
            })?;

        let points = decode_klines_response(status, body)?;

        tracing::debug!(
            symbol = %symbol,
            timeframe = %timeframe,
            count = points.len(),
            "✅ Klines fetched"
        );

        Ok(points)
    }
}

/// Turn a klines HTTP response into points; non-2xx keeps the body for the log
fn decode_klines_response(status: StatusCode, body: String) -> Result<Vec<PricePoint>, FetchError> {
    if !status.is_success() {
        return Err(FetchError::Status { status, body });
    }

    // [[open_time, open, high, low, close, volume, close_time, ...], ...]
    let klines: Vec<Vec<Value>> = serde_json::from_str(&body)?;
    parse_klines(&klines)
}

/// Reduce raw kline rows to (open time, close) points.
///
/// Any row that is too short or carries an unparsable open time or close
/// rejects the whole payload.
pub fn parse_klines(klines: &[Vec<Value>]) -> Result<Vec<PricePoint>, FetchError> {
    klines
        .iter()
        .enumerate()
        .map(|(row, kline)| {
            if kline.len() < 5 {
                return Err(FetchError::Malformed(format!(
                    "row {row} has {} fields, expected at least 5",
                    kline.len()
                )));
            }

            let open_time = kline[0]
                .as_i64()
                .ok_or_else(|| FetchError::Malformed(format!("row {row}: bad open time")))?;
            let timestamp = Utc
                .timestamp_millis_opt(open_time)
                .single()
                .ok_or_else(|| {
                    FetchError::Malformed(format!("row {row}: open time {open_time} out of range"))
                })?;

            // Prices arrive as decimal strings; accept bare numbers too
            let close = match &kline[4] {
                Value::String(s) => s.parse::<f64>().ok(),
                other => other.as_f64(),
            }
            .filter(|c| c.is_finite())
            .ok_or_else(|| FetchError::Malformed(format!("row {row}: bad close price")))?;

            Ok(PricePoint { timestamp, close })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rows(value: Value) -> Vec<Vec<Value>> {
        serde_json::from_value(value).expect("fixture should be an array of arrays")
    }

    #[test]
    fn parses_open_time_and_close() {
        let klines = rows(json!([
            [1_700_000_000_000_i64, "100.0", "101.0", "99.0", "100.5", "12.3", 1_700_000_899_999_i64, "0", 10, "0", "0", "0"],
            [1_700_000_900_000_i64, "100.5", "102.0", "100.0", "101.75", "8.1", 1_700_001_799_999_i64, "0", 7, "0", "0", "0"]
        ]));

        let points = parse_klines(&klines).expect("valid payload");
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].timestamp.timestamp_millis(), 1_700_000_000_000);
        assert_eq!(points[0].close, 100.5);
        assert_eq!(points[1].close, 101.75);
        assert!(points[0].timestamp < points[1].timestamp);
    }

    #[test]
    fn short_row_rejects_payload() {
        let klines = rows(json!([[1_700_000_000_000_i64, "1", "2"]]));
        let err = parse_klines(&klines).unwrap_err();
        assert!(matches!(err, FetchError::Malformed(_)));
    }

    #[test]
    fn unparsable_close_rejects_payload() {
        let klines = rows(json!([
            [1_700_000_000_000_i64, "1", "2", "0.5", "1.5"],
            [1_700_000_900_000_i64, "1", "2", "0.5", "n/a"]
        ]));
        let err = parse_klines(&klines).unwrap_err();
        assert!(err.to_string().contains("row 1"));
    }

    #[test]
    fn empty_payload_is_empty_series() {
        assert!(parse_klines(&[]).expect("empty is valid").is_empty());
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let client = BinanceFuturesClient::new("https://example.test/", Duration::from_secs(1))
            .expect("client should build");
        assert_eq!(client.klines_url(), "https://example.test/fapi/v1/klines");
    }

    #[test]
    fn error_status_keeps_exchange_body() {
        let body = r#"{"code":-1121,"msg":"Invalid symbol."}"#.to_string();
        match decode_klines_response(StatusCode::BAD_REQUEST, body) {
            Err(FetchError::Status { status, body }) => {
                assert_eq!(status, StatusCode::BAD_REQUEST);
                assert!(body.contains("Invalid symbol."));
            }
            other => panic!("expected status error, got {:?}", other),
        }
    }

    #[test]
    fn success_status_with_non_array_body_is_decode_error() {
        let result = decode_klines_response(StatusCode::OK, "<html>maintenance</html>".to_string());
        assert!(matches!(result, Err(FetchError::Decode(_))));
    }

    #[test]
    fn success_status_decodes_rows() {
        let body = r#"[[1700000000000,"1.0","2.0","0.5","1.5","10",1700000899999]]"#.to_string();
        let points = decode_klines_response(StatusCode::OK, body).expect("valid payload");
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].close, 1.5);
    }
}

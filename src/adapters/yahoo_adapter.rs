//! Yahoo Finance adapter.
//!
//! Price history comes from the v8 chart API, queried by range and interval.
//! Headlines come from the v1 search API. Both calls retry transient failures
//! with exponential backoff.

use crate::domain::error::QuantsignalError;
use crate::domain::ohlcv::PriceBar;
use crate::domain::price_series::PriceSeries;
use crate::ports::data_port::{DataPort, FetchRequest};
use crate::ports::news_port::NewsPort;
use reqwest::Url;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::time::Duration;

const BASE_URL: &str = "https://query2.finance.yahoo.com";
const NEWS_COUNT: usize = 10;

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartResult,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    result: Option<Vec<ChartData>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<QuoteData>,
}

#[derive(Debug, Deserialize)]
struct QuoteData {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    news: Vec<NewsItem>,
}

#[derive(Debug, Deserialize)]
struct NewsItem {
    #[serde(default)]
    title: String,
}

pub struct YahooAdapter {
    client: reqwest::blocking::Client,
    base_url: String,
    max_retries: u32,
    base_delay: Duration,
}

impl YahooAdapter {
    pub fn new() -> Result<Self, QuantsignalError> {
        Self::with_base_url(BASE_URL)
    }

    pub fn with_base_url(base_url: &str) -> Result<Self, QuantsignalError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent("Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36")
            .build()
            .map_err(|e| QuantsignalError::DataSource {
                reason: format!("failed to build HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            max_retries: 3,
            base_delay: Duration::from_millis(500),
        })
    }

    /// Base URL plus path segments, each percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, QuantsignalError> {
        let invalid = || QuantsignalError::DataSource {
            reason: format!("invalid base URL {}", self.base_url),
        };
        let mut url = Url::parse(&self.base_url).map_err(|_| invalid())?;
        url.path_segments_mut()
            .map_err(|_| invalid())?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    pub fn chart_url(&self, symbol: &str, request: &FetchRequest) -> Result<Url, QuantsignalError> {
        let mut url = self.endpoint(&["v8", "finance", "chart", symbol])?;
        url.query_pairs_mut()
            .append_pair("range", &request.period)
            .append_pair("interval", &request.interval);
        Ok(url)
    }

    pub fn search_url(&self, symbol: &str) -> Result<Url, QuantsignalError> {
        let mut url = self.endpoint(&["v1", "finance", "search"])?;
        url.query_pairs_mut()
            .append_pair("q", symbol)
            .append_pair("newsCount", &NEWS_COUNT.to_string());
        Ok(url)
    }

    fn get_json<T: DeserializeOwned>(&self, url: &Url) -> Result<T, QuantsignalError> {
        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let delay = self.base_delay * 2u32.pow(attempt - 1);
                tracing::debug!(%url, attempt, ?delay, "retrying request");
                std::thread::sleep(delay);
            }

            match self.client.get(url.clone()).send() {
                Ok(resp) => {
                    let status = resp.status();

                    if status == reqwest::StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
                        last_error = Some(format!("HTTP {} from {}", status, url));
                        continue;
                    }

                    if !status.is_success() {
                        return Err(QuantsignalError::DataSource {
                            reason: format!("HTTP {} from {}", status, url),
                        });
                    }

                    return resp.json().map_err(|e| QuantsignalError::DataSource {
                        reason: format!("failed to parse response from {}: {}", url, e),
                    });
                }
                Err(e) if e.is_connect() || e.is_timeout() => {
                    last_error = Some(e.to_string());
                }
                Err(e) => {
                    return Err(QuantsignalError::DataSource {
                        reason: e.to_string(),
                    });
                }
            }
        }

        Err(QuantsignalError::DataSource {
            reason: last_error.unwrap_or_else(|| "max retries exceeded".into()),
        })
    }
}

fn parse_chart(symbol: &str, resp: ChartResponse) -> Result<Vec<PriceBar>, QuantsignalError> {
    let format_changed = |reason: &str| QuantsignalError::DataSource {
        reason: format!("unexpected chart response for {}: {}", symbol, reason),
    };

    let result = match resp.chart.result {
        Some(result) => result,
        None => {
            return Err(match resp.chart.error {
                Some(err) if err.code == "Not Found" => QuantsignalError::NoData {
                    symbol: symbol.to_string(),
                },
                Some(err) => QuantsignalError::DataSource {
                    reason: format!("{}: {}", err.code, err.description),
                },
                None => format_changed("empty result with no error"),
            });
        }
    };

    let data = result
        .into_iter()
        .next()
        .ok_or_else(|| format_changed("result array is empty"))?;

    // A symbol with no trading history in the range has no timestamp array.
    let Some(timestamps) = data.timestamp else {
        return Err(QuantsignalError::NoData {
            symbol: symbol.to_string(),
        });
    };

    let quote = data
        .indicators
        .quote
        .into_iter()
        .next()
        .ok_or_else(|| format_changed("no quote data"))?;

    let mut bars = Vec::with_capacity(timestamps.len());
    for (i, &ts) in timestamps.iter().enumerate() {
        let timestamp = chrono::DateTime::from_timestamp(ts, 0)
            .map(|dt| dt.naive_utc())
            .ok_or_else(|| format_changed(&format!("invalid timestamp {}", ts)))?;

        let open = quote.open.get(i).copied().flatten();
        let high = quote.high.get(i).copied().flatten();
        let low = quote.low.get(i).copied().flatten();
        let close = quote.close.get(i).copied().flatten();
        let volume = quote.volume.get(i).copied().flatten();

        // Non-trading days come back with every field null.
        if open.is_none() && high.is_none() && low.is_none() && close.is_none() && volume.is_none() {
            continue;
        }

        bars.push(PriceBar {
            timestamp,
            open: open.unwrap_or(f64::NAN),
            high: high.unwrap_or(f64::NAN),
            low: low.unwrap_or(f64::NAN),
            close: close.unwrap_or(f64::NAN),
            volume: volume.unwrap_or(0.0),
        });
    }

    if bars.is_empty() {
        return Err(QuantsignalError::NoData {
            symbol: symbol.to_string(),
        });
    }
    Ok(bars)
}

fn parse_headlines(resp: SearchResponse) -> Vec<String> {
    resp.news
        .into_iter()
        .map(|n| n.title.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect()
}

impl DataPort for YahooAdapter {
    fn fetch_series(&self, symbol: &str, request: &FetchRequest) -> Result<PriceSeries, QuantsignalError> {
        let url = self.chart_url(symbol, request)?;
        let chart: ChartResponse = self.get_json(&url)?;
        let bars = parse_chart(symbol, chart)?;
        tracing::debug!(%symbol, bars = bars.len(), "fetched chart");
        Ok(PriceSeries::from_unsorted(bars))
    }
}

impl NewsPort for YahooAdapter {
    fn headlines(&self, symbol: &str) -> Result<Vec<String>, QuantsignalError> {
        let url = self.search_url(symbol)?;
        let search: SearchResponse = self.get_json(&url)?;
        Ok(parse_headlines(search))
    }
}

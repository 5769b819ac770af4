//! Baltic transparency dashboard export API.
//!
//! One blocking GET per series, no retries. Any failure comes back as a
//! `FetchError` and the caller decides what to skip.

use reqwest::blocking::Client;
use serde_json::Value;
use tracing::debug;

use crate::domain::{SeriesKind, TimeWindow};
use crate::error::{AppError, FetchError};

pub const DEFAULT_BASE_URL: &str = "https://api-baltic.transparency-dashboard.eu/api/v1/export";

const OUTPUT_TIME_ZONE: &str = "CET";
const OUTPUT_FORMAT: &str = "json";
const JSON_HEADER_GROUPS: &str = "0";

pub struct TransparencyClient {
    client: Client,
    base_url: String,
}

impl TransparencyClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, AppError> {
        let client = Client::builder()
            .build()
            .map_err(|e| AppError::new(2, format!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    /// Fetch one series for `window` and return the response's `data` value.
    pub fn fetch_series(&self, kind: SeriesKind, window: &TimeWindow) -> Result<Value, FetchError> {
        let series = kind.api_id();
        let params = query_params(kind, window);
        debug!(series, start = %params[1].1, end = %params[2].1, "requesting export");

        let resp = self
            .client
            .get(&self.base_url)
            .query(&params)
            .send()
            .map_err(|source| FetchError::Request { series, source })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status { series, status });
        }

        let body: Value = resp
            .json()
            .map_err(|source| FetchError::Decode { series, source })?;

        extract_data(body).ok_or(FetchError::MissingData { series })
    }
}

/// Query string for one series: UTC bounds widened by the fetch padding.
fn query_params(kind: SeriesKind, window: &TimeWindow) -> [(&'static str, String); 6] {
    [
        ("id", kind.api_id().to_string()),
        ("start_date", window.fetch_start_utc()),
        ("end_date", window.fetch_end_utc()),
        ("output_time_zone", OUTPUT_TIME_ZONE.to_string()),
        ("output_format", OUTPUT_FORMAT.to_string()),
        ("json_header_groups", JSON_HEADER_GROUPS.to_string()),
    ]
}

/// `Some(data)` when the body is an object with a `data` key.
fn extract_data(body: Value) -> Option<Value> {
    match body {
        Value::Object(mut map) => map.remove("data"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};
    use serde_json::json;

    fn window() -> TimeWindow {
        TimeWindow::default_fixed().unwrap()
    }

    #[test]
    fn query_params_use_padded_utc_window() {
        let params = query_params(SeriesKind::Activation, &window());
        assert_eq!(params[0], ("id", "normal_activations_total".to_string()));
        assert_eq!(params[1], ("start_date", "2024-09-22T19:00".to_string()));
        assert_eq!(params[2], ("end_date", "2024-09-29T01:00".to_string()));
        assert_eq!(params[3].1, "CET");
        assert_eq!(params[4].1, "json");
        assert_eq!(params[5].1, "0");
    }

    #[test]
    fn extract_data_requires_object_with_data_key() {
        assert_eq!(extract_data(json!({"data": {"timeseries": []}})), Some(json!({"timeseries": []})));
        assert_eq!(extract_data(json!({"other": 1})), None);
        assert_eq!(extract_data(json!([{"data": 1}])), None);
        assert_eq!(extract_data(json!(null)), None);
    }

    #[test]
    fn fetch_series_success() {
        let mut server = Server::new();
        let mock = server
            .mock("GET", "/export")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("id".into(), "imbalance_volumes".into()),
                Matcher::UrlEncoded("start_date".into(), "2024-09-22T19:00".into()),
                Matcher::UrlEncoded("end_date".into(), "2024-09-29T01:00".into()),
                Matcher::UrlEncoded("output_time_zone".into(), "CET".into()),
                Matcher::UrlEncoded("output_format".into(), "json".into()),
                Matcher::UrlEncoded("json_header_groups".into(), "0".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "data": {
                        "timeseries": [
                            {"from": "2024-09-23T00:00Z", "to": "2024-09-23T01:00Z", "values": [150.0]}
                        ]
                    }
                })
                .to_string(),
            )
            .create();

        let client = TransparencyClient::new(format!("{}/export", server.url())).unwrap();
        let data = client.fetch_series(SeriesKind::Imbalance, &window()).unwrap();

        assert_eq!(data["timeseries"][0]["values"][0], json!(150.0));
        mock.assert();
    }

    #[test]
    fn fetch_series_reports_http_500() {
        let mut server = Server::new();
        let mock = server
            .mock("GET", "/export")
            .match_query(Matcher::Any)
            .with_status(500)
            .create();

        let client = TransparencyClient::new(format!("{}/export", server.url())).unwrap();
        let err = client.fetch_series(SeriesKind::Imbalance, &window()).unwrap_err();

        match err {
            FetchError::Status { series, status } => {
                assert_eq!(series, "imbalance_volumes");
                assert_eq!(status.as_u16(), 500);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        mock.assert();
    }

    #[test]
    fn fetch_series_rejects_envelope_without_data() {
        let mut server = Server::new();
        let _mock = server
            .mock("GET", "/export")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(json!({"message": "ok"}).to_string())
            .create();

        let client = TransparencyClient::new(format!("{}/export", server.url())).unwrap();
        let err = client.fetch_series(SeriesKind::Activation, &window()).unwrap_err();
        assert!(matches!(err, FetchError::MissingData { series: "normal_activations_total" }));
    }

    #[test]
    fn fetch_series_rejects_non_json_body() {
        let mut server = Server::new();
        let _mock = server
            .mock("GET", "/export")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body("<html>maintenance</html>")
            .create();

        let client = TransparencyClient::new(format!("{}/export", server.url())).unwrap();
        let err = client.fetch_series(SeriesKind::Imbalance, &window()).unwrap_err();
        assert!(matches!(err, FetchError::Decode { .. }));
    }

    #[test]
    fn fetch_series_reports_connection_failure() {
        // Nothing listens on port 9 (discard) on loopback in test environments.
        let client = TransparencyClient::new("http://127.0.0.1:9/export").unwrap();
        let err = client.fetch_series(SeriesKind::Imbalance, &window()).unwrap_err();
        assert!(matches!(err, FetchError::Request { .. }));
    }
}

//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
    time::Duration,
};

use chrono::{NaiveDate, TimeZone, Utc};
use fare_trends::{
    Capabilities, FareApiClient, FareGateway, FareRecord, FetchResult, FilterCriteria,
    GatewayError, Insights, MockChartRenderer, MockClock, MockDownloader, MockNotifier,
    MockSurface, PriceTrendPoint, RouteSummary, ViewController,
    config::{BackendConfig, ExportConfig, FilterConfig, NetworkConfig},
};
use serde_json::json;
use wiremock::MockServer;

/// Mock capabilities plus a clock fixed at 2024-06-15 12:00 UTC.
#[derive(Clone)]
pub struct Harness {
    pub surface: MockSurface,
    pub chart: MockChartRenderer,
    pub downloader: MockDownloader,
    pub notifier: MockNotifier,
    pub clock: MockClock,
}

impl Harness {
    pub fn new() -> Self {
        Self {
            surface: MockSurface::new(),
            chart: MockChartRenderer::new(),
            downloader: MockDownloader::new(),
            notifier: MockNotifier::new(),
            clock: MockClock::new(Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()),
        }
    }

    pub fn capabilities(&self) -> Capabilities {
        Capabilities {
            surface: Arc::new(self.surface.clone()),
            chart: Arc::new(self.chart.clone()),
            downloader: Arc::new(self.downloader.clone()),
            notifier: Arc::new(self.notifier.clone()),
            clock: Arc::new(self.clock.clone()),
        }
    }

    pub fn controller<G: FareGateway>(&self, gateway: G) -> ViewController<G> {
        ViewController::new(
            gateway,
            self.capabilities(),
            FilterConfig::default(),
            ExportConfig::default(),
        )
    }
}

pub fn http_client(server: &MockServer) -> FareApiClient {
    let backend = BackendConfig {
        base_url: server.uri(),
        ..Default::default()
    };
    let network = NetworkConfig {
        request_timeout_secs: 10,
        connect_timeout_secs: 5,
    };
    FareApiClient::new(&backend, &network).expect("Client creation should succeed")
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn record(origin: &str, destination: &str, price: f64, bookings: u32) -> FareRecord {
    FareRecord {
        date: date(2024, 1, 1),
        origin: origin.to_string(),
        destination: destination.to_string(),
        price,
        bookings,
    }
}

/// Wire body of a successful `/api/data` response.
pub fn data_body() -> serde_json::Value {
    json!({
        "price_trends": [
            {"date": "2024-01-01", "avg_price": 250.5},
            {"date": "2024-01-02", "avg_price": 270.0}
        ],
        "popular_routes": [
            {"route": "Perth to Darwin", "bookings": 9, "avg_price": 420.0},
            {"route": "SYD to MEL", "bookings": 3, "avg_price": 199.5}
        ],
        "raw_data": [
            {"date": "2024-01-01", "origin": "SYD", "destination": "MEL", "price": 199.5, "bookings": 3},
            {"date": "2024-01-02", "origin": "Perth", "destination": "Darwin", "price": 420.0, "bookings": 9}
        ]
    })
}

pub fn empty_data_body() -> serde_json::Value {
    json!({"price_trends": [], "popular_routes": [], "raw_data": []})
}

/// A fetch result with one trend point labelled `day` and `records` raw records.
pub fn fetch_result(day: NaiveDate, records: usize) -> FetchResult {
    FetchResult {
        price_trends: vec![PriceTrendPoint {
            date: day,
            avg_price: 300.0,
        }],
        popular_routes: vec![RouteSummary {
            route: "Sydney to Melbourne".to_string(),
            bookings: records as u64,
            avg_price: 300.0,
        }],
        raw_data: (0..records)
            .map(|_| record("Sydney", "Melbourne", 300.0, 1))
            .collect(),
    }
}

/// In-memory gateway replaying scripted data responses, each after a delay.
#[derive(Default)]
pub struct ScriptedGateway {
    responses: Mutex<VecDeque<(Duration, Result<FetchResult, GatewayError>)>>,
    requests: Mutex<Vec<FilterCriteria>>,
}

impl ScriptedGateway {
    pub fn new(responses: Vec<(Duration, Result<FetchResult, GatewayError>)>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<FilterCriteria> {
        self.requests.lock().unwrap().clone()
    }
}

impl FareGateway for ScriptedGateway {
    async fn fetch_data(&self, criteria: &FilterCriteria) -> Result<FetchResult, GatewayError> {
        self.requests.lock().unwrap().push(criteria.clone());
        let (delay, result) = self
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .expect("unexpected fetch_data call");
        tokio::time::sleep(delay).await;
        result
    }

    async fn fetch_insights(&self, raw_data: &[FareRecord]) -> Result<Insights, GatewayError> {
        Ok(Insights {
            text: format!("{} records analysed", raw_data.len()),
        })
    }
}

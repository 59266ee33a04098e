//! Fare Trends Library
//!
//! Controller for the airline fare trends dashboard: filter validation,
//! backend requests, aggregation and rendering through injected capabilities.

pub mod aggregate;
pub mod api;
pub mod bindings;
pub mod chart;
pub mod config;
pub mod controller;
pub mod models;
pub mod terminal;
pub mod traits;
pub mod validation;

// Re-export commonly used types
pub use aggregate::{ExportFormat, Summary, encode_csv, encode_json, summarize};
pub use api::{FareApiClient, FareGateway, GatewayError};
pub use bindings::{InteractionBindings, UiEvent};
pub use chart::ChartHandle;
pub use config::AppConfig;
pub use controller::{AppError, Capabilities, ViewController, ViewState};
pub use models::{FareRecord, FetchResult, FilterCriteria, Insights, PriceTrendPoint, RouteSummary};
pub use traits::{
    ChartEvent, ChartInstance, ChartRenderer, Clock, Control, DirectoryDownloader, Downloader,
    ExportPrompt, Field, FixedPrompt, LogNotifier, MockChartRenderer, MockClock, MockDownloader,
    MockNotifier, MockSurface, Notifier, Region, RouteTable, SystemClock, ViewSurface,
};
pub use validation::{MAX_RANGE_DAYS, ValidationError, validate};

//! Filter-to-render orchestration.
//!
//! The controller reads the filter fields, validates them, fetches data and
//! insights through a [`FareGateway`], and renders the chart, route table,
//! summary and insight text onto the injected capabilities. It is the only
//! writer of the [`ViewState`] and the only owner of the chart.
//!
//! Every render cycle takes a sequence number. After each network call a
//! cycle checks that it is still the latest one; a superseded cycle drops its
//! results without touching the surface.

use std::{cell::RefCell, sync::Arc};

use chrono::NaiveDate;
use thiserror::Error;

use crate::{
    aggregate::{ExportFormat, Summary, summarize},
    api::{FareGateway, GatewayError},
    chart::ChartHandle,
    config::{ExportConfig, FilterConfig},
    models::{FetchResult, FilterCriteria},
    traits::{
        ChartRenderer, Clock, Control, Downloader, Field, Notifier, Region, RouteTable,
        ViewSurface,
    },
    validation::{ValidationError, criteria_from_fields, range_start, validate_with_limit},
};

/// Columns of the popular-routes table.
pub const ROUTE_TABLE_COLUMNS: usize = 3;

const DATA_ERROR_PLACEHOLDER: &str = "Error loading data.";
const NO_ROUTES_PLACEHOLDER: &str = "No popular routes found for the selected filters.";

/// Typed Application Errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AppError {
    #[error("Invalid filters: {0}")]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Gateway(#[from] GatewayError),
    #[error("No data to export for the selected filters")]
    EmptyExport,
    #[error("Export failed: {0}")]
    Export(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ViewState {
    #[default]
    Idle,
    Loading,
    Success,
    Error(String),
}

/// Capabilities the controller renders through.
#[derive(Clone)]
pub struct Capabilities {
    pub surface: Arc<dyn ViewSurface>,
    pub chart: Arc<dyn ChartRenderer>,
    pub downloader: Arc<dyn Downloader>,
    pub notifier: Arc<dyn Notifier>,
    pub clock: Arc<dyn Clock>,
}

enum CycleOutcome {
    Completed,
    Failed(AppError),
    /// A newer cycle started while this one was waiting on the network.
    Superseded,
}

struct ControllerState {
    view: ViewState,
    chart: ChartHandle,
    cycle: u64,
    summary: Option<Summary>,
}

pub struct ViewController<G> {
    gateway: G,
    surface: Arc<dyn ViewSurface>,
    downloader: Arc<dyn Downloader>,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
    filters: FilterConfig,
    export: ExportConfig,
    state: RefCell<ControllerState>,
}

impl<G: FareGateway> ViewController<G> {
    pub fn new(
        gateway: G,
        capabilities: Capabilities,
        filters: FilterConfig,
        export: ExportConfig,
    ) -> Self {
        Self {
            gateway,
            surface: capabilities.surface,
            downloader: capabilities.downloader,
            notifier: capabilities.notifier,
            clock: capabilities.clock,
            filters,
            export,
            state: RefCell::new(ControllerState {
                view: ViewState::Idle,
                chart: ChartHandle::new(capabilities.chart),
                cycle: 0,
                summary: None,
            }),
        }
    }

    // --- ENTRY POINTS ---

    /// Run one render cycle for the filters currently in the fields.
    pub async fn fetch_and_render(&self) {
        let criteria = self.read_criteria();
        let cycle = self.enter_loading();
        let outcome = self.run_cycle(cycle, criteria).await;
        self.exit_loading(cycle, outcome);
    }

    /// Fetch the filtered dataset and download it in `format`.
    ///
    /// Does not touch the view state. Failures are reported through the
    /// notifier and returned.
    pub async fn export(&self, format: ExportFormat) -> Result<(), AppError> {
        let result = self.run_export(format).await;
        match &result {
            Ok(()) => {
                tracing::info!("Exported {}", format.filename(&self.export));
            }
            Err(AppError::EmptyExport) => {
                tracing::info!("Export refused: no data for the selected filters");
                self.send_notice("No data to export", &AppError::EmptyExport.to_string());
            }
            Err(e) => {
                tracing::warn!("Export failed: {}", e);
                self.send_notice("Export failed", &e.to_string());
            }
        }
        result
    }

    /// Reset every filter to unbounded and re-render.
    pub async fn clear(&self) {
        self.write_filters(None, None, "", "");
        self.fetch_and_render().await;
    }

    /// Filter to the last `days` days up to today and re-render.
    ///
    /// A day count that leaves the calendar writes nothing and ends the
    /// cycle in the error state.
    pub async fn set_quick_range(&self, days: i64) {
        let today = self.today();
        let start = match range_start(today, days) {
            Ok(start) => start,
            Err(e) => {
                tracing::debug!("Quick range rejected: {}", e);
                let cycle = self.enter_loading();
                self.exit_loading(cycle, CycleOutcome::Failed(e.into()));
                return;
            }
        };
        self.surface
            .write_field(Field::StartDate, &start.format("%Y-%m-%d").to_string());
        self.surface
            .write_field(Field::EndDate, &today.format("%Y-%m-%d").to_string());
        self.fetch_and_render().await;
    }

    // --- FIELD ACCESS ---

    /// Write all four filter fields. `None` dates become empty fields.
    pub fn write_filters(
        &self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
        origin: &str,
        destination: &str,
    ) {
        let format = |d: Option<NaiveDate>| {
            d.map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default()
        };
        self.surface.write_field(Field::StartDate, &format(start));
        self.surface.write_field(Field::EndDate, &format(end));
        self.surface.write_field(Field::Origin, origin);
        self.surface.write_field(Field::Destination, destination);
    }

    /// Parse the current field values.
    pub fn read_criteria(&self) -> Result<FilterCriteria, ValidationError> {
        criteria_from_fields(
            &self.surface.read_field(Field::StartDate),
            &self.surface.read_field(Field::EndDate),
            &self.surface.read_field(Field::Origin),
            &self.surface.read_field(Field::Destination),
        )
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    // --- INSPECTION ---

    pub fn view_state(&self) -> ViewState {
        self.state.borrow().view.clone()
    }

    /// Summary of the last successfully fetched dataset.
    pub fn summary(&self) -> Option<Summary> {
        self.state.borrow().summary
    }

    pub fn chart_is_live(&self) -> bool {
        self.state.borrow().chart.is_live()
    }

    // --- RENDER CYCLE ---

    fn enter_loading(&self) -> u64 {
        let cycle = {
            let mut state = self.state.borrow_mut();
            state.cycle += 1;
            state.view = ViewState::Loading;
            state.cycle
        };
        tracing::debug!("Render cycle {} started", cycle);

        self.surface.set_enabled(Control::ApplyFilters, false);
        self.surface.set_visible(Region::LoadingIndicator, true);
        self.surface.set_text(Region::Insights, "");
        self.surface.set_visible(Region::Insights, false);
        self.surface.set_visible(Region::Error, false);
        cycle
    }

    fn is_current(&self, cycle: u64) -> bool {
        self.state.borrow().cycle == cycle
    }

    async fn run_cycle(
        &self,
        cycle: u64,
        criteria: Result<FilterCriteria, ValidationError>,
    ) -> CycleOutcome {
        let criteria = match criteria
            .and_then(|c| validate_with_limit(&c, self.filters.max_range_days).map(|_| c))
        {
            Ok(c) => c,
            Err(e) => {
                tracing::debug!("Filters rejected: {}", e);
                return CycleOutcome::Failed(e.into());
            }
        };

        let data = match self.gateway.fetch_data(&criteria).await {
            Ok(data) => data,
            Err(e) => {
                if !self.is_current(cycle) {
                    return CycleOutcome::Superseded;
                }
                tracing::warn!("Data fetch failed: {}", e);
                self.clear_results();
                return CycleOutcome::Failed(e.into());
            }
        };

        if !self.is_current(cycle) {
            return CycleOutcome::Superseded;
        }
        self.render_data(&data);

        // Insights must describe the records just rendered
        let insights = self.gateway.fetch_insights(&data.raw_data).await;
        if !self.is_current(cycle) {
            return CycleOutcome::Superseded;
        }
        match insights {
            Ok(insights) => {
                self.surface.set_text(Region::Insights, &insights.text);
                CycleOutcome::Completed
            }
            Err(e) => {
                tracing::warn!("Insights fetch failed: {}", e);
                CycleOutcome::Failed(e.into())
            }
        }
    }

    fn render_data(&self, data: &FetchResult) {
        let (labels, values) = data.trend_series();
        let summary = summarize(&data.raw_data);
        {
            let mut state = self.state.borrow_mut();
            state.chart.replace(&labels, &values);
            state.summary = Some(summary);
        }

        let table = if data.popular_routes.is_empty() {
            RouteTable::Placeholder {
                message: NO_ROUTES_PLACEHOLDER.to_string(),
                colspan: ROUTE_TABLE_COLUMNS,
            }
        } else {
            RouteTable::Rows(data.popular_routes.clone())
        };
        self.surface.render_table(&table);
        self.surface.render_summary(&summary);
    }

    fn clear_results(&self) {
        self.state.borrow_mut().chart.clear();
        self.surface.render_table(&RouteTable::Placeholder {
            message: DATA_ERROR_PLACEHOLDER.to_string(),
            colspan: ROUTE_TABLE_COLUMNS,
        });
    }

    fn exit_loading(&self, cycle: u64, outcome: CycleOutcome) {
        let view = match outcome {
            CycleOutcome::Superseded => {
                tracing::debug!("Render cycle {} superseded, discarding results", cycle);
                return;
            }
            CycleOutcome::Completed => ViewState::Success,
            CycleOutcome::Failed(e) => ViewState::Error(e.to_string()),
        };

        self.surface.set_enabled(Control::ApplyFilters, true);
        self.surface.set_visible(Region::LoadingIndicator, false);
        match &view {
            ViewState::Error(message) => {
                self.surface.set_text(Region::Error, message);
                self.surface.set_visible(Region::Error, true);
                self.surface.set_visible(Region::Insights, false);
            }
            _ => {
                self.surface.set_visible(Region::Error, false);
                self.surface.set_visible(Region::Insights, true);
            }
        }

        tracing::info!("Render cycle {} finished: {:?}", cycle, view);
        self.state.borrow_mut().view = view;
    }

    // --- EXPORT ---

    async fn run_export(&self, format: ExportFormat) -> Result<(), AppError> {
        let criteria = self.read_criteria()?;
        validate_with_limit(&criteria, self.filters.max_range_days)?;

        let data = self.gateway.fetch_data(&criteria).await?;
        if data.raw_data.is_empty() {
            return Err(AppError::EmptyExport);
        }

        let bytes = format
            .encode(&data.raw_data)
            .map_err(|e| AppError::Export(e.to_string()))?;
        self.downloader
            .trigger_download(&bytes, format.filename(&self.export), format.mime_type())
            .map_err(|e| AppError::Export(format!("{:#}", e)))?;
        Ok(())
    }

    fn send_notice(&self, title: &str, body: &str) {
        if let Err(e) = self.notifier.notify(title, body) {
            tracing::warn!("Failed to show notice: {:#}", e);
        }
    }
}

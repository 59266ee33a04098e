//! Capabilities injected into the controller so it runs without a real UI.
//!
//! This module provides traits for:
//! - `Clock`: time access for quick ranges and default filters
//! - `Notifier`: standalone user notices (export outcomes)
//! - `ViewSurface`: field access and render targets
//! - `ChartRenderer`: drawing and destroying the price chart
//! - `Downloader`: handing an encoded file to the user
//! - `ExportPrompt`: asking which export format to use
//!
//! Each trait has a recording mock for tests.

use std::{
    collections::HashMap,
    fs,
    path::PathBuf,
    sync::{
        Arc, Mutex,
        atomic::{AtomicU64, Ordering},
    },
};

use anyhow::{Context, Result};
use chrono::{DateTime, Local, NaiveDate, Utc};

use crate::{
    aggregate::{ExportFormat, Summary},
    models::RouteSummary,
};

// ==================== Clock Trait ====================

/// Trait for abstracting time access.
pub trait Clock: Send + Sync {
    /// Get the current time in UTC.
    fn now_utc(&self) -> DateTime<Utc>;

    /// Get the current time in the local timezone.
    fn now_local(&self) -> DateTime<Local>;

    /// Today's calendar date in the local timezone.
    fn today(&self) -> NaiveDate {
        self.now_local().date_naive()
    }
}

/// System clock implementation using real time.
#[derive(Debug, Clone, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_utc(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn now_local(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// Mock clock for testing with controllable time.
///
/// `today()` reports the UTC date so tests do not depend on the host timezone.
#[derive(Debug, Clone)]
pub struct MockClock {
    utc_time: Arc<Mutex<DateTime<Utc>>>,
}

impl MockClock {
    /// Create a new mock clock set to the given UTC time.
    pub fn new(time: DateTime<Utc>) -> Self {
        Self {
            utc_time: Arc::new(Mutex::new(time)),
        }
    }

    /// Set the mock clock to a new time.
    pub fn set_time(&self, time: DateTime<Utc>) {
        *self.utc_time.lock().unwrap() = time;
    }

    /// Advance the clock by a duration.
    pub fn advance(&self, duration: chrono::Duration) {
        let mut time = self.utc_time.lock().unwrap();
        *time = *time + duration;
    }
}

impl Clock for MockClock {
    fn now_utc(&self) -> DateTime<Utc> {
        *self.utc_time.lock().unwrap()
    }

    fn now_local(&self) -> DateTime<Local> {
        self.now_utc().with_timezone(&Local)
    }

    fn today(&self) -> NaiveDate {
        self.now_utc().date_naive()
    }
}

// ==================== Notifier Trait ====================

/// Trait for user-facing notices outside the view state.
pub trait Notifier: Send + Sync {
    /// Send a notification with the given title and body.
    fn notify(&self, title: &str, body: &str) -> Result<()>;
}

/// Notifier that writes notices to the log.
#[derive(Debug, Clone, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, title: &str, body: &str) -> Result<()> {
        tracing::info!("{}: {}", title, body);
        Ok(())
    }
}

/// Mock notifier for testing that records all notifications.
#[derive(Debug, Clone, Default)]
pub struct MockNotifier {
    notifications: Arc<Mutex<Vec<(String, String)>>>,
}

impl MockNotifier {
    /// Create a new mock notifier.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get all notifications that have been sent.
    pub fn get_notifications(&self) -> Vec<(String, String)> {
        self.notifications.lock().unwrap().clone()
    }

    /// Get the count of notifications sent.
    pub fn notification_count(&self) -> usize {
        self.notifications.lock().unwrap().len()
    }

    /// Clear all recorded notifications.
    pub fn clear(&self) {
        self.notifications.lock().unwrap().clear();
    }

    /// Check if any notification was sent.
    pub fn was_called(&self) -> bool {
        !self.notifications.lock().unwrap().is_empty()
    }
}

impl Notifier for MockNotifier {
    fn notify(&self, title: &str, body: &str) -> Result<()> {
        self.notifications
            .lock()
            .unwrap()
            .push((title.to_string(), body.to_string()));
        Ok(())
    }
}

// ==================== View Surface ====================

/// Input fields holding the filter values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    StartDate,
    EndDate,
    Origin,
    Destination,
}

impl Field {
    pub const ALL: [Field; 4] = [
        Field::StartDate,
        Field::EndDate,
        Field::Origin,
        Field::Destination,
    ];

    /// Element id on the page.
    pub fn id(&self) -> &'static str {
        match self {
            Field::StartDate => "startDate",
            Field::EndDate => "endDate",
            Field::Origin => "origin",
            Field::Destination => "destination",
        }
    }
}

/// Regions whose visibility follows the view state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Region {
    LoadingIndicator,
    Insights,
    Error,
}

/// Interactive controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Control {
    ApplyFilters,
    ExportData,
    ClearFilters,
}

/// Contents of the popular-routes table.
#[derive(Debug, Clone, PartialEq)]
pub enum RouteTable {
    Rows(Vec<RouteSummary>),
    /// A single row spanning `colspan` columns.
    Placeholder { message: String, colspan: usize },
}

/// Rendering surface the controller reads from and writes to.
pub trait ViewSurface: Send + Sync {
    fn read_field(&self, field: Field) -> String;
    fn write_field(&self, field: Field, value: &str);
    fn set_visible(&self, region: Region, visible: bool);
    fn set_enabled(&self, control: Control, enabled: bool);
    /// Replace the text shown in a region.
    fn set_text(&self, region: Region, text: &str);
    fn render_table(&self, table: &RouteTable);
    fn render_summary(&self, summary: &Summary);
}

#[derive(Debug, Default)]
struct SurfaceState {
    fields: HashMap<Field, String>,
    visible: HashMap<Region, bool>,
    enabled: HashMap<Control, bool>,
    text: HashMap<Region, String>,
    table: Option<RouteTable>,
    summary: Option<Summary>,
    disable_count: usize,
}

/// In-memory surface recording everything the controller renders.
#[derive(Debug, Clone, Default)]
pub struct MockSurface {
    state: Arc<Mutex<SurfaceState>>,
}

impl MockSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field as if the user had typed into it.
    pub fn set_field(&self, field: Field, value: &str) {
        self.write_field(field, value);
    }

    pub fn field(&self, field: Field) -> String {
        self.read_field(field)
    }

    pub fn is_visible(&self, region: Region) -> bool {
        self.state
            .lock()
            .unwrap()
            .visible
            .get(&region)
            .copied()
            .unwrap_or(false)
    }

    /// Controls are enabled until the controller disables them.
    pub fn is_enabled(&self, control: Control) -> bool {
        self.state
            .lock()
            .unwrap()
            .enabled
            .get(&control)
            .copied()
            .unwrap_or(true)
    }

    pub fn text(&self, region: Region) -> String {
        self.state
            .lock()
            .unwrap()
            .text
            .get(&region)
            .cloned()
            .unwrap_or_default()
    }

    pub fn table(&self) -> Option<RouteTable> {
        self.state.lock().unwrap().table.clone()
    }

    pub fn summary(&self) -> Option<Summary> {
        self.state.lock().unwrap().summary
    }

    /// How many times the apply control has been disabled.
    pub fn apply_disable_count(&self) -> usize {
        self.state.lock().unwrap().disable_count
    }
}

impl ViewSurface for MockSurface {
    fn read_field(&self, field: Field) -> String {
        self.state
            .lock()
            .unwrap()
            .fields
            .get(&field)
            .cloned()
            .unwrap_or_default()
    }

    fn write_field(&self, field: Field, value: &str) {
        self.state
            .lock()
            .unwrap()
            .fields
            .insert(field, value.to_string());
    }

    fn set_visible(&self, region: Region, visible: bool) {
        self.state.lock().unwrap().visible.insert(region, visible);
    }

    fn set_enabled(&self, control: Control, enabled: bool) {
        let mut state = self.state.lock().unwrap();
        if control == Control::ApplyFilters && !enabled {
            state.disable_count += 1;
        }
        state.enabled.insert(control, enabled);
    }

    fn set_text(&self, region: Region, text: &str) {
        self.state
            .lock()
            .unwrap()
            .text
            .insert(region, text.to_string());
    }

    fn render_table(&self, table: &RouteTable) {
        self.state.lock().unwrap().table = Some(table.clone());
    }

    fn render_summary(&self, summary: &Summary) {
        self.state.lock().unwrap().summary = Some(*summary);
    }
}

// ==================== Chart Renderer ====================

/// A chart currently drawn on the canvas.
pub trait ChartInstance: Send {
    /// Release the canvas. Consumes the instance so it cannot be reused.
    fn destroy(self: Box<Self>);
}

/// Draws line charts of (label, value) series.
pub trait ChartRenderer: Send + Sync {
    fn draw(&self, labels: &[String], values: &[f64]) -> Box<dyn ChartInstance>;
}

/// Lifecycle events recorded by [`MockChartRenderer`].
#[derive(Debug, Clone, PartialEq)]
pub enum ChartEvent {
    Drawn {
        id: u64,
        labels: Vec<String>,
        values: Vec<f64>,
    },
    Destroyed {
        id: u64,
    },
}

#[derive(Debug, Default)]
struct ChartLog {
    events: Vec<ChartEvent>,
    live: Vec<u64>,
    max_live: usize,
}

/// Mock renderer tracking which chart instances are alive.
#[derive(Debug, Clone, Default)]
pub struct MockChartRenderer {
    log: Arc<Mutex<ChartLog>>,
    next_id: Arc<AtomicU64>,
}

impl MockChartRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<ChartEvent> {
        self.log.lock().unwrap().events.clone()
    }

    pub fn live_count(&self) -> usize {
        self.log.lock().unwrap().live.len()
    }

    /// Highest number of simultaneously live charts ever observed.
    pub fn max_live(&self) -> usize {
        self.log.lock().unwrap().max_live
    }

    /// Labels of the most recently drawn chart that is still alive.
    pub fn live_labels(&self) -> Option<Vec<String>> {
        let log = self.log.lock().unwrap();
        let id = *log.live.last()?;
        log.events.iter().find_map(|e| match e {
            ChartEvent::Drawn { id: drawn, labels, .. } if *drawn == id => Some(labels.clone()),
            _ => None,
        })
    }
}

struct MockChart {
    id: u64,
    log: Arc<Mutex<ChartLog>>,
}

impl ChartInstance for MockChart {
    fn destroy(self: Box<Self>) {
        let mut log = self.log.lock().unwrap();
        log.live.retain(|id| *id != self.id);
        log.events.push(ChartEvent::Destroyed { id: self.id });
    }
}

impl ChartRenderer for MockChartRenderer {
    fn draw(&self, labels: &[String], values: &[f64]) -> Box<dyn ChartInstance> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let mut log = self.log.lock().unwrap();
        log.events.push(ChartEvent::Drawn {
            id,
            labels: labels.to_vec(),
            values: values.to_vec(),
        });
        log.live.push(id);
        log.max_live = log.max_live.max(log.live.len());
        Box::new(MockChart {
            id,
            log: self.log.clone(),
        })
    }
}

// ==================== Downloader ====================

/// Hands an encoded file to the user.
pub trait Downloader: Send + Sync {
    fn trigger_download(&self, bytes: &[u8], filename: &str, mime: &str) -> Result<()>;
}

/// Writes downloads into a directory on disk.
#[derive(Debug, Clone)]
pub struct DirectoryDownloader {
    dir: PathBuf,
}

impl DirectoryDownloader {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }
}

impl Downloader for DirectoryDownloader {
    fn trigger_download(&self, bytes: &[u8], filename: &str, mime: &str) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create {}", self.dir.display()))?;
        let path = self.dir.join(filename);
        fs::write(&path, bytes).with_context(|| format!("Failed to write {}", path.display()))?;
        tracing::info!("Saved {} ({}, {} bytes)", path.display(), mime, bytes.len());
        Ok(())
    }
}

/// A download captured by [`MockDownloader`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Download {
    pub bytes: Vec<u8>,
    pub filename: String,
    pub mime: String,
}

impl Download {
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.bytes).into_owned()
    }
}

#[derive(Debug, Clone, Default)]
pub struct MockDownloader {
    downloads: Arc<Mutex<Vec<Download>>>,
}

impl MockDownloader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn downloads(&self) -> Vec<Download> {
        self.downloads.lock().unwrap().clone()
    }
}

impl Downloader for MockDownloader {
    fn trigger_download(&self, bytes: &[u8], filename: &str, mime: &str) -> Result<()> {
        self.downloads.lock().unwrap().push(Download {
            bytes: bytes.to_vec(),
            filename: filename.to_string(),
            mime: mime.to_string(),
        });
        Ok(())
    }
}

// ==================== Export Prompt ====================

/// Asks the user which format to export.
pub trait ExportPrompt: Send + Sync {
    fn choose_format(&self) -> ExportFormat;
}

/// Prompt that always answers with the same format.
#[derive(Debug, Clone, Copy)]
pub struct FixedPrompt(pub ExportFormat);

impl ExportPrompt for FixedPrompt {
    fn choose_format(&self) -> ExportFormat {
        self.0
    }
}

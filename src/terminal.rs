//! Terminal rendering for the command-line binary.

use std::{collections::HashMap, sync::Mutex};

use crate::{
    aggregate::Summary,
    traits::{ChartInstance, ChartRenderer, Control, Field, Region, RouteTable, ViewSurface},
};

/// Surface that keeps field values in memory and prints render targets to stdout.
#[derive(Debug, Default)]
pub struct TerminalSurface {
    fields: Mutex<HashMap<Field, String>>,
}

impl TerminalSurface {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ViewSurface for TerminalSurface {
    fn read_field(&self, field: Field) -> String {
        self.fields
            .lock()
            .map(|fields| fields.get(&field).cloned().unwrap_or_default())
            .unwrap_or_default()
    }

    fn write_field(&self, field: Field, value: &str) {
        if let Ok(mut fields) = self.fields.lock() {
            fields.insert(field, value.to_string());
        }
    }

    fn set_visible(&self, region: Region, visible: bool) {
        if region == Region::LoadingIndicator && visible {
            println!("Loading...");
        }
    }

    fn set_enabled(&self, control: Control, enabled: bool) {
        tracing::trace!("{:?} enabled: {}", control, enabled);
    }

    fn set_text(&self, region: Region, text: &str) {
        if text.is_empty() {
            return;
        }
        match region {
            Region::Insights => println!("\nInsights\n--------\n{}", text),
            Region::Error => eprintln!("\nError: {}", text),
            Region::LoadingIndicator => {}
        }
    }

    fn render_table(&self, table: &RouteTable) {
        println!("\nPopular routes");
        println!("{:<32} {:>10} {:>12}", "Route", "Bookings", "Avg price");
        match table {
            RouteTable::Rows(routes) => {
                for route in routes {
                    println!(
                        "{:<32} {:>10} {:>12}",
                        route.route,
                        route.bookings,
                        route.formatted_price()
                    );
                }
            }
            RouteTable::Placeholder { message, .. } => println!("{}", message),
        }
    }

    fn render_summary(&self, summary: &Summary) {
        println!("\nSummary");
        println!("  Records:       {}", summary.total_records);
        println!("  Bookings:      {}", summary.total_bookings);
        println!("  Avg price:     ${:.2}", summary.avg_price);
        println!("  Unique routes: {}", summary.unique_routes);
    }
}

const SPARK_LEVELS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// One-line sparkline of a series.
pub fn sparkline(values: &[f64]) -> String {
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let span = max - min;
    values
        .iter()
        .map(|v| {
            if span <= f64::EPSILON {
                SPARK_LEVELS[SPARK_LEVELS.len() / 2]
            } else {
                let idx = ((v - min) / span * (SPARK_LEVELS.len() - 1) as f64).round() as usize;
                SPARK_LEVELS[idx.min(SPARK_LEVELS.len() - 1)]
            }
        })
        .collect()
}

/// Prints the price trend as a sparkline.
#[derive(Debug, Clone, Default)]
pub struct TerminalChartRenderer;

struct TerminalChart;

impl ChartInstance for TerminalChart {
    fn destroy(self: Box<Self>) {}
}

impl ChartRenderer for TerminalChartRenderer {
    fn draw(&self, labels: &[String], values: &[f64]) -> Box<dyn ChartInstance> {
        println!("\nAverage price trend");
        match (labels.first(), labels.last()) {
            (Some(first), Some(last)) => {
                println!("{} {} {}", first, sparkline(values), last);
            }
            _ => println!("(no data)"),
        }
        Box::new(TerminalChart)
    }
}

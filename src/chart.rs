use std::sync::Arc;

use crate::traits::{ChartInstance, ChartRenderer};

/// Owner of the single live price chart.
///
/// At most one instance is alive at any time: the previous chart is always
/// destroyed before a new one is drawn, and dropping the handle destroys it.
pub struct ChartHandle {
    renderer: Arc<dyn ChartRenderer>,
    live: Option<Box<dyn ChartInstance>>,
}

impl ChartHandle {
    pub fn new(renderer: Arc<dyn ChartRenderer>) -> Self {
        Self {
            renderer,
            live: None,
        }
    }

    /// Destroy the current chart (if any), then draw the new series.
    pub fn replace(&mut self, labels: &[String], values: &[f64]) {
        self.clear();
        self.live = Some(self.renderer.draw(labels, values));
    }

    /// Destroy the current chart, leaving the canvas empty.
    pub fn clear(&mut self) {
        if let Some(chart) = self.live.take() {
            chart.destroy();
        }
    }

    pub fn is_live(&self) -> bool {
        self.live.is_some()
    }
}

impl Drop for ChartHandle {
    fn drop(&mut self) {
        self.clear();
    }
}

impl std::fmt::Debug for ChartHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChartHandle")
            .field("live", &self.is_live())
            .finish()
    }
}

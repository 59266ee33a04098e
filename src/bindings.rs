use std::sync::Arc;

use crate::{
    api::FareGateway,
    controller::ViewController,
    traits::{Control, ExportPrompt},
};

/// User actions on the dashboard controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiEvent {
    ApplyFilters,
    ClearFilters,
    ExportData,
    /// Quick-range button carrying its `days` parameter.
    QuickRange(i64),
}

impl UiEvent {
    /// The control that raises this event, if it is one of the fixed buttons.
    pub fn control(&self) -> Option<Control> {
        match self {
            UiEvent::ApplyFilters => Some(Control::ApplyFilters),
            UiEvent::ClearFilters => Some(Control::ClearFilters),
            UiEvent::ExportData => Some(Control::ExportData),
            UiEvent::QuickRange(_) => None,
        }
    }
}

/// Maps UI events onto controller entry points.
pub struct InteractionBindings<G> {
    controller: ViewController<G>,
    prompt: Arc<dyn ExportPrompt>,
    default_range_days: i64,
}

impl<G: FareGateway> InteractionBindings<G> {
    pub fn new(
        controller: ViewController<G>,
        prompt: Arc<dyn ExportPrompt>,
        default_range_days: i64,
    ) -> Self {
        Self {
            controller,
            prompt,
            default_range_days,
        }
    }

    pub fn controller(&self) -> &ViewController<G> {
        &self.controller
    }

    /// Write the default filters and perform the initial render.
    pub async fn on_load(&self) {
        self.controller.write_filters(None, None, "", "");
        self.controller.set_quick_range(self.default_range_days).await;
    }

    pub async fn dispatch(&self, event: UiEvent) {
        tracing::debug!("UI event: {:?}", event);
        match event {
            UiEvent::ApplyFilters => self.controller.fetch_and_render().await,
            UiEvent::ClearFilters => self.controller.clear().await,
            UiEvent::QuickRange(days) => self.controller.set_quick_range(days).await,
            UiEvent::ExportData => {
                let format = self.prompt.choose_format();
                if let Err(e) = self.controller.export(format).await {
                    tracing::debug!("Export event ended without a download: {}", e);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_controls() {
        assert_eq!(UiEvent::ApplyFilters.control(), Some(Control::ApplyFilters));
        assert_eq!(UiEvent::ExportData.control(), Some(Control::ExportData));
        assert_eq!(UiEvent::ClearFilters.control(), Some(Control::ClearFilters));
        assert_eq!(UiEvent::QuickRange(7).control(), None);
    }
}

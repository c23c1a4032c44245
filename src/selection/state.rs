use serde::{Deserialize, Serialize};

/// Selections shorter than this cannot be zoomed into.
pub const MIN_ZOOM_SELECTION_SECS: f64 = 0.25;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "mode", content = "stepId")]
pub enum InteractionMode {
    #[default]
    Idle,
    /// Drag in progress; owned by the renderer, only observed here
    Selecting,
    Selected,
    PopoverOpen(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionRegion {
    pub id: String,
    pub start_seconds: f64,
    pub end_seconds: f64,
}

impl SelectionRegion {
    pub fn duration(&self) -> f64 {
        self.end_seconds - self.start_seconds
    }

    pub fn midpoint(&self) -> f64 {
        self.start_seconds + self.duration() / 2.0
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractionState {
    pub zoom_level_percent: f64,
    pub is_zoomed: bool,
    pub selection: Option<SelectionRegion>,
    pub popover_open_id: Option<String>,
    pub selecting: bool,
    /// Selection length as shown on the selection toolbar, e.g. "1.50s"
    pub selection_text: String,
    pub zoom_selection_enabled: bool,
    pub show_reset_zoom: bool,
}

impl InteractionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> InteractionMode {
        if self.selection.is_some() {
            InteractionMode::Selected
        } else if let Some(id) = &self.popover_open_id {
            InteractionMode::PopoverOpen(id.clone())
        } else if self.selecting {
            InteractionMode::Selecting
        } else {
            InteractionMode::Idle
        }
    }

    pub fn has_selection(&self) -> bool {
        self.selection.is_some()
    }

    pub fn select(&mut self, region: SelectionRegion) {
        let duration = region.duration();
        self.selection_text = format!("{:.2}s", duration);
        self.zoom_selection_enabled = duration >= MIN_ZOOM_SELECTION_SECS;
        self.selection = Some(region);
        self.popover_open_id = None;
        self.selecting = false;
    }

    pub fn clear_selection(&mut self) {
        self.selection = None;
        self.selecting = false;
        self.selection_text.clear();
        self.zoom_selection_enabled = false;
        self.refresh_reset_zoom();
    }

    pub fn set_zoom(&mut self, level: f64) {
        let level = if level.is_finite() { level.max(0.0) } else { 0.0 };
        self.zoom_level_percent = level;
        self.is_zoomed = level != 0.0;
        self.refresh_reset_zoom();
    }

    /// Reset-zoom affordance shows when zoomed with no selection to zoom out of.
    pub fn refresh_reset_zoom(&mut self) {
        self.show_reset_zoom = self.zoom_level_percent != 0.0 && self.selection.is_none();
    }
}

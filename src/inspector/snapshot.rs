use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::config::InspectorLabels;
use crate::models::GroupedSegment;
use crate::renderer::Anchor;
use crate::selection::{InteractionMode, InteractionState};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase", tag = "status")]
pub enum LoadStatus {
    Loading { percent: u8 },
    Ready {
        #[serde(rename = "loadedAt")]
        loaded_at: DateTime<Utc>,
    },
    Failed { message: String },
}

impl Default for LoadStatus {
    fn default() -> Self {
        LoadStatus::Loading { percent: 0 }
    }
}

impl LoadStatus {
    pub fn is_ready(&self) -> bool {
        matches!(self, LoadStatus::Ready { .. })
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, LoadStatus::Failed { .. })
    }
}

/// Everything the presentational shell needs to draw the inspector.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InspectorSnapshot {
    pub instance_id: String,
    pub status: LoadStatus,
    pub is_playing: bool,
    pub duration: f64,
    pub has_multi_channel: bool,
    pub split_channels: bool,
    pub interaction: InteractionState,
    pub mode: InteractionMode,
    pub steps: Vec<GroupedSegment>,
    pub labels: InspectorLabels,
    pub play_label: String,
    pub start_time_text: String,
    pub end_time_text: String,
    pub zoom_text: String,
    /// Waveform and toolbar are hidden while loading or after a failed load
    pub waveform_hidden: bool,
    pub selection_toolbar_visible: bool,
    pub selection_toolbar_anchor: Option<Anchor>,
    pub left_slot: Option<String>,
    pub right_slot: Option<String>,
}

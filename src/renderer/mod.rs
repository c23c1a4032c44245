//! Contract between the inspector and the external waveform renderer.
//!
//! The renderer owns pixels, audio decoding and the live region/marker
//! elements. The inspector only talks to it through [`Renderer`] and only
//! hears from it through [`RendererEvent`].

pub mod memory;

use serde::{Deserialize, Serialize};

use crate::projection::PopoverPayload;

pub use memory::{MemoryRenderer, RendererCall};

/// Class tagged onto the user's drag-selection region.
pub const SELECTION_CLASS: &str = "selection";
/// Class carried by regions highlighted as the current step.
pub const ACTIVE_CLASS: &str = "active";
/// Class that hides resize handles on step regions.
pub const NO_HANDLE_CLASS: &str = "no-handle";
/// Class marking the first rendered marker.
pub const MARKER_START_CLASS: &str = "marker-start";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MarkerId(pub u64);

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionData {
    /// Set on regions that represent annotation steps; user selections leave it false
    #[serde(default)]
    pub step: bool,
    #[serde(default)]
    pub class: Option<String>,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RegionOptions {
    pub id: String,
    pub start: f64,
    pub end: f64,
    pub drag: bool,
    pub resize: bool,
    pub data: RegionData,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionInfo {
    pub id: String,
    pub start: f64,
    pub end: f64,
    #[serde(default)]
    pub data: RegionData,
}

impl RegionInfo {
    pub fn is_step(&self) -> bool {
        self.data.step
    }

    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkerPosition {
    Top,
    Bottom,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MarkerOptions {
    pub time: f64,
    pub label: String,
    pub position: MarkerPosition,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkerInfo {
    pub id: MarkerId,
    pub time: f64,
    pub label: String,
}

/// Horizontal placement of a rendered element, in container pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Anchor {
    pub left: f64,
    pub width: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadOptions {
    pub wave_color: String,
    pub height: u32,
    pub split_channels: bool,
}

/// Callbacks emitted by the renderer, as tagged variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "payload", rename_all = "kebab-case")]
pub enum RendererEvent {
    Ready { channels: u16 },
    Play,
    Pause,
    Error(String),
    Loading(u8),
    Zoom(f64),
    /// Seek settled; carries the new position as a fraction of the duration
    Seek(f64),
    RegionCreated(RegionInfo),
    RegionUpdated(RegionInfo),
    RegionUpdateEnd(RegionInfo),
    RegionMouseenter(RegionInfo),
    RegionRemoved(RegionInfo),
    RegionClick(RegionInfo),
    MarkerClick(MarkerInfo),
}

/// Imperative surface of the waveform renderer.
pub trait Renderer: Send {
    /// Whether a container is mounted and regions/markers can be created.
    fn is_ready(&self) -> bool;
    fn load(&mut self, source: &str, options: &LoadOptions);
    fn destroy(&mut self);
    fn redraw(&mut self);

    fn add_region(&mut self, options: RegionOptions) -> String;
    fn remove_region(&mut self, id: &str);
    fn regions(&self) -> Vec<RegionInfo>;
    fn add_region_class(&mut self, id: &str, class: &str);
    fn remove_region_class(&mut self, id: &str, class: &str);
    fn region_has_class(&self, id: &str, class: &str) -> bool;
    fn region_anchor(&self, id: &str) -> Option<Anchor>;

    fn add_marker(&mut self, options: MarkerOptions) -> MarkerId;
    fn clear_markers(&mut self);
    fn add_marker_class(&mut self, marker: MarkerId, class: &str);
    fn marker_has_popover(&self, marker: MarkerId) -> bool;
    fn attach_popover(&mut self, marker: MarkerId, payload: &PopoverPayload);
    fn set_popover_open(&mut self, marker: MarkerId, open: bool);
    fn close_all_popovers(&mut self);

    fn zoom(&mut self, level: f64);
    fn seek_to(&mut self, fraction: f64);
    fn set_current_time(&mut self, seconds: f64);
    fn current_time(&self) -> f64;
    fn duration(&self) -> f64;
    fn container_width(&self) -> f64;

    fn play(&mut self);
    fn play_region(&mut self, id: &str);
    fn pause(&mut self);
    fn set_split_channels(&mut self, split: bool);
}

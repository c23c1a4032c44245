use std::collections::{BTreeSet, VecDeque};

use uuid::Uuid;

use crate::projection::PopoverPayload;

use super::{
    Anchor, LoadOptions, MarkerId, MarkerInfo, MarkerOptions, RegionData, RegionInfo,
    RegionOptions, Renderer, RendererEvent,
};

/// Every imperative call received, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum RendererCall {
    Load(String),
    Destroy,
    Redraw,
    AddRegion(String),
    RemoveRegion(String),
    AddMarker(String),
    ClearMarkers,
    AttachPopover(MarkerId),
    Zoom(f64),
    SeekTo(f64),
    SetCurrentTime(f64),
    Play,
    PlayRegion(String),
    Pause,
    SetSplitChannels(bool),
}

#[derive(Debug, Clone)]
struct MemoryRegion {
    info: RegionInfo,
    classes: BTreeSet<String>,
}

#[derive(Debug, Clone)]
struct MemoryMarker {
    info: MarkerInfo,
    classes: BTreeSet<String>,
    popover: Option<PopoverPayload>,
    popover_open: bool,
}

/// Headless renderer that keeps regions and markers in memory.
///
/// Calls that a real waveform component answers with a callback queue the
/// matching [`RendererEvent`]; drain them with [`MemoryRenderer::take_events`]
/// and feed them back to the inspector.
#[derive(Debug)]
pub struct MemoryRenderer {
    mounted: bool,
    destroyed: bool,
    duration: f64,
    container_width: f64,
    current_time: f64,
    zoom_level: f64,
    split_channels: bool,
    next_marker: u64,
    regions: Vec<MemoryRegion>,
    markers: Vec<MemoryMarker>,
    events: VecDeque<RendererEvent>,
    calls: Vec<RendererCall>,
}

impl MemoryRenderer {
    pub fn new(duration: f64, container_width: f64) -> Self {
        Self {
            mounted: true,
            destroyed: false,
            duration,
            container_width,
            current_time: 0.0,
            zoom_level: 0.0,
            split_channels: false,
            next_marker: 0,
            regions: Vec::new(),
            markers: Vec::new(),
            events: VecDeque::new(),
            calls: Vec::new(),
        }
    }

    /// Renderer with no container mounted; every projection is skipped.
    pub fn unmounted(duration: f64) -> Self {
        Self {
            mounted: false,
            ..Self::new(duration, 0.0)
        }
    }

    pub fn mount(&mut self) {
        self.mounted = true;
    }

    pub fn take_events(&mut self) -> Vec<RendererEvent> {
        self.events.drain(..).collect()
    }

    pub fn calls(&self) -> &[RendererCall] {
        &self.calls
    }

    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    pub fn zoom_level(&self) -> f64 {
        self.zoom_level
    }

    pub fn split_channels(&self) -> bool {
        self.split_channels
    }

    /// Simulate a user drag from `start` to `end`, returning the callbacks a
    /// real renderer fires for it.
    pub fn drag_select(&mut self, start: f64, end: f64) -> Vec<RendererEvent> {
        let info = RegionInfo {
            id: format!("region-{}", Uuid::new_v4()),
            start: start.min(end),
            end: start.max(end),
            data: RegionData::default(),
        };
        self.regions.push(MemoryRegion {
            info: info.clone(),
            classes: BTreeSet::new(),
        });
        vec![
            RendererEvent::RegionCreated(info.clone()),
            RendererEvent::RegionUpdated(info.clone()),
            RendererEvent::RegionUpdateEnd(info),
        ]
    }

    pub fn region(&self, id: &str) -> Option<RegionInfo> {
        self.find_region(id).map(|r| r.info.clone())
    }

    pub fn region_classes(&self, id: &str) -> Vec<String> {
        self.find_region(id)
            .map(|r| r.classes.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn markers(&self) -> Vec<MarkerInfo> {
        self.markers.iter().map(|m| m.info.clone()).collect()
    }

    pub fn marker_classes(&self, marker: MarkerId) -> Vec<String> {
        self.find_marker(marker)
            .map(|m| m.classes.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn popover(&self, marker: MarkerId) -> Option<&PopoverPayload> {
        self.find_marker(marker).and_then(|m| m.popover.as_ref())
    }

    /// Markers whose popover is currently open.
    pub fn open_popovers(&self) -> Vec<MarkerId> {
        self.markers
            .iter()
            .filter(|m| m.popover_open)
            .map(|m| m.info.id)
            .collect()
    }

    fn find_region(&self, id: &str) -> Option<&MemoryRegion> {
        self.regions.iter().find(|r| r.info.id == id)
    }

    fn find_region_mut(&mut self, id: &str) -> Option<&mut MemoryRegion> {
        self.regions.iter_mut().find(|r| r.info.id == id)
    }

    fn find_marker(&self, marker: MarkerId) -> Option<&MemoryMarker> {
        self.markers.iter().find(|m| m.info.id == marker)
    }

    fn find_marker_mut(&mut self, marker: MarkerId) -> Option<&mut MemoryMarker> {
        self.markers.iter_mut().find(|m| m.info.id == marker)
    }
}

impl Renderer for MemoryRenderer {
    fn is_ready(&self) -> bool {
        self.mounted && !self.destroyed
    }

    fn load(&mut self, source: &str, _options: &LoadOptions) {
        self.calls.push(RendererCall::Load(source.to_string()));
    }

    fn destroy(&mut self) {
        self.calls.push(RendererCall::Destroy);
        self.destroyed = true;
        self.regions.clear();
        self.markers.clear();
        self.events.clear();
    }

    fn redraw(&mut self) {
        self.calls.push(RendererCall::Redraw);
    }

    fn add_region(&mut self, options: RegionOptions) -> String {
        self.calls.push(RendererCall::AddRegion(options.id.clone()));
        let id = if options.id.is_empty() {
            format!("region-{}", Uuid::new_v4())
        } else {
            options.id
        };
        let info = RegionInfo {
            id: id.clone(),
            start: options.start,
            end: options.end,
            data: options.data,
        };
        // Same id replaces the existing region, as the real plugin does
        self.regions.retain(|r| r.info.id != id);
        self.regions.push(MemoryRegion {
            info: info.clone(),
            classes: BTreeSet::new(),
        });
        self.events.push_back(RendererEvent::RegionCreated(info));
        id
    }

    fn remove_region(&mut self, id: &str) {
        self.calls.push(RendererCall::RemoveRegion(id.to_string()));
        if let Some(pos) = self.regions.iter().position(|r| r.info.id == id) {
            let removed = self.regions.remove(pos);
            self.events.push_back(RendererEvent::RegionRemoved(removed.info));
        }
    }

    fn regions(&self) -> Vec<RegionInfo> {
        self.regions.iter().map(|r| r.info.clone()).collect()
    }

    fn add_region_class(&mut self, id: &str, class: &str) {
        if let Some(region) = self.find_region_mut(id) {
            region.classes.insert(class.to_string());
        }
    }

    fn remove_region_class(&mut self, id: &str, class: &str) {
        if let Some(region) = self.find_region_mut(id) {
            region.classes.remove(class);
        }
    }

    fn region_has_class(&self, id: &str, class: &str) -> bool {
        self.find_region(id)
            .map(|r| r.classes.contains(class))
            .unwrap_or(false)
    }

    fn region_anchor(&self, id: &str) -> Option<Anchor> {
        if self.duration <= 0.0 {
            return None;
        }
        let region = self.find_region(id)?;
        let px_per_sec = self.container_width / self.duration;
        Some(Anchor {
            left: region.info.start * px_per_sec,
            width: region.info.duration() * px_per_sec,
        })
    }

    fn add_marker(&mut self, options: MarkerOptions) -> MarkerId {
        self.calls.push(RendererCall::AddMarker(options.label.clone()));
        let id = MarkerId(self.next_marker);
        self.next_marker += 1;
        self.markers.push(MemoryMarker {
            info: MarkerInfo {
                id,
                time: options.time,
                label: options.label,
            },
            classes: BTreeSet::new(),
            popover: None,
            popover_open: false,
        });
        id
    }

    fn clear_markers(&mut self) {
        self.calls.push(RendererCall::ClearMarkers);
        self.markers.clear();
    }

    fn add_marker_class(&mut self, marker: MarkerId, class: &str) {
        if let Some(m) = self.find_marker_mut(marker) {
            m.classes.insert(class.to_string());
        }
    }

    fn marker_has_popover(&self, marker: MarkerId) -> bool {
        self.find_marker(marker)
            .map(|m| m.popover.is_some())
            .unwrap_or(false)
    }

    fn attach_popover(&mut self, marker: MarkerId, payload: &PopoverPayload) {
        self.calls.push(RendererCall::AttachPopover(marker));
        if let Some(m) = self.find_marker_mut(marker) {
            m.popover = Some(payload.clone());
        }
    }

    fn set_popover_open(&mut self, marker: MarkerId, open: bool) {
        if let Some(m) = self.find_marker_mut(marker) {
            m.popover_open = open;
        }
    }

    fn close_all_popovers(&mut self) {
        for marker in &mut self.markers {
            marker.popover_open = false;
        }
    }

    fn zoom(&mut self, level: f64) {
        self.calls.push(RendererCall::Zoom(level));
        self.zoom_level = level;
        self.events.push_back(RendererEvent::Zoom(level));
    }

    fn seek_to(&mut self, fraction: f64) {
        self.calls.push(RendererCall::SeekTo(fraction));
        self.current_time = fraction.clamp(0.0, 1.0) * self.duration;
        self.events.push_back(RendererEvent::Seek(fraction));
    }

    fn set_current_time(&mut self, seconds: f64) {
        self.calls.push(RendererCall::SetCurrentTime(seconds));
        self.current_time = seconds.clamp(0.0, self.duration.max(0.0));
        let fraction = if self.duration > 0.0 {
            self.current_time / self.duration
        } else {
            0.0
        };
        self.events.push_back(RendererEvent::Seek(fraction));
    }

    fn current_time(&self) -> f64 {
        self.current_time
    }

    fn duration(&self) -> f64 {
        self.duration
    }

    fn container_width(&self) -> f64 {
        self.container_width
    }

    fn play(&mut self) {
        self.calls.push(RendererCall::Play);
        self.events.push_back(RendererEvent::Play);
    }

    fn play_region(&mut self, id: &str) {
        self.calls.push(RendererCall::PlayRegion(id.to_string()));
        self.events.push_back(RendererEvent::Play);
    }

    fn pause(&mut self) {
        self.calls.push(RendererCall::Pause);
        self.events.push_back(RendererEvent::Pause);
    }

    fn set_split_channels(&mut self, split: bool) {
        self.calls.push(RendererCall::SetSplitChannels(split));
        self.split_channels = split;
    }
}

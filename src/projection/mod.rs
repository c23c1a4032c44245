pub mod popover;

use std::collections::HashMap;

use crate::models::GroupedSegment;
use crate::renderer::{
    MarkerId, MarkerOptions, MarkerPosition, RegionData, RegionOptions, Renderer,
    MARKER_START_CLASS,
};

pub use popover::{MetadataBlock, PopoverPayload};

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_info};

/// Keeps grouped segments and the renderer's step regions/markers in sync.
///
/// Retains an explicit map from grouped segment id to the handles it created
/// so popovers and anchors are found without querying the renderer.
#[derive(Debug, Default)]
pub struct Projection {
    regions: HashMap<String, String>,
    markers: HashMap<String, MarkerId>,
    marker_groups: HashMap<MarkerId, String>,
    order: Vec<String>,
}

impl Projection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace every step region and marker with one per grouped segment.
    ///
    /// Idempotent. Selection regions are left alone. Returns the number of
    /// projected groups, or 0 when the renderer has no mounted container.
    pub fn project(&mut self, grouped: &[GroupedSegment], renderer: &mut dyn Renderer) -> usize {
        if !renderer.is_ready() {
            log_debug!("renderer not ready; skipping projection of {} steps", grouped.len());
            return 0;
        }

        self.clear(renderer);

        for (index, group) in grouped.iter().enumerate() {
            let region_id = renderer.add_region(RegionOptions {
                id: group.id.clone(),
                start: group.start,
                end: group.end,
                drag: false,
                resize: false,
                data: RegionData {
                    step: true,
                    class: Some(group.kind.clone()),
                    label: Some(group.title.clone()),
                    kind: None,
                },
            });

            let marker = renderer.add_marker(MarkerOptions {
                time: group.start,
                label: group.title.clone(),
                position: MarkerPosition::Top,
            });

            if !renderer.marker_has_popover(marker) {
                renderer.attach_popover(marker, &PopoverPayload::for_group(group));
            }
            if index == 0 {
                renderer.add_marker_class(marker, MARKER_START_CLASS);
            }

            self.regions.insert(group.id.clone(), region_id);
            self.markers.insert(group.id.clone(), marker);
            self.marker_groups.insert(marker, group.id.clone());
            self.order.push(group.id.clone());
        }

        log_info!("projected {} steps onto the waveform", grouped.len());
        grouped.len()
    }

    /// Remove all step regions and markers from the renderer.
    pub fn clear(&mut self, renderer: &mut dyn Renderer) {
        renderer.clear_markers();
        let stale: Vec<String> = renderer
            .regions()
            .into_iter()
            .filter(|r| r.is_step())
            .map(|r| r.id)
            .collect();
        for id in stale {
            renderer.remove_region(&id);
        }

        self.regions.clear();
        self.markers.clear();
        self.marker_groups.clear();
        self.order.clear();
    }

    pub fn marker_for(&self, group_id: &str) -> Option<MarkerId> {
        self.markers.get(group_id).copied()
    }

    pub fn region_for(&self, group_id: &str) -> Option<&str> {
        self.regions.get(group_id).map(String::as_str)
    }

    pub fn group_for_marker(&self, marker: MarkerId) -> Option<&str> {
        self.marker_groups.get(&marker).map(String::as_str)
    }

    pub fn group_for_region(&self, region_id: &str) -> Option<&str> {
        self.regions
            .iter()
            .find(|(_, rid)| rid.as_str() == region_id)
            .map(|(gid, _)| gid.as_str())
    }

    /// Projected group ids in render order.
    pub fn group_ids(&self) -> &[String] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

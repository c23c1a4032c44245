//! Translates renderer callbacks into discrete inspector transitions.

use crate::renderer::{MarkerId, RendererEvent};
use crate::selection::SelectionInput;

#[derive(Debug, Clone, PartialEq)]
pub enum Dispatch {
    Loaded { channels: u16 },
    LoadProgress(u8),
    LoadFailed(String),
    Playing(bool),
    /// Renderer applied a zoom level
    ZoomSettled(f64),
    /// Renderer finished moving the cursor
    SeekSettled,
    MarkerClicked(MarkerId),
    Selection(SelectionInput),
}

pub fn translate(event: RendererEvent) -> Dispatch {
    match event {
        RendererEvent::Ready { channels } => Dispatch::Loaded { channels },
        RendererEvent::Loading(percent) => Dispatch::LoadProgress(percent.min(100)),
        RendererEvent::Error(message) => Dispatch::LoadFailed(message),
        RendererEvent::Play => Dispatch::Playing(true),
        RendererEvent::Pause => Dispatch::Playing(false),
        RendererEvent::Zoom(level) => Dispatch::ZoomSettled(level),
        RendererEvent::Seek(_) => Dispatch::SeekSettled,
        RendererEvent::MarkerClick(marker) => Dispatch::MarkerClicked(marker.id),
        RendererEvent::RegionCreated(region) => {
            Dispatch::Selection(SelectionInput::RegionCreated(region))
        }
        RendererEvent::RegionUpdated(region) => {
            Dispatch::Selection(SelectionInput::RegionUpdated(region))
        }
        RendererEvent::RegionUpdateEnd(_) => Dispatch::Selection(SelectionInput::RegionUpdateEnd),
        RendererEvent::RegionMouseenter(region) => {
            Dispatch::Selection(SelectionInput::RegionHovered(region))
        }
        RendererEvent::RegionRemoved(region) => {
            Dispatch::Selection(SelectionInput::RegionRemoved(region.id))
        }
        RendererEvent::RegionClick(_) => Dispatch::Selection(SelectionInput::RegionClicked),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::{MarkerInfo, RegionData, RegionInfo};

    #[test]
    fn region_events_become_selection_input() {
        let region = RegionInfo {
            id: "r".into(),
            start: 0.0,
            end: 1.0,
            data: RegionData::default(),
        };
        assert_eq!(
            translate(RendererEvent::RegionRemoved(region.clone())),
            Dispatch::Selection(SelectionInput::RegionRemoved("r".into()))
        );
        assert_eq!(
            translate(RendererEvent::RegionClick(region)),
            Dispatch::Selection(SelectionInput::RegionClicked)
        );
    }

    #[test]
    fn lifecycle_events_map_directly() {
        assert_eq!(
            translate(RendererEvent::Ready { channels: 2 }),
            Dispatch::Loaded { channels: 2 }
        );
        assert_eq!(translate(RendererEvent::Loading(140)), Dispatch::LoadProgress(100));
        assert_eq!(translate(RendererEvent::Pause), Dispatch::Playing(false));
        assert_eq!(
            translate(RendererEvent::MarkerClick(MarkerInfo {
                id: MarkerId(3),
                time: 1.0,
                label: "x".into(),
            })),
            Dispatch::MarkerClicked(MarkerId(3))
        );
    }
}

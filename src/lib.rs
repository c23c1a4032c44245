//! Step grouping, selection and navigation engine for annotated audio waveforms.
//!
//! Annotation [`Segment`]s are grouped into [`GroupedSegment`]s, projected onto
//! a [`Renderer`] as regions and markers with popovers, and kept in sync with
//! user selection, zoom and step navigation by an [`Inspector`].

pub mod config;
pub mod error;
pub mod grouping;
pub mod inspector;
pub mod models;
pub mod navigation;
pub mod projection;
pub mod renderer;
pub mod selection;
pub mod utils;

pub use config::{ConfigStore, InspectorConfig, InspectorLabels};
pub use error::{InspectorError, InspectorResult};
pub use grouping::{group_segments, GroupingConfig};
pub use inspector::{
    Inspector, InspectorCallbacks, InspectorSnapshot, LoadStatus, POPOVER_DELAY, REDRAW_DELAY,
    SETTLE_FALLBACK,
};
pub use models::{GroupedSegment, ResultCode, Segment, StepMetadata};
pub use navigation::{Direction, NavigationTarget};
pub use projection::{PopoverPayload, Projection};
pub use renderer::{MemoryRenderer, Renderer, RendererEvent};
pub use selection::{InteractionMode, InteractionState, SelectionMachine};
pub use utils::init_logging;

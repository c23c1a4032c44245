pub mod controller;
pub mod listener;
pub mod snapshot;

pub use controller::{Inspector, InspectorCallbacks, POPOVER_DELAY, REDRAW_DELAY, SETTLE_FALLBACK};
pub use snapshot::{InspectorSnapshot, LoadStatus};

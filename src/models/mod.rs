pub mod grouped;
pub mod segment;

pub use grouped::GroupedSegment;
pub use segment::{ResultCode, Segment, StepMetadata, ERROR_KIND, DEFAULT_KIND};

use serde::Serialize;

use super::segment::Segment;

/// One or more segments merged for compact display on the timeline.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GroupedSegment {
    pub id: String,
    pub start: f64,
    pub end: f64,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub members: Vec<Segment>,
}

impl GroupedSegment {
    pub fn single(segment: Segment) -> Self {
        Self {
            id: segment.id.clone(),
            start: segment.start_or_zero(),
            end: segment.end_or_start(),
            title: segment.title.clone(),
            kind: segment.kind.clone(),
            members: vec![segment],
        }
    }

    pub fn is_cluster(&self) -> bool {
        self.members.len() > 1
    }

    /// False when no member carries an end time, so `end` only mirrors the start.
    pub fn has_known_end(&self) -> bool {
        self.members.is_empty() || self.members.iter().any(|m| m.end.is_some_and(f64::is_finite))
    }

    pub fn contains(&self, segment_id: &str) -> bool {
        self.members.iter().any(|m| m.id == segment_id)
    }
}

use serde::{Deserialize, Serialize};

use crate::grouping::algorithm::sort_by_start;
use crate::models::GroupedSegment;

/// Look-back applied by "previous" so that pressing it just after a step
/// starts lands on the step before.
pub const PREVIOUS_STEP_BUFFER_SECS: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    First,
    Previous,
    Next,
    End,
}

/// Where a navigation action lands.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigationTarget {
    /// Grouped segment whose popover opens after the seek
    pub id: String,
    pub time: f64,
    /// `time` as a fraction of the total duration, for the renderer's seek
    pub fraction: f64,
}

/// Resolve the step a navigation action should move to.
///
/// Returns `None` for empty input or when nothing lies in that direction;
/// "next" and "previous" never wrap around.
pub fn resolve(
    direction: Direction,
    grouped: &[GroupedSegment],
    current_time: f64,
    total_duration: f64,
) -> Option<NavigationTarget> {
    if grouped.is_empty() {
        return None;
    }

    let mut steps = grouped.to_vec();
    sort_by_start(&mut steps);

    let (step, time) = match direction {
        Direction::First => {
            let step = steps.first()?;
            (step, step.start)
        }
        Direction::End => {
            let step = steps.last()?;
            let time = if step.has_known_end() && step.end.is_finite() {
                step.end
            } else {
                total_duration
            };
            (step, time)
        }
        Direction::Next => {
            let step = steps.iter().find(|s| s.start > current_time)?;
            (step, step.start)
        }
        Direction::Previous => {
            let step = steps
                .iter()
                .rev()
                .find(|s| s.start < current_time - PREVIOUS_STEP_BUFFER_SECS)?;
            (step, step.start)
        }
    };

    Some(NavigationTarget {
        id: step.id.clone(),
        time,
        fraction: seek_fraction(time, total_duration),
    })
}

/// Position as a fraction of the duration, clamped to [0, 1].
pub fn seek_fraction(time: f64, total_duration: f64) -> f64 {
    if total_duration <= 0.0 || !total_duration.is_finite() || !time.is_finite() {
        return 0.0;
    }
    (time / total_duration).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Segment;

    fn steps() -> Vec<GroupedSegment> {
        // Deliberately out of order
        vec![
            GroupedSegment::single(Segment::new("c", 10.0, 12.0)),
            GroupedSegment::single(Segment::new("a", 0.0, 3.0)),
            GroupedSegment::single(Segment::new("b", 5.0, 8.0)),
        ]
    }

    #[test]
    fn first_and_end_use_sorted_order() {
        let first = resolve(Direction::First, &steps(), 7.0, 20.0).unwrap();
        assert_eq!(first.id, "a");
        assert_eq!(first.time, 0.0);

        let end = resolve(Direction::End, &steps(), 0.0, 20.0).unwrap();
        assert_eq!(end.id, "c");
        assert_eq!(end.time, 12.0);
        assert_eq!(end.fraction, 0.6);
    }

    #[test]
    fn end_without_an_end_time_seeks_to_the_duration() {
        let mut open_ended = steps();
        open_ended.push(GroupedSegment::single(Segment {
            end: None,
            ..Segment::new("d", 20.0, 20.0)
        }));

        let end = resolve(Direction::End, &open_ended, 0.0, 30.0).unwrap();
        assert_eq!(end.id, "d");
        assert_eq!(end.time, 30.0);
        assert_eq!(end.fraction, 1.0);
    }

    #[test]
    fn next_is_strictly_after_current_time() {
        let target = resolve(Direction::Next, &steps(), 5.0, 20.0).unwrap();
        assert_eq!(target.id, "c");
        assert_eq!(target.fraction, 0.5);

        let target = resolve(Direction::Next, &steps(), 4.99, 20.0).unwrap();
        assert_eq!(target.id, "b");
    }

    #[test]
    fn next_past_the_last_step_does_not_wrap() {
        assert!(resolve(Direction::Next, &steps(), 10.0, 20.0).is_none());
    }

    #[test]
    fn previous_skips_the_step_just_started() {
        let target = resolve(Direction::Previous, &steps(), 10.5, 20.0).unwrap();
        assert_eq!(target.id, "b");

        let target = resolve(Direction::Previous, &steps(), 11.5, 20.0).unwrap();
        assert_eq!(target.id, "c");
    }

    #[test]
    fn previous_near_the_start_is_a_no_op() {
        assert!(resolve(Direction::Previous, &steps(), 0.9, 20.0).is_none());
    }

    #[test]
    fn empty_steps_resolve_to_nothing() {
        for direction in [Direction::First, Direction::Previous, Direction::Next, Direction::End] {
            assert!(resolve(direction, &[], 3.0, 20.0).is_none());
        }
    }

    #[test]
    fn ties_keep_input_order() {
        let tied = vec![
            GroupedSegment::single(Segment::new("x", 2.0, 3.0)),
            GroupedSegment::single(Segment::new("y", 2.0, 4.0)),
        ];
        assert_eq!(resolve(Direction::First, &tied, 0.0, 10.0).unwrap().id, "x");
        assert_eq!(resolve(Direction::End, &tied, 0.0, 10.0).unwrap().id, "y");
    }

    #[test]
    fn zero_duration_seeks_to_the_origin() {
        assert_eq!(seek_fraction(3.0, 0.0), 0.0);
        assert_eq!(seek_fraction(30.0, 10.0), 1.0);
        let target = resolve(Direction::Next, &steps(), 1.0, 0.0).unwrap();
        assert_eq!(target.fraction, 0.0);
    }
}

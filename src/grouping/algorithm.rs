use crate::grouping::config::GroupingConfig;
use crate::grouping::merge::merge_cluster;
use crate::models::{GroupedSegment, Segment};

const ENABLE_LOGS: bool = false;

use crate::log_debug;

/// Timeline length used for the grouping threshold: the latest segment end.
pub fn total_duration(segments: &[Segment]) -> f64 {
    segments
        .iter()
        .filter_map(|s| s.end)
        .filter(|e| e.is_finite())
        .fold(0.0, f64::max)
}

/// Main grouping function: clusters segments whose starts sit too close together.
///
/// Each unassigned segment seeds a cluster and every later unassigned segment
/// whose start lies within the threshold of the *seed's* start joins it. The
/// distance is never chained through other members, so a slowly drifting run
/// of steps can split into several clusters even when consecutive gaps are small.
///
/// Multi-member clusters come first in seed order, followed by the remaining
/// singletons in input order. The output is not sorted by start.
pub fn group_segments(segments: &[Segment], config: &GroupingConfig) -> Vec<GroupedSegment> {
    // Edge case: nothing to group
    if segments.is_empty() {
        return Vec::new();
    }

    let threshold = config.threshold(total_duration(segments));
    let mut assigned = vec![false; segments.len()];
    let mut clusters: Vec<Vec<usize>> = Vec::new();
    let mut singles: Vec<usize> = Vec::new();

    for seed in 0..segments.len() {
        if assigned[seed] {
            continue;
        }
        assigned[seed] = true;

        let seed_start = segments[seed].start_or_zero();
        let mut members = vec![seed];
        for candidate in (seed + 1)..segments.len() {
            if assigned[candidate] {
                continue;
            }
            let distance = (seed_start - segments[candidate].start_or_zero()).abs();
            if distance <= threshold {
                assigned[candidate] = true;
                members.push(candidate);
            }
        }

        if members.len() > 1 {
            clusters.push(members);
        } else {
            singles.push(seed);
        }
    }

    log_debug!(
        "grouped {} segments into {} clusters and {} singles (threshold {:.3}s)",
        segments.len(),
        clusters.len(),
        singles.len(),
        threshold
    );

    let mut grouped: Vec<GroupedSegment> = clusters
        .into_iter()
        .enumerate()
        .map(|(index, members)| {
            let members = members.into_iter().map(|i| segments[i].clone()).collect();
            merge_cluster(index, members)
        })
        .collect();
    grouped.extend(
        singles
            .into_iter()
            .map(|i| GroupedSegment::single(segments[i].clone())),
    );
    grouped
}

/// Stable sort by start; ties keep their relative order.
pub fn sort_by_start(grouped: &mut [GroupedSegment]) {
    grouped.sort_by(|a, b| a.start.total_cmp(&b.start));
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn factor(percent: f64) -> GroupingConfig {
        GroupingConfig::new(percent)
    }

    #[test]
    fn empty_input_yields_empty_output() {
        assert!(group_segments(&[], &factor(2.0)).is_empty());
    }

    #[test]
    fn distant_steps_stay_separate() {
        let segments = vec![Segment::new("0", 0.0, 3.0), Segment::new("1", 3.0, 6.0)];

        let grouped = group_segments(&segments, &factor(2.0));
        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped[0].title, "0");
        assert_eq!(grouped[1].title, "1");
        assert!(grouped.iter().all(|g| !g.is_cluster()));
    }

    #[test]
    fn close_steps_cluster_and_far_step_stays_alone() {
        let segments = vec![
            Segment::new("0", 0.0, 0.1),
            Segment::new("1", 0.1, 0.2),
            Segment::new("2", 10.0, 10.0),
        ];

        let grouped = group_segments(&segments, &factor(2.0));
        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped[0].title, "0 & 1");
        assert_eq!(grouped[0].start, 0.0);
        assert_eq!(grouped[0].end, 0.2);
        assert_eq!(grouped[1].id, "2");
    }

    #[test]
    fn zero_factor_only_merges_identical_starts() {
        let segments = vec![
            Segment::new("a", 1.0, 2.0),
            Segment::new("b", 1.0000001, 2.0),
            Segment::new("c", 1.0, 3.0),
        ];

        let grouped = group_segments(&segments, &factor(0.0));
        assert_eq!(grouped.len(), 2);
        let cluster = &grouped[0];
        let ids: Vec<&str> = cluster.members.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c"]);
        assert_eq!(grouped[1].id, "b");
    }

    #[test]
    fn distance_is_measured_from_the_seed() {
        // Threshold is 2% of 100s = 2s. Consecutive gaps are 1.5s but the third
        // step is 3s from the seed, so it starts its own run.
        let segments = vec![
            Segment::new("0", 0.0, 1.0),
            Segment::new("1", 1.5, 2.0),
            Segment::new("2", 3.0, 4.0),
            Segment::new("3", 50.0, 100.0),
        ];

        let grouped = group_segments(&segments, &factor(2.0));
        let titles: Vec<&str> = grouped.iter().map(|g| g.title.as_str()).collect();
        assert_eq!(titles, vec!["0 & 1", "2", "3"]);
    }

    #[test]
    fn clusters_come_before_singletons() {
        let segments = vec![
            Segment::new("lone", 0.0, 1.0),
            Segment::new("x", 40.0, 41.0),
            Segment::new("y", 40.5, 41.0),
            Segment::new("end", 100.0, 100.0),
        ];

        let grouped = group_segments(&segments, &factor(2.0));
        let ids: Vec<&str> = grouped.iter().map(|g| g.id.as_str()).collect();
        assert_eq!(ids, vec!["g-0", "lone", "end"]);

        let mut sorted = grouped.clone();
        sort_by_start(&mut sorted);
        let ids: Vec<&str> = sorted.iter().map(|g| g.id.as_str()).collect();
        assert_eq!(ids, vec!["lone", "g-0", "end"]);
    }

    #[test]
    fn every_segment_lands_in_exactly_one_group() {
        let segments: Vec<Segment> = (0..40)
            .map(|i| {
                let start = (i * i % 37) as f64 * 0.7;
                let mut segment = Segment::new(i.to_string(), start, start + 0.5);
                if i % 7 == 3 {
                    segment.start = None;
                }
                if i % 5 == 2 {
                    segment.end = None;
                }
                segment
            })
            .collect();

        for percent in [0.0, 1.0, 2.0, 10.0, 50.0] {
            let grouped = group_segments(&segments, &factor(percent));
            let mut seen = HashSet::new();
            let mut count = 0;
            for group in &grouped {
                for member in &group.members {
                    assert!(seen.insert(member.id.clone()), "duplicate {}", member.id);
                    count += 1;
                }
                let min_start = group
                    .members
                    .iter()
                    .map(|m| m.start_or_zero())
                    .fold(f64::INFINITY, f64::min);
                let max_end = group
                    .members
                    .iter()
                    .map(|m| m.end_or_start())
                    .fold(f64::NEG_INFINITY, f64::max);
                assert_eq!(group.start, min_start);
                assert_eq!(group.end, max_end);
            }
            assert_eq!(count, segments.len());
        }
    }

    #[test]
    fn missing_times_do_not_panic() {
        let mut untimed = Segment::new("u", 0.0, 0.0);
        untimed.start = None;
        untimed.end = None;
        let segments = vec![untimed, Segment::new("t", 5.0, 6.0)];

        let grouped = group_segments(&segments, &factor(2.0));
        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped[0].start, 0.0);
        assert_eq!(grouped[0].end, 0.0);
    }

    #[test]
    fn untimed_seed_pulls_cluster_start_to_zero() {
        let mut untimed = Segment::new("u", 0.0, 0.0);
        untimed.start = None;
        untimed.end = None;
        let segments = vec![
            untimed,
            Segment::new("t", 0.05, 0.1),
            Segment::new("z", 10.0, 10.0),
        ];

        let grouped = group_segments(&segments, &factor(2.0));
        assert_eq!(grouped[0].id, "g-0");
        assert_eq!(grouped[0].start, 0.0);
        assert_eq!(grouped[0].end, 0.1);
    }

    #[test]
    fn negative_factor_behaves_like_zero() {
        let segments = vec![Segment::new("0", 0.0, 1.0), Segment::new("1", 0.01, 1.0)];
        assert_eq!(group_segments(&segments, &factor(-5.0)).len(), 2);
    }
}

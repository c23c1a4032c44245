use crate::models::{GroupedSegment, Segment, DEFAULT_KIND, ERROR_KIND};

/// Build the display title for a cluster: "A, B & C".
pub fn join_titles(members: &[Segment]) -> String {
    match members {
        [] => String::new(),
        [only] => only.title.clone(),
        [init @ .., last] => {
            let head: Vec<&str> = init.iter().map(|m| m.title.as_str()).collect();
            format!("{} & {}", head.join(", "), last.title)
        }
    }
}

/// Merge clustered members into one grouped segment.
///
/// Start is the earliest member start, end the latest member end. The type
/// escalates to "error" when any member is an error step.
pub fn merge_cluster(cluster_index: usize, members: Vec<Segment>) -> GroupedSegment {
    let start = members
        .iter()
        .map(Segment::start_or_zero)
        .fold(f64::INFINITY, f64::min);
    let end = members
        .iter()
        .map(Segment::end_or_start)
        .fold(f64::NEG_INFINITY, f64::max);
    let start = if start.is_finite() { start } else { 0.0 };

    let kind = if members.iter().any(Segment::is_error) {
        ERROR_KIND
    } else {
        DEFAULT_KIND
    };

    GroupedSegment {
        id: format!("g-{}", cluster_index),
        start,
        end: end.max(start),
        title: join_titles(&members),
        kind: kind.to_string(),
        members,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn titles_join_with_ampersand_before_last() {
        let a = Segment::new("a", 0.0, 1.0).with_title("A");
        let b = Segment::new("b", 0.0, 1.0).with_title("B");
        let c = Segment::new("c", 0.0, 1.0).with_title("C");

        assert_eq!(join_titles(&[a.clone()]), "A");
        assert_eq!(join_titles(&[a.clone(), b.clone()]), "A & B");
        assert_eq!(join_titles(&[a, b, c]), "A, B & C");
    }

    #[test]
    fn cluster_spans_member_union_and_escalates_errors() {
        let members = vec![
            Segment::new("1", 0.4, 0.6),
            Segment::new("2", 0.1, 0.3).with_kind("error"),
            Segment::new("3", 0.2, 0.9),
        ];

        let grouped = merge_cluster(4, members);
        assert_eq!(grouped.id, "g-4");
        assert_eq!(grouped.start, 0.1);
        assert_eq!(grouped.end, 0.9);
        assert_eq!(grouped.kind, ERROR_KIND);
        assert_eq!(grouped.members.len(), 3);
    }

    #[test]
    fn missing_times_count_like_single_steps() {
        let members = vec![
            Segment {
                start: None,
                end: None,
                ..Segment::new("u", 0.0, 0.0)
            },
            Segment::new("t", 0.05, 0.1),
        ];

        let grouped = merge_cluster(0, members);
        assert_eq!(grouped.start, 0.0);
        assert_eq!(grouped.end, 0.1);
    }

    #[test]
    fn cluster_without_errors_is_default() {
        let members = vec![
            Segment::new("1", 0.0, 0.1).with_kind("warning"),
            Segment::new("2", 0.1, 0.2),
        ];
        assert_eq!(merge_cluster(0, members).kind, DEFAULT_KIND);
    }
}

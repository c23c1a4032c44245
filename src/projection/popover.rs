use serde::Serialize;

use crate::models::{GroupedSegment, ResultCode, Segment};

/// Metadata of one step as shown inside a popover.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetadataBlock {
    pub segment_id: String,
    pub step_no: Option<u32>,
    pub result_code: ResultCode,
    pub detail_text: String,
    pub response_time_seconds: Option<f64>,
    pub duration_seconds: Option<f64>,
}

impl MetadataBlock {
    pub fn from_segment(segment: &Segment) -> Self {
        match &segment.metadata {
            Some(meta) => Self {
                segment_id: segment.id.clone(),
                step_no: Some(meta.step_no),
                result_code: meta.result_code,
                detail_text: meta.detail_text.clone(),
                response_time_seconds: Some(meta.response_time_seconds),
                duration_seconds: Some(meta.duration_seconds),
            },
            None => Self {
                segment_id: segment.id.clone(),
                step_no: None,
                result_code: ResultCode::Pending,
                detail_text: String::new(),
                response_time_seconds: None,
                duration_seconds: None,
            },
        }
    }

    fn to_markup(&self) -> String {
        let step = self
            .step_no
            .map(|n| n.to_string())
            .unwrap_or_else(|| "-".to_string());
        format!(
            concat!(
                "<div class=\"c-popover-details-wrapper\">",
                "<div class=\"c-popover-top-wrapper\">",
                "<div class=\"c-popover-step\"><strong>Step {step}</strong></div>",
                "<div class=\"c-popover-badge {class}\">{badge}</div>",
                "</div>",
                "<div class=\"c-popover-result-wrapper\">",
                "<div class=\"c-popover-result-detail\">{detail}</div>",
                "<div class=\"c-popover-response-time\">Response Time: {response}</div>",
                "<div class=\"c-popover-duration\">Duration: {duration}</div>",
                "</div>",
                "</div>"
            ),
            step = step,
            class = self.result_code.class_name(),
            badge = self.result_code.as_str(),
            detail = escape_html(&self.detail_text),
            response = format_seconds(self.response_time_seconds),
            duration = format_seconds(self.duration_seconds),
        )
    }
}

/// Content attached to one rendered marker.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PopoverPayload {
    /// Id of the grouped segment the marker belongs to
    pub group_id: String,
    pub grouped: bool,
    pub blocks: Vec<MetadataBlock>,
}

impl PopoverPayload {
    /// One block for a single step, one block per member for a cluster.
    pub fn for_group(group: &GroupedSegment) -> Self {
        Self {
            group_id: group.id.clone(),
            grouped: group.is_cluster(),
            blocks: group.members.iter().map(MetadataBlock::from_segment).collect(),
        }
    }

    pub fn to_markup(&self) -> String {
        let id = escape_html(&self.group_id);
        if self.grouped {
            let inner: String = self
                .blocks
                .iter()
                .map(|b| format!("<div class=\"popover-inner\">{}</div>", b.to_markup()))
                .collect();
            format!(
                "<audio-inspector-popover data-group=\"{}\" class=\"grouped-popover\">{}</audio-inspector-popover>",
                id, inner
            )
        } else {
            let inner: String = self.blocks.iter().map(MetadataBlock::to_markup).collect();
            format!(
                "<audio-inspector-popover data-id=\"{}\" class=\"popover\">{}</audio-inspector-popover>",
                id, inner
            )
        }
    }
}

fn format_seconds(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{:.2}s", v),
        _ => "-".to_string(),
    }
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grouping::merge::merge_cluster;
    use crate::models::StepMetadata;

    fn step(id: &str, step_no: u32, code: ResultCode) -> Segment {
        Segment::new(id, 0.0, 1.0).with_metadata(StepMetadata {
            step_no,
            result_code: code,
            detail_text: format!("detail <{}>", id),
            response_time_seconds: 0.5,
            duration_seconds: 1.25,
        })
    }

    #[test]
    fn single_step_payload_has_one_block() {
        let group = GroupedSegment::single(step("s1", 1, ResultCode::Success));
        let payload = PopoverPayload::for_group(&group);

        assert!(!payload.grouped);
        assert_eq!(payload.blocks.len(), 1);

        let markup = payload.to_markup();
        assert!(markup.contains("data-id=\"s1\""));
        assert!(markup.contains("<strong>Step 1</strong>"));
        assert!(markup.contains("c-popover-badge success"));
        assert!(markup.contains("detail &lt;s1&gt;"));
        assert!(markup.contains("Response Time: 0.50s"));
        assert!(markup.contains("Duration: 1.25s"));
    }

    #[test]
    fn cluster_payload_keeps_member_order() {
        let group = merge_cluster(
            0,
            vec![
                step("a", 4, ResultCode::Failed),
                step("b", 5, ResultCode::Aborted),
            ],
        );
        let payload = PopoverPayload::for_group(&group);

        assert!(payload.grouped);
        let ids: Vec<&str> = payload.blocks.iter().map(|b| b.segment_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);

        let markup = payload.to_markup();
        assert!(markup.contains("data-group=\"g-0\""));
        assert_eq!(markup.matches("popover-inner").count(), 2);
        let failed = markup.find("Step 4").unwrap();
        let aborted = markup.find("Step 5").unwrap();
        assert!(failed < aborted);
    }

    #[test]
    fn steps_without_metadata_render_placeholders() {
        let group = GroupedSegment::single(Segment::new("bare", 0.0, 1.0));
        let markup = PopoverPayload::for_group(&group).to_markup();
        assert!(markup.contains("Step -"));
        assert!(markup.contains("c-popover-badge pending"));
    }
}

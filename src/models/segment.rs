use serde::{Deserialize, Serialize};

pub const DEFAULT_KIND: &str = "default";
pub const ERROR_KIND: &str = "error";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum ResultCode {
    Success,
    Failed,
    Satisfactory,
    Aborted,
    InternalError,
    #[default]
    Pending,
}

impl ResultCode {
    /// Badge class used by the popover markup.
    pub fn class_name(&self) -> &'static str {
        match self {
            ResultCode::Success => "success",
            ResultCode::Failed => "failed",
            ResultCode::Satisfactory => "satisfactory",
            ResultCode::Aborted => "aborted",
            ResultCode::InternalError => "internal-error",
            ResultCode::Pending => "pending",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ResultCode::Success => "Success",
            ResultCode::Failed => "Failed",
            ResultCode::Satisfactory => "Satisfactory",
            ResultCode::Aborted => "Aborted",
            ResultCode::InternalError => "Internal Error",
            ResultCode::Pending => "Pending",
        }
    }
}

/// Per-step result details shown in a marker popover.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct StepMetadata {
    pub step_no: u32,
    pub result_code: ResultCode,
    pub detail_text: String,
    pub response_time_seconds: f64,
    pub duration_seconds: f64,
}

/// One raw annotation interval. Supplied by the caller, never mutated by the engine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Segment {
    pub id: String,
    pub start: Option<f64>,
    pub end: Option<f64>,
    #[serde(default)]
    pub title: String,
    #[serde(rename = "type", default = "default_kind")]
    pub kind: String,
    #[serde(default)]
    pub metadata: Option<StepMetadata>,
}

fn default_kind() -> String {
    DEFAULT_KIND.to_string()
}

impl Segment {
    pub fn new(id: impl Into<String>, start: f64, end: f64) -> Self {
        let id = id.into();
        Self {
            title: id.clone(),
            id,
            start: Some(start),
            end: Some(end),
            kind: default_kind(),
            metadata: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = kind.into();
        self
    }

    pub fn with_metadata(mut self, metadata: StepMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Start used for distance and ordering; a missing start counts as zero.
    pub fn start_or_zero(&self) -> f64 {
        self.start.unwrap_or(0.0)
    }

    /// End used for projection; a missing end collapses onto the start.
    pub fn end_or_start(&self) -> f64 {
        self.end.unwrap_or_else(|| self.start_or_zero())
    }

    pub fn is_error(&self) -> bool {
        self.kind == ERROR_KIND
    }
}

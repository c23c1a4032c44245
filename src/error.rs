use thiserror::Error;

/// Errors surfaced by the inspector.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InspectorError {
    /// Audio source failed to load or decode; terminal for that load attempt
    #[error("Failed to load audio: {0}")]
    RendererLoad(String),

    /// A region or marker expected for popover placement was not rendered
    #[error("No rendered anchor for {id}")]
    MissingAnchor { id: String },

    /// Invalid inspector configuration
    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Result type for inspector operations
pub type InspectorResult<T> = Result<T, InspectorError>;

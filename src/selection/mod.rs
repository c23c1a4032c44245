pub mod machine;
pub mod state;

pub use machine::{OperationToken, SelectionInput, SelectionMachine, UiEffect};
pub use state::{InteractionMode, InteractionState, SelectionRegion};

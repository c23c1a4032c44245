use std::collections::BTreeSet;

use crate::renderer::{RegionInfo, NO_HANDLE_CLASS};

use super::state::{InteractionMode, InteractionState, SelectionRegion};

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::log_debug;

/// Renderer-agnostic input, already translated from renderer callbacks.
#[derive(Debug, Clone, PartialEq)]
pub enum SelectionInput {
    RegionCreated(RegionInfo),
    RegionUpdated(RegionInfo),
    RegionUpdateEnd,
    RegionHovered(RegionInfo),
    RegionRemoved(String),
    RegionClicked,
    StepPopoverRequested(String),
    ClearSelection,
    ZoomChanged(f64),
    ClickedOutside,
}

/// Presentational side effects for the adapter to apply.
#[derive(Debug, Clone, PartialEq)]
pub enum UiEffect {
    DecorateRegion { id: String, classes: Vec<String> },
    RemoveOtherSelections { keep: String },
    TagSelection { id: String },
    AnchorSelectionToolbar { id: String },
    ShowStepPopover { id: String },
    HideStepPopovers,
    RemoveSelectionRegions,
    HideSelectionToolbar,
    ClearActiveStyling,
}

/// Proof that a programmatic zoom/seek is in flight.
///
/// While any token is outstanding, region clicks do not clear the selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OperationToken(u64);

#[derive(Debug, Default)]
pub struct SelectionMachine {
    state: InteractionState,
    outstanding: BTreeSet<OperationToken>,
    next_token: u64,
}

impl SelectionMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &InteractionState {
        &self.state
    }

    pub fn mode(&self) -> InteractionMode {
        self.state.mode()
    }

    pub fn begin_operation(&mut self) -> OperationToken {
        self.next_token += 1;
        let token = OperationToken(self.next_token);
        self.outstanding.insert(token);
        token
    }

    /// Release one operation. Returns false if it was already released.
    pub fn complete_operation(&mut self, token: OperationToken) -> bool {
        self.outstanding.remove(&token)
    }

    pub fn is_suppressed(&self) -> bool {
        !self.outstanding.is_empty()
    }

    /// Forget the open popover without emitting effects, e.g. after its
    /// marker was re-created.
    pub fn close_popover(&mut self) {
        self.state.popover_open_id = None;
    }

    pub fn handle(&mut self, input: SelectionInput) -> Vec<UiEffect> {
        match input {
            SelectionInput::RegionCreated(region) => self.on_region_created(region),
            SelectionInput::RegionUpdated(region) => self.on_region_updated(region),
            SelectionInput::RegionUpdateEnd => {
                self.state.refresh_reset_zoom();
                Vec::new()
            }
            SelectionInput::RegionHovered(region) => {
                if region.is_step() {
                    self.open_step_popover(region.id)
                } else {
                    Vec::new()
                }
            }
            SelectionInput::StepPopoverRequested(id) => self.open_step_popover(id),
            SelectionInput::RegionRemoved(id) => {
                if self.state.selection.as_ref().map(|s| s.id == id).unwrap_or(false) {
                    log_debug!("selection region {} removed", id);
                    self.state.clear_selection();
                } else if self.state.selection.is_none() {
                    // Drag abandoned before its first update
                    self.state.selecting = false;
                }
                Vec::new()
            }
            SelectionInput::RegionClicked => {
                if self.is_suppressed() {
                    log_debug!(
                        "region click ignored; {} operation(s) in flight",
                        self.outstanding.len()
                    );
                    Vec::new()
                } else {
                    self.clear_selection()
                }
            }
            SelectionInput::ClearSelection => self.clear_selection(),
            SelectionInput::ZoomChanged(level) => {
                self.state.set_zoom(level);
                Vec::new()
            }
            SelectionInput::ClickedOutside => {
                self.state.popover_open_id = None;
                vec![UiEffect::HideStepPopovers]
            }
        }
    }

    fn on_region_created(&mut self, region: RegionInfo) -> Vec<UiEffect> {
        if region.is_step() {
            let mut classes = vec![NO_HANDLE_CLASS.to_string()];
            if let Some(class) = region.data.class.filter(|c| !c.is_empty()) {
                classes.push(class);
            }
            return vec![UiEffect::DecorateRegion {
                id: region.id,
                classes,
            }];
        }
        self.state.selecting = true;
        Vec::new()
    }

    fn on_region_updated(&mut self, region: RegionInfo) -> Vec<UiEffect> {
        if region.is_step() {
            return Vec::new();
        }

        let mut effects = vec![UiEffect::RemoveOtherSelections {
            keep: region.id.clone(),
        }];
        let already_tagged = self
            .state
            .selection
            .as_ref()
            .map(|s| s.id == region.id)
            .unwrap_or(false);
        if !already_tagged {
            effects.push(UiEffect::TagSelection {
                id: region.id.clone(),
            });
        }
        effects.push(UiEffect::AnchorSelectionToolbar {
            id: region.id.clone(),
        });
        effects.push(UiEffect::HideStepPopovers);

        self.state.select(SelectionRegion {
            id: region.id,
            start_seconds: region.start,
            end_seconds: region.end,
        });
        effects
    }

    fn open_step_popover(&mut self, id: String) -> Vec<UiEffect> {
        if self.state.has_selection() {
            log_debug!("popover for {} suppressed by active selection", id);
            return Vec::new();
        }
        self.state.popover_open_id = Some(id.clone());
        vec![UiEffect::ShowStepPopover { id }]
    }

    fn clear_selection(&mut self) -> Vec<UiEffect> {
        self.state.clear_selection();
        vec![
            UiEffect::RemoveSelectionRegions,
            UiEffect::HideSelectionToolbar,
            UiEffect::ClearActiveStyling,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::RegionData;

    fn step_region(id: &str) -> RegionInfo {
        RegionInfo {
            id: id.into(),
            start: 1.0,
            end: 2.0,
            data: RegionData {
                step: true,
                class: Some("error".into()),
                label: Some(id.into()),
                kind: None,
            },
        }
    }

    fn drag_region(id: &str, start: f64, end: f64) -> RegionInfo {
        RegionInfo {
            id: id.into(),
            start,
            end,
            data: RegionData::default(),
        }
    }

    #[test]
    fn step_region_creation_only_decorates() {
        let mut machine = SelectionMachine::new();
        let effects = machine.handle(SelectionInput::RegionCreated(step_region("4")));

        assert_eq!(
            effects,
            vec![UiEffect::DecorateRegion {
                id: "4".into(),
                classes: vec!["no-handle".into(), "error".into()],
            }]
        );
        assert_eq!(machine.mode(), InteractionMode::Idle);
    }

    #[test]
    fn abandoned_drag_returns_to_idle() {
        let mut machine = SelectionMachine::new();
        machine.handle(SelectionInput::RegionCreated(drag_region("r1", 2.0, 3.0)));
        assert_eq!(machine.mode(), InteractionMode::Selecting);

        machine.handle(SelectionInput::RegionRemoved("r1".into()));
        assert_eq!(machine.mode(), InteractionMode::Idle);
        assert!(!machine.state().selecting);
    }

    #[test]
    fn drag_enters_selecting_then_selected() {
        let mut machine = SelectionMachine::new();
        machine.handle(SelectionInput::RegionCreated(drag_region("r1", 2.0, 3.0)));
        assert_eq!(machine.mode(), InteractionMode::Selecting);

        let effects = machine.handle(SelectionInput::RegionUpdated(drag_region("r1", 2.0, 3.0)));
        assert_eq!(
            effects,
            vec![
                UiEffect::RemoveOtherSelections { keep: "r1".into() },
                UiEffect::TagSelection { id: "r1".into() },
                UiEffect::AnchorSelectionToolbar { id: "r1".into() },
                UiEffect::HideStepPopovers,
            ]
        );
        assert_eq!(machine.mode(), InteractionMode::Selected);
        assert_eq!(machine.state().selection_text, "1.00s");

        // Further resize updates do not re-tag
        let effects = machine.handle(SelectionInput::RegionUpdated(drag_region("r1", 2.0, 3.5)));
        assert!(!effects.contains(&UiEffect::TagSelection { id: "r1".into() }));
        assert_eq!(machine.state().selection_text, "1.50s");
    }

    #[test]
    fn selection_closes_step_popover_and_blocks_new_ones() {
        let mut machine = SelectionMachine::new();
        machine.handle(SelectionInput::RegionHovered(step_region("2")));
        assert_eq!(machine.mode(), InteractionMode::PopoverOpen("2".into()));

        machine.handle(SelectionInput::RegionUpdated(drag_region("r1", 0.0, 1.0)));
        assert_eq!(machine.mode(), InteractionMode::Selected);
        assert!(machine.state().popover_open_id.is_none());

        let effects = machine.handle(SelectionInput::RegionHovered(step_region("3")));
        assert!(effects.is_empty());
        assert!(machine.handle(SelectionInput::StepPopoverRequested("3".into())).is_empty());
    }

    #[test]
    fn click_clears_selection_back_to_idle() {
        let mut machine = SelectionMachine::new();
        machine.handle(SelectionInput::RegionUpdated(drag_region("r1", 0.0, 1.0)));

        let effects = machine.handle(SelectionInput::RegionClicked);
        assert_eq!(
            effects,
            vec![
                UiEffect::RemoveSelectionRegions,
                UiEffect::HideSelectionToolbar,
                UiEffect::ClearActiveStyling,
            ]
        );
        assert_eq!(machine.mode(), InteractionMode::Idle);
        assert!(machine.state().selection_text.is_empty());
    }

    #[test]
    fn click_during_programmatic_operation_is_ignored() {
        let mut machine = SelectionMachine::new();
        machine.handle(SelectionInput::RegionUpdated(drag_region("r1", 0.0, 1.0)));

        let zoom = machine.begin_operation();
        let seek = machine.begin_operation();
        assert!(machine.handle(SelectionInput::RegionClicked).is_empty());

        assert!(machine.complete_operation(zoom));
        // Completing twice must not release the seek
        assert!(!machine.complete_operation(zoom));
        assert!(machine.is_suppressed());
        assert!(machine.handle(SelectionInput::RegionClicked).is_empty());
        assert_eq!(machine.mode(), InteractionMode::Selected);

        machine.complete_operation(seek);
        assert!(!machine.handle(SelectionInput::RegionClicked).is_empty());
        assert_eq!(machine.mode(), InteractionMode::Idle);
    }

    #[test]
    fn zoom_zero_always_unzooms() {
        let mut machine = SelectionMachine::new();
        machine.handle(SelectionInput::ZoomChanged(300.0));
        assert!(machine.state().is_zoomed);
        assert!(machine.state().show_reset_zoom);

        machine.handle(SelectionInput::ZoomChanged(0.0));
        assert!(!machine.state().is_zoomed);
        assert!(!machine.state().show_reset_zoom);

        machine.handle(SelectionInput::ZoomChanged(-5.0));
        assert_eq!(machine.state().zoom_level_percent, 0.0);
    }

    #[test]
    fn reset_zoom_reevaluated_on_update_end() {
        let mut machine = SelectionMachine::new();
        machine.handle(SelectionInput::ZoomChanged(100.0));
        machine.handle(SelectionInput::RegionUpdated(drag_region("r1", 0.0, 1.0)));
        machine.handle(SelectionInput::RegionUpdateEnd);
        assert!(!machine.state().show_reset_zoom);

        machine.handle(SelectionInput::RegionRemoved("r1".into()));
        assert!(machine.state().show_reset_zoom);
        assert_eq!(machine.mode(), InteractionMode::Idle);
    }

    #[test]
    fn outside_click_closes_popovers_but_keeps_selection() {
        let mut machine = SelectionMachine::new();
        machine.handle(SelectionInput::RegionHovered(step_region("1")));
        assert_eq!(
            machine.handle(SelectionInput::ClickedOutside),
            vec![UiEffect::HideStepPopovers]
        );
        assert_eq!(machine.mode(), InteractionMode::Idle);

        machine.handle(SelectionInput::RegionUpdated(drag_region("r1", 0.0, 1.0)));
        machine.handle(SelectionInput::ClickedOutside);
        assert_eq!(machine.mode(), InteractionMode::Selected);
    }

    #[test]
    fn removing_unrelated_region_keeps_selection() {
        let mut machine = SelectionMachine::new();
        machine.handle(SelectionInput::RegionUpdated(drag_region("r1", 0.0, 1.0)));
        machine.handle(SelectionInput::RegionRemoved("4".into()));
        assert!(machine.state().has_selection());
    }
}

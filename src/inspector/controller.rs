use std::{collections::HashMap, future::Future, sync::Arc, time::Duration};

use chrono::Utc;
use tokio::{
    sync::{mpsc, Mutex},
    task::JoinHandle,
    time,
};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::config::InspectorConfig;
use crate::error::{InspectorError, InspectorResult};
use crate::grouping::group_segments;
use crate::models::{GroupedSegment, Segment};
use crate::navigation::{self, Direction, NavigationTarget};
use crate::projection::Projection;
use crate::renderer::{
    Anchor, LoadOptions, MarkerId, Renderer, RendererEvent, ACTIVE_CLASS, SELECTION_CLASS,
};
use crate::selection::{InteractionState, OperationToken, SelectionInput, SelectionMachine, UiEffect};

use super::listener::{translate, Dispatch};
use super::snapshot::{InspectorSnapshot, LoadStatus};

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_error, log_info, log_warn};

/// Fallback wait before opening a step popover when the renderer never
/// confirms the seek.
pub const POPOVER_DELAY: Duration = Duration::from_millis(100);
/// Fallback wait before releasing click suppression for an unconfirmed zoom/seek.
pub const SETTLE_FALLBACK: Duration = Duration::from_millis(500);
/// Wait before redrawing after a channel layout change.
pub const REDRAW_DELAY: Duration = Duration::from_millis(500);

const WAVEFORM_HEIGHT: u32 = 80;

type LoadedCallback = Arc<dyn Fn() + Send + Sync>;
type ErrorCallback = Arc<dyn Fn(&InspectorError) + Send + Sync>;

/// Caller hooks for load completion and load failure.
#[derive(Clone, Default)]
pub struct InspectorCallbacks {
    on_loaded: Option<LoadedCallback>,
    on_error: Option<ErrorCallback>,
}

impl InspectorCallbacks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_loaded(mut self, callback: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_loaded = Some(Arc::new(callback));
        self
    }

    pub fn on_error(mut self, callback: impl Fn(&InspectorError) + Send + Sync + 'static) -> Self {
        self.on_error = Some(Arc::new(callback));
        self
    }
}

/// Callback invocation deferred until the state lock is released.
enum Notification {
    Loaded(LoadedCallback),
    Failed(ErrorCallback, InspectorError),
}

impl Notification {
    fn deliver(self) {
        match self {
            Notification::Loaded(callback) => callback(),
            Notification::Failed(callback, error) => callback(&error),
        }
    }
}

struct InspectorInner<R> {
    id: Uuid,
    renderer: R,
    config: InspectorConfig,
    wave_rgba: String,
    callbacks: InspectorCallbacks,
    segments: Vec<Segment>,
    grouped: Vec<GroupedSegment>,
    projection: Projection,
    selection: SelectionMachine,
    status: LoadStatus,
    is_playing: bool,
    duration: f64,
    has_multi_channel: bool,
    split_channels: bool,
    toolbar_visible: bool,
    toolbar_anchor: Option<Anchor>,
    pending_popover: Option<String>,
    popover_timer: Option<CancellationToken>,
    redraw_timer: Option<CancellationToken>,
    pending_seeks: Vec<OperationToken>,
    pending_zooms: Vec<OperationToken>,
    fallbacks: HashMap<OperationToken, CancellationToken>,
    torn_down: bool,
}

/// One inspector instance: owns the renderer and keeps steps, selection and
/// navigation in sync with it.
///
/// Cheap to clone; clones share the same state. Renderer callbacks must be
/// delivered through [`Inspector::handle_event`] or [`Inspector::listen`],
/// never re-entrantly from inside a renderer call.
pub struct Inspector<R: Renderer + 'static> {
    inner: Arc<Mutex<InspectorInner<R>>>,
    shutdown: CancellationToken,
}

impl<R: Renderer + 'static> Clone for Inspector<R> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            shutdown: self.shutdown.clone(),
        }
    }
}

impl<R: Renderer + 'static> Inspector<R> {
    pub fn new(
        renderer: R,
        config: InspectorConfig,
        callbacks: InspectorCallbacks,
    ) -> InspectorResult<Self> {
        config.validate()?;
        let wave_rgba = config.wave_rgba()?;

        Ok(Self {
            inner: Arc::new(Mutex::new(InspectorInner {
                id: Uuid::new_v4(),
                renderer,
                config,
                wave_rgba,
                callbacks,
                segments: Vec::new(),
                grouped: Vec::new(),
                projection: Projection::new(),
                selection: SelectionMachine::new(),
                status: LoadStatus::default(),
                is_playing: false,
                duration: 0.0,
                has_multi_channel: false,
                split_channels: false,
                toolbar_visible: false,
                toolbar_anchor: None,
                pending_popover: None,
                popover_timer: None,
                redraw_timer: None,
                pending_seeks: Vec::new(),
                pending_zooms: Vec::new(),
                fallbacks: HashMap::new(),
                torn_down: false,
            })),
            shutdown: CancellationToken::new(),
        })
    }

    /// Start loading an audio source. Projection waits for the renderer's ready callback.
    pub async fn load(&self, source: &str) {
        let mut inner = self.inner.lock().await;
        if inner.torn_down {
            return;
        }

        inner.status = LoadStatus::Loading { percent: 0 };
        inner.is_playing = false;
        inner.duration = 0.0;
        inner.cancel_pending_popover();

        if source.is_empty() {
            log_warn!("inspector {}: no audio source given", inner.id);
            return;
        }

        log_info!("inspector {}: loading {}", inner.id, source);
        let options = LoadOptions {
            wave_color: inner.wave_rgba.clone(),
            height: WAVEFORM_HEIGHT,
            split_channels: true,
        };
        inner.renderer.load(source, &options);
    }

    /// Replace the annotation segments; re-groups and, once loaded, re-projects.
    pub async fn set_segments(&self, segments: Vec<Segment>) {
        let mut inner = self.inner.lock().await;
        if inner.torn_down {
            return;
        }

        inner.segments = segments;
        inner.regroup();
        inner.project();
    }

    /// Feed one renderer callback through the listener layer.
    pub async fn handle_event(&self, event: RendererEvent) {
        let notification = {
            let mut inner = self.inner.lock().await;
            if inner.torn_down {
                return;
            }

            match translate(event) {
                Dispatch::Loaded { channels } => inner.on_ready(channels),
                Dispatch::LoadProgress(percent) => {
                    inner.on_progress(percent);
                    None
                }
                Dispatch::LoadFailed(message) => inner.on_failed(message),
                Dispatch::Playing(playing) => {
                    inner.is_playing = playing;
                    None
                }
                Dispatch::ZoomSettled(level) => {
                    inner.on_zoom_settled(level);
                    None
                }
                Dispatch::SeekSettled => {
                    inner.on_seek_settled();
                    None
                }
                Dispatch::MarkerClicked(marker) => {
                    inner.on_marker_clicked(marker);
                    None
                }
                Dispatch::Selection(input) => {
                    inner.dispatch(input);
                    None
                }
            }
        };

        if let Some(notification) = notification {
            notification.deliver();
        }
    }

    /// Forward renderer callbacks from a channel until teardown or the sender closes.
    pub fn listen(&self, mut events: mpsc::UnboundedReceiver<RendererEvent>) -> JoinHandle<()> {
        let this = self.clone();
        let shutdown = self.shutdown.clone();

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = shutdown.cancelled() => {
                        log_debug!("renderer listener shutting down");
                        break;
                    }
                    event = events.recv() => match event {
                        Some(event) => this.handle_event(event).await,
                        None => break,
                    },
                }
            }
        })
    }

    /// Seek to the first/previous/next/last step and open its popover once the
    /// renderer has settled.
    pub async fn go_to(&self, direction: Direction) -> Option<NavigationTarget> {
        let mut inner = self.inner.lock().await;
        if inner.torn_down || !inner.status.is_ready() {
            return None;
        }

        let current_time = inner.renderer.current_time();
        let duration = inner.renderer.duration();
        let target = navigation::resolve(direction, &inner.grouped, current_time, duration)?;
        log_debug!(
            "navigate {:?} from {:.2}s to step {} at {:.2}s",
            direction,
            current_time,
            target.id,
            target.time
        );

        let token = inner.selection.begin_operation();
        inner.pending_seeks.push(token);
        self.arm_fallback(&mut inner, token);

        inner.cancel_pending_popover();
        inner.pending_popover = Some(target.id.clone());
        let cancel = self.shutdown.child_token();
        inner.popover_timer = Some(cancel.clone());
        self.spawn_after(POPOVER_DELAY, cancel, |this| async move {
            this.fire_popover_timer().await;
        });

        inner.renderer.seek_to(target.fraction);
        Some(target)
    }

    pub async fn zoom_in(&self) {
        let mut inner = self.inner.lock().await;
        if inner.torn_down {
            return;
        }
        let level = inner.selection.state().zoom_level_percent + inner.config.zoom_increment_percent;
        self.issue_zoom(&mut inner, level);
    }

    pub async fn zoom_out(&self) {
        let mut inner = self.inner.lock().await;
        if inner.torn_down {
            return;
        }
        let level = (inner.selection.state().zoom_level_percent
            - inner.config.zoom_increment_percent)
            .max(0.0);
        self.issue_zoom(&mut inner, level);
    }

    /// Jump to an absolute zoom level; 0 resets the zoom.
    pub async fn set_zoom_level(&self, level: f64) {
        let mut inner = self.inner.lock().await;
        if inner.torn_down {
            return;
        }
        let level = if level.is_finite() { level.max(0.0) } else { 0.0 };
        self.issue_zoom(&mut inner, level);
    }

    /// Zoom so the active selection fills the container, centred on it.
    ///
    /// Returns false when there is no selection or it is too short to zoom into.
    pub async fn zoom_to_selection(&self) -> bool {
        let mut inner = self.inner.lock().await;
        if inner.torn_down {
            return false;
        }

        let state = inner.selection.state();
        let selection = match (&state.selection, state.zoom_selection_enabled) {
            (Some(selection), true) => selection.clone(),
            _ => return false,
        };
        let width = inner.renderer.container_width();
        if width <= 0.0 || selection.duration() <= 0.0 {
            return false;
        }

        let token = inner.selection.begin_operation();
        inner.pending_seeks.push(token);
        self.arm_fallback(&mut inner, token);
        inner.renderer.set_current_time(selection.midpoint());

        self.issue_zoom(&mut inner, width / selection.duration());
        true
    }

    pub async fn clear_selection(&self) {
        let mut inner = self.inner.lock().await;
        if inner.torn_down {
            return;
        }
        inner.dispatch(SelectionInput::ClearSelection);
    }

    /// Pause, or play the active selection (the whole file when there is none).
    pub async fn toggle_play(&self) {
        let mut inner = self.inner.lock().await;
        if inner.torn_down || !inner.status.is_ready() {
            return;
        }

        if inner.is_playing {
            inner.renderer.pause();
            return;
        }
        let selected = inner.selection.state().selection.as_ref().map(|s| s.id.clone());
        match selected {
            Some(id) => inner.renderer.play_region(&id),
            None => inner.renderer.play(),
        }
    }

    /// Show channels stacked or overlaid. Only multi-channel sources can split.
    pub async fn set_split_channels(&self, split: bool) -> bool {
        let mut inner = self.inner.lock().await;
        if inner.torn_down || !inner.has_multi_channel {
            return false;
        }

        inner.split_channels = split;
        inner.renderer.set_split_channels(split);

        if let Some(previous) = inner.redraw_timer.take() {
            previous.cancel();
        }
        let cancel = self.shutdown.child_token();
        inner.redraw_timer = Some(cancel.clone());
        self.spawn_after(REDRAW_DELAY, cancel, |this| async move {
            this.fire_redraw_timer().await;
        });
        true
    }

    /// Document-level click; clicks outside the waveform close step popovers.
    pub async fn on_document_click(&self, inside_container: bool) {
        if inside_container {
            return;
        }
        let mut inner = self.inner.lock().await;
        if inner.torn_down {
            return;
        }
        inner.dispatch(SelectionInput::ClickedOutside);
    }

    pub async fn on_resize(&self) {
        let mut inner = self.inner.lock().await;
        if !inner.torn_down {
            inner.renderer.redraw();
        }
    }

    /// Cancel pending timers and destroy the renderer. Later calls are no-ops.
    pub async fn teardown(&self) {
        let mut inner = self.inner.lock().await;
        if inner.torn_down {
            return;
        }

        inner.torn_down = true;
        self.shutdown.cancel();
        inner.pending_popover = None;
        inner.popover_timer = None;
        inner.redraw_timer = None;
        inner.fallbacks.clear();
        inner.pending_seeks.clear();
        inner.pending_zooms.clear();
        inner.renderer.destroy();
        log_info!("inspector {} torn down", inner.id);
    }

    pub async fn is_torn_down(&self) -> bool {
        self.inner.lock().await.torn_down
    }

    pub async fn snapshot(&self) -> InspectorSnapshot {
        let inner = self.inner.lock().await;
        inner.snapshot()
    }

    pub async fn interaction(&self) -> InteractionState {
        self.inner.lock().await.selection.state().clone()
    }

    pub async fn grouped_segments(&self) -> Vec<GroupedSegment> {
        self.inner.lock().await.grouped.clone()
    }

    pub async fn config(&self) -> InspectorConfig {
        self.inner.lock().await.config.clone()
    }

    /// Run `f` against the owned renderer.
    pub async fn with_renderer<T>(&self, f: impl FnOnce(&mut R) -> T) -> T {
        let mut inner = self.inner.lock().await;
        f(&mut inner.renderer)
    }

    fn issue_zoom(&self, inner: &mut InspectorInner<R>, level: f64) {
        let token = inner.selection.begin_operation();
        inner.pending_zooms.push(token);
        self.arm_fallback(inner, token);
        inner.renderer.zoom(level);
    }

    /// Release click suppression for `token` if the renderer never confirms it.
    fn arm_fallback(&self, inner: &mut InspectorInner<R>, token: OperationToken) {
        let cancel = self.shutdown.child_token();
        inner.fallbacks.insert(token, cancel.clone());
        self.spawn_after(SETTLE_FALLBACK, cancel, move |this| async move {
            this.fire_fallback(token).await;
        });
    }

    fn spawn_after<F, Fut>(&self, delay: Duration, cancel: CancellationToken, action: F)
    where
        F: FnOnce(Inspector<R>) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let this = self.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = cancel.cancelled() => {}
                _ = time::sleep(delay) => action(this).await,
            }
        });
    }

    async fn fire_popover_timer(&self) {
        let mut inner = self.inner.lock().await;
        if inner.torn_down {
            return;
        }
        inner.popover_timer = None;
        inner.show_pending_popover();
    }

    async fn fire_redraw_timer(&self) {
        let mut inner = self.inner.lock().await;
        if inner.torn_down {
            return;
        }
        inner.redraw_timer = None;
        inner.renderer.redraw();
    }

    async fn fire_fallback(&self, token: OperationToken) {
        let mut inner = self.inner.lock().await;
        if inner.torn_down {
            return;
        }
        if inner.release_operation(token) {
            log_debug!("renderer never confirmed operation {:?}; released", token);
        }
    }
}

impl<R: Renderer> InspectorInner<R> {
    fn regroup(&mut self) {
        self.grouped = group_segments(&self.segments, &self.config.grouping());
    }

    fn project(&mut self) {
        if !self.status.is_ready() {
            log_debug!("inspector {}: projection deferred until ready", self.id);
            return;
        }
        self.projection.project(&self.grouped, &mut self.renderer);

        // Markers were re-created; re-open the popover if its step survived
        if let Some(id) = self.selection.state().popover_open_id.clone() {
            match self.projection.marker_for(&id) {
                Some(marker) => self.renderer.set_popover_open(marker, true),
                None => self.selection.close_popover(),
            }
        }
    }

    fn on_ready(&mut self, channels: u16) -> Option<Notification> {
        if self.status.is_failed() {
            log_warn!("inspector {}: ready after a failed load ignored", self.id);
            return None;
        }

        self.status = LoadStatus::Ready {
            loaded_at: Utc::now(),
        };
        self.duration = self.renderer.duration();
        self.has_multi_channel = channels > 1;
        self.split_channels = self.has_multi_channel;
        self.renderer.set_split_channels(self.split_channels);
        log_info!(
            "inspector {}: audio ready ({:.2}s, {} channel(s))",
            self.id,
            self.duration,
            channels
        );

        self.project();
        self.callbacks.on_loaded.clone().map(Notification::Loaded)
    }

    fn on_progress(&mut self, percent: u8) {
        if self.status.is_failed() {
            return;
        }
        self.status = LoadStatus::Loading { percent };
    }

    fn on_failed(&mut self, message: String) -> Option<Notification> {
        log_error!("inspector {}: audio failed to load: {}", self.id, message);
        self.status = LoadStatus::Failed {
            message: message.clone(),
        };
        self.is_playing = false;
        self.cancel_pending_popover();

        let error = InspectorError::RendererLoad(message);
        self.callbacks
            .on_error
            .clone()
            .map(|callback| Notification::Failed(callback, error))
    }

    fn on_zoom_settled(&mut self, level: f64) {
        self.dispatch(SelectionInput::ZoomChanged(level));
        // One confirmation settles one operation, oldest first
        if !self.pending_zooms.is_empty() {
            let token = self.pending_zooms.remove(0);
            self.release_operation(token);
        }
    }

    fn on_seek_settled(&mut self) {
        if !self.pending_seeks.is_empty() {
            let token = self.pending_seeks.remove(0);
            self.release_operation(token);
        }
        self.show_pending_popover();
    }

    fn on_marker_clicked(&mut self, marker: MarkerId) {
        let group = self.projection.group_for_marker(marker).map(str::to_string);
        match group {
            Some(group_id) => self.dispatch(SelectionInput::StepPopoverRequested(group_id)),
            None => log_debug!("click on unknown marker {:?}", marker),
        }
    }

    /// Complete one operation; returns false if it was already released.
    fn release_operation(&mut self, token: OperationToken) -> bool {
        if let Some(cancel) = self.fallbacks.remove(&token) {
            cancel.cancel();
        }
        self.pending_seeks.retain(|t| *t != token);
        self.pending_zooms.retain(|t| *t != token);
        self.selection.complete_operation(token)
    }

    fn show_pending_popover(&mut self) {
        if let Some(cancel) = self.popover_timer.take() {
            cancel.cancel();
        }
        if let Some(id) = self.pending_popover.take() {
            self.dispatch(SelectionInput::StepPopoverRequested(id));
        }
    }

    fn cancel_pending_popover(&mut self) {
        if let Some(cancel) = self.popover_timer.take() {
            cancel.cancel();
        }
        self.pending_popover = None;
    }

    fn dispatch(&mut self, input: SelectionInput) {
        let effects = self.selection.handle(input);
        for effect in effects {
            self.apply(effect);
        }
    }

    fn apply(&mut self, effect: UiEffect) {
        match effect {
            UiEffect::DecorateRegion { id, classes } => {
                for class in &classes {
                    self.renderer.add_region_class(&id, class);
                }
            }
            UiEffect::RemoveOtherSelections { keep } => {
                let others: Vec<String> = self
                    .renderer
                    .regions()
                    .into_iter()
                    .filter(|r| !r.is_step() && r.id != keep)
                    .map(|r| r.id)
                    .collect();
                for id in others {
                    self.renderer.remove_region(&id);
                }
            }
            UiEffect::TagSelection { id } => {
                self.renderer.add_region_class(&id, SELECTION_CLASS);
            }
            UiEffect::AnchorSelectionToolbar { id } => {
                self.toolbar_visible = true;
                self.toolbar_anchor = self.renderer.region_anchor(&id);
                if self.toolbar_anchor.is_none() {
                    let err = InspectorError::MissingAnchor { id };
                    log_warn!("selection toolbar left unpositioned: {}", err);
                }
            }
            UiEffect::ShowStepPopover { id } => {
                self.renderer.close_all_popovers();
                self.clear_active_styling();
                if let Some(region_id) = self.projection.region_for(&id).map(str::to_string) {
                    self.renderer.add_region_class(&region_id, ACTIVE_CLASS);
                }
                match self.projection.marker_for(&id) {
                    Some(marker) => self.renderer.set_popover_open(marker, true),
                    None => {
                        let err = InspectorError::MissingAnchor { id };
                        log_warn!("step popover not shown: {}", err);
                        self.selection.close_popover();
                    }
                }
            }
            UiEffect::HideStepPopovers => self.renderer.close_all_popovers(),
            UiEffect::RemoveSelectionRegions => {
                let selections: Vec<String> = self
                    .renderer
                    .regions()
                    .into_iter()
                    .filter(|r| !r.is_step())
                    .map(|r| r.id)
                    .collect();
                for id in selections {
                    self.renderer.remove_region(&id);
                }
            }
            UiEffect::HideSelectionToolbar => {
                self.toolbar_visible = false;
                self.toolbar_anchor = None;
            }
            UiEffect::ClearActiveStyling => self.clear_active_styling(),
        }
    }

    fn clear_active_styling(&mut self) {
        for region in self.renderer.regions() {
            if self.renderer.region_has_class(&region.id, ACTIVE_CLASS) {
                self.renderer.remove_region_class(&region.id, ACTIVE_CLASS);
            }
        }
    }

    fn snapshot(&self) -> InspectorSnapshot {
        let interaction = self.selection.state().clone();
        let labels = self.config.labels.clone();
        let play_label = if self.is_playing {
            labels.pause.clone()
        } else {
            labels.play.clone()
        };

        InspectorSnapshot {
            instance_id: self.id.to_string(),
            status: self.status.clone(),
            is_playing: self.is_playing,
            duration: self.duration,
            has_multi_channel: self.has_multi_channel,
            split_channels: self.split_channels,
            mode: interaction.mode(),
            zoom_text: format!("{:.0}%", interaction.zoom_level_percent),
            interaction,
            steps: self.grouped.clone(),
            labels,
            play_label,
            start_time_text: "0s".to_string(),
            end_time_text: format!("{:.2}s", self.duration),
            waveform_hidden: !self.status.is_ready(),
            selection_toolbar_visible: self.toolbar_visible,
            selection_toolbar_anchor: self.toolbar_anchor,
            left_slot: self.config.left_slot.clone(),
            right_slot: self.config.right_slot.clone(),
        }
    }
}

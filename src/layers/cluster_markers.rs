//! The public overlay: clickable markers over one clustered source.
//!
//! All state lives behind `RefCell`s and every method takes `&self`, so the
//! host can keep the overlay in an `Rc` and run several update cycles at
//! once. A cycle only borrows state in its synchronous tail, after its last
//! suspension point, which is also where the generation check happens.

use crate::background::scheduler::{Generation, UpdateScheduler};
use crate::core::config::{FitBoundsOptions, MarkerOptions};
use crate::core::geo::LatLng;
use crate::data::geojson::Feature;
use crate::data::identity::{FeatureId, FeatureIdentity};
use crate::input::events::{
    click_queue, ClickReceiver, ClickSender, HostEvent, MarkerEvent, OverlayEvent,
};
use crate::layers::marker::MarkersOnScreen;
use crate::layers::reconciler::{MarkerSetReconciler, ReconcileReport};
use crate::layers::selection::{Placement, Scene, SelectionTracker};
use crate::rendering::context::RenderContext;
use crate::rendering::renderers::Renderers;
use crate::spatial::clustering::Representation;
use crate::spatial::index::FeatureIndex;
use crate::spatial::leaves::{load_leaves, ClusterLeafCache};
use crate::traits::{Configurable, FrameRequester, HostMap};
use crate::{MarkerError, Result};
use crossbeam_channel::{unbounded, Receiver, Sender};
use futures::stream::{FuturesOrdered, StreamExt};
use instant::Instant;
use std::cell::RefCell;
use std::time::Duration;

/// Result of running one update cycle
#[derive(Debug, Clone, PartialEq)]
pub enum CycleOutcome {
    /// The cycle reached the end and its markers are on screen
    Committed(CycleReport),
    /// A newer trigger arrived while the cycle was waiting; nothing changed
    Superseded,
}

impl CycleOutcome {
    pub fn is_committed(&self) -> bool {
        matches!(self, CycleOutcome::Committed(_))
    }
}

/// Statistics of a committed cycle
#[derive(Debug, Clone, PartialEq)]
pub struct CycleReport {
    pub generation: Generation,
    pub markers: ReconcileReport,
    /// Whether the selection pin was rendered again
    pub pin_rerendered: bool,
    pub elapsed: Duration,
}

/// The state a committed cycle leaves behind
struct OverlayState<M> {
    features: FeatureIndex,
    leaves: ClusterLeafCache,
    markers: MarkersOnScreen<M>,
    selection: SelectionTracker<M>,
}

impl<M> Default for OverlayState<M> {
    fn default() -> Self {
        Self {
            features: FeatureIndex::default(),
            leaves: ClusterLeafCache::default(),
            markers: MarkersOnScreen::default(),
            selection: SelectionTracker::default(),
        }
    }
}

/// Interactive markers for every point of a clustered source
pub struct ClusterMarkers<H: HostMap> {
    host: H,
    source_id: String,
    options: RefCell<MarkerOptions>,
    identity: RefCell<FeatureIdentity>,
    renderers: Renderers,
    scheduler: UpdateScheduler,
    request_frame: FrameRequester,
    state: RefCell<OverlayState<H::Marker>>,
    clicks_tx: ClickSender,
    clicks_rx: ClickReceiver,
    subscribers: RefCell<Vec<Sender<OverlayEvent>>>,
}

impl<H: HostMap> ClusterMarkers<H> {
    /// Attaches to `source_id` on `host` and schedules the first cycle.
    ///
    /// Fails when the source is not registered on the map or the options
    /// are inconsistent.
    pub fn new(
        host: H,
        source_id: impl Into<String>,
        options: MarkerOptions,
        renderers: Renderers,
    ) -> Result<Self> {
        let source_id = source_id.into();
        options.validate()?;
        if !host.has_source(&source_id) {
            return Err(MarkerError::MissingSource(source_id));
        }

        let request_frame = host.frame_requester();
        let (clicks_tx, clicks_rx) = click_queue(request_frame.clone());
        let initial_selection = options.selected_feature.clone();
        let overlay = Self {
            host,
            identity: RefCell::new(FeatureIdentity::new(options.identity.clone())),
            options: RefCell::new(options),
            source_id,
            renderers,
            scheduler: UpdateScheduler::new(),
            request_frame,
            state: RefCell::new(OverlayState::default()),
            clicks_tx,
            clicks_rx,
            subscribers: RefCell::new(Vec::new()),
        };

        if let Some(feature) = initial_selection {
            overlay.set_selected_feature(&feature)?;
        }
        overlay.schedule();
        log::debug!("cluster markers attached to source {}", overlay.source_id);
        Ok(overlay)
    }

    /// Overlay with default options and renderers
    pub fn with_defaults(host: H, source_id: impl Into<String>) -> Result<Self> {
        Self::new(host, source_id, MarkerOptions::default(), Renderers::default())
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn source_id(&self) -> &str {
        &self.source_id
    }

    /// Requests an update cycle on the next frame
    pub fn schedule(&self) {
        if self.scheduler.schedule() {
            (self.request_frame)();
        }
    }

    /// Whether a frame has been requested and not yet run
    pub fn is_update_pending(&self) -> bool {
        self.scheduler.is_pending()
    }

    pub fn generation(&self) -> Generation {
        self.scheduler.current()
    }

    /// Reacts to a map notification
    pub fn handle_host_event(&self, event: &HostEvent) {
        match event {
            HostEvent::MoveEnd | HostEvent::ZoomEnd => self.schedule(),
            HostEvent::SourceData { source_id, loaded } => {
                if *loaded && *source_id == self.source_id {
                    self.schedule();
                }
            }
        }
    }

    /// Animation frame entry point: handles queued clicks, then runs the
    /// pending cycle if there is one
    pub async fn on_frame(&self) -> Result<Option<CycleOutcome>> {
        self.dispatch_clicks();
        match self.scheduler.take_pending() {
            Some(generation) => self.run_cycle(generation).await.map(Some),
            None => Ok(None),
        }
    }

    /// Runs one update cycle as `generation`.
    ///
    /// Leaves of all visible clusters are fetched together. The cycle stops
    /// without touching anything as soon as `generation` is no longer
    /// current, and a failed leaf fetch aborts it with the previous markers
    /// left in place.
    pub async fn run_cycle(&self, generation: Generation) -> Result<CycleOutcome> {
        let started = Instant::now();
        if !self.scheduler.is_current(generation) {
            log::debug!("cycle {} superseded before start", generation);
            return Ok(CycleOutcome::Superseded);
        }
        log::debug!("cycle {} started", generation);

        let zoom = self.host.zoom();
        let raw = self.host.query_source_features(&self.source_id);
        let features = FeatureIndex::build(raw, &self.identity.borrow())?;

        let mut leaves = ClusterLeafCache::new();
        let mut pending: FuturesOrdered<_> = features
            .clusters()
            .map(|cluster| async move {
                let result = load_leaves(&self.host, &self.source_id, cluster).await;
                (cluster.id.clone(), result)
            })
            .collect();

        while let Some((cluster_id, result)) = pending.next().await {
            if !self.scheduler.is_current(generation) {
                log::debug!("cycle {} superseded while loading leaves", generation);
                return Ok(CycleOutcome::Superseded);
            }
            match result {
                Ok(cluster_leaves) => leaves.insert(cluster_id, cluster_leaves),
                Err(e) => {
                    log::warn!("cycle {} aborted: {}", generation, e);
                    return Err(e);
                }
            }
        }
        drop(pending);

        let (markers, pin_rerendered) = self.commit(features, leaves, zoom)?;
        let report = CycleReport {
            generation,
            markers,
            pin_rerendered,
            elapsed: started.elapsed(),
        };
        log::debug!(
            "cycle {} committed: {} created, {} reused, {} removed in {:?}",
            generation,
            markers.created,
            markers.reused,
            markers.removed,
            report.elapsed
        );
        Ok(CycleOutcome::Committed(report))
    }

    fn commit(
        &self,
        features: FeatureIndex,
        leaves: ClusterLeafCache,
        zoom: f64,
    ) -> Result<(ReconcileReport, bool)> {
        let options = self.options.borrow();
        let identity = self.identity.borrow();
        let mut state = self.state.borrow_mut();
        let state = &mut *state;

        let render_context = RenderContext::new(options.marker_size, zoom);
        let reconciler = MarkerSetReconciler {
            host: &self.host,
            renderers: &self.renderers,
            identity: &identity,
            thresholds: options.thresholds(),
            render_context,
            clicks: &self.clicks_tx,
        };
        let report = reconciler.reconcile(
            &features,
            &leaves,
            &mut state.markers,
            &mut state.selection,
        );
        state.features = features;
        state.leaves = leaves;

        let scene = Scene {
            features: &state.features,
            leaves: &state.leaves,
            markers: &state.markers,
            identity: &identity,
        };
        let make_pin = |feature: &Feature, coordinate: LatLng| {
            let element = self.renderers.pin.render(feature, &render_context);
            self.host.create_marker(element, coordinate)
        };
        let pin_rerendered = state
            .selection
            .sync(&scene, &make_pin)
            .map_err(|e| {
                log::error!("selection pin lost: {}", e);
                e
            })?;

        Ok((report, pin_rerendered))
    }

    /// Selects `feature` and pins it where it is drawn now
    pub fn set_selected_feature(&self, feature: &Feature) -> Result<()> {
        let render_context = self.render_context();
        let identity = self.identity.borrow();
        let mut state = self.state.borrow_mut();
        let state = &mut *state;

        let scene = Scene {
            features: &state.features,
            leaves: &state.leaves,
            markers: &state.markers,
            identity: &identity,
        };
        let make_pin = |feature: &Feature, coordinate: LatLng| {
            let element = self.renderers.pin.render(feature, &render_context);
            self.host.create_marker(element, coordinate)
        };
        state.selection.select(feature, &scene, &make_pin)
    }

    /// Clears the selection and removes the pin
    pub fn reset_selected_feature(&self) {
        self.state.borrow_mut().selection.reset();
    }

    /// Replaces the options used when a collapsed cluster is clicked
    pub fn set_bounds_options(&self, bounds_options: FitBoundsOptions) {
        self.options.borrow_mut().bounds_options = bounds_options;
    }

    /// Consumer events, one receiver per call
    pub fn subscribe(&self) -> Receiver<OverlayEvent> {
        let (tx, rx) = unbounded();
        self.subscribers.borrow_mut().push(tx);
        rx
    }

    /// Handles the clicks queued by marker callbacks; returns how many
    pub fn dispatch_clicks(&self) -> usize {
        let events = self.clicks_rx.drain();
        let handled = events.len();
        for event in events {
            if let Err(e) = self.handle_click(event) {
                log::error!("click could not be handled: {}", e);
            }
        }
        handled
    }

    fn handle_click(&self, event: MarkerEvent) -> Result<()> {
        let MarkerEvent::Clicked {
            marker_id,
            representation,
            child,
        } = event;

        let selected = {
            let state = self.state.borrow();
            if !state.markers.contains(&marker_id) {
                log::debug!("ignoring click on removed marker {}", marker_id);
                return Ok(());
            }
            let found = match representation {
                Representation::Collapsed => {
                    let bounds = state.leaves.bounds_of(&marker_id);
                    drop(state);
                    if let Some(bounds) = bounds {
                        let options = self.options.borrow().bounds_options.clone();
                        self.host.fit_bounds(&bounds, &options);
                    }
                    return Ok(());
                }
                Representation::Plain => state
                    .features
                    .get(&marker_id)
                    .map(|item| item.feature.clone()),
                Representation::Unfolded => {
                    let identity = self.identity.borrow();
                    let leaf = child.as_ref().and_then(|child| {
                        state
                            .leaves
                            .get(&marker_id)
                            .unwrap_or_default()
                            .iter()
                            .find(|leaf| identity.matches(leaf, child))
                            .cloned()
                    });
                    leaf
                }
            };
            found
        };

        let Some(feature) = selected else {
            log::debug!("click on {} matched no feature", marker_id);
            return Ok(());
        };
        self.set_selected_feature(&feature)?;
        self.notify(OverlayEvent::FeatureSelected(feature));
        Ok(())
    }

    fn notify(&self, event: OverlayEvent) {
        self.subscribers
            .borrow_mut()
            .retain(|subscriber| subscriber.send(event.clone()).is_ok());
    }

    /// Takes every marker and the pin off the map and cancels running cycles
    pub fn clear(&self) {
        self.scheduler.invalidate();
        let mut state = self.state.borrow_mut();
        state.selection.reset();
        let removed = state.markers.destroy_all();
        state.features = FeatureIndex::default();
        state.leaves.clear();
        log::debug!("cleared {} markers from source {}", removed, self.source_id);
    }

    fn render_context(&self) -> RenderContext {
        RenderContext::new(self.options.borrow().marker_size, self.host.zoom())
    }

    /// Ids of the markers on screen
    pub fn marker_ids(&self) -> Vec<FeatureId> {
        self.state.borrow().markers.ids().cloned().collect()
    }

    pub fn marker_count(&self) -> usize {
        self.state.borrow().markers.len()
    }

    pub fn representation_of(&self, id: &FeatureId) -> Option<Representation> {
        self.state
            .borrow()
            .markers
            .get(id)
            .map(|handle| handle.representation())
    }

    /// Applies `f` to the host marker drawn for `id`
    pub fn with_marker<F, R>(&self, id: &FeatureId, f: F) -> Option<R>
    where
        F: FnOnce(&H::Marker) -> R,
    {
        self.state
            .borrow()
            .markers
            .get(id)
            .map(|handle| f(handle.marker()))
    }

    pub fn selected_feature_id(&self) -> Option<FeatureId> {
        self.state.borrow().selection.selected_feature_id().cloned()
    }

    pub fn selected_cluster_id(&self) -> Option<FeatureId> {
        self.state.borrow().selection.selected_cluster_id().cloned()
    }

    pub fn has_pin(&self) -> bool {
        self.state.borrow().selection.pin().is_some()
    }

    /// Where the pin currently sits
    pub fn pin_placement(&self) -> Option<Placement> {
        self.state
            .borrow()
            .selection
            .pin()
            .map(|pin| pin.placement().clone())
    }
}

impl<H: HostMap> Configurable for ClusterMarkers<H> {
    type Config = MarkerOptions;

    fn config(&self) -> MarkerOptions {
        self.options.borrow().clone()
    }

    /// Swaps the options and redraws everything on the next frame
    fn set_config(&self, config: MarkerOptions) -> Result<()> {
        Self::validate_config(&config)?;
        *self.identity.borrow_mut() = FeatureIdentity::new(config.identity.clone());
        *self.options.borrow_mut() = config;
        self.schedule();
        Ok(())
    }

    fn validate_config(config: &MarkerOptions) -> Result<()> {
        config.validate()
    }
}

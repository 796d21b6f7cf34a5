//! In-memory map engine shared by the integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use cluster_markers::prelude::*;
use futures::channel::oneshot;
use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

pub const SOURCE: &str = "points";

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Pixels per degree of the fake projection
const SCALE: f64 = 1000.0;

fn project(coordinate: LatLng) -> Point {
    Point::new(coordinate.lng * SCALE, -coordinate.lat * SCALE)
}

/// Marker bookkeeping shared by the host and every marker it created
#[derive(Default)]
pub struct MarkerLedger {
    created: Cell<usize>,
    live: RefCell<HashMap<String, usize>>,
}

impl MarkerLedger {
    fn attach(&self, class_name: &str) {
        *self.live.borrow_mut().entry(class_name.to_string()).or_default() += 1;
    }

    fn detach(&self, class_name: &str) {
        if let Some(count) = self.live.borrow_mut().get_mut(class_name) {
            *count -= 1;
        }
    }
}

pub struct MockMarker {
    element: MarkerElement,
    coordinate: LatLng,
    offset: Point,
    z_index: i32,
    on_map: bool,
    handler: Option<ClickHandler>,
    ledger: Rc<MarkerLedger>,
}

impl MockMarker {
    pub fn coordinate(&self) -> LatLng {
        self.coordinate
    }

    pub fn offset(&self) -> Point {
        self.offset
    }

    pub fn z_index(&self) -> i32 {
        self.z_index
    }

    pub fn is_on_map(&self) -> bool {
        self.on_map
    }

    /// Simulates a click, on the child drawing `child` if given
    pub fn click(&self, child: Option<FeatureId>) {
        if let Some(handler) = &self.handler {
            handler(child);
        }
    }
}

impl HostMarker for MockMarker {
    fn set_coordinate(&mut self, coordinate: LatLng) {
        self.coordinate = coordinate;
    }

    fn set_offset(&mut self, offset: Point) {
        self.offset = offset;
    }

    fn set_z_index(&mut self, z_index: i32) {
        self.z_index = z_index;
    }

    fn add_to_map(&mut self) {
        if !self.on_map {
            self.on_map = true;
            self.ledger.attach(&self.element.class_name);
        }
    }

    fn remove(&mut self) {
        if self.on_map {
            self.on_map = false;
            self.ledger.detach(&self.element.class_name);
        }
    }

    fn element(&self) -> &MarkerElement {
        &self.element
    }

    fn bounding_rect(&self) -> Option<Bounds> {
        self.on_map
            .then(|| self.element.rect_at(project(self.coordinate)))
    }

    fn child_rect(&self, feature_id: &FeatureId) -> Option<Bounds> {
        if !self.on_map {
            return None;
        }
        self.element
            .child_rect_at(project(self.coordinate), feature_id)
    }

    fn on_click(&mut self, handler: ClickHandler) {
        self.handler = Some(handler);
    }
}

/// Map engine with one clustered source, scriptable from tests
#[derive(Default)]
pub struct MockHost {
    zoom: Cell<f64>,
    features: RefCell<Vec<Feature>>,
    leaves: RefCell<HashMap<u64, Vec<Feature>>>,
    failing: RefCell<HashSet<u64>>,
    gated: RefCell<HashSet<u64>>,
    waiting: RefCell<Vec<(u64, oneshot::Sender<()>)>>,
    fetches: Cell<usize>,
    frames_requested: Rc<Cell<usize>>,
    fitted: RefCell<Vec<(LatLngBounds, FitBoundsOptions)>>,
    ledger: Rc<MarkerLedger>,
}

impl MockHost {
    pub fn new(zoom: f64) -> Self {
        let host = Self::default();
        host.zoom.set(zoom);
        host
    }

    pub fn set_zoom(&self, zoom: f64) {
        self.zoom.set(zoom);
    }

    /// Replaces what the viewport shows
    pub fn show(&self, features: Vec<Feature>) {
        *self.features.borrow_mut() = features;
    }

    pub fn set_leaves(&self, cluster_id: u64, leaves: Vec<Feature>) {
        self.leaves.borrow_mut().insert(cluster_id, leaves);
    }

    pub fn fail_leaves(&self, cluster_id: u64) {
        self.failing.borrow_mut().insert(cluster_id);
    }

    /// Holds leaf fetches of `cluster_id` until [`MockHost::release`]
    pub fn gate(&self, cluster_id: u64) {
        self.gated.borrow_mut().insert(cluster_id);
    }

    pub fn release(&self, cluster_id: u64) {
        self.gated.borrow_mut().remove(&cluster_id);
        let waiting = std::mem::take(&mut *self.waiting.borrow_mut());
        let (released, kept): (Vec<_>, Vec<_>) =
            waiting.into_iter().partition(|(id, _)| *id == cluster_id);
        *self.waiting.borrow_mut() = kept;
        for (_, tx) in released {
            let _ = tx.send(());
        }
    }

    pub fn fetches(&self) -> usize {
        self.fetches.get()
    }

    pub fn frames_requested(&self) -> usize {
        self.frames_requested.get()
    }

    pub fn fitted(&self) -> Vec<(LatLngBounds, FitBoundsOptions)> {
        self.fitted.borrow().clone()
    }

    pub fn markers_created(&self) -> usize {
        self.ledger.created.get()
    }

    /// Markers of `class_name` currently on the map
    pub fn live(&self, class_name: &str) -> usize {
        self.ledger.live.borrow().get(class_name).copied().unwrap_or(0)
    }

    pub fn live_total(&self) -> usize {
        self.ledger.live.borrow().values().sum()
    }
}

#[async_trait(?Send)]
impl HostMap for MockHost {
    type Marker = MockMarker;

    fn has_source(&self, source_id: &str) -> bool {
        source_id == SOURCE
    }

    fn zoom(&self) -> f64 {
        self.zoom.get()
    }

    fn query_source_features(&self, _source_id: &str) -> Vec<Feature> {
        self.features.borrow().clone()
    }

    async fn cluster_leaves(
        &self,
        _source_id: &str,
        cluster_id: u64,
        limit: usize,
    ) -> anyhow::Result<Vec<Feature>> {
        self.fetches.set(self.fetches.get() + 1);

        let gate = if self.gated.borrow().contains(&cluster_id) {
            let (tx, rx) = oneshot::channel();
            self.waiting.borrow_mut().push((cluster_id, tx));
            Some(rx)
        } else {
            None
        };
        if let Some(rx) = gate {
            let _ = rx.await;
        }

        if self.failing.borrow().contains(&cluster_id) {
            anyhow::bail!("source error for cluster {}", cluster_id);
        }
        let leaves = self
            .leaves
            .borrow()
            .get(&cluster_id)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("unknown cluster {}", cluster_id))?;
        Ok(leaves.into_iter().take(limit).collect())
    }

    fn fit_bounds(&self, bounds: &LatLngBounds, options: &FitBoundsOptions) {
        self.fitted.borrow_mut().push((bounds.clone(), options.clone()));
    }

    fn create_marker(&self, element: MarkerElement, coordinate: LatLng) -> MockMarker {
        self.ledger.created.set(self.ledger.created.get() + 1);
        MockMarker {
            element,
            coordinate,
            offset: Point::zero(),
            z_index: 0,
            on_map: false,
            handler: None,
            ledger: self.ledger.clone(),
        }
    }

    fn frame_requester(&self) -> FrameRequester {
        let frames = self.frames_requested.clone();
        Rc::new(move || frames.set(frames.get() + 1))
    }
}

pub fn point(id: &str, lat: f64, lng: f64) -> Feature {
    Feature::point(LatLng::new(lat, lng)).with_property("id", id)
}

pub fn cluster(engine_id: u64, lat: f64, lng: f64, count: usize) -> Feature {
    Feature::cluster(engine_id, LatLng::new(lat, lng), count)
}

pub fn overlay(host: MockHost) -> ClusterMarkers<MockHost> {
    init_logging();
    ClusterMarkers::with_defaults(host, SOURCE).expect("overlay")
}

/// Runs the pending frame and expects it to commit
pub async fn commit(overlay: &ClusterMarkers<MockHost>) -> CycleReport {
    match overlay.on_frame().await {
        Ok(Some(CycleOutcome::Committed(report))) => report,
        other => panic!("expected a committed cycle, got {:?}", other.map(|o| o.is_some())),
    }
}

/// Schedules and commits one cycle
pub async fn refresh(overlay: &ClusterMarkers<MockHost>) -> CycleReport {
    overlay.handle_host_event(&HostEvent::MoveEnd);
    commit(overlay).await
}

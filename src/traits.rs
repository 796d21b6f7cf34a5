//! Seams between the overlay and the map engine hosting it
//!
//! The overlay never touches pixels or the network itself: it queries the
//! host for features, asks it for cluster members, and drives marker
//! primitives the host creates.

use crate::core::{
    bounds::Bounds,
    config::FitBoundsOptions,
    geo::{LatLng, LatLngBounds, Point},
};
use crate::data::{geojson::Feature, identity::FeatureId};
use crate::rendering::element::MarkerElement;
use crate::Result;
use async_trait::async_trait;
use std::rc::Rc;

/// Callback fired by a marker click, with the clicked child's leaf id when
/// the marker has children
pub type ClickHandler = Box<dyn Fn(Option<FeatureId>)>;

/// Asks the host to call [`crate::ClusterMarkers::on_frame`] on the next
/// animation frame
pub type FrameRequester = Rc<dyn Fn()>;

/// The map engine the overlay is attached to.
///
/// Everything runs on one thread; the only suspension point is
/// [`HostMap::cluster_leaves`].
#[async_trait(?Send)]
pub trait HostMap {
    type Marker: HostMarker;

    /// Whether a source with this id is registered on the map
    fn has_source(&self, source_id: &str) -> bool;

    /// Current zoom level
    fn zoom(&self) -> f64;

    /// Features of `source_id` currently rendered in the viewport
    fn query_source_features(&self, source_id: &str) -> Vec<Feature>;

    /// Members of the cluster `cluster_id`, at most `limit` of them
    async fn cluster_leaves(
        &self,
        source_id: &str,
        cluster_id: u64,
        limit: usize,
    ) -> anyhow::Result<Vec<Feature>>;

    /// Moves the viewport so that `bounds` is visible
    fn fit_bounds(&self, bounds: &LatLngBounds, options: &FitBoundsOptions);

    /// Materialises `element` as a marker anchored at `coordinate`, not yet
    /// added to the map
    fn create_marker(&self, element: MarkerElement, coordinate: LatLng) -> Self::Marker;

    /// Frame request hook, shared with marker click callbacks so that a
    /// click gets handled without waiting for the next viewport change
    fn frame_requester(&self) -> FrameRequester;
}

/// A marker primitive owned by the host
pub trait HostMarker {
    fn set_coordinate(&mut self, coordinate: LatLng);

    /// Screen-space displacement from the anchor, in pixels
    fn set_offset(&mut self, offset: Point);

    fn set_z_index(&mut self, z_index: i32);

    fn add_to_map(&mut self);

    fn remove(&mut self);

    fn element(&self) -> &MarkerElement;

    /// Rendered rectangle in screen pixels, `None` until laid out
    fn bounding_rect(&self) -> Option<Bounds>;

    /// Rendered rectangle of the child drawing `feature_id`
    fn child_rect(&self, feature_id: &FeatureId) -> Option<Bounds>;

    /// Registers the single click callback of this marker. The callback
    /// queues the click and requests a frame; the click is handled there.
    fn on_click(&mut self, handler: ClickHandler);
}

/// Components whose configuration can be swapped at runtime.
///
/// Works on snapshots so that implementors can keep their configuration
/// behind interior mutability and take `&self`.
pub trait Configurable {
    type Config: Clone;

    fn config(&self) -> Self::Config;

    fn set_config(&self, config: Self::Config) -> Result<()>;

    fn validate_config(_config: &Self::Config) -> Result<()> {
        Ok(())
    }

    /// Edits a copy of the configuration, validates it, then applies it
    fn update_config<F>(&self, updater: F) -> Result<()>
    where
        F: FnOnce(&mut Self::Config),
    {
        let mut config = self.config();
        updater(&mut config);
        Self::validate_config(&config)?;
        self.set_config(config)
    }
}

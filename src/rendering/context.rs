use crate::data::geojson::Feature;
use crate::data::identity::FeatureId;

/// What a renderer gets to know about the current cycle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderContext {
    /// Edge length of a single marker in pixels
    pub marker_size: f64,
    /// Zoom level of the cycle that asked for the element
    pub zoom: f64,
}

impl RenderContext {
    pub fn new(marker_size: f64, zoom: f64) -> Self {
        Self { marker_size, zoom }
    }
}

/// A cluster leaf handed to the unfolded-cluster renderer
#[derive(Debug, Clone, Copy)]
pub struct LeafRef<'a> {
    pub id: &'a FeatureId,
    pub feature: &'a Feature,
}

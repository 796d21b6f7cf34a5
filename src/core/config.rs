//! Configuration for the cluster marker overlay
//!
//! Every struct is `#[serde(default)]` at every level, so a partial JSON
//! document deep-merges over the defaults (or over an existing configuration
//! with [`MarkerOptions::merged`]).

use crate::core::constants::{
    DEFAULT_CLUSTER_MAX_ZOOM, DEFAULT_CLUSTER_MIN_ZOOM, DEFAULT_FIT_BOUNDS_PADDING,
    DEFAULT_MARKER_SIZE, DEFAULT_UNFOLDED_CLUSTER_MAX_LEAVES,
};
use crate::data::geojson::Feature;
use crate::data::identity::IdentityOptions;
use crate::{MarkerError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Options forwarded to the host when fitting the viewport to a cluster
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FitBoundsOptions {
    /// Padding in pixels around the fitted bounds
    pub padding: f64,
    /// Upper zoom limit for the fit
    pub max_zoom: Option<f64>,
    /// Whether the host should animate the transition
    pub animate: bool,
}

impl Default for FitBoundsOptions {
    fn default() -> Self {
        Self {
            padding: DEFAULT_FIT_BOUNDS_PADDING,
            max_zoom: None,
            animate: true,
        }
    }
}

/// Zoom/size thresholds that decide how a cluster is drawn
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RepresentationThresholds {
    pub cluster_min_zoom: f64,
    pub cluster_max_zoom: f64,
    pub unfolded_cluster_max_leaves: usize,
}

impl Default for RepresentationThresholds {
    fn default() -> Self {
        Self {
            cluster_min_zoom: DEFAULT_CLUSTER_MIN_ZOOM,
            cluster_max_zoom: DEFAULT_CLUSTER_MAX_ZOOM,
            unfolded_cluster_max_leaves: DEFAULT_UNFOLDED_CLUSTER_MAX_LEAVES,
        }
    }
}

/// Constructor configuration of [`crate::ClusterMarkers`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkerOptions {
    /// Below this zoom clusters are always collapsed
    pub cluster_min_zoom: f64,
    /// At or above this zoom clusters are always unfolded
    pub cluster_max_zoom: f64,
    /// Largest cluster unfolded between the two zoom thresholds
    pub unfolded_cluster_max_leaves: usize,
    /// Marker edge length in pixels, handed to the renderers
    pub marker_size: f64,
    pub bounds_options: FitBoundsOptions,
    /// Feature selected as soon as the overlay is created
    pub selected_feature: Option<Feature>,
    pub identity: IdentityOptions,
}

impl Default for MarkerOptions {
    fn default() -> Self {
        Self {
            cluster_min_zoom: DEFAULT_CLUSTER_MIN_ZOOM,
            cluster_max_zoom: DEFAULT_CLUSTER_MAX_ZOOM,
            unfolded_cluster_max_leaves: DEFAULT_UNFOLDED_CLUSTER_MAX_LEAVES,
            marker_size: DEFAULT_MARKER_SIZE,
            bounds_options: FitBoundsOptions::default(),
            selected_feature: None,
            identity: IdentityOptions::default(),
        }
    }
}

impl MarkerOptions {
    /// Builds options from a partial JSON document, defaults filling the gaps
    pub fn from_json(value: &Value) -> Result<Self> {
        MarkerOptions::default().merged(value)
    }

    /// Deep-merges `patch` over these options
    pub fn merged(&self, patch: &Value) -> Result<Self> {
        let mut base = serde_json::to_value(self)?;
        merge_json(&mut base, patch);
        let options: MarkerOptions = serde_json::from_value(base)?;
        options.validate()?;
        Ok(options)
    }

    pub fn thresholds(&self) -> RepresentationThresholds {
        RepresentationThresholds {
            cluster_min_zoom: self.cluster_min_zoom,
            cluster_max_zoom: self.cluster_max_zoom,
            unfolded_cluster_max_leaves: self.unfolded_cluster_max_leaves,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.cluster_min_zoom <= self.cluster_max_zoom) {
            return Err(MarkerError::InvalidConfig(format!(
                "cluster_min_zoom ({}) must not exceed cluster_max_zoom ({})",
                self.cluster_min_zoom, self.cluster_max_zoom
            )));
        }
        if !(self.marker_size > 0.0) {
            return Err(MarkerError::InvalidConfig(format!(
                "marker_size must be positive, got {}",
                self.marker_size
            )));
        }
        if !(self.bounds_options.padding >= 0.0) {
            return Err(MarkerError::InvalidConfig(format!(
                "bounds padding must not be negative, got {}",
                self.bounds_options.padding
            )));
        }
        Ok(())
    }
}

/// Recursively overlays `patch` onto `base`; objects merge, everything else replaces
fn merge_json(base: &mut Value, patch: &Value) {
    match (base, patch) {
        (Value::Object(base_map), Value::Object(patch_map)) => {
            for (key, patch_value) in patch_map {
                match base_map.get_mut(key) {
                    Some(base_value) => merge_json(base_value, patch_value),
                    None => {
                        base_map.insert(key.clone(), patch_value.clone());
                    }
                }
            }
        }
        (base, patch) => *base = patch.clone(),
    }
}

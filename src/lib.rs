//! # cluster-markers
//!
//! Clickable markers for every point of a clustered map source.
//!
//! The map engine groups nearby points into clusters. This crate draws a
//! marker per cluster or point, unfolds small clusters into their individual
//! points so each stays clickable, and keeps a pin on the selected point
//! while it moves between plain markers, collapsed and unfolded clusters.
//!
//! The engine is reached through the [`HostMap`] and [`HostMarker`] traits;
//! [`ClusterMarkers`] is the overlay driven by its events and frames.

pub mod background;
pub mod core;
pub mod data;
pub mod input;
pub mod layers;
pub mod prelude;
pub mod rendering;
pub mod runtime;
pub mod spatial;
pub mod traits;
pub use crate::core::constants;

// Re-export public API
pub use crate::core::{
    bounds::Bounds,
    config::{FitBoundsOptions, MarkerOptions},
    geo::{LatLng, LatLngBounds, Point},
};

pub use data::{
    geojson::{Feature, GeoJson, Geometry},
    identity::{FeatureId, FeatureIdentity, IdentityOptions},
};

pub use layers::{
    cluster_markers::{ClusterMarkers, CycleOutcome, CycleReport},
    reconciler::ReconcileReport,
    selection::Placement,
};

pub use input::events::{HostEvent, MarkerEvent, OverlayEvent};

pub use rendering::{
    element::{ChildElement, MarkerElement},
    renderers::Renderers,
};

pub use spatial::clustering::{select_representation, Representation};

pub use traits::{ClickHandler, Configurable, FrameRequester, HostMap, HostMarker};

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, MarkerError>;

/// Common error types
#[derive(Debug, thiserror::Error)]
pub enum MarkerError {
    #[error("source '{0}' is not registered on the map")]
    MissingSource(String),

    #[error("unsupported geometry: expected Point, got {geometry}")]
    UnsupportedGeometry { geometry: String },

    #[error("cluster feature without an engine id")]
    MissingClusterId,

    #[error("failed to load leaves of cluster {cluster_id}")]
    LeafFetch {
        cluster_id: FeatureId,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("no element for feature {feature_id} in unfolded cluster {cluster_id}")]
    SelectedElementNotFound {
        cluster_id: FeatureId,
        feature_id: FeatureId,
    },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Error type alias for convenience
pub type Error = MarkerError;

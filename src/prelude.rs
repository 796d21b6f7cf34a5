//! Prelude module for common cluster-markers types and traits
//!
//! This module re-exports the most commonly used types, traits, and functions
//! for easy importing with `use cluster_markers::prelude::*;`

pub use crate::core::{
    bounds::Bounds,
    config::{FitBoundsOptions, MarkerOptions, RepresentationThresholds},
    geo::{LatLng, LatLngBounds, Point},
};

pub use crate::data::{
    geojson::{Feature, GeoJson, Geometry},
    identity::{FeatureId, FeatureIdentity, IdentityOptions},
};

pub use crate::layers::{
    cluster_markers::{ClusterMarkers, CycleOutcome, CycleReport},
    reconciler::ReconcileReport,
    selection::Placement,
};

pub use crate::input::events::{HostEvent, MarkerEvent, OverlayEvent};

pub use crate::rendering::{
    context::{LeafRef, RenderContext},
    element::{ChildElement, MarkerElement},
    renderers::{
        CircleLayoutRenderer, ClusterRenderer, MarkerRenderer, PinRenderer, Renderers,
        UnfoldedClusterRenderer,
    },
};

pub use crate::spatial::clustering::Representation;

pub use crate::background::scheduler::Generation;

pub use crate::traits::{ClickHandler, Configurable, FrameRequester, HostMap, HostMarker};

#[cfg(feature = "tokio-runtime")]
pub use crate::runtime::{spawn_frame, FrameHandle};

pub use crate::{Error as MarkerError, Result};

pub use fxhash::{FxHashMap as HashMap, FxHashSet as HashSet};

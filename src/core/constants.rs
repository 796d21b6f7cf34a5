//! Engine-wide defaults and property-name conventions.
//! Keeping them in a single place makes it easier to tweak the magic numbers.

/// Zoom below which clusters always stay collapsed.
pub const DEFAULT_CLUSTER_MIN_ZOOM: f64 = 0.0;

/// Zoom at or above which every cluster is unfolded.
pub const DEFAULT_CLUSTER_MAX_ZOOM: f64 = 17.0;

/// Largest cluster that unfolds between the two thresholds.
pub const DEFAULT_UNFOLDED_CLUSTER_MAX_LEAVES: usize = 7;

/// Edge length of a plain marker in pixels.
pub const DEFAULT_MARKER_SIZE: f64 = 24.0;

/// Padding applied when fitting the viewport to a cluster's leaves.
pub const DEFAULT_FIT_BOUNDS_PADDING: f64 = 32.0;

/// Z-index given to regular markers.
pub const MARKER_Z_INDEX: i32 = 0;

/// Z-index given to the selection pin, above every marker.
pub const PIN_Z_INDEX: i32 = 1000;

/// GeoJSON property flagging a cluster feature.
pub const CLUSTER_PROPERTY: &str = "cluster";

/// GeoJSON property carrying the number of points in a cluster.
pub const POINT_COUNT_PROPERTY: &str = "point_count";

/// Property holding the embedded metadata blob.
pub const DEFAULT_METADATA_PROPERTY: &str = "metadata";

/// Identifier field inside the metadata blob.
pub const DEFAULT_METADATA_ID_FIELD: &str = "id";

/// Plain identifier property.
pub const DEFAULT_ID_PROPERTY: &str = "id";

/// Identity returned when nothing else resolves.
pub const UNKNOWN_FEATURE_ID: &str = "unknown";

/// CSS-style class names of the default renderers.
pub const CLUSTER_CLASS: &str = "cluster-markers-cluster";
pub const MARKER_CLASS: &str = "cluster-markers-marker";
pub const UNFOLDED_CLASS: &str = "cluster-markers-unfolded";
pub const PIN_CLASS: &str = "cluster-markers-pin";

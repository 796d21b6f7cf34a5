pub mod cluster_markers;
pub mod marker;
pub mod reconciler;
pub mod selection;

pub use cluster_markers::{ClusterMarkers, CycleOutcome, CycleReport};
pub use marker::{MarkerHandle, MarkersOnScreen};
pub use reconciler::{MarkerSetReconciler, ReconcileReport};
pub use selection::{PinMarker, Placement, Scene, SelectionTracker};

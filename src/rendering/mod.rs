pub mod context;
pub mod element;
pub mod renderers;

// Re-export main types
pub use context::{LeafRef, RenderContext};
pub use element::{ChildElement, MarkerElement};
pub use renderers::{
    CircleLayoutRenderer, ClusterRenderer, DefaultClusterRenderer, DefaultMarkerRenderer,
    DefaultPinRenderer, MarkerRenderer, PinRenderer, Renderers, UnfoldedClusterRenderer,
};

pub mod events;

pub use events::{HostEvent, MarkerEvent, OverlayEvent};

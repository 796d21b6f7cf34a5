use crate::data::geojson::Feature;
use crate::data::identity::FeatureId;
use crate::spatial::clustering::Representation;
use crate::traits::FrameRequester;
use crossbeam_channel::{unbounded, Receiver, Sender};
use std::cell::Cell;
use std::rc::Rc;

/// Map engine notifications that can trigger an update cycle
#[derive(Debug, Clone, PartialEq)]
pub enum HostEvent {
    /// The viewport finished panning
    MoveEnd,
    /// The viewport finished zooming
    ZoomEnd,
    /// A source reported new data
    SourceData { source_id: String, loaded: bool },
}

/// Messages posted by marker click callbacks
#[derive(Debug, Clone, PartialEq)]
pub enum MarkerEvent {
    Clicked {
        /// Id under which the marker is on screen
        marker_id: FeatureId,
        representation: Representation,
        /// Leaf id of the clicked child, for unfolded clusters
        child: Option<FeatureId>,
    },
}

/// Sending half of the click queue, cloned into every marker callback.
///
/// The first click after the queue was drained requests a frame, so clicks
/// are handled even when no update cycle is pending.
#[derive(Clone)]
pub struct ClickSender {
    tx: Sender<MarkerEvent>,
    frame_requested: Rc<Cell<bool>>,
    request_frame: FrameRequester,
}

impl ClickSender {
    /// Queues `event`; false once the receiving side is gone
    pub fn send(&self, event: MarkerEvent) -> bool {
        if self.tx.send(event).is_err() {
            return false;
        }
        if !self.frame_requested.replace(true) {
            (self.request_frame)();
        }
        true
    }
}

/// Receiving half of the click queue
pub struct ClickReceiver {
    rx: Receiver<MarkerEvent>,
    frame_requested: Rc<Cell<bool>>,
}

impl ClickReceiver {
    /// Takes every queued click. Clicks arriving afterwards request a new
    /// frame.
    pub fn drain(&self) -> Vec<MarkerEvent> {
        self.frame_requested.set(false);
        self.rx.try_iter().collect()
    }
}

/// Click queue whose sender requests a frame through `request_frame`
pub fn click_queue(request_frame: FrameRequester) -> (ClickSender, ClickReceiver) {
    let (tx, rx) = unbounded();
    let frame_requested = Rc::new(Cell::new(false));
    (
        ClickSender {
            tx,
            frame_requested: frame_requested.clone(),
            request_frame,
        },
        ClickReceiver {
            rx,
            frame_requested,
        },
    )
}

/// Notifications for consumers of the overlay
#[derive(Debug, Clone, PartialEq)]
pub enum OverlayEvent {
    /// A feature was selected by clicking its marker
    FeatureSelected(Feature),
}

//! Driving animation frames on an async runtime
//!
//! The overlay itself is runtime-agnostic: a host calls
//! [`ClusterMarkers::on_frame`] whenever it gets an animation frame. With the
//! `tokio-runtime` feature, [`spawn_frame`] runs that call as a local task so
//! that a new frame can start while an earlier cycle still waits for leaves,
//! the way frames interleave in a browser.

use crate::layers::cluster_markers::{ClusterMarkers, CycleOutcome};
use crate::traits::HostMap;
use crate::Result;

/// Logs what became of one frame
pub fn log_frame_result(source_id: &str, result: &Result<Option<CycleOutcome>>) {
    match result {
        Ok(Some(CycleOutcome::Committed(report))) => log::trace!(
            "frame on {} committed cycle {} ({:?})",
            source_id,
            report.generation,
            report.elapsed
        ),
        Ok(Some(CycleOutcome::Superseded)) => {
            log::trace!("frame on {} superseded", source_id)
        }
        Ok(None) => {}
        Err(e) => log::warn!("update cycle on {} failed: {}", source_id, e),
    }
}

/// Runs one frame to completion, logging failures instead of returning them
pub async fn run_frame<H: HostMap>(overlay: &ClusterMarkers<H>) -> Option<CycleOutcome> {
    let result = overlay.on_frame().await;
    log_frame_result(overlay.source_id(), &result);
    result.ok().flatten()
}

#[cfg(feature = "tokio-runtime")]
pub use self::tokio_impl::{spawn_frame, FrameHandle};

#[cfg(feature = "tokio-runtime")]
mod tokio_impl {
    use super::*;
    use std::rc::Rc;
    use tokio::task::JoinHandle;

    /// Handle to a frame running on the current `LocalSet`
    pub struct FrameHandle(JoinHandle<Option<CycleOutcome>>);

    impl FrameHandle {
        pub fn is_finished(&self) -> bool {
            self.0.is_finished()
        }

        pub fn cancel(&self) {
            self.0.abort();
        }

        /// Waits for the frame; `None` when nothing ran, the cycle failed or
        /// the task was cancelled
        pub async fn join(self) -> Option<CycleOutcome> {
            self.0.await.ok().flatten()
        }
    }

    /// Spawns [`ClusterMarkers::on_frame`] on the current `LocalSet`.
    ///
    /// Must be called from within a `LocalSet` (or a current-thread runtime
    /// driving one).
    pub fn spawn_frame<H>(overlay: Rc<ClusterMarkers<H>>) -> FrameHandle
    where
        H: HostMap + 'static,
        H::Marker: 'static,
    {
        FrameHandle(tokio::task::spawn_local(async move {
            run_frame(&overlay).await
        }))
    }
}

//! Diffing of the desired marker set against the markers on screen.

use crate::core::config::RepresentationThresholds;
use crate::core::constants::MARKER_Z_INDEX;
use crate::data::identity::{FeatureId, FeatureIdentity};
use crate::input::events::{ClickSender, MarkerEvent};
use crate::layers::marker::{MarkerHandle, MarkersOnScreen};
use crate::layers::selection::SelectionTracker;
use crate::rendering::context::{LeafRef, RenderContext};
use crate::rendering::element::MarkerElement;
use crate::rendering::renderers::Renderers;
use crate::spatial::clustering::{select_representation, Representation};
use crate::spatial::index::{FeatureIndex, IndexedFeature};
use crate::spatial::leaves::ClusterLeafCache;
use crate::traits::{HostMap, HostMarker};

/// What one reconciliation did to the markers on screen
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub created: usize,
    pub reused: usize,
    pub removed: usize,
}

impl ReconcileReport {
    /// Whether nothing was built or torn down
    pub fn is_stable(&self) -> bool {
        self.created == 0 && self.removed == 0
    }
}

/// Builds, reuses and destroys markers so that the screen shows exactly
/// `features`, each in the representation its zoom and size call for.
pub struct MarkerSetReconciler<'a, H: HostMap + ?Sized> {
    pub host: &'a H,
    pub renderers: &'a Renderers,
    pub identity: &'a FeatureIdentity,
    pub thresholds: RepresentationThresholds,
    pub render_context: RenderContext,
    pub clicks: &'a ClickSender,
}

impl<'a, H: HostMap + ?Sized> MarkerSetReconciler<'a, H> {
    /// Replaces the content of `markers` with the markers for `features`.
    ///
    /// Selection hooks fire for every marker built, before the selection is
    /// synced by the caller.
    pub fn reconcile(
        &self,
        features: &FeatureIndex,
        leaves: &ClusterLeafCache,
        markers: &mut MarkersOnScreen<H::Marker>,
        selection: &mut SelectionTracker<H::Marker>,
    ) -> ReconcileReport {
        let mut report = ReconcileReport::default();
        let mut next = MarkersOnScreen::new();

        for item in features.iter() {
            let representation = self.representation_of(item, leaves);
            let members = if representation.is_cluster() {
                leaves.leaf_ids(&item.id, self.identity)
            } else {
                Vec::new()
            };

            if let Some(mut handle) = markers.remove(&item.id) {
                if handle.matches(representation, &members) {
                    handle.move_to(item.coordinate);
                    next.insert(item.id.clone(), handle);
                    report.reused += 1;
                    continue;
                }
                log::debug!(
                    "marker {} changed from {} to {}",
                    item.id,
                    handle.representation(),
                    representation
                );
                handle.destroy();
                report.removed += 1;
            }

            let handle = self.build(item, representation, members, leaves);
            if representation.is_cluster() {
                selection.on_cluster_created(&item.id, handle.members());
            } else {
                selection.on_marker_created(&item.id);
            }
            next.insert(item.id.clone(), handle);
            report.created += 1;
        }

        report.removed += markers.destroy_all();
        *markers = next;
        report
    }

    /// Representation of one visible feature, counting cached leaves first
    pub fn representation_of(
        &self,
        item: &IndexedFeature,
        leaves: &ClusterLeafCache,
    ) -> Representation {
        let leaf_count = if item.is_cluster() {
            leaves
                .get(&item.id)
                .map(<[_]>::len)
                .or_else(|| item.feature.point_count())
        } else {
            None
        };
        select_representation(self.render_context.zoom, leaf_count, &self.thresholds)
    }

    fn build(
        &self,
        item: &IndexedFeature,
        representation: Representation,
        members: Vec<FeatureId>,
        leaves: &ClusterLeafCache,
    ) -> MarkerHandle<H::Marker> {
        let element = self.render(item, representation, &members, leaves);
        let mut marker = self.host.create_marker(element, item.coordinate);
        marker.set_z_index(MARKER_Z_INDEX);

        let clicks = self.clicks.clone();
        let marker_id = item.id.clone();
        marker.on_click(Box::new(move |child| {
            let event = MarkerEvent::Clicked {
                marker_id: marker_id.clone(),
                representation,
                child,
            };
            if !clicks.send(event) {
                log::trace!("click on {} after the overlay was dropped", marker_id);
            }
        }));
        marker.add_to_map();

        MarkerHandle::new(marker, representation, item.coordinate, members)
    }

    fn render(
        &self,
        item: &IndexedFeature,
        representation: Representation,
        members: &[FeatureId],
        leaves: &ClusterLeafCache,
    ) -> MarkerElement {
        let ctx = &self.render_context;
        match representation {
            Representation::Plain => self.renderers.marker.render(&item.feature, ctx),
            Representation::Collapsed => {
                let count = item
                    .feature
                    .point_count()
                    .unwrap_or_else(|| members.len());
                self.renderers.cluster.render(&item.feature, count, ctx)
            }
            Representation::Unfolded => {
                let leaf_features = leaves.get(&item.id).unwrap_or_default();
                let refs: Vec<LeafRef<'_>> = members
                    .iter()
                    .zip(leaf_features)
                    .map(|(id, feature)| LeafRef { id, feature })
                    .collect();
                self.renderers.unfolded.render(&item.feature, &refs, ctx)
            }
        }
    }
}

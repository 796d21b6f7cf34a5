//! The selected feature and its pin.
//!
//! A selection moves through
//! `Unselected -> Plain -> InCollapsedCluster <-> InUnfoldedCluster -> Unselected`
//! as update cycles change how the selected point is drawn. The pin follows:
//! on the point itself for plain markers and unloaded points, on the cluster
//! anchor for collapsed clusters, and on the leaf's own child element for
//! unfolded clusters.

use crate::core::constants::PIN_Z_INDEX;
use crate::core::geo::{LatLng, Point};
use crate::data::geojson::Feature;
use crate::data::identity::{FeatureId, FeatureIdentity};
use crate::layers::marker::MarkersOnScreen;
use crate::spatial::clustering::Representation;
use crate::spatial::index::FeatureIndex;
use crate::spatial::leaves::ClusterLeafCache;
use crate::traits::HostMarker;
use crate::{MarkerError, Result};

/// What is currently drawn, as seen by the selection tracker
pub struct Scene<'a, M> {
    pub features: &'a FeatureIndex,
    pub leaves: &'a ClusterLeafCache,
    pub markers: &'a MarkersOnScreen<M>,
    pub identity: &'a FeatureIdentity,
}

/// Builds a pin marker for a feature at a coordinate, not yet on the map
pub type PinFactory<'a, M> = dyn Fn(&Feature, LatLng) -> M + 'a;

/// Where the pin belongs
#[derive(Debug, Clone, PartialEq)]
pub enum Placement {
    /// Directly on a point: plain marker or a point not drawn at all
    Point(LatLng),
    /// On the marker of the cluster holding the selected leaf
    Cluster {
        cluster_id: FeatureId,
        representation: Representation,
        coordinate: LatLng,
        offset: Point,
    },
}

impl Placement {
    pub fn coordinate(&self) -> LatLng {
        match self {
            Placement::Point(coordinate) => *coordinate,
            Placement::Cluster { coordinate, .. } => *coordinate,
        }
    }

    pub fn offset(&self) -> Point {
        match self {
            Placement::Point(_) => Point::zero(),
            Placement::Cluster { offset, .. } => *offset,
        }
    }

    pub fn cluster_id(&self) -> Option<&FeatureId> {
        match self {
            Placement::Point(_) => None,
            Placement::Cluster { cluster_id, .. } => Some(cluster_id),
        }
    }
}

/// The pin overlay marker
pub struct PinMarker<M> {
    marker: M,
    placement: Placement,
}

impl<M: HostMarker> PinMarker<M> {
    pub fn marker(&self) -> &M {
        &self.marker
    }

    pub fn placement(&self) -> &Placement {
        &self.placement
    }

    pub fn coordinate(&self) -> LatLng {
        self.placement.coordinate()
    }

    pub fn offset(&self) -> Point {
        self.placement.offset()
    }
}

/// Owns at most one selected feature and its pin
pub struct SelectionTracker<M> {
    selected_feature_id: Option<FeatureId>,
    selected_cluster_id: Option<FeatureId>,
    selected_feature: Option<Feature>,
    pin: Option<PinMarker<M>>,
    /// Set when the marker drawing the selection was rebuilt this cycle
    stale_pin: bool,
}

impl<M> Default for SelectionTracker<M> {
    fn default() -> Self {
        Self {
            selected_feature_id: None,
            selected_cluster_id: None,
            selected_feature: None,
            pin: None,
            stale_pin: false,
        }
    }
}

impl<M: HostMarker> SelectionTracker<M> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected_feature_id(&self) -> Option<&FeatureId> {
        self.selected_feature_id.as_ref()
    }

    pub fn selected_cluster_id(&self) -> Option<&FeatureId> {
        self.selected_cluster_id.as_ref()
    }

    pub fn selected_feature(&self) -> Option<&Feature> {
        self.selected_feature.as_ref()
    }

    pub fn pin(&self) -> Option<&PinMarker<M>> {
        self.pin.as_ref()
    }

    /// Selects `feature` and pins it against what is on screen now
    pub fn select(
        &mut self,
        feature: &Feature,
        scene: &Scene<'_, M>,
        make_pin: &PinFactory<'_, M>,
    ) -> Result<()> {
        feature.require_point()?;
        let id = scene.identity.identity_of(feature)?;

        self.reset();
        self.selected_feature_id = Some(id.clone());
        self.selected_feature = Some(feature.clone());

        let placement = Self::resolve(&id, feature, scene)?;
        self.place_pin(placement, make_pin);
        Ok(())
    }

    /// Clears the selection and removes the pin
    pub fn reset(&mut self) {
        self.selected_feature_id = None;
        self.selected_cluster_id = None;
        self.selected_feature = None;
        self.stale_pin = false;
        self.remove_pin();
    }

    /// Reconciliation hook: a plain marker was (re)built
    pub fn on_marker_created(&mut self, id: &FeatureId) {
        if self.selected_feature_id.as_ref() == Some(id) {
            self.stale_pin = true;
        }
    }

    /// Reconciliation hook: a cluster marker was (re)built
    pub fn on_cluster_created(&mut self, cluster_id: &FeatureId, members: &[FeatureId]) {
        let Some(selected) = self.selected_feature_id.as_ref() else {
            return;
        };
        if members.contains(selected) || self.selected_cluster_id.as_ref() == Some(cluster_id) {
            self.stale_pin = true;
        }
    }

    /// Moves the pin after reconciliation. Returns true when the pin was
    /// rendered again.
    pub fn sync(&mut self, scene: &Scene<'_, M>, make_pin: &PinFactory<'_, M>) -> Result<bool> {
        let (Some(id), Some(feature)) = (&self.selected_feature_id, &self.selected_feature) else {
            self.stale_pin = false;
            return Ok(false);
        };

        // a pin that cannot be placed comes off the map; the selection stays
        // and the next cycle places it again
        let placement = match Self::resolve(id, feature, scene) {
            Ok(placement) => placement,
            Err(e) => {
                self.stale_pin = false;
                self.remove_pin();
                return Err(e);
            }
        };

        let rebuild = match &self.pin {
            None => true,
            Some(pin) => self.stale_pin || pin.placement.cluster_id() != placement.cluster_id(),
        };
        self.stale_pin = false;

        if rebuild {
            self.remove_pin();
            self.place_pin(placement, make_pin);
            return Ok(true);
        }

        if let Some(pin) = self.pin.as_mut() {
            if pin.placement.coordinate() != placement.coordinate() {
                pin.marker.set_coordinate(placement.coordinate());
            }
            if pin.placement.offset() != placement.offset() {
                pin.marker.set_offset(placement.offset());
            }
            self.selected_cluster_id = placement.cluster_id().cloned();
            pin.placement = placement;
        }
        Ok(false)
    }

    /// Where the pin for `feature`, known as `id`, belongs in `scene`
    pub fn resolve(id: &FeatureId, feature: &Feature, scene: &Scene<'_, M>) -> Result<Placement> {
        if let Some(item) = scene.features.get(id) {
            return Ok(Placement::Point(item.coordinate));
        }

        if let Some((cluster_id, leaf)) = scene.leaves.find_leaf(id, scene.identity) {
            if let Some(handle) = scene.markers.get(cluster_id) {
                return match handle.representation() {
                    Representation::Collapsed => Ok(Placement::Cluster {
                        cluster_id: cluster_id.clone(),
                        representation: Representation::Collapsed,
                        coordinate: handle.coordinate(),
                        offset: Point::zero(),
                    }),
                    Representation::Unfolded => {
                        let not_found = || MarkerError::SelectedElementNotFound {
                            cluster_id: cluster_id.clone(),
                            feature_id: id.clone(),
                        };
                        let cluster_rect = handle.marker().bounding_rect().ok_or_else(not_found)?;
                        let child_rect = handle.marker().child_rect(id).ok_or_else(not_found)?;
                        Ok(Placement::Cluster {
                            cluster_id: cluster_id.clone(),
                            representation: Representation::Unfolded,
                            coordinate: handle.coordinate(),
                            offset: cluster_rect.offset_to(&child_rect),
                        })
                    }
                    Representation::Plain => Ok(Placement::Point(handle.coordinate())),
                };
            }
            if let Some(coordinate) = leaf.coordinate() {
                return Ok(Placement::Point(coordinate));
            }
        }

        Ok(Placement::Point(feature.require_point()?))
    }

    fn place_pin(&mut self, placement: Placement, make_pin: &PinFactory<'_, M>) {
        let Some(feature) = self.selected_feature.as_ref() else {
            return;
        };

        let mut marker = make_pin(feature, placement.coordinate());
        marker.set_offset(placement.offset());
        marker.set_z_index(PIN_Z_INDEX);
        marker.add_to_map();

        self.selected_cluster_id = placement.cluster_id().cloned();
        self.pin = Some(PinMarker { marker, placement });
    }

    fn remove_pin(&mut self) {
        if let Some(mut pin) = self.pin.take() {
            pin.marker.remove();
        }
    }
}

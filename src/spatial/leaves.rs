//! Per-cycle cache of cluster members.

use crate::core::geo::{LatLng, LatLngBounds};
use crate::data::geojson::Feature;
use crate::data::identity::{FeatureId, FeatureIdentity};
use crate::prelude::HashMap;
use crate::spatial::index::IndexedFeature;
use crate::traits::HostMap;
use crate::{MarkerError, Result};

/// Leaves of every visible cluster, keyed by cluster identity.
///
/// Built from scratch by each update cycle and handed over to the overlay
/// only when that cycle commits, so two cycles never share one.
#[derive(Debug, Clone, Default)]
pub struct ClusterLeafCache {
    leaves: HashMap<FeatureId, Vec<Feature>>,
}

impl ClusterLeafCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, cluster_id: FeatureId, leaves: Vec<Feature>) {
        self.leaves.insert(cluster_id, leaves);
    }

    pub fn get(&self, cluster_id: &FeatureId) -> Option<&[Feature]> {
        self.leaves.get(cluster_id).map(Vec::as_slice)
    }

    pub fn contains(&self, cluster_id: &FeatureId) -> bool {
        self.leaves.contains_key(cluster_id)
    }

    pub fn clear(&mut self) {
        self.leaves.clear();
    }

    pub fn len(&self) -> usize {
        self.leaves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.leaves.is_empty()
    }

    /// Finds the cluster holding the leaf `leaf_id`
    pub fn find_leaf(
        &self,
        leaf_id: &FeatureId,
        identity: &FeatureIdentity,
    ) -> Option<(&FeatureId, &Feature)> {
        self.leaves.iter().find_map(|(cluster_id, leaves)| {
            leaves
                .iter()
                .find(|leaf| identity.matches(leaf, leaf_id))
                .map(|leaf| (cluster_id, leaf))
        })
    }

    /// Identities of a cluster's leaves, in source order
    pub fn leaf_ids(&self, cluster_id: &FeatureId, identity: &FeatureIdentity) -> Vec<FeatureId> {
        self.get(cluster_id)
            .unwrap_or_default()
            .iter()
            .map(|leaf| identity.identity_of(leaf).unwrap_or_else(|_| FeatureId::unknown()))
            .collect()
    }

    /// Geographic extent of a cluster's leaves
    pub fn bounds_of(&self, cluster_id: &FeatureId) -> Option<LatLngBounds> {
        let points: Vec<LatLng> = self
            .get(cluster_id)?
            .iter()
            .filter_map(Feature::coordinate)
            .collect();
        LatLngBounds::from_points(&points)
    }
}

/// Fetches the members of one cluster from the host's source
pub async fn load_leaves<H>(
    host: &H,
    source_id: &str,
    cluster: &IndexedFeature,
) -> Result<Vec<Feature>>
where
    H: HostMap + ?Sized,
{
    let engine_id = cluster
        .feature
        .engine_id()
        .ok_or(MarkerError::MissingClusterId)?;
    let limit = cluster.feature.point_count().unwrap_or(usize::MAX);

    host.cluster_leaves(source_id, engine_id, limit)
        .await
        .map_err(|e| MarkerError::LeafFetch {
            cluster_id: cluster.id.clone(),
            source: e.into(),
        })
}

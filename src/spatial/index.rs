use crate::core::geo::LatLng;
use crate::data::geojson::Feature;
use crate::data::identity::{FeatureId, FeatureIdentity};
use crate::prelude::HashMap;
use crate::{MarkerError, Result};

/// A visible feature with its resolved identity and anchor coordinate
#[derive(Debug, Clone, PartialEq)]
pub struct IndexedFeature {
    pub id: FeatureId,
    pub feature: Feature,
    pub coordinate: LatLng,
}

impl IndexedFeature {
    pub fn is_cluster(&self) -> bool {
        self.feature.is_cluster()
    }
}

/// The features returned by one source query, keyed by identity.
///
/// Order follows the query result. Duplicates (the same point reported by
/// two tiles) keep their first occurrence.
#[derive(Debug, Clone, Default)]
pub struct FeatureIndex {
    items: Vec<IndexedFeature>,
    by_id: HashMap<FeatureId, usize>,
}

impl FeatureIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves identities and coordinates for a raw query result.
    ///
    /// Non-point features are logged and skipped. A cluster without engine
    /// id aborts the whole build.
    pub fn build(features: Vec<Feature>, identity: &FeatureIdentity) -> Result<Self> {
        let mut index = Self::new();
        index.items.reserve(features.len());

        for feature in features {
            let id = identity.identity_of(&feature)?;
            let coordinate = match feature.require_point() {
                Ok(coordinate) => coordinate,
                Err(MarkerError::UnsupportedGeometry { geometry }) => {
                    log::warn!("skipping feature {} with {} geometry", id, geometry);
                    continue;
                }
                Err(e) => return Err(e),
            };
            index.insert(IndexedFeature {
                id,
                feature,
                coordinate,
            });
        }

        Ok(index)
    }

    /// Inserts unless the id is already present; returns whether it was added
    pub fn insert(&mut self, item: IndexedFeature) -> bool {
        if self.by_id.contains_key(&item.id) {
            return false;
        }
        self.by_id.insert(item.id.clone(), self.items.len());
        self.items.push(item);
        true
    }

    pub fn get(&self, id: &FeatureId) -> Option<&IndexedFeature> {
        self.by_id.get(id).map(|&i| &self.items[i])
    }

    pub fn contains(&self, id: &FeatureId) -> bool {
        self.by_id.contains_key(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &IndexedFeature> {
        self.items.iter()
    }

    pub fn clusters(&self) -> impl Iterator<Item = &IndexedFeature> {
        self.items.iter().filter(|item| item.is_cluster())
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

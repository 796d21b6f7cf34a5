use crate::core::geo::LatLng;
use crate::data::identity::FeatureId;
use crate::prelude::HashMap;
use crate::spatial::clustering::Representation;
use crate::traits::HostMarker;

/// A host marker currently on screen, tagged with how it was drawn
pub struct MarkerHandle<M> {
    marker: M,
    representation: Representation,
    coordinate: LatLng,
    /// Leaf ids of a cluster, empty for plain markers
    members: Vec<FeatureId>,
}

impl<M: HostMarker> MarkerHandle<M> {
    pub fn new(
        marker: M,
        representation: Representation,
        coordinate: LatLng,
        members: Vec<FeatureId>,
    ) -> Self {
        Self {
            marker,
            representation,
            coordinate,
            members,
        }
    }

    pub fn representation(&self) -> Representation {
        self.representation
    }

    pub fn coordinate(&self) -> LatLng {
        self.coordinate
    }

    pub fn members(&self) -> &[FeatureId] {
        &self.members
    }

    pub fn marker(&self) -> &M {
        &self.marker
    }

    /// Whether this handle already draws `representation` of `members`
    pub fn matches(&self, representation: Representation, members: &[FeatureId]) -> bool {
        self.representation == representation && self.members == members
    }

    /// Follows an anchor that moved without rebuilding the element
    pub fn move_to(&mut self, coordinate: LatLng) {
        if self.coordinate != coordinate {
            self.coordinate = coordinate;
            self.marker.set_coordinate(coordinate);
        }
    }

    /// Takes the marker off the map
    pub fn destroy(mut self) {
        self.marker.remove();
    }
}

/// Markers currently displayed, keyed by feature identity
pub struct MarkersOnScreen<M> {
    markers: HashMap<FeatureId, MarkerHandle<M>>,
}

impl<M> Default for MarkersOnScreen<M> {
    fn default() -> Self {
        Self {
            markers: HashMap::default(),
        }
    }
}

impl<M: HostMarker> MarkersOnScreen<M> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &FeatureId) -> Option<&MarkerHandle<M>> {
        self.markers.get(id)
    }

    pub fn contains(&self, id: &FeatureId) -> bool {
        self.markers.contains_key(id)
    }

    pub fn insert(&mut self, id: FeatureId, handle: MarkerHandle<M>) -> Option<MarkerHandle<M>> {
        self.markers.insert(id, handle)
    }

    pub fn remove(&mut self, id: &FeatureId) -> Option<MarkerHandle<M>> {
        self.markers.remove(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &FeatureId> {
        self.markers.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&FeatureId, &MarkerHandle<M>)> {
        self.markers.iter()
    }

    /// Removes every marker from the map; returns how many there were
    pub fn destroy_all(&mut self) -> usize {
        let count = self.markers.len();
        for (_, handle) in self.markers.drain() {
            handle.destroy();
        }
        count
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }
}

use crate::core::bounds::Bounds;
use crate::core::geo::Point;
use crate::data::identity::FeatureId;
use serde::{Deserialize, Serialize};

/// A rendered child of an element, tied to the leaf it draws
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChildElement {
    pub feature_id: FeatureId,
    pub class_name: String,
    /// Rectangle relative to the parent's top-left corner
    pub rect: Bounds,
}

/// Retained description of a marker's DOM, produced by the renderers and
/// materialised by the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerElement {
    pub class_name: String,
    pub label: Option<String>,
    pub width: f64,
    pub height: f64,
    pub children: Vec<ChildElement>,
}

impl MarkerElement {
    pub fn new(class_name: impl Into<String>, width: f64, height: f64) -> Self {
        Self {
            class_name: class_name.into(),
            label: None,
            width,
            height,
            children: Vec::new(),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_child(mut self, child: ChildElement) -> Self {
        self.children.push(child);
        self
    }

    /// The child drawing `feature_id`, if any
    pub fn child(&self, feature_id: &FeatureId) -> Option<&ChildElement> {
        self.children.iter().find(|c| &c.feature_id == feature_id)
    }

    /// The element's own rectangle in local coordinates
    pub fn local_rect(&self) -> Bounds {
        Bounds::from_origin_and_size(Point::zero(), self.width, self.height)
    }

    /// Rectangle of the element once centered on `anchor` (screen pixels)
    pub fn rect_at(&self, anchor: Point) -> Bounds {
        Bounds::from_center_and_size(anchor, self.width, self.height)
    }

    /// Screen rectangle of the child drawing `feature_id`, with the element
    /// centered on `anchor`
    pub fn child_rect_at(&self, anchor: Point, feature_id: &FeatureId) -> Option<Bounds> {
        let origin = self.rect_at(anchor).min;
        self.child(feature_id).map(|c| c.rect.translated(&origin))
    }
}

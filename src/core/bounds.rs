use crate::core::geo::Point;
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle in screen pixels, y growing downwards.
///
/// Used for element layouts (relative to the element's top-left corner) and
/// for the rectangles a host reports once markers are laid out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min: Point,
    pub max: Point,
}

impl Bounds {
    pub fn new(min: Point, max: Point) -> Self {
        Self { min, max }
    }

    pub fn from_coords(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self::new(Point::new(min_x, min_y), Point::new(max_x, max_y))
    }

    /// Rectangle of `width` x `height` whose top-left corner is `origin`
    pub fn from_origin_and_size(origin: Point, width: f64, height: f64) -> Self {
        Self::new(origin, origin.add(&Point::new(width, height)))
    }

    /// Rectangle of `width` x `height` centered on `center`
    pub fn from_center_and_size(center: Point, width: f64, height: f64) -> Self {
        let half = Point::new(width / 2.0, height / 2.0);
        Self::new(center.subtract(&half), center.add(&half))
    }

    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    pub fn center(&self) -> Point {
        Point::new(
            (self.min.x + self.max.x) / 2.0,
            (self.min.y + self.max.y) / 2.0,
        )
    }

    /// Same rectangle moved by `delta`
    pub fn translated(&self, delta: &Point) -> Bounds {
        Bounds::new(self.min.add(delta), self.max.add(delta))
    }

    /// Vector from this rectangle's center to the center of `inner`.
    ///
    /// This is how far a pin anchored on a marker must be shifted to sit on
    /// one of the marker's children.
    pub fn offset_to(&self, inner: &Bounds) -> Point {
        inner.center().subtract(&self.center())
    }
}

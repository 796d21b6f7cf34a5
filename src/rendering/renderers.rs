//! Render strategies, one per marker role.
//!
//! Each role has a trait, a default implementation, and a blanket impl for
//! plain closures so callers can inject a function instead of a type.

use crate::core::bounds::Bounds;
use crate::core::constants::{CLUSTER_CLASS, MARKER_CLASS, PIN_CLASS, UNFOLDED_CLASS};
use crate::core::geo::Point;
use crate::data::geojson::Feature;
use crate::rendering::context::{LeafRef, RenderContext};
use crate::rendering::element::{ChildElement, MarkerElement};
use std::f64::consts::PI;

/// Draws a collapsed cluster
pub trait ClusterRenderer {
    fn render(&self, cluster: &Feature, point_count: usize, ctx: &RenderContext) -> MarkerElement;
}

/// Draws a single point
pub trait MarkerRenderer {
    fn render(&self, feature: &Feature, ctx: &RenderContext) -> MarkerElement;
}

/// Lays out the leaves of an unfolded cluster around its anchor.
///
/// The returned element must contain one child per leaf, tagged with the
/// leaf's id; the selection pin is aligned on that child.
pub trait UnfoldedClusterRenderer {
    fn render(&self, cluster: &Feature, leaves: &[LeafRef<'_>], ctx: &RenderContext)
        -> MarkerElement;
}

/// Draws the selection pin
pub trait PinRenderer {
    fn render(&self, feature: &Feature, ctx: &RenderContext) -> MarkerElement;
}

impl<F> ClusterRenderer for F
where
    F: Fn(&Feature, usize, &RenderContext) -> MarkerElement,
{
    fn render(&self, cluster: &Feature, point_count: usize, ctx: &RenderContext) -> MarkerElement {
        self(cluster, point_count, ctx)
    }
}

impl<F> MarkerRenderer for F
where
    F: Fn(&Feature, &RenderContext) -> MarkerElement,
{
    fn render(&self, feature: &Feature, ctx: &RenderContext) -> MarkerElement {
        self(feature, ctx)
    }
}

impl<F> UnfoldedClusterRenderer for F
where
    F: Fn(&Feature, &[LeafRef<'_>], &RenderContext) -> MarkerElement,
{
    fn render(
        &self,
        cluster: &Feature,
        leaves: &[LeafRef<'_>],
        ctx: &RenderContext,
    ) -> MarkerElement {
        self(cluster, leaves, ctx)
    }
}

impl<F> PinRenderer for F
where
    F: Fn(&Feature, &RenderContext) -> MarkerElement,
{
    fn render(&self, feature: &Feature, ctx: &RenderContext) -> MarkerElement {
        self(feature, ctx)
    }
}

/// Count badge growing with the number of digits
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultClusterRenderer;

impl ClusterRenderer for DefaultClusterRenderer {
    fn render(&self, _cluster: &Feature, point_count: usize, ctx: &RenderContext) -> MarkerElement {
        let label = abbreviate_count(point_count);
        let size = ctx.marker_size + 6.0 * label.len() as f64;
        MarkerElement::new(CLUSTER_CLASS, size, size).with_label(label)
    }
}

/// Round marker of `marker_size`
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultMarkerRenderer;

impl MarkerRenderer for DefaultMarkerRenderer {
    fn render(&self, _feature: &Feature, ctx: &RenderContext) -> MarkerElement {
        MarkerElement::new(MARKER_CLASS, ctx.marker_size, ctx.marker_size)
    }
}

/// Places leaves evenly on a ring, first leaf at twelve o'clock
#[derive(Debug, Clone, Copy)]
pub struct CircleLayoutRenderer {
    /// Distance between neighbouring leaf centers, in marker sizes
    pub spacing: f64,
}

impl Default for CircleLayoutRenderer {
    fn default() -> Self {
        Self { spacing: 1.25 }
    }
}

impl CircleLayoutRenderer {
    fn radius(&self, count: usize, marker_size: f64) -> f64 {
        if count < 2 {
            return 0.0;
        }
        let circumference = count as f64 * marker_size * self.spacing;
        (circumference / (2.0 * PI)).max(marker_size * 0.75)
    }
}

impl UnfoldedClusterRenderer for CircleLayoutRenderer {
    fn render(
        &self,
        _cluster: &Feature,
        leaves: &[LeafRef<'_>],
        ctx: &RenderContext,
    ) -> MarkerElement {
        let size = ctx.marker_size;
        let radius = self.radius(leaves.len(), size);
        let extent = 2.0 * radius + size;
        let center = Point::new(extent / 2.0, extent / 2.0);

        let mut element = MarkerElement::new(UNFOLDED_CLASS, extent, extent);
        for (i, leaf) in leaves.iter().enumerate() {
            let angle = -PI / 2.0 + 2.0 * PI * i as f64 / leaves.len() as f64;
            let leaf_center = Point::new(
                center.x + radius * angle.cos(),
                center.y + radius * angle.sin(),
            );
            element = element.with_child(ChildElement {
                feature_id: leaf.id.clone(),
                class_name: MARKER_CLASS.to_string(),
                rect: Bounds::from_center_and_size(leaf_center, size, size),
            });
        }
        element
    }
}

/// Teardrop pin, taller than a marker
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultPinRenderer;

impl PinRenderer for DefaultPinRenderer {
    fn render(&self, _feature: &Feature, ctx: &RenderContext) -> MarkerElement {
        MarkerElement::new(PIN_CLASS, ctx.marker_size, ctx.marker_size * 1.5)
    }
}

/// The four strategies used by the overlay
pub struct Renderers {
    pub cluster: Box<dyn ClusterRenderer>,
    pub marker: Box<dyn MarkerRenderer>,
    pub unfolded: Box<dyn UnfoldedClusterRenderer>,
    pub pin: Box<dyn PinRenderer>,
}

impl Default for Renderers {
    fn default() -> Self {
        Self {
            cluster: Box::new(DefaultClusterRenderer),
            marker: Box::new(DefaultMarkerRenderer),
            unfolded: Box::new(CircleLayoutRenderer::default()),
            pin: Box::new(DefaultPinRenderer),
        }
    }
}

impl Renderers {
    pub fn with_cluster(mut self, renderer: impl ClusterRenderer + 'static) -> Self {
        self.cluster = Box::new(renderer);
        self
    }

    pub fn with_marker(mut self, renderer: impl MarkerRenderer + 'static) -> Self {
        self.marker = Box::new(renderer);
        self
    }

    pub fn with_unfolded(mut self, renderer: impl UnfoldedClusterRenderer + 'static) -> Self {
        self.unfolded = Box::new(renderer);
        self
    }

    pub fn with_pin(mut self, renderer: impl PinRenderer + 'static) -> Self {
        self.pin = Box::new(renderer);
        self
    }
}

fn abbreviate_count(count: usize) -> String {
    match count {
        0..=999 => count.to_string(),
        1_000..=9_999 => format!("{:.1}k", count as f64 / 1_000.0),
        _ => format!("{}k", count / 1_000),
    }
}

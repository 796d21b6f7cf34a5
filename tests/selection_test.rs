mod common;

use cluster_markers::constants::{CLUSTER_CLASS, PIN_CLASS, UNFOLDED_CLASS};
use cluster_markers::prelude::*;
use common::*;
use serde_json::json;

fn abc() -> Feature {
    point("abc", 1.0, 1.0)
}

fn leaves_of_12() -> Vec<Feature> {
    vec![abc(), point("def", 1.2, 1.1), point("ghi", 1.1, 0.9)]
}

fn cluster_12() -> Feature {
    cluster(12, 1.1, 1.0, 3)
}

fn host_with_cluster(zoom: f64) -> MockHost {
    let host = MockHost::new(zoom);
    host.show(vec![point("a", 10.0, 10.0), cluster_12()]);
    host.set_leaves(12, leaves_of_12());
    host
}

/// Unfolds at zoom 17 and above only
fn overlay_unfolding_at_max_zoom(host: MockHost) -> ClusterMarkers<MockHost> {
    init_logging();
    let options = MarkerOptions::from_json(&json!({ "unfolded_cluster_max_leaves": 2 })).unwrap();
    ClusterMarkers::new(host, SOURCE, options, Renderers::default()).unwrap()
}

/// Offset of the child drawing `leaf` from the center of marker `cluster`
fn child_offset(overlay: &ClusterMarkers<MockHost>, cluster: &str, leaf: &str) -> Point {
    overlay
        .with_marker(&FeatureId::from(cluster), |m| {
            let rect = m.bounding_rect().unwrap();
            rect.offset_to(&m.child_rect(&FeatureId::from(leaf)).unwrap())
        })
        .unwrap()
}

#[tokio::test]
async fn test_leaf_of_unfolded_cluster_is_pinned_on_its_child() {
    let overlay = overlay(host_with_cluster(10.0));
    commit(&overlay).await;

    overlay.set_selected_feature(&abc()).unwrap();

    assert_eq!(overlay.selected_feature_id(), Some(FeatureId::from("abc")));
    assert_eq!(overlay.selected_cluster_id(), Some(FeatureId::from("12")));

    let placement = overlay.pin_placement().unwrap();
    assert_eq!(placement.coordinate(), LatLng::new(1.1, 1.0));
    let offset = placement.offset();
    assert_eq!(offset, child_offset(&overlay, "12", "abc"));
    // first leaf of the ring sits straight above the anchor
    assert!(offset.x.abs() < 1e-9);
    assert!(offset.y < 0.0);
    assert_eq!(overlay.host().live(PIN_CLASS), 1);
}

#[tokio::test]
async fn test_pin_follows_cluster_through_representation_changes() {
    let overlay = overlay_unfolding_at_max_zoom(host_with_cluster(17.0));
    commit(&overlay).await;
    overlay.set_selected_feature(&abc()).unwrap();
    let unfolded_offset = overlay.pin_placement().unwrap().offset();
    assert_ne!(unfolded_offset, Point::zero());

    overlay.host().set_zoom(10.0);
    let report = refresh(&overlay).await;

    assert!(report.pin_rerendered);
    assert_eq!(
        overlay.representation_of(&FeatureId::from("12")),
        Some(Representation::Collapsed)
    );
    let placement = overlay.pin_placement().unwrap();
    assert_eq!(placement.coordinate(), LatLng::new(1.1, 1.0));
    assert_eq!(placement.offset(), Point::zero());
    assert_eq!(overlay.selected_cluster_id(), Some(FeatureId::from("12")));
    assert_eq!(overlay.host().live(PIN_CLASS), 1);

    overlay.host().set_zoom(17.0);
    let report = refresh(&overlay).await;

    assert!(report.pin_rerendered);
    assert_eq!(overlay.pin_placement().unwrap().offset(), unfolded_offset);
    assert_eq!(overlay.host().live(PIN_CLASS), 1);
}

#[tokio::test]
async fn test_pin_is_left_alone_when_nothing_changes() {
    let overlay = overlay(host_with_cluster(10.0));
    commit(&overlay).await;
    overlay.set_selected_feature(&abc()).unwrap();
    let created = overlay.host().markers_created();

    let report = refresh(&overlay).await;

    assert!(!report.pin_rerendered);
    assert_eq!(overlay.host().markers_created(), created);
    assert_eq!(overlay.host().live(PIN_CLASS), 1);
}

#[tokio::test]
async fn test_plain_marker_swallowed_by_cluster() {
    let host = MockHost::new(17.0);
    host.show(vec![abc(), point("def", 1.2, 1.1)]);
    host.set_leaves(12, leaves_of_12());
    let overlay = overlay_unfolding_at_max_zoom(host);
    commit(&overlay).await;

    overlay.set_selected_feature(&abc()).unwrap();
    assert_eq!(
        overlay.pin_placement(),
        Some(Placement::Point(LatLng::new(1.0, 1.0)))
    );
    assert!(overlay.selected_cluster_id().is_none());

    overlay.host().set_zoom(10.0);
    overlay.host().show(vec![cluster_12()]);
    let report = refresh(&overlay).await;

    assert!(report.pin_rerendered);
    assert_eq!(overlay.selected_cluster_id(), Some(FeatureId::from("12")));
    assert_eq!(
        overlay.pin_placement().unwrap().coordinate(),
        LatLng::new(1.1, 1.0)
    );
    assert_eq!(overlay.host().live(PIN_CLASS), 1);
}

#[tokio::test]
async fn test_selection_outside_the_view_stays_on_its_coordinate() {
    let overlay = overlay(host_with_cluster(10.0));
    commit(&overlay).await;

    let far = point("far", 45.0, 7.0);
    overlay.set_selected_feature(&far).unwrap();

    assert_eq!(
        overlay.pin_placement(),
        Some(Placement::Point(LatLng::new(45.0, 7.0)))
    );
    assert!(overlay.selected_cluster_id().is_none());

    refresh(&overlay).await;
    assert_eq!(
        overlay.pin_placement(),
        Some(Placement::Point(LatLng::new(45.0, 7.0)))
    );
}

#[tokio::test]
async fn test_reset_clears_selection_and_pin() {
    let overlay = overlay(host_with_cluster(10.0));
    commit(&overlay).await;
    overlay.set_selected_feature(&abc()).unwrap();

    overlay.reset_selected_feature();

    assert!(overlay.selected_feature_id().is_none());
    assert!(overlay.selected_cluster_id().is_none());
    assert!(!overlay.has_pin());
    assert_eq!(overlay.host().live(PIN_CLASS), 0);

    let report = refresh(&overlay).await;
    assert!(!report.pin_rerendered);
    assert!(!overlay.has_pin());

    overlay.set_selected_feature(&abc()).unwrap();
    assert_eq!(overlay.host().live(PIN_CLASS), 1);
}

#[tokio::test]
async fn test_selecting_again_replaces_the_pin() {
    let overlay = overlay(host_with_cluster(10.0));
    commit(&overlay).await;

    overlay.set_selected_feature(&abc()).unwrap();
    overlay
        .set_selected_feature(&point("a", 10.0, 10.0))
        .unwrap();

    assert_eq!(overlay.selected_feature_id(), Some(FeatureId::from("a")));
    assert!(overlay.selected_cluster_id().is_none());
    assert_eq!(overlay.host().live(PIN_CLASS), 1);
}

#[tokio::test]
async fn test_non_point_selection_is_rejected() {
    let overlay = overlay(host_with_cluster(10.0));
    commit(&overlay).await;
    overlay.set_selected_feature(&abc()).unwrap();

    let polygon = Feature::point(LatLng::new(0.0, 0.0)).with_geometry(Geometry::Polygon {
        coordinates: vec![vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 0.0]]],
    });
    let result = overlay.set_selected_feature(&polygon);

    assert!(matches!(
        result,
        Err(MarkerError::UnsupportedGeometry { ref geometry }) if geometry == "Polygon"
    ));
    assert_eq!(overlay.selected_feature_id(), Some(FeatureId::from("abc")));
    assert_eq!(overlay.host().live(PIN_CLASS), 1);
}

#[tokio::test]
async fn test_click_on_plain_marker_selects_and_notifies() {
    let overlay = overlay(host_with_cluster(10.0));
    commit(&overlay).await;
    let events = overlay.subscribe();
    drop(overlay.subscribe());

    overlay.with_marker(&FeatureId::from("a"), |m| m.click(None));
    assert_eq!(overlay.dispatch_clicks(), 1);

    assert_eq!(overlay.selected_feature_id(), Some(FeatureId::from("a")));
    assert!(overlay.has_pin());
    assert_eq!(
        events.try_recv().unwrap(),
        OverlayEvent::FeatureSelected(point("a", 10.0, 10.0))
    );
    assert!(events.try_recv().is_err());
}

#[tokio::test]
async fn test_click_on_unfolded_child_selects_that_leaf() {
    let overlay = overlay(host_with_cluster(10.0));
    commit(&overlay).await;
    let events = overlay.subscribe();

    overlay.with_marker(&FeatureId::from("12"), |m| {
        m.click(Some(FeatureId::from("def")))
    });
    overlay.dispatch_clicks();

    assert_eq!(overlay.selected_feature_id(), Some(FeatureId::from("def")));
    assert_eq!(overlay.selected_cluster_id(), Some(FeatureId::from("12")));
    assert_eq!(
        overlay.pin_placement().unwrap().offset(),
        child_offset(&overlay, "12", "def")
    );
    assert_eq!(
        events.try_recv().unwrap(),
        OverlayEvent::FeatureSelected(point("def", 1.2, 1.1))
    );
}

#[tokio::test]
async fn test_click_requests_the_frame_that_handles_it() {
    let overlay = overlay(host_with_cluster(10.0));
    commit(&overlay).await;
    let events = overlay.subscribe();
    let frames = overlay.host().frames_requested();

    overlay.with_marker(&FeatureId::from("a"), |m| m.click(None));
    overlay.with_marker(&FeatureId::from("a"), |m| m.click(None));
    assert_eq!(overlay.host().frames_requested(), frames + 1);

    assert!(matches!(overlay.on_frame().await, Ok(None)));
    assert_eq!(overlay.selected_feature_id(), Some(FeatureId::from("a")));
    assert!(overlay.has_pin());
    assert_eq!(
        events.try_recv().unwrap(),
        OverlayEvent::FeatureSelected(point("a", 10.0, 10.0))
    );

    overlay.with_marker(&FeatureId::from("12"), |m| {
        m.click(Some(FeatureId::from("def")))
    });
    assert_eq!(overlay.host().frames_requested(), frames + 2);
    overlay.on_frame().await.unwrap();
    assert_eq!(overlay.selected_feature_id(), Some(FeatureId::from("def")));
}

/// Ring layout that leaves out the child of one leaf
struct SkipLeaf(&'static str);

impl UnfoldedClusterRenderer for SkipLeaf {
    fn render(
        &self,
        cluster: &Feature,
        leaves: &[LeafRef<'_>],
        ctx: &RenderContext,
    ) -> MarkerElement {
        let mut element = CircleLayoutRenderer::default().render(cluster, leaves, ctx);
        element
            .children
            .retain(|child| child.feature_id.as_str() != self.0);
        element
    }
}

#[tokio::test]
async fn test_unfolded_cluster_without_the_selected_child() {
    init_logging();
    let options = MarkerOptions::from_json(&json!({ "unfolded_cluster_max_leaves": 2 })).unwrap();
    let renderers = Renderers::default().with_unfolded(SkipLeaf("abc"));
    let overlay =
        ClusterMarkers::new(host_with_cluster(10.0), SOURCE, options, renderers).unwrap();
    commit(&overlay).await;
    overlay.set_selected_feature(&abc()).unwrap();
    assert_eq!(overlay.host().live(PIN_CLASS), 1);

    overlay.host().set_zoom(17.0);
    overlay.handle_host_event(&HostEvent::ZoomEnd);
    let result = overlay.on_frame().await;

    assert!(matches!(
        result,
        Err(MarkerError::SelectedElementNotFound { ref cluster_id, ref feature_id })
            if cluster_id.as_str() == "12" && feature_id.as_str() == "abc"
    ));
    // markers are committed, only the pin is missing
    assert_eq!(
        overlay.representation_of(&FeatureId::from("12")),
        Some(Representation::Unfolded)
    );
    assert_eq!(overlay.host().live(UNFOLDED_CLASS), 1);
    assert_eq!(overlay.host().live(CLUSTER_CLASS), 0);
    assert_eq!(overlay.selected_feature_id(), Some(FeatureId::from("abc")));
    assert!(!overlay.has_pin());
    assert_eq!(overlay.host().live(PIN_CLASS), 0);

    overlay.host().set_zoom(10.0);
    let report = refresh(&overlay).await;

    assert!(report.pin_rerendered);
    assert_eq!(
        overlay.pin_placement().unwrap().coordinate(),
        LatLng::new(1.1, 1.0)
    );
    assert_eq!(overlay.selected_cluster_id(), Some(FeatureId::from("12")));
    assert_eq!(overlay.host().live(PIN_CLASS), 1);
}

#[tokio::test]
async fn test_clicks_on_removed_markers_are_ignored() {
    let overlay = overlay(host_with_cluster(10.0));
    commit(&overlay).await;

    overlay.with_marker(&FeatureId::from("a"), |m| m.click(None));
    overlay.host().show(vec![cluster_12()]);
    overlay.schedule();
    let outcome = overlay.run_cycle(overlay.generation()).await.unwrap();
    assert!(outcome.is_committed());
    assert_eq!(overlay.dispatch_clicks(), 1);

    assert!(overlay.selected_feature_id().is_none());
    assert!(!overlay.has_pin());
}

#[tokio::test]
async fn test_initial_selection_is_applied() {
    init_logging();
    let mut options = MarkerOptions::default();
    options.selected_feature = Some(abc());
    let overlay =
        ClusterMarkers::new(host_with_cluster(10.0), SOURCE, options, Renderers::default())
            .unwrap();

    assert_eq!(
        overlay.pin_placement(),
        Some(Placement::Point(LatLng::new(1.0, 1.0)))
    );

    let report = commit(&overlay).await;

    assert!(report.pin_rerendered);
    assert_eq!(overlay.selected_cluster_id(), Some(FeatureId::from("12")));
    assert_eq!(overlay.host().live(PIN_CLASS), 1);
}

use crate::core::config::RepresentationThresholds;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How a feature is drawn on screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Representation {
    /// A single point marker
    Plain,
    /// A cluster drawn as one aggregate badge
    Collapsed,
    /// A cluster drawn as its individual leaves around the cluster anchor
    Unfolded,
}

impl Representation {
    pub fn is_cluster(&self) -> bool {
        !matches!(self, Representation::Plain)
    }
}

impl fmt::Display for Representation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Representation::Plain => write!(f, "plain"),
            Representation::Collapsed => write!(f, "collapsed"),
            Representation::Unfolded => write!(f, "unfolded"),
        }
    }
}

/// Picks the representation of a feature.
///
/// `leaf_count` is `None` for non-cluster features. Clusters below
/// `cluster_min_zoom` stay collapsed; from there on they unfold when small
/// enough, and unconditionally from `cluster_max_zoom` up.
pub fn select_representation(
    zoom: f64,
    leaf_count: Option<usize>,
    thresholds: &RepresentationThresholds,
) -> Representation {
    let Some(leaf_count) = leaf_count else {
        return Representation::Plain;
    };

    if zoom < thresholds.cluster_min_zoom {
        return Representation::Collapsed;
    }

    if leaf_count <= thresholds.unfolded_cluster_max_leaves || zoom >= thresholds.cluster_max_zoom
    {
        Representation::Unfolded
    } else {
        Representation::Collapsed
    }
}

use crate::core::constants::{CLUSTER_PROPERTY, POINT_COUNT_PROPERTY};
use crate::core::geo::LatLng;
use crate::{MarkerError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// GeoJSON geometry types
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Geometry {
    Point {
        coordinates: [f64; 2],
    },
    LineString {
        coordinates: Vec<[f64; 2]>,
    },
    Polygon {
        coordinates: Vec<Vec<[f64; 2]>>,
    },
    MultiPoint {
        coordinates: Vec<[f64; 2]>,
    },
    MultiLineString {
        coordinates: Vec<Vec<[f64; 2]>>,
    },
    MultiPolygon {
        coordinates: Vec<Vec<Vec<[f64; 2]>>>,
    },
    GeometryCollection {
        geometries: Vec<Geometry>,
    },
}

impl Geometry {
    pub fn type_name(&self) -> &'static str {
        match self {
            Geometry::Point { .. } => "Point",
            Geometry::LineString { .. } => "LineString",
            Geometry::Polygon { .. } => "Polygon",
            Geometry::MultiPoint { .. } => "MultiPoint",
            Geometry::MultiLineString { .. } => "MultiLineString",
            Geometry::MultiPolygon { .. } => "MultiPolygon",
            Geometry::GeometryCollection { .. } => "GeometryCollection",
        }
    }
}

/// A feature as returned by the clustered source: either a cluster aggregate
/// or an individual point.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Feature {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(default)]
    pub geometry: Option<Geometry>,
    #[serde(default)]
    pub properties: Option<HashMap<String, Value>>,
}

impl Feature {
    /// Creates a point feature without id or properties
    pub fn point(coordinate: LatLng) -> Self {
        Self {
            id: None,
            geometry: Some(Geometry::Point {
                coordinates: coordinate.to_position(),
            }),
            properties: None,
        }
    }

    /// Creates a cluster feature the way clustering sources emit them
    pub fn cluster(engine_id: u64, coordinate: LatLng, point_count: usize) -> Self {
        Self::point(coordinate)
            .with_id(engine_id)
            .with_property(CLUSTER_PROPERTY, true)
            .with_property(POINT_COUNT_PROPERTY, point_count)
    }

    pub fn with_id(mut self, id: impl Into<Value>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_geometry(mut self, geometry: Geometry) -> Self {
        self.geometry = Some(geometry);
        self
    }

    pub fn with_property(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.properties
            .get_or_insert_with(HashMap::new)
            .insert(key.to_string(), value.into());
        self
    }

    pub fn property(&self, key: &str) -> Option<&Value> {
        self.properties.as_ref().and_then(|props| props.get(key))
    }

    /// Whether the source flagged this feature as a cluster
    pub fn is_cluster(&self) -> bool {
        match self.property(CLUSTER_PROPERTY) {
            Some(Value::Bool(flag)) => *flag,
            Some(Value::String(flag)) => flag == "true",
            _ => false,
        }
    }

    /// Number of points aggregated by a cluster
    pub fn point_count(&self) -> Option<usize> {
        match self.property(POINT_COUNT_PROPERTY)? {
            Value::Number(n) => n.as_u64().map(|n| n as usize),
            Value::String(s) => s.parse().ok(),
            _ => None,
        }
    }

    /// Numeric id assigned by the map engine, accepted as number or numeric string
    pub fn engine_id(&self) -> Option<u64> {
        match self.id.as_ref()? {
            Value::Number(n) => n.as_u64(),
            Value::String(s) => s.parse().ok(),
            _ => None,
        }
    }

    /// Coordinate of a Point feature
    pub fn coordinate(&self) -> Option<LatLng> {
        match self.geometry.as_ref()? {
            Geometry::Point { coordinates } => Some(LatLng::from_position(*coordinates)),
            _ => None,
        }
    }

    /// Like [`Feature::coordinate`] but reports what was found instead
    pub fn require_point(&self) -> Result<LatLng> {
        self.coordinate().ok_or_else(|| MarkerError::UnsupportedGeometry {
            geometry: self
                .geometry
                .as_ref()
                .map(Geometry::type_name)
                .unwrap_or("none")
                .to_string(),
        })
    }
}

/// Root GeoJSON object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GeoJson {
    Feature(Feature),
    FeatureCollection { features: Vec<Feature> },
}

impl GeoJson {
    /// Parses a Feature or FeatureCollection document
    pub fn parse(geojson_str: &str) -> Result<Self> {
        Ok(serde_json::from_str(geojson_str)?)
    }

    pub fn into_features(self) -> Vec<Feature> {
        match self {
            GeoJson::Feature(feature) => vec![feature],
            GeoJson::FeatureCollection { features } => features,
        }
    }
}

//! Stable identities for source features.
//!
//! The same underlying point must map to the same [`FeatureId`] whether it is
//! drawn as a plain marker, as a child of an unfolded cluster or not at all,
//! so resolution only looks at the feature itself and never at cycle state.

use crate::core::constants::{
    DEFAULT_ID_PROPERTY, DEFAULT_METADATA_ID_FIELD, DEFAULT_METADATA_PROPERTY, UNKNOWN_FEATURE_ID,
};
use crate::data::geojson::Feature;
use crate::{MarkerError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::borrow::Borrow;
use std::fmt;

/// Canonical string identity of a feature or cluster
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureId(String);

impl FeatureId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Identity of a cluster, derived from the engine's numeric id
    pub fn from_engine_id(engine_id: u64) -> Self {
        Self(engine_id.to_string())
    }

    /// Sentinel used when no identifier could be resolved
    pub fn unknown() -> Self {
        Self(UNKNOWN_FEATURE_ID.to_string())
    }

    pub fn is_unknown(&self) -> bool {
        self.0 == UNKNOWN_FEATURE_ID
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FeatureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FeatureId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for FeatureId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl Borrow<str> for FeatureId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Where identifiers live inside feature properties
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentityOptions {
    /// Property holding the embedded metadata (JSON text or object)
    pub metadata_property: String,
    /// Identifier field inside the metadata
    pub metadata_id_field: String,
    /// Plain identifier property
    pub id_property: String,
}

impl Default for IdentityOptions {
    fn default() -> Self {
        Self {
            metadata_property: DEFAULT_METADATA_PROPERTY.to_string(),
            metadata_id_field: DEFAULT_METADATA_ID_FIELD.to_string(),
            id_property: DEFAULT_ID_PROPERTY.to_string(),
        }
    }
}

/// Resolves [`FeatureId`]s.
///
/// Precedence for points: metadata identifier, then the plain `id`
/// property, then the feature's own id, then the `"unknown"` sentinel.
/// Clusters always use the engine id.
#[derive(Debug, Clone, Default)]
pub struct FeatureIdentity {
    options: IdentityOptions,
}

impl FeatureIdentity {
    pub fn new(options: IdentityOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &IdentityOptions {
        &self.options
    }

    /// Identity of any feature. Fails only for a cluster without engine id.
    pub fn identity_of(&self, feature: &Feature) -> Result<FeatureId> {
        if feature.is_cluster() {
            return feature
                .engine_id()
                .map(FeatureId::from_engine_id)
                .ok_or(MarkerError::MissingClusterId);
        }
        Ok(self.point_identity(feature))
    }

    /// Whether `feature` resolves to `id`
    pub fn matches(&self, feature: &Feature, id: &FeatureId) -> bool {
        matches!(self.identity_of(feature), Ok(ref resolved) if resolved == id)
    }

    fn point_identity(&self, feature: &Feature) -> FeatureId {
        self.metadata_identity(feature)
            .or_else(|| {
                feature
                    .property(&self.options.id_property)
                    .and_then(scalar_id)
            })
            .or_else(|| feature.id.as_ref().and_then(scalar_id))
            .unwrap_or_else(FeatureId::unknown)
    }

    fn metadata_identity(&self, feature: &Feature) -> Option<FeatureId> {
        let blob = feature.property(&self.options.metadata_property)?;
        let field = &self.options.metadata_id_field;
        match blob {
            Value::String(raw) => match serde_json::from_str::<Value>(raw) {
                Ok(parsed) => parsed.get(field).and_then(scalar_id),
                Err(e) => {
                    log::debug!("unreadable metadata on feature, falling back: {}", e);
                    None
                }
            },
            Value::Object(map) => map.get(field).and_then(scalar_id),
            _ => None,
        }
    }
}

fn scalar_id(value: &Value) -> Option<FeatureId> {
    match value {
        Value::String(s) if !s.is_empty() => Some(FeatureId::new(s.as_str())),
        Value::Number(n) => Some(FeatureId::new(n.to_string())),
        _ => None,
    }
}

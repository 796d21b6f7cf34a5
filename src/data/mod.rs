pub mod geojson;
pub mod identity;

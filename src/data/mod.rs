pub mod features;
pub mod geojson;
pub mod ingest;
pub mod style;

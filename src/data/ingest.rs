//! Record normalization for loosely-shaped input.
//!
//! Records are JSON objects whose coordinate fields may go by several
//! names. These functions resolve the aliases, coerce the numbers and split
//! the remaining keys off as properties.

use crate::core::geo::LatLng;
use crate::data::features::Properties;
use crate::MapError;
use serde_json::Value;

const LAT_KEYS: [&str; 3] = ["lat", "latitude", "y"];
const LNG_KEYS: [&str; 4] = ["lng", "longitude", "lon", "x"];
const LINE_KEYS: [&str; 4] = ["coords", "coordinates", "path", "latlngs"];
const POLYGON_KEYS: [&str; 4] = ["coords", "coordinates", "ring", "latlngs"];

fn invalid(msg: impl Into<String>) -> MapError {
    MapError::InvalidFeature(msg.into())
}

fn as_object(record: &Value) -> Result<&Properties, MapError> {
    record
        .as_object()
        .ok_or_else(|| invalid("record is not an object"))
}

/// Accepts JSON numbers and numeric strings
fn coerce_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// First non-null value among `keys`
fn first_present<'a>(object: &'a Properties, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|k| object.get(*k))
        .find(|v| !v.is_null())
}

/// First value among `keys` that is a non-empty array
fn first_list<'a>(object: &'a Properties, keys: &[&str]) -> Option<&'a Vec<Value>> {
    keys.iter()
        .filter_map(|k| object.get(*k))
        .filter_map(Value::as_array)
        .find(|a| !a.is_empty())
}

fn properties_without(object: &Properties, excluded: &[&str]) -> Properties {
    object
        .iter()
        .filter(|(k, _)| !excluded.contains(&k.as_str()))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}

fn lat_lng_of(object: &Properties) -> Option<LatLng> {
    let lat = first_present(object, &LAT_KEYS).and_then(coerce_number)?;
    let lng = first_present(object, &LNG_KEYS).and_then(coerce_number)?;
    Some(LatLng::new(lat, lng))
}

/// One coordinate entry: `[lat, lng]` or an object with lat/lng aliases.
///
/// Entries that cannot be read become `(0, 0)` so that vertex positions in
/// the rest of the sequence are preserved.
fn position(entry: &Value) -> LatLng {
    let parsed = match entry {
        Value::Array(pair) => {
            let lat = pair.first().and_then(coerce_number);
            let lng = pair.get(1).and_then(coerce_number);
            lat.zip(lng).map(|(lat, lng)| LatLng::new(lat, lng))
        }
        Value::Object(object) => lat_lng_of(object),
        _ => None,
    };
    parsed.unwrap_or_default()
}

fn positions(entries: &[Value]) -> Vec<LatLng> {
    entries.iter().map(position).collect()
}

/// Normalizes a point record.
///
/// Latitude is the first non-null of `lat`, `latitude`, `y`; longitude of
/// `lng`, `longitude`, `lon`, `x`. Every other key becomes a property.
pub fn point_record(record: &Value) -> Result<(LatLng, Properties), MapError> {
    let object = as_object(record)?;
    let position =
        lat_lng_of(object).ok_or_else(|| invalid("point missing lat/lng coordinates"))?;
    let mut excluded = LAT_KEYS.to_vec();
    excluded.extend(LNG_KEYS);
    Ok((position, properties_without(object, &excluded)))
}

/// Normalizes a line record.
///
/// Coordinates come from the first non-empty of `coords`, `coordinates`,
/// `path`, `latlngs` and must hold at least two entries.
pub fn line_record(record: &Value) -> Result<(Vec<LatLng>, Properties), MapError> {
    let object = as_object(record)?;
    let coords = first_list(object, &LINE_KEYS)
        .filter(|c| c.len() >= 2)
        .ok_or_else(|| invalid("line needs at least 2 coordinates"))?;
    Ok((positions(coords), properties_without(object, &LINE_KEYS)))
}

/// Normalizes a polygon record.
///
/// Coordinates come from the first non-empty of `coords`, `coordinates`,
/// `ring`, `latlngs`. When the first entry is itself a list of positions the
/// value is read as a list of rings, otherwise as a single ring. Rings with
/// fewer than three positions are dropped.
pub fn polygon_record(record: &Value) -> Result<(Vec<Vec<LatLng>>, Properties), MapError> {
    let object = as_object(record)?;
    let coords = first_list(object, &POLYGON_KEYS)
        .ok_or_else(|| invalid("polygon missing coordinates"))?;

    let multi_ring = coords
        .first()
        .and_then(Value::as_array)
        .and_then(|ring| ring.first())
        .map_or(false, Value::is_array);

    let rings: Vec<Vec<LatLng>> = if multi_ring {
        coords
            .iter()
            .filter_map(Value::as_array)
            .filter(|ring| ring.len() >= 3)
            .map(|ring| positions(ring))
            .collect()
    } else if coords.len() >= 3 {
        vec![positions(coords)]
    } else {
        Vec::new()
    };

    if rings.is_empty() {
        return Err(invalid("polygon has no ring with at least 3 positions"));
    }
    Ok((rings, properties_without(object, &POLYGON_KEYS)))
}

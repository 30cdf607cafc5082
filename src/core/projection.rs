//! Spherical Web Mercator transforms between geographic and pixel space.
//!
//! Nothing here is cached: the view's center and zoom change continuously
//! during interaction, so every call recomputes from the view it is given.

use crate::core::{
    constants::TILE_SIZE,
    geo::{LatLng, Point},
    viewport::Viewport,
};
use std::f64::consts::PI;

/// Width (and height) of the whole world in pixels at `zoom`
pub fn world_size(zoom: f64) -> f64 {
    2_f64.powf(zoom) * TILE_SIZE
}

/// Projects a coordinate to world pixels at `zoom`
pub fn project(lat_lng: &LatLng, zoom: f64) -> Point {
    let scale = world_size(zoom);
    let x = (lat_lng.lng + 180.0) / 360.0 * scale;
    let lat_rad = lat_lng.lat.to_radians();
    let y = (1.0 - (lat_rad.tan() + 1.0 / lat_rad.cos()).ln() / PI) / 2.0 * scale;
    Point::new(x, y)
}

/// Inverse of [`project`]
pub fn unproject(world: &Point, zoom: f64) -> LatLng {
    let scale = world_size(zoom);
    let lng = world.x / scale * 360.0 - 180.0;
    let lat = (PI - 2.0 * PI * world.y / scale).sinh().atan().to_degrees();
    LatLng::new(lat, lng)
}

/// Converts a coordinate to a pixel relative to the view's top-left corner
pub fn geo_to_pixel(lat_lng: &LatLng, view: &Viewport) -> Point {
    let world = project(lat_lng, view.zoom);
    let center = project(&view.center, view.zoom);
    Point::new(
        world.x - center.x + view.size.x / 2.0,
        world.y - center.y + view.size.y / 2.0,
    )
}

/// Converts a view pixel back to a coordinate; exact inverse of [`geo_to_pixel`]
pub fn pixel_to_geo(pixel: &Point, view: &Viewport) -> LatLng {
    let center = project(&view.center, view.zoom);
    let world = Point::new(
        pixel.x + center.x - view.size.x / 2.0,
        pixel.y + center.y - view.size.y / 2.0,
    );
    unproject(&world, view.zoom)
}

/// View center that places `lat_lng` at `pixel` for a view of the given zoom and size
pub fn center_for_anchor(lat_lng: &LatLng, pixel: &Point, zoom: f64, size: &Point) -> LatLng {
    let world = project(lat_lng, zoom);
    let center_world = Point::new(
        world.x - pixel.x + size.x / 2.0,
        world.y - pixel.y + size.y / 2.0,
    );
    unproject(&center_world, zoom)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view(lat: f64, lng: f64, zoom: f64) -> Viewport {
        Viewport::new(LatLng::new(lat, lng), zoom, Point::new(800.0, 600.0))
    }

    #[test]
    fn test_center_maps_to_middle_of_view() {
        let v = view(37.77, -122.42, 12.0);
        let pixel = geo_to_pixel(&v.center, &v);
        assert!((pixel.x - 400.0).abs() < 1e-9);
        assert!((pixel.y - 300.0).abs() < 1e-9);
    }

    #[test]
    fn test_world_origin_at_zoom_one() {
        let origin = project(&LatLng::new(0.0, -180.0), 1.0);
        assert!(origin.x.abs() < 1e-9);
        assert!((origin.y - 256.0).abs() < 1e-9);
    }

    #[test]
    fn test_round_trip_grid() {
        for &zoom in &[1.0, 3.5, 10.0, 17.25, 20.0] {
            let v = view(12.0, 45.0, zoom);
            for &lat in &[-84.9, -45.0, 0.0, 33.3, 84.9] {
                for &lng in &[-179.9, -90.0, 0.0, 44.9, 179.9] {
                    let coord = LatLng::new(lat, lng);
                    let back = pixel_to_geo(&geo_to_pixel(&coord, &v), &v);
                    assert!((back.lat - lat).abs() < 1e-6, "lat {lat} at zoom {zoom}");
                    assert!((back.lng - lng).abs() < 1e-6, "lng {lng} at zoom {zoom}");
                }
            }
        }
    }

    #[test]
    fn test_center_for_anchor_places_coordinate() {
        let size = Point::new(640.0, 480.0);
        let target = LatLng::new(48.85, 2.35);
        let pixel = Point::new(100.0, 50.0);
        let center = center_for_anchor(&target, &pixel, 9.0, &size);
        let v = Viewport::new(center, 9.0, size);
        let placed = geo_to_pixel(&target, &v);
        assert!((placed.x - pixel.x).abs() < 1e-6);
        assert!((placed.y - pixel.y).abs() < 1e-6);
    }
}

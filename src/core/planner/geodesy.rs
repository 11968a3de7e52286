use crate::domain::models::GeoPoint;

/// Mean Earth radius used by web map libraries for their distance primitive.
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Haversine great-circle distance in meters.
pub fn compute_distance(a: GeoPoint, b: GeoPoint) -> f64 {
    let rad = std::f64::consts::PI / 180.0;
    let lat1 = a.lat * rad;
    let lat2 = b.lat * rad;
    let sin_d_lat = ((b.lat - a.lat) * rad / 2.0).sin();
    let sin_d_lng = ((b.lng - a.lng) * rad / 2.0).sin();
    let h = sin_d_lat * sin_d_lat + lat1.cos() * lat2.cos() * sin_d_lng * sin_d_lng;
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    EARTH_RADIUS_METERS * c
}

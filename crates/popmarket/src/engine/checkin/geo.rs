use super::config::CheckinConfig;
use super::domain::GeoPoint;

const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Great-circle distance in meters between two WGS84 points.
pub(crate) fn haversine_distance_m(a: &GeoPoint, b: &GeoPoint) -> f64 {
    let lat_a = a.latitude.to_radians();
    let lat_b = b.latitude.to_radians();
    let d_lat = (b.latitude - a.latitude).to_radians();
    let d_lon = (b.longitude - a.longitude).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat_a.cos() * lat_b.cos() * (d_lon / 2.0).sin().powi(2);

    2.0 * EARTH_RADIUS_M * h.sqrt().asin()
}

pub(crate) struct GeoScore {
    pub score: u8,
    pub distance_m: Option<f64>,
}

/// Maps distance-to-site and reading accuracy into a 0-100 confidence score.
///
/// A missing location scores zero without penalizing the other channels. Coarse
/// readings cap the achievable score: a device that cannot place itself within the
/// venue radius cannot claim full GPS confidence.
pub(crate) fn score_location(
    site: &GeoPoint,
    visitor: Option<&GeoPoint>,
    accuracy_m: Option<f64>,
    config: &CheckinConfig,
) -> GeoScore {
    let Some(visitor) = visitor else {
        return GeoScore {
            score: 0,
            distance_m: None,
        };
    };

    let distance = haversine_distance_m(site, visitor);

    let raw = if distance <= config.full_score_radius_m {
        100.0
    } else if distance >= config.max_radius_m {
        0.0
    } else {
        100.0 * (config.max_radius_m - distance)
            / (config.max_radius_m - config.full_score_radius_m)
    };

    let cap = accuracy_cap(accuracy_m, config);
    let score = (raw.round() as u8).min(cap);

    GeoScore {
        score,
        distance_m: Some(distance),
    }
}

fn accuracy_cap(accuracy_m: Option<f64>, config: &CheckinConfig) -> u8 {
    match accuracy_m {
        None => 100,
        Some(accuracy) if accuracy <= config.fine_accuracy_m => 100,
        Some(accuracy) if accuracy <= config.coarse_accuracy_m => config.coarse_cap,
        Some(accuracy) if accuracy <= config.poor_accuracy_m => config.poor_cap,
        Some(_) => config.floor_cap,
    }
}

//! Inverse transverse-Mercator conversion for the shelter dataset, which
//! ships its coordinates as UTM zone 33 (EPSG:25833) eastings/northings.

const WGS84_A: f64 = 6_378_137.0;
const WGS84_F: f64 = 1.0 / 298.257_223_563;
const K0: f64 = 0.9996;
const FALSE_EASTING: f64 = 500_000.0;

/// The zone covering mainland Norway in the national datasets.
pub const NORWAY_ZONE: u8 = 33;

/// Converts a northern-hemisphere UTM coordinate to WGS84 (latitude,
/// longitude) in degrees.
#[must_use]
pub fn utm_to_wgs84(zone: u8, easting: f64, northing: f64) -> (f64, f64) {
    let e2 = WGS84_F * (2.0 - WGS84_F);
    let e1 = (1.0 - (1.0 - e2).sqrt()) / (1.0 + (1.0 - e2).sqrt());
    let ep2 = e2 / (1.0 - e2);

    let x = easting - FALSE_EASTING;
    let m = northing / K0;
    let mu = m / (WGS84_A
        * (1.0 - e2 / 4.0 - 3.0 * e2 * e2 / 64.0 - 5.0 * e2 * e2 * e2 / 256.0));

    // Footpoint latitude
    let phi1 = mu
        + (3.0 * e1 / 2.0 - 27.0 * e1.powi(3) / 32.0) * (2.0 * mu).sin()
        + (21.0 * e1 * e1 / 16.0 - 55.0 * e1.powi(4) / 32.0) * (4.0 * mu).sin()
        + (151.0 * e1.powi(3) / 96.0) * (6.0 * mu).sin()
        + (1097.0 * e1.powi(4) / 512.0) * (8.0 * mu).sin();

    let sin_phi1 = phi1.sin();
    let cos_phi1 = phi1.cos();
    let tan_phi1 = phi1.tan();

    let c1 = ep2 * cos_phi1 * cos_phi1;
    let t1 = tan_phi1 * tan_phi1;
    let n1 = WGS84_A / (1.0 - e2 * sin_phi1 * sin_phi1).sqrt();
    let r1 = WGS84_A * (1.0 - e2) / (1.0 - e2 * sin_phi1 * sin_phi1).powf(1.5);
    let d = x / (n1 * K0);

    let lat = phi1
        - (n1 * tan_phi1 / r1)
            * (d * d / 2.0
                - (5.0 + 3.0 * t1 + 10.0 * c1 - 4.0 * c1 * c1 - 9.0 * ep2) * d.powi(4) / 24.0
                + (61.0 + 90.0 * t1 + 298.0 * c1 + 45.0 * t1 * t1 - 252.0 * ep2 - 3.0 * c1 * c1)
                    * d.powi(6)
                    / 720.0);

    let lon_origin = f64::from(zone).mul_add(6.0, -183.0);
    let lon = lon_origin.to_radians()
        + (d - (1.0 + 2.0 * t1 + c1) * d.powi(3) / 6.0
            + (5.0 - 2.0 * c1 + 28.0 * t1 - 3.0 * c1 * c1 + 8.0 * ep2 + 24.0 * t1 * t1)
                * d.powi(5)
                / 120.0)
            / cos_phi1;

    (lat.to_degrees(), lon.to_degrees())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equator_on_central_meridian() {
        let (lat, lon) = utm_to_wgs84(NORWAY_ZONE, 500_000.0, 0.0);
        assert!(lat.abs() < 1e-9, "lat was {lat}");
        assert!((lon - 15.0).abs() < 1e-9, "lon was {lon}");
    }

    #[test]
    fn test_central_meridian_holds_at_any_northing() {
        for northing in [1_000_000.0, 4_500_000.0, 6_650_000.0, 7_800_000.0] {
            let (_, lon) = utm_to_wgs84(NORWAY_ZONE, 500_000.0, northing);
            assert!((lon - 15.0).abs() < 1e-6, "lon was {lon} at {northing}");
        }
    }

    #[test]
    fn test_southern_norway_range() {
        // Roughly central Oslo in EPSG:25833.
        let (lat, lon) = utm_to_wgs84(NORWAY_ZONE, 262_000.0, 6_650_000.0);
        assert!((59.0..61.0).contains(&lat), "lat was {lat}");
        assert!((10.0..12.0).contains(&lon), "lon was {lon}");
    }

    #[test]
    fn test_west_of_central_meridian_gives_smaller_longitude() {
        let (_, west) = utm_to_wgs84(NORWAY_ZONE, 300_000.0, 6_650_000.0);
        let (_, east) = utm_to_wgs84(NORWAY_ZONE, 600_000.0, 6_650_000.0);
        assert!(west < 15.0);
        assert!(east > 15.0);
    }

    #[test]
    fn test_northing_increases_latitude() {
        let (south, _) = utm_to_wgs84(NORWAY_ZONE, 400_000.0, 6_500_000.0);
        let (north, _) = utm_to_wgs84(NORWAY_ZONE, 400_000.0, 7_500_000.0);
        assert!(north > south);
    }
}

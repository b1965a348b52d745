//! # Geodetic ↔ geocentric conversion
//!
//! The spherical-harmonic expansion is evaluated on a **sphere**, whereas query
//! positions are given on the **WGS-84 ellipsoid** (geodetic latitude, height above
//! the ellipsoid). This module converts between both descriptions and carries the
//! angle δ between the geodetic and geocentric verticals, needed to rotate the
//! synthesized field back to the local geodetic North/East/Down frame.
//!
//! ## Conventions
//!
//! - Colatitudes in **degrees**, in `[0, 180]`.
//! - Heights and radii in **kilometers**; negative heights (below the ellipsoid) are valid.
//! - [`geodetic_to_geocentric`](crate::geodesy::geodetic_to_geocentric) is closed-form and
//!   used on every query; [`geocentric_to_geodetic`](crate::geodesy::geocentric_to_geodetic)
//!   is the inverse (Vermeille / Zhu closed form) kept for checks and tooling.
use nalgebra::{Matrix3, Vector3};

use crate::constants::{Degree, Kilometer, WGS84_EQUATORIAL_RADIUS, WGS84_POLAR_RADIUS};

/// Position on the geocentric sphere plus the geodetic ↔ geocentric rotation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeocentricCoordinates {
    /// Distance to the Earth center, in kilometers.
    pub radius: Kilometer,
    /// Geocentric colatitude, in degrees.
    pub colatitude: Degree,
    /// sin δ, δ being the geodetic minus geocentric latitude.
    pub sin_delta: f64,
    /// cos δ.
    pub cos_delta: f64,
}

/// Position relative to the WGS-84 ellipsoid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeodeticCoordinates {
    /// Height above the ellipsoid, in kilometers.
    pub height: Kilometer,
    /// Geodetic colatitude, in degrees.
    pub colatitude: Degree,
}

impl GeocentricCoordinates {
    /// Rotation taking a (North, East, Down) vector from the geocentric frame to the
    /// geodetic frame.
    ///
    /// The East component is untouched:
    ///
    /// ```text
    /// X_gd = X·cos δ + Z·sin δ
    /// Y_gd = Y
    /// Z_gd = Z·cos δ − X·sin δ
    /// ```
    pub fn geodetic_rotation(&self) -> Matrix3<f64> {
        let (sd, cd) = (self.sin_delta, self.cos_delta);
        Matrix3::new(cd, 0.0, sd, 0.0, 1.0, 0.0, -sd, 0.0, cd)
    }

    /// Rotate a geocentric (North, East, Down) vector into the geodetic frame.
    pub fn rotate_to_geodetic(&self, north_east_down: &Vector3<f64>) -> Vector3<f64> {
        self.geodetic_rotation() * north_east_down
    }
}

/// Convert a geodetic position into geocentric spherical coordinates.
///
/// Arguments
/// ---------
/// * `height`: height above the WGS-84 ellipsoid in **kilometers** (may be negative).
/// * `geodetic_colatitude`: `90° − geodetic latitude`, in **degrees**.
///
/// Returns
/// -------
/// * [`GeocentricCoordinates`] with the geocentric radius, colatitude and the
///   sine/cosine of the vertical deflection δ.
///
/// Details
/// -------
/// With `ρ² = a²·sin²θ + b²·cos²θ` (θ the geodetic colatitude):
///
/// ```text
/// r²    = h·(h + 2ρ) + (a⁴·sin²θ + b⁴·cos²θ) / ρ²
/// cos δ = (h + ρ) / r
/// sin δ = (a² − b²)·cosθ·sinθ / (ρ·r)
/// ```
///
/// The geocentric colatitude is `acos(cosθ·cos δ − sinθ·sin δ)`, the cosine being
/// clamped to `[-1, 1]`. Geodetic colatitudes of exactly 0° and 180° are returned
/// unchanged so that pole queries reach the polar branch of the synthesis.
pub fn geodetic_to_geocentric(
    height: Kilometer,
    geodetic_colatitude: Degree,
) -> GeocentricCoordinates {
    let a2 = WGS84_EQUATORIAL_RADIUS * WGS84_EQUATORIAL_RADIUS;
    let b2 = WGS84_POLAR_RADIUS * WGS84_POLAR_RADIUS;
    let a4 = a2 * a2;
    let b4 = b2 * b2;

    let (stgd, ctgd) = geodetic_colatitude.to_radians().sin_cos();
    let c2 = ctgd * ctgd;
    let s2 = 1.0 - c2;

    let rho = (a2 * s2 + b2 * c2).sqrt();
    let radius = (height * (height + 2.0 * rho) + (a4 * s2 + b4 * c2) / (rho * rho)).sqrt();

    let cos_delta = (height + rho) / radius;
    let sin_delta = (a2 - b2) * ctgd * stgd / (rho * radius);

    // both poles lie on the rotation axis, where the two colatitudes agree
    let colatitude = if geodetic_colatitude == 0.0 || geodetic_colatitude == 180.0 {
        geodetic_colatitude
    } else {
        (ctgd * cos_delta - stgd * sin_delta)
            .clamp(-1.0, 1.0)
            .acos()
            .to_degrees()
    };

    GeocentricCoordinates {
        radius,
        colatitude,
        sin_delta,
        cos_delta,
    }
}

/// Convert geocentric spherical coordinates back onto the WGS-84 ellipsoid.
///
/// Closed-form solution of the ellipsoidal height problem (Zhu 1993 /
/// Vermeille 2002); no iteration is needed.
///
/// Arguments
/// ---------
/// * `radius`: geocentric distance in **kilometers**.
/// * `colatitude`: geocentric colatitude in **degrees**.
///
/// Returns
/// -------
/// * [`GeodeticCoordinates`]: height above the ellipsoid and geodetic colatitude.
pub fn geocentric_to_geodetic(radius: Kilometer, colatitude: Degree) -> GeodeticCoordinates {
    let a = WGS84_EQUATORIAL_RADIUS;
    let a2 = a * a;
    let b2 = WGS84_POLAR_RADIUS * WGS84_POLAR_RADIUS;

    let e2 = (a2 - b2) / a2;
    let e4 = e2 * e2;
    let ep2 = (a2 - b2) / b2;

    let (sin_theta, cos_theta) = colatitude.to_radians().sin_cos();
    let r = radius * sin_theta;
    let z = radius * cos_theta;
    let r2 = r * r;
    let z2 = z * z;

    let f = 54.0 * b2 * z2;
    let g = r2 + (1.0 - e2) * z2 - e2 * (a2 - b2);
    let c = e4 * f * r2 / (g * g * g);
    let s = (1.0 + c + (c * c + 2.0 * c).sqrt()).cbrt();
    let p = f / (3.0 * (s + 1.0 / s + 1.0).powi(2) * g * g);
    let q = (1.0 + 2.0 * e4 * p).sqrt();

    // rounding can push the radicand slightly below zero on the polar axis
    let radicand =
        0.5 * a2 * (1.0 + 1.0 / q) - p * (1.0 - e2) * z2 / (q * (1.0 + q)) - 0.5 * p * r2;
    let r0 = -p * e2 * r / (1.0 + q) + radicand.max(0.0).sqrt();

    let u = ((r - e2 * r0).powi(2) + z2).sqrt();
    let v = ((r - e2 * r0).powi(2) + (1.0 - e2) * z2).sqrt();
    let z0 = b2 * z / (a * v);

    GeodeticCoordinates {
        height: u * (1.0 - b2 / (a * v)),
        colatitude: 90.0 - (z + ep2 * z0).atan2(r).to_degrees(),
    }
}

#[cfg(test)]
mod geodesy_test {
    use approx::assert_abs_diff_eq;
    use rand::{rngs::StdRng, Rng, SeedableRng};

    use super::*;

    #[test]
    fn test_equator_sea_level() {
        let geo = geodetic_to_geocentric(0.0, 90.0);
        assert_abs_diff_eq!(geo.radius, WGS84_EQUATORIAL_RADIUS, epsilon = 1e-9);
        assert_abs_diff_eq!(geo.colatitude, 90.0, epsilon = 1e-12);
        assert_abs_diff_eq!(geo.sin_delta, 0.0, epsilon = 1e-15);
        assert_abs_diff_eq!(geo.cos_delta, 1.0, epsilon = 1e-15);
    }

    #[test]
    fn test_poles_map_onto_poles() {
        let north = geodetic_to_geocentric(0.0, 0.0);
        assert_eq!(north.colatitude, 0.0);
        assert_abs_diff_eq!(north.radius, WGS84_POLAR_RADIUS, epsilon = 1e-9);

        let south = geodetic_to_geocentric(-0.09, 180.0);
        assert_eq!(south.colatitude, 180.0);
        assert_abs_diff_eq!(south.radius, WGS84_POLAR_RADIUS - 0.09, epsilon = 1e-9);
    }

    #[test]
    fn test_mid_latitude_deflection() {
        // geocentric latitude is closer to the equator than the geodetic one
        let geo = geodetic_to_geocentric(2.55, 90.0 - 46.1912);
        assert!(geo.colatitude > 90.0 - 46.1912);
        assert!(geo.sin_delta > 0.0);
        assert_abs_diff_eq!(
            geo.sin_delta * geo.sin_delta + geo.cos_delta * geo.cos_delta,
            1.0,
            epsilon = 1e-12
        );
        // deflection of the vertical stays below 0.2°
        assert!(geo.sin_delta.asin().to_degrees() < 0.2);
    }

    #[test]
    fn test_rotation_keeps_east_and_norm() {
        let geo = geodetic_to_geocentric(1.0, 50.0);
        let v = Vector3::new(20000.0, 5000.0, 45000.0);
        let rotated = geo.rotate_to_geodetic(&v);
        assert_eq!(rotated.y, v.y);
        assert_abs_diff_eq!(rotated.norm(), v.norm(), epsilon = 1e-8);
        assert_abs_diff_eq!(
            rotated.x,
            v.x * geo.cos_delta + v.z * geo.sin_delta,
            epsilon = 1e-9
        );
        assert_abs_diff_eq!(
            rotated.z,
            v.z * geo.cos_delta - v.x * geo.sin_delta,
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_round_trip_known_points() {
        for &(height, colatitude) in &[
            (0.0, 0.0),
            (-0.09, 180.0),
            (-0.09, 90.0 - 36.250278),
            (8.52, 90.0 - 27.9617),
            (400.0, 123.4),
            (0.0, 0.001),
        ] {
            let geo = geodetic_to_geocentric(height, colatitude);
            let back = geocentric_to_geodetic(geo.radius, geo.colatitude);
            assert_abs_diff_eq!(back.height, height, epsilon = 1e-6);
            assert_abs_diff_eq!(back.colatitude, colatitude, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_round_trip_random() {
        let mut rng = StdRng::seed_from_u64(42_u64);
        for _ in 0..10_000 {
            let height = rng.random_range(-10.0..1000.0);
            let colatitude = rng.random_range(0.0..=180.0);
            let geo = geodetic_to_geocentric(height, colatitude);
            let back = geocentric_to_geodetic(geo.radius, geo.colatitude);
            assert_abs_diff_eq!(back.height, height, epsilon = 1e-6);
            assert_abs_diff_eq!(back.colatitude, colatitude, epsilon = 1e-6);
        }
    }
}

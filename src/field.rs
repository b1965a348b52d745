//! Derived magnetic elements.
//!
//! From the geodetic North (X), East (Y) and Down (Z) components:
//!
//! ```text
//! H = √(X² + Y²)      F = √(H² + Z²)
//! D = atan2(Y, X)     I = atan2(Z, H)
//! ```
//!
//! and their time derivatives given the rate vector `(Ẋ, Ẏ, Ż)`. Angles are
//! returned in degrees, angle rates in arc-minutes per year.
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::constants::{ArcMinute, Degree, NanoTesla, ARCMIN_PER_DEGREE};

/// Declination, inclination, horizontal and total intensity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FieldElements {
    pub declination: Degree,
    pub inclination: Degree,
    pub horizontal_intensity: NanoTesla,
    pub total_intensity: NanoTesla,
}

/// Yearly rates of [`FieldElements`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FieldElementsRate {
    /// arc-minutes / year
    pub declination: ArcMinute,
    /// arc-minutes / year
    pub inclination: ArcMinute,
    /// nT / year
    pub horizontal_intensity: NanoTesla,
    /// nT / year
    pub total_intensity: NanoTesla,
}

/// Sign convention of the declination and inclination rates.
///
/// `Implemented` is the analytic derivative of `atan2`, it reproduces the BGS
/// IGRF calculator. `Alternate` negates both angle rates and is kept for
/// comparisons against sources using the opposite convention. Intensity rates
/// are the same under both conventions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SvSignConvention {
    #[default]
    Implemented,
    Alternate,
}

/// Compute D, I, H, F from a North/East/Down field vector in nT.
pub fn xyz_to_dhif(xyz: &Vector3<f64>) -> FieldElements {
    let (x, y, z) = (xyz.x, xyz.y, xyz.z);
    let horizontal_intensity = x.hypot(y);

    FieldElements {
        declination: y.atan2(x).to_degrees(),
        inclination: z.atan2(horizontal_intensity).to_degrees(),
        horizontal_intensity,
        total_intensity: horizontal_intensity.hypot(z),
    }
}

/// Rates of D, I, H, F given the field vector and its yearly rate, using
/// [`SvSignConvention::Implemented`].
///
/// Arguments
/// -----------------
/// * `xyz`: North/East/Down field, nT.
/// * `xyz_rate`: North/East/Down rate at the same epoch, nT/year.
///
/// Return
/// ----------
/// * Declination and inclination rates in arc-minutes/year, intensity rates
///   in nT/year. A purely vertical field (`H = 0`) has no defined declination
///   and yields non-finite angle rates.
pub fn xyz_to_dhif_sv(xyz: &Vector3<f64>, xyz_rate: &Vector3<f64>) -> FieldElementsRate {
    xyz_to_dhif_sv_with_convention(xyz, xyz_rate, SvSignConvention::Implemented)
}

/// Same as [`xyz_to_dhif_sv`] with an explicit sign convention.
pub fn xyz_to_dhif_sv_with_convention(
    xyz: &Vector3<f64>,
    xyz_rate: &Vector3<f64>,
    convention: SvSignConvention,
) -> FieldElementsRate {
    let (x, y, z) = (xyz.x, xyz.y, xyz.z);
    let (xd, yd, zd) = (xyz_rate.x, xyz_rate.y, xyz_rate.z);

    let h2 = x * x + y * y;
    let h = h2.sqrt();
    let f2 = h2 + z * z;
    let f = f2.sqrt();

    let hdot = (x * xd + y * yd) / h;
    let fdot = (x * xd + y * yd + z * zd) / f;
    let ddot = ((yd * x - xd * y) / h2).to_degrees() * ARCMIN_PER_DEGREE;
    let idot = ((h * zd - hdot * z) / f2).to_degrees() * ARCMIN_PER_DEGREE;

    let sign = match convention {
        SvSignConvention::Implemented => 1.0,
        SvSignConvention::Alternate => -1.0,
    };

    FieldElementsRate {
        declination: sign * ddot,
        inclination: sign * idot,
        horizontal_intensity: hdot,
        total_intensity: fdot,
    }
}

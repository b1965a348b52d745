//! # Geomagnetic field at a geodetic position and date
//!
//! Composes the whole evaluation chain:
//!
//! 1. calendar date → decimal year ([`crate::time::decimal_year`]),
//! 2. geodetic → geocentric position ([`crate::geodesy::geodetic_to_geocentric`]),
//! 3. coefficient interpolation and secular-variation bracket
//!    ([`CoefficientModel::interpolate`], [`CoefficientModel::secular_variation`]),
//! 4. spherical-harmonic synthesis of the main field, the bracket-start field
//!    and the coefficient rates, sharing one [`PointSynthesizer`],
//! 5. rotation of each North/East/Down vector back to the geodetic frame,
//! 6. derived elements ([`xyz_to_dhif`], [`xyz_to_dhif_sv_with_convention`]).
//!
//! ## Example
//!
//! ```rust
//! use igrf::coefficients::ShcModel;
//! use igrf::geomagnetic::evaluate;
//! use igrf::time::calendar_date;
//!
//! let model = ShcModel::Igrf13.coefficient_model().unwrap();
//! let date = calendar_date(2015, 8, 3).unwrap();
//! let result = evaluate(model, 46.1912, -122.1944, 2550.0, &date).unwrap();
//!
//! assert!((result.declination - 15.675).abs() < 0.01);
//! assert!((result.total_intensity - 53063.0).abs() < 1.0);
//! ```
use hifitime::Epoch;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::{
    coefficients::CoefficientModel,
    constants::{ArcMinute, DecimalYear, Degree, Meter, NanoTesla, METERS_TO_KM},
    field::{xyz_to_dhif, xyz_to_dhif_sv_with_convention, SvSignConvention},
    geodesy::geodetic_to_geocentric,
    igrf_errors::IgrfError,
    synthesis::{resolve_degrees, PointSynthesizer, SynthesisParams},
    time::decimal_year,
};

/// A position on the WGS-84 ellipsoid at a calendar date.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeomagneticQuery {
    /// Geodetic latitude, degrees in `[-90, 90]`.
    pub latitude: Degree,
    /// Longitude, degrees (`[-180, 180]` or `[0, 360]`).
    pub longitude: Degree,
    /// Height above the ellipsoid, meters.
    pub altitude: Meter,
    /// Observation date; only the calendar day is used.
    pub date: Epoch,
}

/// Field elements at a query position, with their yearly secular variation.
///
/// Angles are in degrees, angle rates in arc-minutes/year, intensities in nT
/// and intensity rates in nT/year. North, East and Vertical (down) are the
/// geodetic X, Y and Z components.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeomagneticResult {
    pub decimal_year: DecimalYear,
    pub latitude: Degree,
    pub longitude: Degree,
    pub altitude: Meter,

    pub declination: Degree,
    pub inclination: Degree,
    pub horizontal_intensity: NanoTesla,
    pub total_intensity: NanoTesla,
    pub north: NanoTesla,
    pub east: NanoTesla,
    pub vertical: NanoTesla,

    pub declination_sv: ArcMinute,
    pub inclination_sv: ArcMinute,
    pub horizontal_intensity_sv: NanoTesla,
    pub total_intensity_sv: NanoTesla,
    pub north_sv: NanoTesla,
    pub east_sv: NanoTesla,
    pub vertical_sv: NanoTesla,
}

impl GeomagneticQuery {
    /// Build a query, rejecting latitudes outside `[-90, 90]` and non-finite
    /// longitudes or altitudes.
    pub fn new(
        latitude: Degree,
        longitude: Degree,
        altitude: Meter,
        date: Epoch,
    ) -> Result<Self, IgrfError> {
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(IgrfError::InvalidLatitude(latitude));
        }
        for (name, value) in [("longitude", longitude), ("altitude", altitude)] {
            if !value.is_finite() {
                return Err(IgrfError::NonFiniteCoordinate { name, value });
            }
        }
        Ok(GeomagneticQuery {
            latitude,
            longitude,
            altitude,
            date,
        })
    }

    /// Decimal year of the query date.
    pub fn decimal_year(&self) -> DecimalYear {
        decimal_year(&self.date)
    }

    /// Evaluate the full-degree field of `model` with the implemented SV sign.
    pub fn evaluate(&self, model: &CoefficientModel) -> Result<GeomagneticResult, IgrfError> {
        self.evaluate_model(model, 1, None, SvSignConvention::Implemented)
    }

    /// Evaluate with a parameter set; the model is the cached generation
    /// selected by `params.model`.
    pub fn evaluate_with(&self, params: &SynthesisParams) -> Result<GeomagneticResult, IgrfError> {
        let model = params.model.coefficient_model()?;
        self.evaluate_model(model, params.nmin, params.nmax, params.sv_sign)
    }

    fn evaluate_model(
        &self,
        model: &CoefficientModel,
        nmin: usize,
        nmax: Option<usize>,
        sv_sign: SvSignConvention,
    ) -> Result<GeomagneticResult, IgrfError> {
        let year = self.decimal_year();

        let main_coefficients = model.interpolate(year)?;
        let sv_coefficients = model.secular_variation(year)?;

        let position = geodetic_to_geocentric(self.altitude * METERS_TO_KM, 90.0 - self.latitude);
        let (nmin, nmax) = resolve_degrees(model.coefficient_count(), nmax, nmin)?;
        let synthesizer = PointSynthesizer::new(
            position.radius,
            position.colatitude,
            self.longitude,
            nmin,
            nmax,
        )?;

        let geodetic_field = |coefficients: &[f64]| -> Result<Vector3<f64>, IgrfError> {
            let field = synthesizer.synthesize(coefficients)?;
            Ok(position.rotate_to_geodetic(&field.to_north_east_down()))
        };

        let xyz = geodetic_field(main_coefficients.as_slice())?;
        let xyz_rate = geodetic_field(sv_coefficients.rate.as_slice())?;
        let xyz_bracket = geodetic_field(sv_coefficients.main_field.as_slice())?;

        let elements = xyz_to_dhif(&xyz);
        let elements_rate = xyz_to_dhif_sv_with_convention(&xyz_bracket, &xyz_rate, sv_sign);

        Ok(GeomagneticResult {
            decimal_year: year,
            latitude: self.latitude,
            longitude: self.longitude,
            altitude: self.altitude,

            declination: elements.declination,
            inclination: elements.inclination,
            horizontal_intensity: elements.horizontal_intensity,
            total_intensity: elements.total_intensity,
            north: xyz.x,
            east: xyz.y,
            vertical: xyz.z,

            declination_sv: elements_rate.declination,
            inclination_sv: elements_rate.inclination,
            horizontal_intensity_sv: elements_rate.horizontal_intensity,
            total_intensity_sv: elements_rate.total_intensity,
            north_sv: xyz_rate.x,
            east_sv: xyz_rate.y,
            vertical_sv: xyz_rate.z,
        })
    }
}

/// Geomagnetic field of `model` at a geodetic position and date.
///
/// Arguments
/// -----------------
/// * `model`: coefficient table, e.g. `ShcModel::Igrf14.coefficient_model()?`.
/// * `latitude`: geodetic latitude, degrees in `[-90, 90]`.
/// * `longitude`: degrees.
/// * `altitude`: height above the WGS-84 ellipsoid, **meters**.
/// * `date`: observation date.
///
/// Return
/// ----------
/// * The [`GeomagneticResult`], or an error for an invalid latitude, a
///   non-finite longitude or altitude, or a date before the first model epoch.
pub fn evaluate(
    model: &CoefficientModel,
    latitude: Degree,
    longitude: Degree,
    altitude: Meter,
    date: &Epoch,
) -> Result<GeomagneticResult, IgrfError> {
    GeomagneticQuery::new(latitude, longitude, altitude, *date)?.evaluate(model)
}

/// Same as [`evaluate`] with a [`SynthesisParams`] configuration.
pub fn evaluate_with_params(
    latitude: Degree,
    longitude: Degree,
    altitude: Meter,
    date: &Epoch,
    params: &SynthesisParams,
) -> Result<GeomagneticResult, IgrfError> {
    GeomagneticQuery::new(latitude, longitude, altitude, *date)?.evaluate_with(params)
}

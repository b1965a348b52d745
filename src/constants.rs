//! # Constants and type definitions for IGRF
//!
//! This module centralizes the **reference ellipsoid**, the **geomagnetic reference
//! radius**, unit conversions, and the type aliases used throughout the crate.
//!
//! ## Overview
//!
//! - WGS-84 ellipsoid parameters (equatorial radius, flattening, derived polar radius)
//! - IGRF reference radius used to scale the spherical-harmonic expansion
//! - Core type aliases (`Degree`, `Kilometer`, `NanoTesla`, …)

// -------------------------------------------------------------------------------------------------
// Reference ellipsoid and geomagnetic reference sphere
// -------------------------------------------------------------------------------------------------

/// WGS-84 equatorial radius in kilometers
pub const WGS84_EQUATORIAL_RADIUS: f64 = 6378.137;

/// WGS-84 flattening
pub const WGS84_FLATTENING: f64 = 1.0 / 298.257223563;

/// WGS-84 polar radius in kilometers, derived from the flattening
pub const WGS84_POLAR_RADIUS: f64 = WGS84_EQUATORIAL_RADIUS * (1.0 - WGS84_FLATTENING);

/// Mean Earth radius used as the IGRF reference sphere, in kilometers
pub const IGRF_REFERENCE_RADIUS: f64 = 6371.2;

/// First year covered by the IGRF secular-variation 5-year brackets
pub const IGRF_BASE_YEAR: f64 = 1900.0;

/// Length of an IGRF secular-variation bracket, in years
pub const IGRF_EPOCH_STEP: f64 = 5.0;

// -------------------------------------------------------------------------------------------------
// Unit conversions
// -------------------------------------------------------------------------------------------------

/// Meters → kilometers
pub const METERS_TO_KM: f64 = 1.0e-3;

/// Degrees → arc-minutes
pub const ARCMIN_PER_DEGREE: f64 = 60.0;

// -------------------------------------------------------------------------------------------------
// Type aliases
// -------------------------------------------------------------------------------------------------

/// Angle in degrees
pub type Degree = f64;
/// Angle in arc-minutes
pub type ArcMinute = f64;
/// Distance in kilometers
pub type Kilometer = f64;
/// Distance in meters
pub type Meter = f64;
/// Magnetic flux density in nanotesla
pub type NanoTesla = f64;
/// Fractional year, e.g. `2015.5849` for 2015-08-03
pub type DecimalYear = f64;

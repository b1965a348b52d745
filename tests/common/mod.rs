#![allow(dead_code)]

use std::fs::File;

use approx::assert_abs_diff_eq;
use camino::Utf8Path;
use hifitime::Epoch;
use serde::Deserialize;

use igrf::{geomagnetic::GeomagneticResult, time::calendar_date};

/// Reference values from the BGS IGRF-13 online calculator.
#[derive(Debug, Clone, Deserialize)]
pub struct ReferenceLocation {
    pub name: String,
    pub date: (i32, u8, u8),
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: f64,

    pub declination: f64,
    pub inclination: f64,
    pub horizontal_intensity: f64,
    pub total_intensity: f64,
    pub north: f64,
    pub east: f64,
    pub vertical: f64,

    pub declination_sv: f64,
    pub inclination_sv: f64,
    pub horizontal_intensity_sv: f64,
    pub total_intensity_sv: f64,
    pub north_sv: f64,
    pub east_sv: f64,
    pub vertical_sv: f64,
}

impl ReferenceLocation {
    pub fn epoch(&self) -> Epoch {
        let (year, month, day) = self.date;
        calendar_date(year, month, day).unwrap()
    }
}

pub fn load_reference_locations() -> Vec<ReferenceLocation> {
    let path = Utf8Path::new("tests/data/igrf13_reference.json");
    let file = File::open(path).unwrap();
    serde_json::from_reader(file).unwrap()
}

/// Angles within 0.01°, intensities within 1 nT, every rate within 0.1 per year.
pub fn assert_result_close(actual: &GeomagneticResult, expected: &ReferenceLocation) {
    assert_abs_diff_eq!(actual.declination, expected.declination, epsilon = 0.01);
    assert_abs_diff_eq!(actual.inclination, expected.inclination, epsilon = 0.01);
    assert_abs_diff_eq!(
        actual.horizontal_intensity,
        expected.horizontal_intensity,
        epsilon = 1.0
    );
    assert_abs_diff_eq!(
        actual.total_intensity,
        expected.total_intensity,
        epsilon = 1.0
    );
    assert_abs_diff_eq!(actual.north, expected.north, epsilon = 1.0);
    assert_abs_diff_eq!(actual.east, expected.east, epsilon = 1.0);
    assert_abs_diff_eq!(actual.vertical, expected.vertical, epsilon = 1.0);

    assert_abs_diff_eq!(
        actual.declination_sv,
        expected.declination_sv,
        epsilon = 0.1
    );
    assert_abs_diff_eq!(
        actual.inclination_sv,
        expected.inclination_sv,
        epsilon = 0.1
    );
    assert_abs_diff_eq!(
        actual.horizontal_intensity_sv,
        expected.horizontal_intensity_sv,
        epsilon = 0.1
    );
    assert_abs_diff_eq!(
        actual.total_intensity_sv,
        expected.total_intensity_sv,
        epsilon = 0.1
    );
    assert_abs_diff_eq!(actual.north_sv, expected.north_sv, epsilon = 0.1);
    assert_abs_diff_eq!(actual.east_sv, expected.east_sv, epsilon = 0.1);
    assert_abs_diff_eq!(actual.vertical_sv, expected.vertical_sv, epsilon = 0.1);
}

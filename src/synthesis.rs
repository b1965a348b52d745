//! # Spherical-harmonic synthesis
//!
//! Evaluates the internal geomagnetic potential expansion
//!
//! ```text
//! V(r, θ, φ) = a Σₙ Σₘ (a/r)ⁿ⁺¹ [gₙᵐ cos mφ + hₙᵐ sin mφ] Pₙᵐ(cos θ)
//! ```
//!
//! on the reference sphere `a = 6371.2 km` and returns the geocentric field
//! components `B = −∇V`:
//!
//! - `B_r` (radial, outward),
//! - `B_θ` (along increasing colatitude, i.e. southward),
//! - `B_φ` (along increasing longitude, i.e. eastward).
//!
//! ## Coefficient layout
//!
//! Coefficients are read in the canonical SHC order starting at degree 1:
//! `g₁⁰, g₁¹, h₁¹, g₂⁰, g₂¹, h₂¹, g₂², h₂², …`. An `m = 0` term consumes one
//! value, every `m ≥ 1` term consumes a `(g, h)` pair. A lower degree `nmin > 1`
//! skips the first `nmin² − 1` values.
//!
//! ## Entry points
//!
//! - [`synth_values`]: one point, degrees resolved from the coefficient count.
//! - [`PointSynthesizer`]: one point, Legendre and longitude tables kept to
//!   synthesize several coefficient sets (main field, secular variation, …).
//! - [`synth_grid`]: colatitude × longitude grid sharing the tables.
//!
//! ## See also
//! * [`LegendreTable`] – provides `Pₙᵐ`, `dPₙᵐ/dθ` and the pole substitution.
use nalgebra::{DMatrix, Vector3};
use tracing::warn;

use crate::{
    coefficients::{coefficient_count, ShcModel},
    constants::{Degree, Kilometer, NanoTesla, IGRF_REFERENCE_RADIUS},
    field::SvSignConvention,
    igrf_errors::IgrfError,
    legendre::LegendreTable,
};

/// Geocentric spherical components of the field, in nT.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SphericalField {
    pub radial: NanoTesla,
    pub theta: NanoTesla,
    pub phi: NanoTesla,
}

impl SphericalField {
    /// Geocentric North/East/Down vector: `(−B_θ, B_φ, −B_r)`.
    pub fn to_north_east_down(&self) -> Vector3<f64> {
        Vector3::new(-self.theta, self.phi, -self.radial)
    }
}

/// Field components over a grid, rows follow colatitudes and columns longitudes.
#[derive(Debug, Clone, PartialEq)]
pub struct GridField {
    pub radial: DMatrix<NanoTesla>,
    pub theta: DMatrix<NanoTesla>,
    pub phi: DMatrix<NanoTesla>,
}

/// `cos(mφ)` and `sin(mφ)` for `m = 0..=nmax`.
#[derive(Debug, Clone, PartialEq)]
pub struct LongitudeTerms {
    cos_m: Vec<f64>,
    sin_m: Vec<f64>,
}

impl LongitudeTerms {
    pub fn new(nmax: usize, longitude: Degree) -> Self {
        let phi = longitude.to_radians();
        let (sin_m, cos_m) = (0..=nmax).map(|m| (m as f64 * phi).sin_cos()).unzip();
        LongitudeTerms { cos_m, sin_m }
    }

    /// `(cos mφ, sin mφ)`
    #[inline]
    pub fn get(&self, m: usize) -> (f64, f64) {
        (self.cos_m[m], self.sin_m[m])
    }
}

/// Resolve the degree range of a synthesis.
///
/// The largest degree a coefficient vector supports is `⌊√(len + 1)⌋ − 1`.
/// A requested `nmax` above it is clamped with a warning; `None` selects it.
pub(crate) fn resolve_degrees(
    n_coefficients: usize,
    nmax: Option<usize>,
    nmin: usize,
) -> Result<(usize, usize), IgrfError> {
    let supported = ((n_coefficients + 1) as f64).sqrt().floor() as usize - 1;

    if nmin == 0 {
        return Err(IgrfError::InvalidDegree("nmin must be at least 1".into()));
    }
    if nmax == Some(0) {
        return Err(IgrfError::InvalidDegree("nmax must be at least 1".into()));
    }
    if supported == 0 {
        return Err(IgrfError::InvalidDegree(format!(
            "{n_coefficients} coefficients do not describe a single degree"
        )));
    }

    let nmax = match nmax {
        Some(requested) if requested > supported => {
            warn!(
                requested,
                supported, "nmax exceeds the coefficient set, reduced to the supported maximum"
            );
            supported
        }
        Some(requested) => requested,
        None => supported,
    };

    if nmax < nmin {
        return Err(IgrfError::InvalidDegree(format!(
            "nmax ({nmax}) is lower than nmin ({nmin})"
        )));
    }

    Ok((nmin, nmax))
}

/// Accumulate the three components for one point.
fn accumulate(
    coefficients: &[f64],
    radius: Kilometer,
    nmin: usize,
    nmax: usize,
    legendre: &LegendreTable,
    longitude: &LongitudeTerms,
) -> SphericalField {
    let ratio = radius / IGRF_REFERENCE_RADIUS;
    let mut radius_power = ratio.powi(-(nmin as i32 + 2));
    let mut index = nmin * nmin - 1;
    let mut field = SphericalField::default();

    for n in nmin..=nmax {
        let n_plus_one = (n + 1) as f64;

        let g = coefficients[index];
        field.radial += n_plus_one * legendre.value(n, 0) * radius_power * g;
        field.theta -= legendre.theta_derivative(n, 0) * radius_power * g;
        index += 1;

        for m in 1..=n {
            let (cos_m, sin_m) = longitude.get(m);
            let (g, h) = (coefficients[index], coefficients[index + 1]);
            let cos_term = g * cos_m + h * sin_m;

            field.radial += n_plus_one * legendre.value(n, m) * radius_power * cos_term;
            field.theta -= legendre.theta_derivative(n, m) * radius_power * cos_term;
            field.phi += m as f64
                * legendre.value_over_sin_theta(n, m)
                * radius_power
                * (g * sin_m - h * cos_m);

            index += 2;
        }

        radius_power /= ratio;
    }

    field
}

fn check_radius(radius: Kilometer) -> Result<(), IgrfError> {
    if radius > 0.0 && radius.is_finite() {
        Ok(())
    } else {
        Err(IgrfError::InvalidSynthesisParameter(format!(
            "radius must be a positive number of km, got {radius}"
        )))
    }
}

fn check_coefficient_count(coefficients: &[f64], nmax: usize) -> Result<(), IgrfError> {
    let needed = coefficient_count(1, nmax);
    if coefficients.len() < needed {
        return Err(IgrfError::InvalidDegree(format!(
            "degree {nmax} needs {needed} coefficients, got {}",
            coefficients.len()
        )));
    }
    Ok(())
}

/// Synthesizer bound to one evaluation point.
///
/// Holds the Legendre and longitude tables of the point so that several
/// coefficient vectors of the same degree can be synthesized without
/// recomputing them.
#[derive(Debug, Clone)]
pub struct PointSynthesizer {
    radius: Kilometer,
    nmin: usize,
    nmax: usize,
    legendre: LegendreTable,
    longitude: LongitudeTerms,
}

impl PointSynthesizer {
    /// Prepare the tables at a geocentric position.
    ///
    /// Arguments
    /// -----------------
    /// * `radius`: geocentric radius, km.
    /// * `colatitude`: geocentric colatitude in `[0, 180]`, degrees.
    /// * `longitude`: degrees, any range.
    /// * `nmin`, `nmax`: degree range, `1 ≤ nmin ≤ nmax`.
    ///
    /// Return
    /// ----------
    /// * The synthesizer, or [`IgrfError::InvalidDegree`] /
    ///   [`IgrfError::ColatitudeOutOfBounds`] /
    ///   [`IgrfError::InvalidSynthesisParameter`] for a non-positive radius.
    pub fn new(
        radius: Kilometer,
        colatitude: Degree,
        longitude: Degree,
        nmin: usize,
        nmax: usize,
    ) -> Result<Self, IgrfError> {
        if nmin == 0 || nmax < nmin {
            return Err(IgrfError::InvalidDegree(format!(
                "invalid degree range [{nmin}, {nmax}]"
            )));
        }
        check_radius(radius)?;

        let legendre = LegendreTable::new(nmax, colatitude)?;
        if let Some(pole) = legendre.pole() {
            warn!(
                colatitude,
                ?pole,
                "evaluation point at a geographic pole, using the polar limit of B_phi"
            );
        }

        Ok(PointSynthesizer {
            radius,
            nmin,
            nmax,
            legendre,
            longitude: LongitudeTerms::new(nmax, longitude),
        })
    }

    pub fn nmin(&self) -> usize {
        self.nmin
    }

    pub fn nmax(&self) -> usize {
        self.nmax
    }

    pub fn legendre(&self) -> &LegendreTable {
        &self.legendre
    }

    /// Synthesize the field of one coefficient vector (canonical order from degree 1).
    pub fn synthesize(&self, coefficients: &[f64]) -> Result<SphericalField, IgrfError> {
        check_coefficient_count(coefficients, self.nmax)?;
        Ok(accumulate(
            coefficients,
            self.radius,
            self.nmin,
            self.nmax,
            &self.legendre,
            &self.longitude,
        ))
    }
}

/// Field components at one geocentric point.
///
/// Arguments
/// -----------------
/// * `coefficients`: Gauss coefficients in canonical order from degree 1.
/// * `radius`: geocentric radius, km.
/// * `colatitude`: geocentric colatitude in `[0, 180]`, degrees.
/// * `longitude`: degrees.
/// * `nmax`: maximum degree, `None` for the largest the coefficients support;
///   larger values are clamped to it.
/// * `nmin`: minimum degree, `None` for 1.
///
/// Return
/// ----------
/// * `(B_r, B_θ, B_φ)` in nT.
///
/// Example
/// ----------
/// ```rust
/// use igrf::coefficients::ShcModel;
/// use igrf::synthesis::synth_values;
///
/// let model = ShcModel::Igrf14.coefficient_model().unwrap();
/// let coefficients = model.interpolate(2020.0).unwrap();
/// let field = synth_values(coefficients.as_slice(), 6371.2, 90.0, 0.0, None, None).unwrap();
/// assert!(field.theta < 0.0); // northward at the equator
/// ```
pub fn synth_values(
    coefficients: &[f64],
    radius: Kilometer,
    colatitude: Degree,
    longitude: Degree,
    nmax: Option<usize>,
    nmin: Option<usize>,
) -> Result<SphericalField, IgrfError> {
    let (nmin, nmax) = resolve_degrees(coefficients.len(), nmax, nmin.unwrap_or(1))?;
    PointSynthesizer::new(radius, colatitude, longitude, nmin, nmax)?.synthesize(coefficients)
}

/// Field components on the grid `colatitudes × longitudes` at one radius.
///
/// Legendre tables are built once per colatitude and longitude terms once per
/// longitude. Degrees are resolved as in [`synth_values`].
pub fn synth_grid(
    coefficients: &[f64],
    radius: Kilometer,
    colatitudes: &[Degree],
    longitudes: &[Degree],
    nmax: Option<usize>,
    nmin: Option<usize>,
) -> Result<GridField, IgrfError> {
    let (nmin, nmax) = resolve_degrees(coefficients.len(), nmax, nmin.unwrap_or(1))?;
    check_radius(radius)?;

    let longitude_terms: Vec<LongitudeTerms> = longitudes
        .iter()
        .map(|&longitude| LongitudeTerms::new(nmax, longitude))
        .collect();

    let shape = (colatitudes.len(), longitudes.len());
    let mut grid = GridField {
        radial: DMatrix::zeros(shape.0, shape.1),
        theta: DMatrix::zeros(shape.0, shape.1),
        phi: DMatrix::zeros(shape.0, shape.1),
    };

    for (i, &colatitude) in colatitudes.iter().enumerate() {
        let legendre = LegendreTable::new(nmax, colatitude)?;
        if legendre.pole().is_some() {
            warn!(colatitude, "grid row at a geographic pole, using the polar limit of B_phi");
        }

        for (j, terms) in longitude_terms.iter().enumerate() {
            let field = accumulate(coefficients, radius, nmin, nmax, &legendre, terms);
            grid.radial[(i, j)] = field.radial;
            grid.theta[(i, j)] = field.theta;
            grid.phi[(i, j)] = field.phi;
        }
    }

    Ok(grid)
}

/// Configuration of a geomagnetic evaluation.
///
/// Build it with [`SynthesisParams::builder`] or use [`SynthesisParams::default`]:
/// degrees 1 to the table maximum, IGRF-14, [`SvSignConvention::Implemented`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SynthesisParams {
    /// Lowest degree included in the sum.
    pub nmin: usize,
    /// Highest degree, `None` for the model maximum.
    pub nmax: Option<usize>,
    /// Model generation used by [`crate::geomagnetic`] evaluations.
    pub model: ShcModel,
    /// Sign convention of the declination / inclination rates.
    pub sv_sign: SvSignConvention,
}

impl SynthesisParams {
    /// Create a new [`SynthesisParamsBuilder`].
    ///
    /// # Example
    ///
    /// ```rust
    /// use igrf::coefficients::ShcModel;
    /// use igrf::synthesis::SynthesisParams;
    ///
    /// let params = SynthesisParams::builder()
    ///     .model(ShcModel::Igrf13)
    ///     .nmax(10)
    ///     .build()
    ///     .unwrap();
    /// assert_eq!(params.nmax, Some(10));
    /// ```
    pub fn builder() -> SynthesisParamsBuilder {
        SynthesisParamsBuilder::new()
    }
}

impl Default for SynthesisParams {
    fn default() -> Self {
        SynthesisParams {
            nmin: 1,
            nmax: None,
            model: ShcModel::default(),
            sv_sign: SvSignConvention::default(),
        }
    }
}

/// Fluent builder for [`SynthesisParams`].
#[derive(Debug, Clone)]
pub struct SynthesisParamsBuilder {
    params: SynthesisParams,
}

impl Default for SynthesisParamsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SynthesisParamsBuilder {
    /// Create a new builder initialized with default values.
    pub fn new() -> Self {
        Self {
            params: SynthesisParams::default(),
        }
    }

    pub fn nmin(mut self, v: usize) -> Self {
        self.params.nmin = v;
        self
    }
    pub fn nmax(mut self, v: usize) -> Self {
        self.params.nmax = Some(v);
        self
    }
    pub fn model(mut self, v: ShcModel) -> Self {
        self.params.model = v;
        self
    }
    pub fn sv_sign(mut self, v: SvSignConvention) -> Self {
        self.params.sv_sign = v;
        self
    }

    /// Finalize the builder.
    ///
    /// Validation rules
    /// -----------------
    /// * `nmin ≥ 1`
    /// * `nmax ≥ nmin` when `nmax` is set.
    ///
    /// A `nmax` above the model maximum is accepted here and clamped at
    /// evaluation time.
    pub fn build(self) -> Result<SynthesisParams, IgrfError> {
        let p = &self.params;

        if p.nmin == 0 {
            return Err(IgrfError::InvalidSynthesisParameter(
                "nmin must be >= 1".into(),
            ));
        }
        if let Some(nmax) = p.nmax {
            if nmax < p.nmin {
                return Err(IgrfError::InvalidSynthesisParameter(format!(
                    "nmax ({nmax}) must be >= nmin ({})",
                    p.nmin
                )));
            }
        }

        Ok(self.params)
    }
}

#[cfg(test)]
mod synthesis_test {
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    use super::*;

    const G10: f64 = -30000.0;

    fn dipole(g10: f64, g11: f64, h11: f64) -> Vec<f64> {
        vec![g10, g11, h11]
    }

    fn igrf14_2020() -> Vec<f64> {
        ShcModel::Igrf14
            .coefficient_model()
            .unwrap()
            .interpolate(2020.0)
            .unwrap()
            .as_slice()
            .to_vec()
    }

    #[test]
    fn test_axial_dipole() {
        let coefficients = dipole(G10, 0.0, 0.0);
        for &colatitude in &[10.0_f64, 45.0, 90.0, 160.0] {
            let field =
                synth_values(&coefficients, IGRF_REFERENCE_RADIUS, colatitude, 12.0, None, None)
                    .unwrap();
            let (s, c) = colatitude.to_radians().sin_cos();
            assert_relative_eq!(field.radial, 2.0 * G10 * c, epsilon = 1e-9);
            assert_relative_eq!(field.theta, G10 * s, epsilon = 1e-9);
            assert_eq!(field.phi, 0.0);
        }

        // northward and horizontal at the equator
        let field =
            synth_values(&coefficients, IGRF_REFERENCE_RADIUS, 90.0, 0.0, None, None).unwrap();
        let ned = field.to_north_east_down();
        assert_relative_eq!(ned.x, -G10, epsilon = 1e-9);
        assert_abs_diff_eq!(ned.z, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_dipole_radius_scaling() {
        let coefficients = dipole(G10, 1500.0, -4500.0);
        let surface =
            synth_values(&coefficients, IGRF_REFERENCE_RADIUS, 60.0, 30.0, None, None).unwrap();
        let far =
            synth_values(&coefficients, 2.0 * IGRF_REFERENCE_RADIUS, 60.0, 30.0, None, None)
                .unwrap();
        assert_relative_eq!(far.radial, surface.radial / 8.0, epsilon = 1e-9);
        assert_relative_eq!(far.theta, surface.theta / 8.0, epsilon = 1e-9);
        assert_relative_eq!(far.phi, surface.phi / 8.0, epsilon = 1e-9);
    }

    #[test]
    fn test_equatorial_dipole_longitude_terms() {
        let h11 = 5000.0;
        let coefficients = dipole(0.0, 0.0, h11);

        let east = synth_values(&coefficients, IGRF_REFERENCE_RADIUS, 90.0, 90.0, None, None)
            .unwrap();
        assert_relative_eq!(east.radial, 2.0 * h11, epsilon = 1e-9);
        assert_abs_diff_eq!(east.phi, 0.0, epsilon = 1e-9);

        let greenwich =
            synth_values(&coefficients, IGRF_REFERENCE_RADIUS, 90.0, 0.0, None, None).unwrap();
        assert_abs_diff_eq!(greenwich.radial, 0.0, epsilon = 1e-9);
        assert_relative_eq!(greenwich.phi, -h11, epsilon = 1e-9);
    }

    #[test]
    fn test_nmax_is_clamped_to_supported_degree() {
        let coefficients = igrf14_2020();
        let clamped =
            synth_values(&coefficients, 6400.0, 52.0, -3.5, Some(20), None).unwrap();
        let explicit =
            synth_values(&coefficients, 6400.0, 52.0, -3.5, Some(13), None).unwrap();
        let default = synth_values(&coefficients, 6400.0, 52.0, -3.5, None, None).unwrap();
        assert_eq!(clamped, explicit);
        assert_eq!(default, explicit);
    }

    #[test]
    fn test_nmin_skips_low_degrees() {
        let coefficients = igrf14_2020();
        let full = synth_values(&coefficients, 6500.0, 71.0, 140.0, None, None).unwrap();
        let dipole_only =
            synth_values(&coefficients, 6500.0, 71.0, 140.0, Some(1), Some(1)).unwrap();
        let upper = synth_values(&coefficients, 6500.0, 71.0, 140.0, None, Some(2)).unwrap();

        assert_relative_eq!(full.radial, dipole_only.radial + upper.radial, epsilon = 1e-8);
        assert_relative_eq!(full.theta, dipole_only.theta + upper.theta, epsilon = 1e-8);
        assert_relative_eq!(full.phi, dipole_only.phi + upper.phi, epsilon = 1e-8);
    }

    #[test]
    fn test_degree_errors() {
        let coefficients = igrf14_2020();
        let run = |nmax, nmin| synth_values(&coefficients, 6371.2, 45.0, 0.0, nmax, nmin);

        assert!(matches!(run(None, Some(0)), Err(IgrfError::InvalidDegree(_))));
        assert!(matches!(run(Some(0), None), Err(IgrfError::InvalidDegree(_))));
        assert!(matches!(run(Some(3), Some(5)), Err(IgrfError::InvalidDegree(_))));
        assert!(matches!(
            synth_values(&[1.0, 2.0], 6371.2, 45.0, 0.0, None, None),
            Err(IgrfError::InvalidDegree(_))
        ));
        assert_eq!(
            synth_values(&coefficients, 6371.2, 190.0, 0.0, None, None),
            Err(IgrfError::ColatitudeOutOfBounds(190.0))
        );
    }

    #[test]
    fn test_non_positive_radius() {
        let coefficients = dipole(G10, 2.0, 3.0);
        for radius in [0.0, -6371.2, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                synth_values(&coefficients, radius, 10.0, 0.0, None, None),
                Err(IgrfError::InvalidSynthesisParameter(_))
            ));
            assert!(matches!(
                synth_grid(&coefficients, radius, &[10.0], &[0.0], None, None),
                Err(IgrfError::InvalidSynthesisParameter(_))
            ));
        }
        assert!(PointSynthesizer::new(0.0, 45.0, 0.0, 1, 1).is_err());
    }

    #[test]
    fn test_point_synthesizer_rejects_short_coefficients() {
        let synthesizer = PointSynthesizer::new(6371.2, 45.0, 0.0, 1, 13).unwrap();
        assert!(matches!(
            synthesizer.synthesize(&[0.0; 194]),
            Err(IgrfError::InvalidDegree(_))
        ));
        assert!(synthesizer.synthesize(&[0.0; 195]).is_ok());
    }

    #[test]
    fn test_poles_are_finite_and_continuous() {
        let coefficients = igrf14_2020();
        for (pole, near) in [(0.0, 1e-7), (180.0, 180.0 - 1e-7)] {
            let at_pole = synth_values(&coefficients, 6356.8, pole, 37.0, None, None).unwrap();
            let close = synth_values(&coefficients, 6356.8, near, 37.0, None, None).unwrap();

            for (a, b) in [
                (at_pole.radial, close.radial),
                (at_pole.theta, close.theta),
                (at_pole.phi, close.phi),
            ] {
                assert!(a.is_finite());
                assert_abs_diff_eq!(a, b, epsilon = 0.1);
            }
        }
    }

    #[test]
    fn test_grid_matches_point_evaluation() {
        let coefficients = igrf14_2020();
        let colatitudes = [0.0, 30.0, 90.0, 135.5, 180.0];
        let longitudes = [-180.0, -45.0, 0.0, 200.0];
        let grid =
            synth_grid(&coefficients, 6871.2, &colatitudes, &longitudes, None, None).unwrap();

        assert_eq!(grid.radial.shape(), (5, 4));
        for (i, &colatitude) in colatitudes.iter().enumerate() {
            for (j, &longitude) in longitudes.iter().enumerate() {
                let point =
                    synth_values(&coefficients, 6871.2, colatitude, longitude, None, None)
                        .unwrap();
                assert_eq!(grid.radial[(i, j)], point.radial);
                assert_eq!(grid.theta[(i, j)], point.theta);
                assert_eq!(grid.phi[(i, j)], point.phi);
            }
        }
    }

    #[test]
    fn test_params_builder() {
        let params = SynthesisParams::builder()
            .nmin(2)
            .nmax(8)
            .model(ShcModel::Igrf13)
            .sv_sign(SvSignConvention::Alternate)
            .build()
            .unwrap();
        assert_eq!(params.nmin, 2);
        assert_eq!(params.nmax, Some(8));
        assert_eq!(params.model, ShcModel::Igrf13);
        assert_eq!(params.sv_sign, SvSignConvention::Alternate);

        let default = SynthesisParams::builder().build().unwrap();
        assert_eq!(default, SynthesisParams::default());
        assert_eq!(default.model, ShcModel::Igrf14);

        assert!(matches!(
            SynthesisParams::builder().nmin(0).build(),
            Err(IgrfError::InvalidSynthesisParameter(_))
        ));
        assert!(matches!(
            SynthesisParams::builder().nmin(4).nmax(3).build(),
            Err(IgrfError::InvalidSynthesisParameter(_))
        ));
    }
}

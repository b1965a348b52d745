//! Temporal interpolation of Gauss coefficients.
//!
//! IGRF coefficients are tabulated every five years and vary **linearly**
//! between epochs. Past the last tabulated epoch the last segment is
//! prolonged with the same slope (the predictive secular-variation segment of
//! the table), it is never clamped. Dates before the first epoch are rejected.
//!
//! Secular variation follows the IGRF convention of a **constant rate inside
//! each five-year bracket** starting at 1900: for a date in
//! `[1900 + 5k, 1900 + 5(k + 1))` the rate is `c(1900 + 5k + 1) - c(1900 + 5k)`.
//! A bracket end falling before the first epoch of a table is extrapolated
//! backward along the first segment; only the date itself must lie in the table.
use nalgebra::DVector;
use tracing::warn;

use crate::{
    constants::{DecimalYear, IGRF_BASE_YEAR, IGRF_EPOCH_STEP},
    igrf_errors::IgrfError,
};

use super::CoefficientModel;

/// Coefficients describing the secular variation around a date.
#[derive(Debug, Clone, PartialEq)]
pub struct SecularVariationCoefficients {
    /// Start of the five-year bracket containing the date.
    pub epoch_start: DecimalYear,
    /// Main-field coefficients at `epoch_start`.
    pub main_field: DVector<f64>,
    /// Coefficient rates, in nT/year.
    pub rate: DVector<f64>,
}

impl CoefficientModel {
    /// Locate the interpolation segment of `year`.
    ///
    /// Returns the index `i` of the segment `[epochs[i], epochs[i + 1]]` and the
    /// weight `w` of `epochs[i + 1]`; `w > 1` past the last epoch.
    fn segment(&self, year: DecimalYear) -> Result<(usize, f64), IgrfError> {
        let first_epoch = self.first_epoch();
        if year.is_nan() || year < first_epoch {
            return Err(IgrfError::DateBeforeFirstEpoch { year, first_epoch });
        }
        Ok(self.nearest_segment(year))
    }

    /// Segment of `year` without range check: `w < 0` before the first epoch,
    /// `w > 1` past the last one.
    fn nearest_segment(&self, year: DecimalYear) -> (usize, f64) {
        let last_segment = self.epochs.len() - 2;
        let index = self
            .epochs
            .partition_point(|&epoch| epoch <= year)
            .saturating_sub(1)
            .min(last_segment);

        let (t0, t1) = (self.epochs[index], self.epochs[index + 1]);
        (index, (year - t0) / (t1 - t0))
    }

    /// `(1 - w)·c[i] + w·c[i + 1]`, which keeps both segment ends exact.
    fn blend(&self, (index, weight): (usize, f64)) -> DVector<f64> {
        self.coefficients.column(index) * (1.0 - weight)
            + self.coefficients.column(index + 1) * weight
    }

    /// Interpolate every coefficient at `year`.
    ///
    /// At a tabulated epoch the stored column is returned unchanged.
    ///
    /// Arguments
    /// -----------------
    /// * `year`: decimal year, at or after the first epoch of the table.
    ///
    /// Return
    /// ----------
    /// * The `N` coefficients in canonical order, or
    ///   [`IgrfError::DateBeforeFirstEpoch`].
    pub fn interpolate(&self, year: DecimalYear) -> Result<DVector<f64>, IgrfError> {
        let segment = self.segment(year)?;

        if year > self.last_epoch() {
            warn!(
                year,
                last_epoch = self.last_epoch(),
                model = %self.name,
                "extrapolating coefficients beyond the last model epoch"
            );
        }

        Ok(self.blend(segment))
    }

    /// Secular-variation coefficients for the five-year bracket containing `year`.
    ///
    /// Return
    /// ----------
    /// * The bracket start, the main-field coefficients at that start and the
    ///   per-year coefficient rates.
    ///
    /// See also
    /// ------------
    /// * [`CoefficientModel::interpolate`] – same blending for both bracket ends.
    pub fn secular_variation(
        &self,
        year: DecimalYear,
    ) -> Result<SecularVariationCoefficients, IgrfError> {
        self.segment(year)?;

        let bracket = ((year - IGRF_BASE_YEAR) / IGRF_EPOCH_STEP).floor();
        let epoch_start = IGRF_BASE_YEAR + bracket * IGRF_EPOCH_STEP;

        let main_field = self.blend(self.nearest_segment(epoch_start));
        let one_year_later = self.blend(self.nearest_segment(epoch_start + 1.0));
        let rate = &one_year_later - &main_field;

        Ok(SecularVariationCoefficients {
            epoch_start,
            main_field,
            rate,
        })
    }
}

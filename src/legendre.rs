//! # Schmidt semi-normalized associated Legendre functions
//!
//! [`LegendreTable`] evaluates, for one colatitude θ and every degree/order
//! `0 ≤ m ≤ n ≤ nmax`:
//!
//! - the Schmidt semi-normalized functions `P(n, m)(cos θ)`,
//! - their colatitude derivatives `dP(n, m)/dθ`.
//!
//! ## Storage
//!
//! Both families share one dense `(nmax + 1) × (nmax + 2)` matrix. The functions
//! fill the lower triangle (`row = n`, `column = m`), the derivatives fill the
//! strict upper triangle shifted by one column (`row = m`, `column = n + 1`).
//! The two triangles never overlap, so a single allocation serves the whole
//! synthesis of one point.
//!
//! ## Recurrence
//!
//! With `rootn[k] = √k`:
//!
//! ```text
//! P(0,0) = 1,  P(1,1) = sin θ
//! P(m+1, m)   = cos θ · √(2m+1) · P(m, m)
//! P(m+1, m+1) = sin θ · √(2m+1) · P(m, m) / √(2m+2)          (m > 0)
//! P(n, m)     = [(2n−1) cos θ · P(n−1, m) − √((n−1)² − m²) · P(n−2, m)] / √(n² − m²)
//! ```
//!
//! The derivative row uses dedicated expressions for `m = 0`, `m = 1`,
//! `2 ≤ m < n` and `m = n`.
//!
//! ## Poles
//!
//! At θ = 0° or θ = 180° the longitude component of the field needs
//! `P(n, m) / sin θ`, which is `0/0`. [`LegendreTable::value_over_sin_theta`]
//! then substitutes the derivative term (`+dP/dθ` at the North pole, `−dP/dθ`
//! at the South pole), its limit. This branch is part of the contract of the
//! table: callers may pass exact pole colatitudes.
use nalgebra::DMatrix;

use crate::{constants::Degree, igrf_errors::IgrfError};

/// Geographic pole reached by an exact colatitude of 0° or 180°.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pole {
    North,
    South,
}

impl Pole {
    /// Pole matching an exact colatitude, if any.
    pub fn from_colatitude(colatitude: Degree) -> Option<Pole> {
        if colatitude == 0.0 {
            Some(Pole::North)
        } else if colatitude == 180.0 {
            Some(Pole::South)
        } else {
            None
        }
    }
}

/// Legendre functions and their θ-derivatives at one colatitude.
#[derive(Debug, Clone, PartialEq)]
pub struct LegendreTable {
    nmax: usize,
    pnm: DMatrix<f64>,
    sin_theta: f64,
    pole: Option<Pole>,
}

impl LegendreTable {
    /// Evaluate the table up to degree `nmax` at `colatitude` (degrees).
    ///
    /// Arguments
    /// -----------------
    /// * `nmax`: maximum degree, at least 1.
    /// * `colatitude`: geocentric colatitude in `[0, 180]` degrees.
    ///
    /// Return
    /// ----------
    /// * The table, or [`IgrfError::InvalidDegree`] / [`IgrfError::ColatitudeOutOfBounds`].
    pub fn new(nmax: usize, colatitude: Degree) -> Result<Self, IgrfError> {
        if nmax == 0 {
            return Err(IgrfError::InvalidDegree(
                "Legendre table needs nmax >= 1".into(),
            ));
        }
        if !(0.0..=180.0).contains(&colatitude) {
            return Err(IgrfError::ColatitudeOutOfBounds(colatitude));
        }

        // sin θ straight from θ stays accurate a hair away from the poles
        let (sin_theta, cos_theta) = colatitude.to_radians().sin_cos();

        let rootn: Vec<f64> = (0..=(2 * nmax * nmax).max(2 * nmax + 2))
            .map(|k| (k as f64).sqrt())
            .collect();

        let mut pnm = DMatrix::<f64>::zeros(nmax + 1, nmax + 2);
        pnm[(0, 0)] = 1.0;
        pnm[(1, 1)] = sin_theta;

        for m in 0..nmax {
            let pmm = rootn[2 * m + 1] * pnm[(m, m)];
            pnm[(m + 1, m)] = cos_theta * pmm;

            if m > 0 {
                pnm[(m + 1, m + 1)] = sin_theta * pmm / rootn[2 * m + 2];
            }

            for n in m + 2..=nmax {
                let d = n * n - m * m;
                let e = 2 * n - 1;
                pnm[(n, m)] = (e as f64 * cos_theta * pnm[(n - 1, m)]
                    - rootn[d - e] * pnm[(n - 2, m)])
                    / rootn[d];
            }
        }

        pnm[(0, 2)] = -pnm[(1, 1)];
        pnm[(1, 2)] = pnm[(1, 0)];
        for n in 2..=nmax {
            let nf = n as f64;
            let nn = nf * nf + nf;

            pnm[(0, n + 1)] = -(nn / 2.0).sqrt() * pnm[(n, 1)];
            pnm[(1, n + 1)] =
                ((2.0 * nn).sqrt() * pnm[(n, 0)] - (nn - 2.0).sqrt() * pnm[(n, 2)]) / 2.0;

            for m in 2..n {
                let mf = m as f64;
                pnm[(m, n + 1)] = 0.5
                    * (((nf + mf) * (nf - mf + 1.0)).sqrt() * pnm[(n, m - 1)]
                        - ((nf + mf + 1.0) * (nf - mf)).sqrt() * pnm[(n, m + 1)]);
            }

            pnm[(n, n + 1)] = (2.0 * nf).sqrt() * pnm[(n, n - 1)] / 2.0;
        }

        Ok(LegendreTable {
            nmax,
            pnm,
            sin_theta,
            pole: Pole::from_colatitude(colatitude),
        })
    }

    pub fn nmax(&self) -> usize {
        self.nmax
    }

    /// sin θ of the evaluation colatitude.
    pub fn sin_theta(&self) -> f64 {
        self.sin_theta
    }

    /// Pole reached by the evaluation colatitude, if any.
    pub fn pole(&self) -> Option<Pole> {
        self.pole
    }

    /// Raw storage, see the module documentation for the layout.
    pub fn as_matrix(&self) -> &DMatrix<f64> {
        &self.pnm
    }

    /// `P(n, m)(cos θ)`.
    #[inline]
    pub fn value(&self, n: usize, m: usize) -> f64 {
        debug_assert!(m <= n && n <= self.nmax);
        self.pnm[(n, m)]
    }

    /// `dP(n, m)/dθ`.
    #[inline]
    pub fn theta_derivative(&self, n: usize, m: usize) -> f64 {
        debug_assert!(m <= n && n <= self.nmax);
        self.pnm[(m, n + 1)]
    }

    /// `P(n, m) / sin θ`, replaced by its limit `±dP(n, m)/dθ` at the poles.
    #[inline]
    pub fn value_over_sin_theta(&self, n: usize, m: usize) -> f64 {
        match self.pole {
            Some(Pole::North) => self.theta_derivative(n, m),
            Some(Pole::South) => -self.theta_derivative(n, m),
            None => self.value(n, m) / self.sin_theta,
        }
    }
}

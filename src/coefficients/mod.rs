//! # Spherical-harmonic coefficient tables (SHC)
//!
//! This module loads the **Gauss coefficients** (g, h) of the International
//! Geomagnetic Reference Field from the fixed SHC text format and exposes them as an
//! immutable, time-indexed [`CoefficientModel`](crate::coefficients::CoefficientModel).
//!
//! ## Public API
//!
//! ### [`crate::coefficients::ShcModel`]
//! Enumeration of the embedded model generations:
//!
//! - `ShcModel::Igrf13` – 13th generation, epochs 1900–2025
//! - `ShcModel::Igrf14` – 14th generation, epochs 1900–2030 (default)
//!
//! ```rust
//! use igrf::coefficients::ShcModel;
//!
//! let generation: ShcModel = "IGRF-13".parse().unwrap();
//! let model = generation.coefficient_model().unwrap();
//! assert_eq!(model.nmax(), 13);
//! ```
//!
//! Each embedded table is parsed **once per process** and shared as a
//! `&'static CoefficientModel`; the model is read-only, so any number of threads
//! can evaluate against it concurrently.
//!
//! ### [`crate::coefficients::CoefficientModel`]
//!
//! Built from arbitrary SHC text with
//! [`CoefficientModel::from_shc_str`](crate::coefficients::CoefficientModel::from_shc_str)
//! or from a file with
//! [`CoefficientModel::from_shc_file`](crate::coefficients::CoefficientModel::from_shc_file).
//!
//! ## SHC format
//!
//! ```text
//! # IGRF 13                                   <- first comment line = model name
//! # ...                                       <- other comments are skipped
//! 1  13 26 2 1 1900.0 2025.0                  <- nmin nmax N order step start_year end_year
//!    1900.0 1905.0 ... 2025.0                 <- N epochs
//!  1   0 -31543 -31464 ... -29376.3           <- n m c_1 ... c_N
//!  1   1  -2298  -2298 ...  -1413.9           <- cosine term (g)
//!  1  -1   5922   5909 ...   4523.0           <- sine term (h), order sign is not relied on
//! ```
//!
//! Coefficient rows follow the canonical order: for each degree `n`, the `m = 0`
//! term, then for `m = 1..=n` the cosine term followed by the sine term. The
//! loader checks that order row by row, so a missing or duplicated row is a
//! load-time error and never a silently shifted coefficient.
pub mod interpolation;
mod shc_parser;

use std::{fmt, str::FromStr};

use camino::Utf8Path;
use itertools::Itertools;
use nalgebra::DMatrix;
use once_cell::sync::OnceCell;
use tracing::debug;

use crate::{constants::DecimalYear, igrf_errors::IgrfError};
use shc_parser::{parse_coefficient_row, parse_epochs, parse_header};

static IGRF13_SHC: &str = include_str!("data_models/igrf13.shc");
static IGRF14_SHC: &str = include_str!("data_models/igrf14.shc");

static IGRF13_MODEL: OnceCell<CoefficientModel> = OnceCell::new();
static IGRF14_MODEL: OnceCell<CoefficientModel> = OnceCell::new();

/// Embedded IGRF model generations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ShcModel {
    Igrf13,
    #[default]
    Igrf14,
}

impl ShcModel {
    /// Raw SHC text of this generation.
    pub fn shc_table(&self) -> &'static str {
        match self {
            ShcModel::Igrf13 => IGRF13_SHC,
            ShcModel::Igrf14 => IGRF14_SHC,
        }
    }

    /// Parsed coefficient model of this generation.
    ///
    /// The table is parsed on first access and cached for the lifetime of the
    /// process; later calls return the same reference.
    ///
    /// Return
    /// ----------
    /// * The shared [`CoefficientModel`], or the [`IgrfError`] raised while parsing
    ///   the embedded table.
    pub fn coefficient_model(&self) -> Result<&'static CoefficientModel, IgrfError> {
        let cell = match self {
            ShcModel::Igrf13 => &IGRF13_MODEL,
            ShcModel::Igrf14 => &IGRF14_MODEL,
        };
        cell.get_or_try_init(|| CoefficientModel::from_shc_str(self.shc_table()))
    }
}

impl fmt::Display for ShcModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShcModel::Igrf13 => write!(f, "IGRF13"),
            ShcModel::Igrf14 => write!(f, "IGRF14"),
        }
    }
}

impl FromStr for ShcModel {
    type Err = IgrfError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .collect::<String>()
            .to_ascii_uppercase();
        match normalized.as_str() {
            "IGRF13" => Ok(ShcModel::Igrf13),
            "IGRF14" => Ok(ShcModel::Igrf14),
            _ => Err(IgrfError::InvalidShcModel(format!("Invalid SHC model: {s}"))),
        }
    }
}

impl TryFrom<&str> for ShcModel {
    type Error = IgrfError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Parameter line of an SHC table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShcHeader {
    /// Lowest degree present in the table.
    pub nmin: usize,
    /// Highest degree present in the table.
    pub nmax: usize,
    /// Number of tabulated epochs.
    pub n_epochs: usize,
    /// Order of the temporal interpolation (2 = piecewise linear).
    pub order: usize,
    /// Number of splines per epoch step.
    pub step: usize,
    pub start_year: DecimalYear,
    pub end_year: DecimalYear,
}

/// Number of coefficients for degrees `nmin..=nmax`, i.e. `(nmax + 1)² - nmin²`.
///
/// For `nmin = 1` this is `nmax² + 2·nmax` (195 for degree 13).
pub fn coefficient_count(nmin: usize, nmax: usize) -> usize {
    (nmax + 1) * (nmax + 1) - nmin * nmin
}

/// Canonical `(n, m)` sequence of an SHC table: one `m = 0` row per degree,
/// then a cosine/sine pair for every `m = 1..=n`.
pub(crate) fn canonical_degree_order(
    nmin: usize,
    nmax: usize,
) -> impl Iterator<Item = (usize, usize)> {
    (nmin..=nmax).flat_map(|n| {
        std::iter::once((n, 0)).chain((1..=n).flat_map(move |m| [(n, m), (n, m)]))
    })
}

/// Time-indexed Gauss coefficients of one model generation.
///
/// `coefficients` is an `N × E` matrix: row `i` is the time series of the i-th
/// coefficient in canonical order, column `j` holds every coefficient at
/// `epochs[j]`.
///
/// Invariants (checked at load time)
/// -----------------
/// * `epochs` is strictly increasing and holds at least two values.
/// * `coefficients.ncols() == epochs.len()`.
/// * `coefficients.nrows() == nmax² + 2·nmax`.
#[derive(Debug, Clone, PartialEq)]
pub struct CoefficientModel {
    name: String,
    header: ShcHeader,
    epochs: Vec<DecimalYear>,
    coefficients: DMatrix<f64>,
}

impl CoefficientModel {
    /// Parse an SHC table held in memory.
    ///
    /// The first comment line becomes the model name (without the leading `#`).
    ///
    /// Arguments
    /// -----------------
    /// * `table`: full text of the SHC table.
    ///
    /// Return
    /// ----------
    /// * The parsed model, or a format error:
    ///   [`IgrfError::InvalidHeader`], [`IgrfError::NomParsingError`],
    ///   [`IgrfError::EpochCountMismatch`], [`IgrfError::NonMonotonicEpochs`],
    ///   [`IgrfError::ColumnCountMismatch`], [`IgrfError::UnexpectedDegreeOrder`]
    ///   or [`IgrfError::RowCountMismatch`].
    pub fn from_shc_str(table: &str) -> Result<Self, IgrfError> {
        Self::parse_table(table, None)
    }

    /// Read and parse an SHC file; the model is named after the file.
    ///
    /// See also
    /// ------------
    /// * [`CoefficientModel::from_shc_str`] – in-memory variant and error list.
    pub fn from_shc_file(path: &Utf8Path) -> Result<Self, IgrfError> {
        let table = std::fs::read_to_string(path)?;
        Self::parse_table(&table, path.file_name())
    }

    fn parse_table(table: &str, file_name: Option<&str>) -> Result<Self, IgrfError> {
        let mut name: Option<String> = file_name.map(str::to_string);
        let mut header: Option<ShcHeader> = None;
        let mut epochs: Option<Vec<f64>> = None;
        let mut rows: Vec<Vec<f64>> = Vec::new();
        let mut expected_order: Option<Box<dyn Iterator<Item = (usize, usize)>>> = None;

        for (index, raw_line) in table.lines().enumerate() {
            let line_number = index + 1;
            let line = raw_line.trim();
            if line.is_empty() {
                continue;
            }

            if let Some(comment) = line.strip_prefix('#') {
                if name.is_none() {
                    name = Some(comment.trim().to_string());
                }
                continue;
            }

            let Some(header) = header else {
                let (_, parsed) = parse_header(line)
                    .map_err(|_e| IgrfError::InvalidHeader(line.to_string()))?;
                header = Some(Self::validate_header(parsed)?);
                continue;
            };

            let Some(epochs) = epochs.as_ref() else {
                let (_, parsed) =
                    parse_epochs(line).map_err(|_e| IgrfError::NomParsingError(line.to_string()))?;
                if parsed.len() != header.n_epochs {
                    return Err(IgrfError::EpochCountMismatch {
                        expected: header.n_epochs,
                        found: parsed.len(),
                    });
                }
                if !parsed.iter().tuple_windows().all(|(a, b)| a < b) {
                    return Err(IgrfError::NonMonotonicEpochs);
                }
                epochs = Some(parsed);
                expected_order = Some(Box::new(canonical_degree_order(
                    header.nmin,
                    header.nmax,
                )));
                continue;
            };

            let (_, (n, m, values)) = parse_coefficient_row(line)
                .map_err(|_e| IgrfError::NomParsingError(line.to_string()))?;

            if values.len() != epochs.len() {
                return Err(IgrfError::ColumnCountMismatch {
                    line: line_number,
                    expected: epochs.len() + 2,
                    found: values.len() + 2,
                });
            }

            let expected = expected_order.as_mut().and_then(|order| order.next());
            match expected {
                Some((expected_n, expected_m))
                    if n.unsigned_abs() as usize == expected_n
                        && m.unsigned_abs() as usize == expected_m => {}
                Some((expected_n, expected_m)) => {
                    return Err(IgrfError::UnexpectedDegreeOrder {
                        line: line_number,
                        expected_n,
                        expected_m,
                        found_n: n,
                        found_m: m,
                    })
                }
                None => {
                    return Err(IgrfError::RowCountMismatch {
                        expected: coefficient_count(header.nmin, header.nmax),
                        found: rows.len() + 1,
                    })
                }
            }

            rows.push(values);
        }

        let header =
            header.ok_or_else(|| IgrfError::InvalidHeader("missing parameter line".into()))?;
        let epochs = epochs.ok_or_else(|| IgrfError::InvalidHeader("missing epoch line".into()))?;

        let expected_rows = coefficient_count(header.nmin, header.nmax);
        if rows.len() != expected_rows {
            return Err(IgrfError::RowCountMismatch {
                expected: expected_rows,
                found: rows.len(),
            });
        }

        let coefficients =
            DMatrix::from_row_iterator(rows.len(), epochs.len(), rows.into_iter().flatten());

        let model = CoefficientModel {
            name: name.unwrap_or_else(|| "SHC Name Unknown".to_string()),
            header,
            epochs,
            coefficients,
        };

        debug!(
            name = %model.name,
            nmax = model.nmax(),
            first_epoch = model.first_epoch(),
            last_epoch = model.last_epoch(),
            "loaded SHC coefficient table"
        );

        Ok(model)
    }

    fn validate_header(header: ShcHeader) -> Result<ShcHeader, IgrfError> {
        if header.nmin != 1 {
            return Err(IgrfError::InvalidHeader(format!(
                "tables must start at degree 1, found nmin = {}",
                header.nmin
            )));
        }
        if header.nmax < header.nmin {
            return Err(IgrfError::InvalidHeader(format!(
                "nmax = {} is lower than nmin = {}",
                header.nmax, header.nmin
            )));
        }
        if header.n_epochs < 2 {
            return Err(IgrfError::InvalidHeader(format!(
                "at least two epochs are required, found {}",
                header.n_epochs
            )));
        }
        Ok(header)
    }

    /// Display name (first comment line, or file name for file-based models).
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn header(&self) -> &ShcHeader {
        &self.header
    }

    /// Maximum spherical-harmonic degree of the table.
    pub fn nmax(&self) -> usize {
        self.header.nmax
    }

    pub fn epochs(&self) -> &[DecimalYear] {
        &self.epochs
    }

    pub fn first_epoch(&self) -> DecimalYear {
        self.epochs[0]
    }

    pub fn last_epoch(&self) -> DecimalYear {
        self.epochs[self.epochs.len() - 1]
    }

    /// `N × E` coefficient matrix, rows in canonical `(n, m)` order.
    pub fn coefficients(&self) -> &DMatrix<f64> {
        &self.coefficients
    }

    /// Number of coefficients per epoch.
    pub fn coefficient_count(&self) -> usize {
        self.coefficients.nrows()
    }
}

use thiserror::Error;

#[derive(Error, Debug)]
pub enum IgrfError {
    #[error("Error during the nom parsing of SHC line: {0}")]
    NomParsingError(String),

    #[error("Invalid SHC header: {0}")]
    InvalidHeader(String),

    #[error("SHC line {line}: expected {expected} columns, found {found}")]
    ColumnCountMismatch {
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error("SHC table holds {found} coefficient rows, expected {expected}")]
    RowCountMismatch { expected: usize, found: usize },

    #[error("SHC epoch line holds {found} epochs, header announces {expected}")]
    EpochCountMismatch { expected: usize, found: usize },

    #[error("SHC line {line}: expected degree/order ({expected_n}, {expected_m}), found ({found_n}, {found_m})")]
    UnexpectedDegreeOrder {
        line: usize,
        expected_n: usize,
        expected_m: usize,
        found_n: i32,
        found_m: i32,
    },

    #[error("SHC epochs are not strictly increasing")]
    NonMonotonicEpochs,

    #[error("Unable to perform file operation: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid SHC model: {0}")]
    InvalidShcModel(String),

    #[error("Invalid calendar date: {0}")]
    InvalidDate(String),

    #[error("Year {year} precedes the first model epoch {first_epoch}")]
    DateBeforeFirstEpoch { year: f64, first_epoch: f64 },

    #[error("Invalid spherical harmonic degree: {0}")]
    InvalidDegree(String),

    #[error("Colatitude outside bounds [0, 180]: {0}")]
    ColatitudeOutOfBounds(f64),

    #[error("Latitude outside bounds [-90, 90]: {0}")]
    InvalidLatitude(f64),

    #[error("Non-finite {name}: {value}")]
    NonFiniteCoordinate { name: &'static str, value: f64 },

    #[error("Invalid synthesis parameter: {0}")]
    InvalidSynthesisParameter(String),
}

impl PartialEq for IgrfError {
    fn eq(&self, other: &Self) -> bool {
        use IgrfError::*;
        match (self, other) {
            (NomParsingError(a), NomParsingError(b)) => a == b,
            (InvalidHeader(a), InvalidHeader(b)) => a == b,
            (
                ColumnCountMismatch {
                    line: l1,
                    expected: e1,
                    found: f1,
                },
                ColumnCountMismatch {
                    line: l2,
                    expected: e2,
                    found: f2,
                },
            ) => l1 == l2 && e1 == e2 && f1 == f2,
            (
                RowCountMismatch {
                    expected: e1,
                    found: f1,
                },
                RowCountMismatch {
                    expected: e2,
                    found: f2,
                },
            ) => e1 == e2 && f1 == f2,
            (
                EpochCountMismatch {
                    expected: e1,
                    found: f1,
                },
                EpochCountMismatch {
                    expected: e2,
                    found: f2,
                },
            ) => e1 == e2 && f1 == f2,
            (
                UnexpectedDegreeOrder {
                    line: l1,
                    expected_n: en1,
                    expected_m: em1,
                    found_n: fn1,
                    found_m: fm1,
                },
                UnexpectedDegreeOrder {
                    line: l2,
                    expected_n: en2,
                    expected_m: em2,
                    found_n: fn2,
                    found_m: fm2,
                },
            ) => l1 == l2 && en1 == en2 && em1 == em2 && fn1 == fn2 && fm1 == fm2,

            // io::Error is not comparable: same variant is enough
            (IoError(_), IoError(_)) => true,

            (InvalidShcModel(a), InvalidShcModel(b)) => a == b,
            (InvalidDate(a), InvalidDate(b)) => a == b,
            (
                DateBeforeFirstEpoch {
                    year: y1,
                    first_epoch: f1,
                },
                DateBeforeFirstEpoch {
                    year: y2,
                    first_epoch: f2,
                },
            ) => y1 == y2 && f1 == f2,
            (InvalidDegree(a), InvalidDegree(b)) => a == b,
            (ColatitudeOutOfBounds(a), ColatitudeOutOfBounds(b)) => a == b,
            (InvalidLatitude(a), InvalidLatitude(b)) => a == b,
            (
                NonFiniteCoordinate {
                    name: n1,
                    value: v1,
                },
                NonFiniteCoordinate {
                    name: n2,
                    value: v2,
                },
            ) => n1 == n2 && (v1 == v2 || (v1.is_nan() && v2.is_nan())),
            (InvalidSynthesisParameter(a), InvalidSynthesisParameter(b)) => a == b,

            (NonMonotonicEpochs, NonMonotonicEpochs) => true,

            _ => false,
        }
    }
}

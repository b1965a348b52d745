pub mod coefficients;
pub mod constants;
pub mod field;
pub mod geodesy;
pub mod geomagnetic;
pub mod igrf_errors;
pub mod legendre;
pub mod synthesis;
pub mod time;

pub use coefficients::{CoefficientModel, ShcModel};
pub use geomagnetic::{evaluate, GeomagneticQuery, GeomagneticResult};
pub use igrf_errors::IgrfError;

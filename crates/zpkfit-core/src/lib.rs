//! zpkfit-core: rational ZPK fitting of frequency responses
//!
//! Fits a complex frequency response with a zero-pole-gain model using the
//! AAA barycentric algorithm, searches for the largest stable truncation,
//! refines the result with Levenberg-Marquardt and reflects any remaining
//! right-half-plane poles.
//!
//! ## Modules
//!
//! - `response` - Frequency response samples and weights
//! - `hints` - Layered key-value configuration lookup
//! - `math` - Linear algebra helpers
//! - `aaa` - AAA barycentric rational approximation
//! - `zpk` - Root codings, ZPK fitter and local optimizer
//! - `fit` - Order resolution, stability search, stabilization and assembly

pub mod aaa;
pub mod constants;
pub mod error;
pub mod fit;
pub mod hints;
pub mod math;
pub mod response;
pub mod zpk;

pub use error::{FitError, Result};
pub use fit::{fit_aaa, FitAid, FitOutcome, FitSession};
pub use hints::{HintStore, HintValue};
pub use response::ResponseData;
pub use zpk::{CodingMap, ZpkFitter};

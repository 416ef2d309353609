//! Zero-pole-gain models
//!
//! Root sets, root codings (second-order sections and real/imaginary pairs),
//! the `ZpkFitter` that binds a coded model to weighted response data, and
//! the Levenberg-Marquardt optimizer used to refine it.

pub mod coding;
mod fitter;
pub mod model;
pub mod optimize;
pub mod roots;

pub use coding::{CodingId, CodingMap, Factor};
pub use fitter::{CodingScope, ZpkFitter};
pub use optimize::{OptimizeOptions, OptimizeReport};
pub use roots::RootSet;

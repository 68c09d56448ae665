//! Backend services.
//!
//! - [`convert`] - Options lookup, CSV conversion upload and result download

pub mod convert;

pub use convert::*;

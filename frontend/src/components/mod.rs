//! UI Components for the camconv application.
//!
//! # Layout Components
//! - [`Header`] - Title bar with engine status
//! - [`Hero`] - Main title and description
//! - [`Footer`] - Page footer
//!
//! # Feature Components
//! - [`UploadSection`] - CSV file picker, image type and transform toggle
//! - [`ParamsPanel`] - Source or target frame, coordinates, datum and epoch
//! - [`ResultSection`] - Transformation details, preview and download
//! - [`LogsPanel`] - Real-time conversion logs (SSE)

mod header;
mod hero;
mod upload;
mod params;
mod result;
mod footer;
mod logs;

pub use header::*;
pub use hero::*;
pub use upload::*;
pub use params::*;
pub use result::*;
pub use footer::*;
pub use logs::*;

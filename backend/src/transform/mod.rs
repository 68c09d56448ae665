//! Transformation module.
//!
//! This module handles the coordinate conversion of validated tables:
//! - Service: one engine call per table, output table, inspection
//! - Inspection: read-only snapshot of the last run
//! - Pipeline: parse, validate, transform, write

pub mod inspection;
pub mod pipeline;
pub mod service;

pub use inspection::InspectionSnapshot;
pub use pipeline::*;
pub use service::{format_coordinates, write_coordinates, TransformationService, DEFAULT_SAMPLE_ROWS};

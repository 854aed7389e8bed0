//! Generator for OpenDRIVE road networks.
//!
//! A network is described as a list of segments (standalone roads and
//! junctions built from a small set of junction types) and the links between
//! them. Each segment is generated in its own frame, then the segments are
//! moved into place and the result is written as OpenDRIVE 1.5.

pub mod config;
pub mod error;
pub mod generation;
pub mod linking;
pub mod validate;
pub mod opendrive;
pub mod pipeline;

pub use error::{Error, Result};
pub use pipeline::{execute_pipeline, generate, Options};

//! # Core Module
//!
//! The stateless foundation of the library: data models and the I/O helpers that
//! move them in and out of text.
//!
//! ## Architecture
//!
//! - **Data Models** ([`models`]) - Samples, ladder steps, measurements, parameter
//!   values and protocol templates
//! - **I/O** ([`io`]) - Template sources, request parsing and CSV report export
//!
//! Nothing in this module performs network access. Filesystem access is limited
//! to reading templates and request files on explicit request.

pub mod io;
pub mod models;

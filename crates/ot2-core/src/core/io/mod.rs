//! Reading and writing the files that surround a run.
//!
//! - [`templates`] - Built-in and on-disk protocol templates
//! - [`request`] - Operator requests (TOML or JSON) and their validation
//! - [`report`] - CSV export of the per-sample summary

pub mod report;
pub mod request;
pub mod templates;

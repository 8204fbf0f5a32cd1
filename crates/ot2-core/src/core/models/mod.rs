//! # Core Models Module
//!
//! Data structures shared by every stage of protocol generation.
//!
//! ## Key Components
//!
//! - [`sample`] - Samples and the dilution ladder prepared for each of them
//! - [`measurement`] - Operator-entered concentrations, keyed by dilution factor
//! - [`selection`] - The validated outcome of the operator's dilution choice
//! - [`value`] - The closed set of value kinds a parameter block may hold
//! - [`template`] - Protocol templates and the location of their parameter slot
//!
//! Samples are created from caller input and only ever gain computed results;
//! their identifiers never change once constructed.

pub mod measurement;
pub mod sample;
pub mod selection;
pub mod template;
pub mod value;

//! # OT-2 Protocols Core Library
//!
//! Generates ready-to-run Opentrons OT-2 protocol scripts from operator
//! requests. The central workflow prepares Sanger sequencing samples: each
//! sample is diluted across a ladder, the operator records concentrations,
//! and the library validates the chosen dilution, embeds every computed value
//! into a protocol template and summarizes the run.
//!
//! ## Layers
//!
//! - **[`core`]: Data and files.** Samples, measurements, parameter values and
//!   templates, plus request parsing and CSV export.
//!
//! - **[`engine`]: The computation.** Dilution planning, selection and yield,
//!   parameter blocks, template merging and report assembly. Nothing here
//!   performs network I/O or reads the environment; configuration is passed
//!   in explicitly.
//!
//! - **[`workflows`]: Complete protocols.** Ties the engine together for the
//!   Sanger workflow and the smaller ELISA, labware and calibration generators.

pub mod core;
pub mod engine;
pub mod workflows;

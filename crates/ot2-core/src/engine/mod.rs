//! # Engine Module
//!
//! The computation behind a protocol run: every stage here is a pure
//! function of its inputs, so identical inputs give identical plans, blocks
//! and scripts.
//!
//! ## Stages
//!
//! - **Dilution Planner** ([`planner`]) - Volumes for each step of a sample's ladder
//! - **Selection & Yield** ([`selection`]) - Validates the operator's chosen dilution
//!   against the measured concentration and computes the transferable mass
//! - **Parameter Blocks** ([`parameters`]) - Deterministic serialization of run parameters
//! - **Template Merger** ([`merger`]) - Splices a parameter block into a protocol template
//! - **Report Assembler** ([`report`]) - One summary row per sample
//!
//! Supporting modules hold the run configuration ([`config`]), the error
//! taxonomy ([`error`]) and progress reporting ([`progress`]).

pub mod config;
pub mod error;
pub mod merger;
pub mod parameters;
pub mod planner;
pub mod progress;
pub mod report;
pub mod selection;

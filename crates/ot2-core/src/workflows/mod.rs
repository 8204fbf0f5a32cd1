//! # Workflows Module
//!
//! Complete protocol generators built on the engine.
//!
//! - **Sanger** ([`sanger`]) - Dilution ladders, operator-validated selections,
//!   the merged script, the per-sample report and the sequencing order payload
//! - **ELISA** ([`elisa`]), **Labware** ([`labware`]) and **Calibration**
//!   ([`calibrate`]) - Fixed templates with small parameter blocks
//!
//! Every generator implements [`protocol::Protocol`].

pub mod calibrate;
pub mod elisa;
pub mod labware;
pub mod protocol;
pub mod sanger;

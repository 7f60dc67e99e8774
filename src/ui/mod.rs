//! ui
//!
//! User interaction utilities.
//!
//! # Modules
//!
//! - [`output`] - Progress, results, warnings and JSON on the console
//!
//! All console output from commands goes through this module so that
//! `--quiet` and `--json` are honoured in one place.

pub mod output;

//! wry - Salesforce org reference data and fixture substitution
//!
//! wry is a single-binary tool that queries a Salesforce org for reference
//! data (record types, user roles, record counts, limits) and copies fixture
//! directories with `$R{key}` placeholders resolved to org-specific ids.
//!
//! # Architecture
//!
//! - [`cli`] - Command-line interface layer (parses args, delegates to core)
//! - [`core`] - Reference data, substitution, tree transform, reports, config
//! - [`org`] - Access to an org's REST API behind the `OrgApi` trait
//! - [`secrets`] - Secret storage abstraction for access tokens
//! - [`ui`] - Console output
//!
//! # Guarantees
//!
//! 1. A transform never writes over existing files unless asked to
//! 2. Unknown placeholder keys fail the run unless explicitly kept
//! 3. Output order is deterministic

pub mod cli;
pub mod core;
pub mod org;
pub mod secrets;
pub mod ui;

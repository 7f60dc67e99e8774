//! core
//!
//! Domain logic for wry, independent of the command line.
//!
//! # Modules
//!
//! - [`config`] - Configuration schema and loading
//! - [`reference`] - Record type and role lookup table
//! - [`substitute`] - `$R{key}` and record type rewrites on text
//! - [`transform`] - Directory tree mirroring with substitution
//! - [`count`] - Record-count reporter
//! - [`limits`] - Org-limits reporter
//! - [`selection`] - Comma-separated name lists with `ALL`
//!
//! Everything that talks to an org takes `&dyn OrgApi`, so the same code
//! runs against the REST client and the mock.

pub mod config;
pub mod count;
pub mod limits;
pub mod reference;
pub mod selection;
pub mod substitute;
pub mod transform;

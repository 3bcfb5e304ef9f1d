//! # Lane Siege Development Tools
//!
//! Command-line tools for development:
//! - Unit catalog validation
//! - Export of the built-in roster as an editable RON file

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod validate;

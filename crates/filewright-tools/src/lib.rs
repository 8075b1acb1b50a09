//! Tools exposed to the language model.
//!
//! Each tool owns its wire-level definition (name, description, JSON schema)
//! and an `invoke` boundary that never lets a failure escape as an error.

pub mod file_ops;

pub use file_ops::*;

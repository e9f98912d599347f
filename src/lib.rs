//! Core library for the observatum-tools command line application.
//!
//! The library exposes the diagnostic helpers that power the command-line
//! interface as well as the integration tests. The modules are structured to
//! keep responsibilities narrow and composable: source adapters live under
//! [`observatum::tools::source`], data representations inside
//! [`observatum::tools::model`], the key comparison logic in
//! [`observatum::tools::check`], the key-field inventory in
//! [`observatum::tools::inventory`], and report rendering under
//! [`observatum::tools::report`].

pub mod observatum;

pub use observatum::tools::{Result, ToolError, check, error, inventory, model, report, source};

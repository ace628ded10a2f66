//! Driver-facing adapters. Nothing in the core depends on these.

pub mod csv;

//! Command-line surface of the exposure engine.
//!
//! Reads namespace snapshots from YAML or JSON files, runs the read or write path against them,
//! and prints the result as JSON. Nothing is applied to a cluster.

#![deny(warnings, rust_2018_idioms)]
#![forbid(unsafe_code)]

mod args;
mod snapshot;

pub use self::{args::Args, snapshot::Snapshot};

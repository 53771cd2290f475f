//! Write path of the exposure engine.
//!
//! [`Synthesizer`] builds new routing objects for a workload from the editable network model.
//! [`Planner`] turns a single requested change into the ordered create, update, and delete actions
//! a caller applies to the cluster. Nothing here talks to the cluster.

#![deny(warnings, rust_2018_idioms)]
#![forbid(unsafe_code)]

mod error;
mod planner;
mod synth;


pub use self::{
    error::PlanError,
    planner::{plan, LiveObjects, Planner},
    synth::{synthesize_network, Synthesizer},
};

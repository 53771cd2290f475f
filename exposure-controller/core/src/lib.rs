#![deny(warnings, rust_2018_idioms)]
#![forbid(unsafe_code)]

mod config;
pub mod network;
mod port;
pub mod relation;
pub mod update;
mod workload;

pub use self::{
    config::ExposureConfig,
    port::{
        check_node_port, protocol_from_port_name, NodePortRangeError, PortRef, TransportPort,
        NAMED_PROTOCOLS, NODE_PORT_RANGE,
    },
    workload::Workload,
};

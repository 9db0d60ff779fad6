// Domain layer: replication models and the ports a host implements.

pub mod model;
pub mod ports;

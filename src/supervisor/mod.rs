mod connection_supervisor;

pub use connection_supervisor::*;

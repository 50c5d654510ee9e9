// Domain layer: models and the provider ports the core talks through.

pub mod model;
pub mod ports;

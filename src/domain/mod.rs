// Domain layer: the document, rule outcomes and the ports the engine talks through.

pub mod model;
pub mod ports;

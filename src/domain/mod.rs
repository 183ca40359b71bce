// Domain layer: models, ports and the static country table.

pub mod countries;
pub mod model;
pub mod ports;

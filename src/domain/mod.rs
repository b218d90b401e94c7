// Domain layer: option types and ports (interfaces) shared by core and config.

pub mod model;
pub mod ports;

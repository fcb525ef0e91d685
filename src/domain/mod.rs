// Domain layer: document model, styles and ports. No I/O here.

pub mod model;
pub mod ports;
pub mod style;

// Domain layer: models and ports shared by the three reconciliation stages.

pub mod model;
pub mod ports;

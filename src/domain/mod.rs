// Domain layer: identity/phone rules, page model and ports. No I/O here.

pub mod identity;
pub mod model;
pub mod phone;
pub mod ports;

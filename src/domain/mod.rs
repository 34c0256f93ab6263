//! Cart domain: pricing, the cart aggregate, its events and ports.
pub mod aggregates;
pub mod events;
pub mod ports;
pub mod pricing;
pub mod value_objects;

//! Domain layer: value objects, aggregates, events and pricing.
pub mod value_objects;
pub mod aggregates;
pub mod events;
pub mod pricing;

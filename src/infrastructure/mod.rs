//! Adapters for the domain ports.
pub mod memory;
pub mod nats;
pub mod postgres;

pub use memory::{InMemoryCartStore, InMemoryCatalog, RecordingPublisher};
pub use nats::NatsPublisher;
pub use postgres::{PgCartStore, PgCatalog};

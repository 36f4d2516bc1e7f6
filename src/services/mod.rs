// Service exports
pub mod memory;
pub mod postgres;
pub mod registry;

pub use memory::InMemoryRegistry;
pub use postgres::PostgisRegistry;
pub use registry::{ParcelRegistry, RegistryError};

//! Implementations of the ports (in-memory, for development and tests).

pub mod inmem_api;

pub use self::inmem_api::InMemoryCloudApi;

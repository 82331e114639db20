//! Identity backend implementations.

mod memory;

pub use memory::InMemoryIdentityProvider;

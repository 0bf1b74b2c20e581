//! State store adapters.

pub mod local;
pub mod memory;

pub use local::LocalStateStore;
pub use memory::InMemoryStateStore;

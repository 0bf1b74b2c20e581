//! Program storage adapters.

pub mod memory;

pub use memory::InMemoryProgramStore;

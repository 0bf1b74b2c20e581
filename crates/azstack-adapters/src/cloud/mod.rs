//! Cloud provider adapters.

pub mod simulated;

pub use simulated::{CloudIdentity, SimulatedCloud, SimulatedResource, snapshot_path};

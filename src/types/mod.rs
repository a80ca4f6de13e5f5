//! Core job inputs: the expanded port set and the resolved target.
//!
//! Both are built once per job and shared read-only by every worker.

mod port;
mod target;

pub use port::{PortSet, MAX_PORT, MIN_PORT};
pub use target::ScanTarget;

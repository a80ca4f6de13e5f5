//! # pentk-scanner - A Concurrent Network Port Scanner
//!
//! The port scanning module of the pentk toolkit. Given a target host and
//! a port specification, it determines the state of each port with one of
//! three strategies and can fingerprint open TCP services by their banner.
//!
//! ## Features
//!
//! - **Multiple Scan Types**: TCP Connect, SYN half-open, and UDP scanning
//! - **Worker Pool**: 1-200 OS threads draining a shared atomic cursor
//! - **Banner Grabbing**: Protocol-aware probes for common services
//! - **Multiple Output Formats**: Console table, plus txt, CSV, and JSON files
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use pentk_scanner::config::ScanOptions;
//! use pentk_scanner::progress::NoProgress;
//! use pentk_scanner::scanner::{run_scan, CancelFlag, ScanJob, ScanType};
//! use pentk_scanner::services::ServiceCatalog;
//! use pentk_scanner::types::{PortSet, ScanTarget};
//!
//! # fn main() -> Result<(), pentk_scanner::ScanError> {
//! let target = ScanTarget::resolve("192.168.1.1")?;
//! let options = ScanOptions::new(ScanType::Connect, 50, 2000);
//! let job = ScanJob::new(target, PortSet::expand("22,80,443"), options)?;
//!
//! let report = run_scan(&job, &ServiceCatalog::new(), &NoProgress, &CancelFlag::new())?;
//! for result in &report.results {
//!     println!("Port {} is {}", result.port, result.status);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - [`types`] - Port set expansion and target resolution
//! - [`scanner`] - The `Scanner` trait, the three strategies, and the worker pool
//! - [`packet`] - IPv4/TCP encoding and checksums for SYN scanning
//! - [`banner`] - Banner grabbing for open TCP ports
//! - [`services`] - Static port to service-name catalog
//! - [`aggregator`] - Shared counters and open-port list
//! - [`progress`] - Progress reporting while workers run
//! - [`output`] - Console table and persisted formats
//! - [`config`] - Scan options and application settings
//! - [`cli`] and [`module`] - The `port-scanner` command and its lifecycle
//! - [`error`] - Error types

pub mod aggregator;
pub mod banner;
pub mod cli;
pub mod config;
pub mod error;
pub mod module;
pub mod output;
pub mod packet;
pub mod progress;
pub mod scanner;
pub mod services;
pub mod types;

// Re-export commonly used types
pub use error::{ConfigError, ScanError};
pub use module::{Module, ModuleInfo, ModuleRegistry};
pub use scanner::{PortResult, PortStatus, ScanType, Scanner};
pub use types::{PortSet, ScanTarget};

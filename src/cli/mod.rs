//! Command surface of the `port-scanner` module.
//!
//! - `port-scanner scan <target> [options]` - Scan a target
//! - `port-scanner help` - Show detailed help

mod scan;

pub use scan::ScanCommand;

use crate::config::AppSettings;
use crate::error::{ScanError, ScanResult};
use crate::module::{Module, ModuleInfo, EXIT_FAILURE, EXIT_SUCCESS};
use crate::output;
use crate::services::ServiceCatalog;
use clap::error::ErrorKind;
use clap::Parser;
use serde::{Deserialize, Serialize};

/// Format of a persisted result file.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// One block per open port
    #[default]
    Txt,
    /// Comma-separated values with a header row
    Csv,
    /// Structured JSON document
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Txt => write!(f, "txt"),
            Self::Csv => write!(f, "csv"),
            Self::Json => write!(f, "json"),
        }
    }
}

const INFO: ModuleInfo = ModuleInfo {
    name: "port-scanner",
    version: env!("CARGO_PKG_VERSION"),
    author: "PenTest Team",
    description: "Port scanner with TCP connect, SYN and UDP scan types",
    category: "scanner",
};

/// Printed when the module is run without a command.
pub const USAGE: &str = "\
Usage: port-scanner <command> [args]
Commands:
  scan <target> [options]    Run a port scan
  help                       Show detailed help

Scan options:
  -p, --ports <range>        Port range (default: 1-1024)
  -t, --threads <count>      Thread count (default: 50)
  -T, --timeout <ms>         Timeout in milliseconds (default: 2000)
  -s, --scan-type <type>     Scan type: connect, syn, udp (default: connect)
  -b, --banner               Enable banner grabbing
  -v, --verbose              Show per-port output
  -o, --output <file>        Output file
  -f, --format <format>      Output format: txt, csv, json (default: txt)
  --no-banner                Hide banners in the console table
";

/// Printed by the `help` command.
pub const LONG_HELP: &str = "\
Port scanner help
=================
A multi-threaded port scanner.

Scan types:
  connect  - TCP connect scan (most common)
  syn      - TCP SYN scan (half-open, requires root)
  udp      - UDP scan (slower)

Port range syntax:
  Single port:  80
  Range:        1-1000
  List:         80,443,8080
  Mixed:        1-100,443,8080-8088

Examples:
  pentk port-scanner scan 192.168.1.1
  pentk port-scanner scan example.com -p 1-65535 -t 100 -s syn
  pentk port-scanner scan 10.0.0.1 -p 80,443,8080 -b -o result.json -f json
";

/// Static help returned through the lifecycle contract.
pub const MODULE_HELP: &str = "\
Port scanner
============
Command: scan <target> [options]

Options:
  -p, --ports <range>     Port range (default: 1-1024)
  -t, --threads <n>       Threads (default: 50, max: 200)
  -T, --timeout <ms>      Timeout (default: 2000)
  -s, --scan-type <type>  Scan type: connect, syn, udp
  -b, --banner            Enable banner grabbing
  -v, --verbose           Show per-port output
  -o, --output <file>     Write results to a file
  -f, --format <format>   Output format: txt, csv, json
  --no-banner             Hide banners in the console table

Note: SYN scanning requires root privileges
";

/// State acquired by `initialize`.
#[derive(Debug)]
struct Loaded {
    catalog: ServiceCatalog,
    settings: AppSettings,
}

/// The `port-scanner` module.
#[derive(Debug, Default)]
pub struct PortScannerModule {
    loaded: Option<Loaded>,
}

impl PortScannerModule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Initialize with explicit settings instead of the settings file.
    pub fn initialize_with(&mut self, settings: AppSettings) {
        let catalog = ServiceCatalog::new();
        tracing::debug!(services = catalog.len(), "service catalog built");
        self.loaded = Some(Loaded { catalog, settings });
    }

    fn run_scan_command(&self, loaded: &Loaded, args: &[String]) -> i32 {
        let cmd = match ScanCommand::try_parse_from(args) {
            Ok(cmd) => cmd,
            Err(e) => {
                return match e.kind() {
                    ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                        let _ = e.print();
                        EXIT_SUCCESS
                    }
                    _ => {
                        let _ = e.print();
                        EXIT_FAILURE
                    }
                };
            }
        };

        match cmd.execute(&loaded.catalog, &loaded.settings) {
            Ok(()) => EXIT_SUCCESS,
            Err(e) => {
                tracing::debug!(error = ?e, "scan aborted");
                output::print_error(&e.to_string());
                EXIT_FAILURE
            }
        }
    }
}

impl Module for PortScannerModule {
    fn info(&self) -> &ModuleInfo {
        &INFO
    }

    fn initialize(&mut self) -> ScanResult<()> {
        self.initialize_with(AppSettings::load_or_default());
        Ok(())
    }

    fn execute(&self, args: &[String]) -> i32 {
        let Some(loaded) = &self.loaded else {
            output::print_error(
                &ScanError::Configuration("module used before initialization".to_string())
                    .to_string(),
            );
            return EXIT_FAILURE;
        };

        let Some(command) = args.first() else {
            print!("{}", USAGE);
            return EXIT_SUCCESS;
        };

        match command.as_str() {
            // clap expects the command name in position 0.
            "scan" => self.run_scan_command(loaded, args),
            "help" => {
                print!("{}", LONG_HELP);
                EXIT_SUCCESS
            }
            other => {
                output::print_error(&format!("unknown command '{}'", other));
                EXIT_FAILURE
            }
        }
    }

    fn cleanup(&mut self) {
        self.loaded = None;
        tracing::debug!("port scanner cleaned up");
    }

    fn help(&self) -> Option<&'static str> {
        Some(MODULE_HELP)
    }
}

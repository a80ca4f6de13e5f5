//! Module lifecycle and registry.
//!
//! A module is a named capability driven through `initialize`, `execute`,
//! and `cleanup`. The registry binds the built-in modules at startup and
//! dispatches tokenized arguments to them by name.

use crate::cli::PortScannerModule;
use crate::error::ScanResult;
use std::fmt;

/// Exit code for a completed command.
pub const EXIT_SUCCESS: i32 = 0;
/// Exit code for configuration, resolution, permission, or dispatch failure.
pub const EXIT_FAILURE: i32 = 1;

/// Descriptive metadata for a module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleInfo {
    pub name: &'static str,
    pub version: &'static str,
    pub author: &'static str,
    pub description: &'static str,
    pub category: &'static str,
}

impl fmt::Display for ModuleInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:<20} {:<10} {:<15} {:<20} {}",
            self.name, self.version, self.category, self.author, self.description
        )
    }
}

/// Lifecycle contract every module implements.
pub trait Module: Send {
    /// Static metadata.
    fn info(&self) -> &ModuleInfo;

    /// Prepare the module for use. Called once before the first `execute`.
    fn initialize(&mut self) -> ScanResult<()>;

    /// Run a command; `args` excludes the module name. Returns an exit code.
    fn execute(&self, args: &[String]) -> i32;

    /// Release whatever `initialize` acquired.
    fn cleanup(&mut self);

    /// Long help text, if the module provides any.
    fn help(&self) -> Option<&'static str> {
        None
    }
}

struct Entry {
    module: Box<dyn Module>,
    initialized: bool,
}

/// Named modules, in registration order.
#[derive(Default)]
pub struct ModuleRegistry {
    entries: Vec<Entry>,
}

impl ModuleRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding every built-in module.
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(PortScannerModule::new()));
        registry
    }

    /// Add a module. A later module with the same name is unreachable.
    pub fn register(&mut self, module: Box<dyn Module>) {
        tracing::debug!(name = module.info().name, "module registered");
        self.entries.push(Entry {
            module,
            initialized: false,
        });
    }

    /// Metadata for every registered module.
    pub fn list(&self) -> impl Iterator<Item = &ModuleInfo> {
        self.entries.iter().map(|e| e.module.info())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up a module by name.
    pub fn get(&self, name: &str) -> Option<&dyn Module> {
        self.entries
            .iter()
            .find(|e| e.module.info().name == name)
            .map(|e| e.module.as_ref())
    }

    /// Initialize `name` if needed, then run `args` through it.
    ///
    /// Returns `EXIT_FAILURE` for an unknown module or a failed
    /// initialization.
    pub fn dispatch(&mut self, name: &str, args: &[String]) -> i32 {
        let Some(entry) = self.entries.iter_mut().find(|e| e.module.info().name == name) else {
            crate::output::print_error(&format!("module '{}' not found", name));
            eprintln!("Use 'pentk --list' to see available modules");
            return EXIT_FAILURE;
        };

        if !entry.initialized {
            if let Err(e) = entry.module.initialize() {
                crate::output::print_error(&format!("failed to initialize {}: {}", name, e));
                return EXIT_FAILURE;
            }
            entry.initialized = true;
        }

        entry.module.execute(args)
    }

    /// Clean up every initialized module.
    pub fn shutdown(&mut self) {
        for entry in self.entries.iter_mut().filter(|e| e.initialized) {
            entry.module.cleanup();
            entry.initialized = false;
        }
    }
}

impl Drop for ModuleRegistry {
    fn drop(&mut self) {
        self.shutdown();
    }
}

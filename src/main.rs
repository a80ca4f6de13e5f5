// pentk - dispatches commands to registered toolkit modules.

use anyhow::Context;
use clap::Parser;
use pentk_scanner::ModuleRegistry;
use tracing_subscriber::EnvFilter;

/// PenTest ToolKit - run a registered module.
#[derive(Parser, Debug)]
#[command(name = "pentk")]
#[command(author = "PenTest Team")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Modular reconnaissance toolkit", long_about = None)]
#[command(after_help = "Examples:\n  pentk --list\n  pentk port-scanner scan 192.168.1.1 -p 1-1000")]
struct Cli {
    /// List all registered modules
    #[arg(short, long)]
    list: bool,

    /// Enable debug logging on stderr
    #[arg(short, long)]
    verbose: bool,

    /// Module to run
    #[arg(value_name = "MODULE")]
    module: Option<String>,

    /// Command and arguments passed to the module
    #[arg(value_name = "ARGS", trailing_var_arg = true, allow_hyphen_values = true)]
    args: Vec<String>,
}

fn init_tracing(verbose: bool) -> anyhow::Result<()> {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default))
        .context("invalid log filter")?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to install tracing subscriber: {e}"))
}

fn print_modules(registry: &ModuleRegistry) {
    if registry.is_empty() {
        println!("No modules loaded");
        return;
    }

    println!("\nLoaded modules ({}):", registry.len());
    println!("{}", "=".repeat(78));
    println!(
        "{:<20} {:<10} {:<15} {:<20} {}",
        "NAME", "VERSION", "CATEGORY", "AUTHOR", "DESCRIPTION"
    );
    println!(
        "{:<20} {:<10} {:<15} {:<20} {}",
        "----", "-------", "--------", "------", "-----------"
    );
    for info in registry.list() {
        println!("{}", info);
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose)?;

    let mut registry = ModuleRegistry::with_builtin();

    if cli.list {
        print_modules(&registry);
        return Ok(());
    }

    let Some(module) = cli.module else {
        println!("Usage: pentk <module> <command> [args]");
        println!("Use 'pentk --help' for more information");
        print_modules(&registry);
        return Ok(());
    };

    let code = registry.dispatch(&module, &cli.args);
    registry.shutdown();
    std::process::exit(code);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_args_forwarded() {
        let cli =
            Cli::try_parse_from(["pentk", "port-scanner", "scan", "127.0.0.1", "-p", "80"]).unwrap();
        assert!(!cli.list);
        assert!(!cli.verbose);
        assert_eq!(cli.module.as_deref(), Some("port-scanner"));
        assert_eq!(cli.args, ["scan", "127.0.0.1", "-p", "80"]);
    }

    #[test]
    fn test_hyphenated_args_stay_with_module() {
        let cli = Cli::try_parse_from([
            "pentk",
            "-v",
            "port-scanner",
            "scan",
            "host",
            "-v",
            "-T",
            "-5",
            "--no-banner",
        ])
        .unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.args, ["scan", "host", "-v", "-T", "-5", "--no-banner"]);
    }

    #[test]
    fn test_list_flag() {
        let cli = Cli::try_parse_from(["pentk", "--list"]).unwrap();
        assert!(cli.list);
        assert!(cli.module.is_none());
        assert!(cli.args.is_empty());

        let registry = ModuleRegistry::with_builtin();
        print_modules(&registry);
        assert!(registry.list().any(|info| info.name == "port-scanner"));
    }

    #[test]
    fn test_init_tracing() {
        init_tracing(false).unwrap();
        // A second global subscriber is refused.
        assert!(init_tracing(true).is_err());
    }
}

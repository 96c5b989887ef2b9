//! seedcodes CLI - rewrite passes for SQL seed files
//!
//! Runs the annotate, add-conflicts and rewrite-refs passes against a seed
//! file, one at a time or chained in a chosen order.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

use seedcodes::entity::EntityKind;
use seedcodes::report::append_reports;
use seedcodes::{run_passes, LookupTable, PassRegistry, RunOptions, SeedError, ToolConfig};

#[derive(Parser)]
#[command(name = "seedcodes")]
#[command(version, about = "Regex rewrite passes for SQL seed files", long_about = None)]
struct Cli {
    /// Path to seedcodes.yaml (default: ./seedcodes.yaml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct FileArgs {
    /// SQL seed file rewritten in place
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Transform and report without writing the file
    #[arg(long)]
    dry_run: bool,

    /// Copy the original to <file>.bak before writing
    #[arg(long)]
    backup: bool,

    /// Append one NDJSON report line per pass to this file
    #[arg(long)]
    report: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Copy entity codes from comments into INSERT statements
    Annotate {
        #[command(flatten)]
        file: FileArgs,
    },

    /// Append ON CONFLICT ... DO NOTHING to INSERT statements
    AddConflicts {
        #[command(flatten)]
        file: FileArgs,
    },

    /// Replace WHERE code = 'X' with WHERE name = 'Y'
    RewriteRefs {
        #[command(flatten)]
        file: FileArgs,

        /// YAML code -> name mapping (default: built-in table)
        #[arg(short, long)]
        lookup: Option<PathBuf>,
    },

    /// Run several passes in the given order over one read/write cycle
    Run {
        #[command(flatten)]
        file: FileArgs,

        /// Comma-separated pass names, e.g. annotate,add-conflicts,rewrite-refs
        #[arg(short, long, value_delimiter = ',', required = true)]
        passes: Vec<String>,

        /// YAML code -> name mapping (default: built-in table)
        #[arg(short, long)]
        lookup: Option<PathBuf>,
    },

    /// Load a lookup table and print what it contains
    ValidateLookup {
        /// YAML code -> name mapping (default: built-in table)
        #[arg(short, long)]
        lookup: Option<PathBuf>,
    },

    /// List registered passes
    ListPasses,
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("seedcodes=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    dotenv::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = ToolConfig::load(cli.config.as_deref()).and_then(|config| match cli.command {
        Commands::Annotate { file } => run(&config, file, vec!["annotate".to_string()], None),
        Commands::AddConflicts { file } => {
            run(&config, file, vec!["add-conflicts".to_string()], None)
        }
        Commands::RewriteRefs { file, lookup } => {
            run(&config, file, vec!["rewrite-refs".to_string()], lookup)
        }
        Commands::Run {
            file,
            passes,
            lookup,
        } => run(&config, file, passes, lookup),
        Commands::ValidateLookup { lookup } => validate_lookup(&config, lookup),
        Commands::ListPasses => list_passes(&config),
    });

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

/// Run `names` over the resolved seed file and print confirmations
fn run(
    config: &ToolConfig,
    args: FileArgs,
    names: Vec<String>,
    lookup: Option<PathBuf>,
) -> Result<(), SeedError> {
    let path = config.resolve_seed_file(args.file)?;

    // Only the reference rewriter reads the table
    let lookup = if names.iter().any(|name| name == "rewrite-refs") {
        config.resolve_lookup(lookup)?
    } else {
        LookupTable::default()
    };

    let registry = PassRegistry::with_defaults(config, lookup)?;
    let options = RunOptions {
        dry_run: args.dry_run,
        backup: args.backup,
    };
    let summary = run_passes(&registry, &names, &path, options)?;

    for report in summary.reports.iter().filter(|r| r.changed) {
        let pass = registry.get(&report.pass)?;
        if args.dry_run {
            println!("~ {} would change {}", pass.name(), path.display());
        } else {
            for line in pass.confirmation(&path, report) {
                println!("{}", line);
            }
        }
    }

    if let Some(backup) = &summary.backup {
        println!("  ℹ Original saved to {}", backup.display());
    }

    if let Some(report_path) = args.report {
        append_reports(&report_path, &summary.reports)?;
    }

    Ok(())
}

fn validate_lookup(config: &ToolConfig, lookup: Option<PathBuf>) -> Result<(), SeedError> {
    let table = config.resolve_lookup(lookup)?;
    if table.is_empty() {
        return Err(SeedError::Lookup(
            "lookup table has no recipes, preparations or products".to_string(),
        ));
    }

    for kind in EntityKind::ALL {
        println!("  ✓ Loaded {} {}", table.count(kind), kind.label());
    }
    println!("✅ Lookup table is valid ({} entries)", table.len());
    Ok(())
}

fn list_passes(config: &ToolConfig) -> Result<(), SeedError> {
    let registry = PassRegistry::with_defaults(config, LookupTable::default())?;
    for name in registry.list_passes() {
        println!("{}", name);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use std::path::Path;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_run_parses_pass_list() {
        let cli = Cli::parse_from([
            "seedcodes",
            "run",
            "--file",
            "seed.sql",
            "--passes",
            "annotate,rewrite-refs",
            "--dry-run",
        ]);

        match cli.command {
            Commands::Run { file, passes, .. } => {
                assert_eq!(passes, vec!["annotate", "rewrite-refs"]);
                assert_eq!(file.file.as_deref(), Some(Path::new("seed.sql")));
                assert!(file.dry_run);
            }
            _ => panic!("expected run"),
        }
    }

    #[test]
    fn test_validate_lookup_rejects_empty_table() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("lookup.yaml");
        std::fs::write(&path, "recipes: {}\n").unwrap();

        let err = validate_lookup(&ToolConfig::default(), Some(path)).unwrap_err();
        assert!(matches!(err, SeedError::Lookup(_)));
        assert!(validate_lookup(&ToolConfig::default(), None).is_ok());
    }
}

//! Command-line interface for building and inspecting symbol databases.

use std::fs;
use std::path::PathBuf;
use std::process;

use anyhow::{anyhow, bail, Context};
use clap::{Parser, ValueEnum};
use colored::Colorize;

use doxdb::{build_database, BuildOptions, FunctionEntry, SymbolDatabase};

#[derive(Parser)]
#[command(
    name = "doxdb",
    about = "Build a C++ symbol database from Doxygen XML",
    version
)]
struct Cli {
    /// Doxygen XML directories or fragment files
    #[arg(default_value = ".")]
    paths: Vec<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Show a single namespace instead of the whole database
    #[arg(long)]
    namespace: Option<String>,

    /// List names declared as more than one entity kind
    #[arg(long)]
    conflicts: bool,

    /// Fail on the first invalid declaration instead of skipping it
    #[arg(long)]
    strict: bool,

    /// Write JSON output to a file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Suppress progress output and warnings
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "warn"
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    if let Err(e) = run(&cli) {
        eprintln!("{}: {:#}", "Error".red().bold(), e);
        process::exit(1);
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    if cli.output.is_some() && cli.format != OutputFormat::Json {
        bail!("--output requires --format json");
    }

    if cli.format == OutputFormat::Text && !cli.quiet {
        let shown = cli
            .paths
            .iter()
            .map(|p| p.display().to_string())
            .collect::<Vec<_>>()
            .join(", ");
        println!(
            "{} Building symbol database from {}",
            "→".blue().bold(),
            shown
        );
    }

    let options = BuildOptions { strict: cli.strict };
    let db = build_database(&cli.paths, &options)?;

    match cli.format {
        OutputFormat::Json => {
            let json = if cli.conflicts {
                serde_json::to_string_pretty(&db.conflicts().cross_kind_conflicts())?
            } else if let Some(path) = &cli.namespace {
                let view = db
                    .namespace_view(path)
                    .ok_or_else(|| anyhow!("namespace {} not found", path))?;
                serde_json::to_string_pretty(&view)?
            } else {
                serde_json::to_string_pretty(&db)?
            };
            match &cli.output {
                Some(file) => {
                    fs::write(file, json)
                        .with_context(|| format!("writing {}", file.display()))?;
                    println!("{} Wrote {}", "✓".green().bold(), file.display());
                }
                None => println!("{}", json),
            }
        }
        OutputFormat::Text => {
            if cli.conflicts {
                print_conflicts(&db);
            } else if let Some(path) = &cli.namespace {
                print_namespace(&db, path)?;
            } else {
                print_summary(&db);
            }
        }
    }
    Ok(())
}

fn print_summary(db: &SymbolDatabase) {
    let stats = db.stats();
    println!("{} Symbol database built", "✓".green().bold());
    println!("  {} Namespaces: {}", "•".dimmed(), stats.namespaces);
    println!(
        "  {} Functions: {} ({} overload sets, {} placeholders)",
        "•".dimmed(),
        stats.functions,
        stats.overload_sets,
        stats.placeholders
    );
    println!("  {} Typedefs: {}", "•".dimmed(), stats.typedefs);
    println!("  {} Enums: {}", "•".dimmed(), stats.enums);
    println!("  {} Globals: {}", "•".dimmed(), stats.globals);
    if stats.conflicted_names > 0 {
        println!(
            "  {} Conflicted names: {}",
            "!".yellow().bold(),
            stats.conflicted_names
        );
    }

    if !db.namespaces().is_empty() {
        println!();
        for path in db.namespaces().keys() {
            if let Some(view) = db.namespace_view(path) {
                println!(
                    "  {} {}  ({} functions, {} typedefs, {} enums, {} globals)",
                    "•".dimmed(),
                    path,
                    view.functions.len(),
                    view.typedefs.len(),
                    view.enums.len(),
                    view.globals.len()
                );
            }
        }
    }
}

fn print_namespace(db: &SymbolDatabase, path: &str) -> anyhow::Result<()> {
    let view = db
        .namespace_view(path)
        .ok_or_else(|| anyhow!("namespace {} not found", path))?;

    println!("{} {}", "→".blue().bold(), view.namespace.path);
    if !view.namespace.description.is_empty() {
        println!("  {}", view.namespace.description);
    }
    for child_path in view.namespace.children.values() {
        println!("  {} {}", "ns".cyan(), child_path);
    }
    for (qualified, entry) in &view.functions {
        match entry {
            FunctionEntry::Function(f) => {
                let marker = if f.force_cast { " [force_cast]" } else { "" };
                println!("  {} {}{}", "fn".cyan(), f.signature, marker);
            }
            FunctionEntry::Placeholder(_) => {
                println!("  {} {} (unresolved)", "fn".cyan(), qualified);
            }
            FunctionEntry::Overloads(set) => {
                println!(
                    "  {} {} ({} overloads)",
                    "fn".cyan(),
                    qualified,
                    set.overloads.len()
                );
            }
        }
    }
    for typedef in view.typedefs.values() {
        println!("  {} {}", "type".cyan(), typedef.definition);
    }
    for (qualified, enumeration) in &view.enums {
        println!(
            "  {} {} ({} values)",
            "enum".cyan(),
            qualified,
            enumeration.values.len()
        );
    }
    for (qualified, global) in &view.globals {
        println!("  {} {}: {}", "global".cyan(), qualified, global.ty);
    }
    Ok(())
}

fn print_conflicts(db: &SymbolDatabase) {
    let conflicted = db.conflicts().cross_kind_conflicts();
    if conflicted.is_empty() {
        println!("{} No cross-kind name conflicts", "✓".green().bold());
        return;
    }
    for name in conflicted {
        println!("{} {}", "!".yellow().bold(), name);
        for entry in db.conflicts().occurrences(name) {
            match &entry.location {
                Some(location) => println!("    {} at {}", entry.kind, location),
                None => println!("    {}", entry.kind),
            }
        }
    }
}

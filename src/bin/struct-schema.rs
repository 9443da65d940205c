//! Struct Schema CLI
//!
//! Command-line interface for compiling struct catalogs into object schemas.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use serde::Serialize;
use struct_schema::{build_definitions, load_catalog, Catalog, CompileOptions};

#[derive(Parser)]
#[command(name = "struct-schema")]
#[command(about = "Compile struct descriptors into JSON/OpenAPI object schemas")]
#[command(version)]
struct Cli {
    /// Log debug output to stderr
    #[arg(long, short, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log errors
    #[arg(long, short, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile one struct from a catalog
    Compile {
        /// Catalog file (JSON)
        catalog: PathBuf,

        /// Struct to compile
        #[arg(long = "type", short = 't')]
        type_name: String,

        /// Include private fields
        #[arg(long)]
        all_fields: bool,

        /// Mark every included field as required
        #[arg(long)]
        force_required: bool,

        /// Also compile every nested struct and emit a definitions document
        #[arg(long)]
        definitions: bool,

        /// Output file (stdout if not specified)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// List the structs and enums in a catalog
    List {
        /// Catalog file (JSON)
        catalog: PathBuf,
    },
}

struct CompileArgs {
    catalog: PathBuf,
    type_name: String,
    all_fields: bool,
    force_required: bool,
    definitions: bool,
    output: Option<PathBuf>,
    pretty: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_tracing(cli.quiet, cli.verbose) {
        eprintln!("Error: {}", e);
        return ExitCode::from(2);
    }

    let result = match cli.command {
        Commands::Compile {
            catalog,
            type_name,
            all_fields,
            force_required,
            definitions,
            output,
            pretty,
        } => run_compile(CompileArgs {
            catalog,
            type_name,
            all_fields,
            force_required,
            definitions,
            output,
            pretty,
        }),
        Commands::List { catalog } => run_list(&catalog),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(code) => ExitCode::from(code),
    }
}

fn init_tracing(quiet: bool, verbose: bool) -> Result<(), String> {
    let level = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "warn"
    };

    let filter = tracing_subscriber::EnvFilter::try_from_env("STRUCT_SCHEMA_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| format!("failed to initialize tracing subscriber: {}", e))
}

fn load(path: &Path) -> Result<Catalog, u8> {
    load_catalog(path).map_err(|e| {
        eprintln!("Error: {}", e);
        e.exit_code() as u8
    })
}

fn run_compile(args: CompileArgs) -> Result<(), u8> {
    let CompileArgs {
        catalog: catalog_path,
        type_name,
        all_fields,
        force_required,
        definitions,
        output,
        pretty,
    } = args;

    let catalog = load(&catalog_path)?;
    let options = CompileOptions::new()
        .public_only(!all_fields)
        .force_required(force_required);

    let json_output = if definitions {
        let defs = build_definitions(&type_name, &catalog.structs, &options, &catalog.enums)
            .map_err(|e| {
                eprintln!("Error: {}", e);
                e.exit_code() as u8
            })?;
        to_json(&defs, pretty)?
    } else {
        let Some(compiler) = catalog.structs.get(&type_name) else {
            eprintln!("Error: unknown type {}", type_name);
            return Err(2);
        };
        let compiled = compiler.compile(&options, &catalog.enums).map_err(|e| {
            eprintln!("Error: cannot compile {}: {}", type_name, e);
            2u8
        })?;
        to_json(&compiled, pretty)?
    };

    match output {
        Some(path) => {
            std::fs::write(&path, &json_output).map_err(|e| {
                eprintln!("Error writing to {}: {}", path.display(), e);
                3u8
            })?;
        }
        None => {
            println!("{}", json_output);
        }
    }

    Ok(())
}

fn to_json<T: Serialize>(value: &T, pretty: bool) -> Result<String, u8> {
    if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
    .map_err(|e| {
        eprintln!("Error serializing output: {}", e);
        2u8
    })
}

fn run_list(path: &Path) -> Result<(), u8> {
    let catalog = load(path)?;

    for name in catalog.structs.keys() {
        println!("struct {}", name);
    }
    for name in catalog.enums.names() {
        println!("enum {}", name);
    }

    Ok(())
}

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};
use observatum_tools::source::{self, SourceColumns, SourceFormat, open_source};
use observatum_tools::{Result, ToolError, check, inventory, report};
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    if let Err(error) = run(cli) {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    init_logging()?;
    match cli.command {
        Command::Check(args) => execute_check(args),
        Command::Inventory(args) => execute_inventory(args),
    }
}

fn execute_check(args: CheckArgs) -> Result<()> {
    if !args.primary.exists() {
        return Err(ToolError::MissingInput(args.primary));
    }
    if !args.reference.exists() {
        return Err(ToolError::MissingInput(args.reference));
    }

    let primary_columns = SourceColumns::new(&args.primary_table, &args.primary_name_column)
        .with_key(&args.primary_key_column);
    let reference_columns = SourceColumns::new(&args.reference_table, &args.reference_name_column)
        .with_key(&args.reference_key_column)
        .with_parent(&args.reference_parent_column);
    let busy_timeout = args.busy_timeout_ms.map(Duration::from_millis);

    let mut primary = open_source(
        &args.primary,
        resolve_format(args.primary_format, &args.primary),
        primary_columns,
        busy_timeout,
    )?;
    let mut reference = open_source(
        &args.reference,
        resolve_format(args.reference_format, &args.reference),
        reference_columns,
        busy_timeout,
    )?;

    let outcomes = check::check(&args.entities, primary.as_mut(), reference.as_mut());

    if args.json {
        println!("{}", serde_json::to_string_pretty(&outcomes)?);
    } else {
        print!("{}", report::render_outcomes(&outcomes));
    }
    Ok(())
}

fn execute_inventory(args: InventoryArgs) -> Result<()> {
    if !args.source.exists() {
        return Err(ToolError::MissingInput(args.source));
    }

    let columns = SourceColumns::new(&args.table, &args.name_column);
    let busy_timeout = args.busy_timeout_ms.map(Duration::from_millis);
    let mut source = open_source(
        &args.source,
        resolve_format(args.format, &args.source),
        columns,
        busy_timeout,
    )?;

    let fields = inventory::key_field_inventory(source.as_mut(), &args.pattern)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&fields)?);
    } else {
        print!("{}", report::render_inventory(&fields));
    }
    Ok(())
}

fn init_logging() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| ToolError::Logging(error.to_string()))
}

fn resolve_format(kind: Option<SourceFormatKind>, path: &Path) -> SourceFormat {
    kind.map(SourceFormat::from)
        .or_else(|| source::detect_format(path))
        .unwrap_or(SourceFormat::Sqlite)
}

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Cross-check taxon keys between a field list and a reference dataset."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compare entity keys between the primary and reference sources.
    Check(CheckArgs),
    /// List the key-related columns of one sample row.
    Inventory(InventoryArgs),
}

#[derive(clap::Args)]
struct CheckArgs {
    /// Entity names to check, matched by case-sensitive prefix.
    #[arg(required = true)]
    entities: Vec<String>,

    /// Path to the primary source (the field list).
    #[arg(long)]
    primary: PathBuf,

    /// Path to the reference source (the master dataset).
    #[arg(long)]
    reference: PathBuf,

    /// Backend for the primary source; guessed from the extension if omitted.
    #[arg(long, value_enum)]
    primary_format: Option<SourceFormatKind>,

    /// Backend for the reference source; guessed from the extension if omitted.
    #[arg(long, value_enum)]
    reference_format: Option<SourceFormatKind>,

    /// Table or sheet holding the primary rows.
    #[arg(long, default_value = "taxa")]
    primary_table: String,

    /// Name column in the primary source.
    #[arg(long, default_value = "scientific_name")]
    primary_name_column: String,

    /// Key column in the primary source.
    #[arg(long, default_value = "tvk")]
    primary_key_column: String,

    /// Table or sheet holding the reference rows.
    #[arg(long, default_value = "organism_master")]
    reference_table: String,

    /// Name column in the reference source.
    #[arg(long, default_value = "item_name")]
    reference_name_column: String,

    /// Key column in the reference source.
    #[arg(long, default_value = "taxon_version_key")]
    reference_key_column: String,

    /// Parent key column in the reference source.
    #[arg(long, default_value = "parent_tvk")]
    reference_parent_column: String,

    /// Busy timeout in milliseconds for SQLite sources.
    #[arg(long)]
    busy_timeout_ms: Option<u64>,

    /// Emit the report as JSON instead of text.
    #[arg(long)]
    json: bool,
}

#[derive(clap::Args)]
struct InventoryArgs {
    /// Name prefix used to pick the sample row.
    pattern: String,

    /// Path to the source to inspect.
    #[arg(long)]
    source: PathBuf,

    /// Backend for the source; guessed from the extension if omitted.
    #[arg(long, value_enum)]
    format: Option<SourceFormatKind>,

    /// Table or sheet to sample from.
    #[arg(long, default_value = "organism_master")]
    table: String,

    /// Name column to match the pattern against.
    #[arg(long, default_value = "item_name")]
    name_column: String,

    /// Busy timeout in milliseconds for SQLite sources.
    #[arg(long)]
    busy_timeout_ms: Option<u64>,

    /// Emit the inventory as JSON instead of text.
    #[arg(long)]
    json: bool,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum SourceFormatKind {
    Sqlite,
    Excel,
}

impl From<SourceFormatKind> for SourceFormat {
    fn from(kind: SourceFormatKind) -> Self {
        match kind {
            SourceFormatKind::Sqlite => SourceFormat::Sqlite,
            SourceFormatKind::Excel => SourceFormat::Excel,
        }
    }
}

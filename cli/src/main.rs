use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use rowgate_core::{Row, TableSchema, Value};
use rowgate_db::{GatewayConfig, TableCatalog};
use rowgate_sqlite::{SchemaManager, TableGateway, TracingNotifier, open};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "rowgate")]
#[command(about = "Register managed tables and read or write their rows")]
#[command(version)]
struct Cli {
    /// Path to a rowgate YAML config file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Database file (overrides the config file).
    #[arg(long, global = true)]
    db: Option<PathBuf>,
    /// Directory of table descriptor files (overrides the config file).
    #[arg(long, global = true)]
    tables: Option<PathBuf>,
    /// Increase log verbosity (-v info, -vv debug).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Create missing tables and add missing columns.
    Install,
    /// Show whether each managed table exists and how many rows it has.
    Status,
    /// Print the DDL the managed tables are declared with.
    Ddl,
    /// Insert a row and print its id.
    Insert(InsertArgs),
    /// Fetch a row (or one field) and print it as JSON.
    Get(GetArgs),
    /// Update a row and print the number of affected rows.
    Update(UpdateArgs),
    /// Delete a row and print the number of affected rows.
    Delete(DeleteArgs),
}

#[derive(Debug, Args)]
struct InsertArgs {
    /// Table name.
    #[arg(long)]
    table: String,
    /// Row as a JSON object, e.g. '{"customer":"alice"}'.
    #[arg(long)]
    data: String,
    /// Event tag for the insert notifications.
    #[arg(long, default_value = "cli")]
    tag: String,
}

#[derive(Debug, Args)]
struct GetArgs {
    /// Table name.
    #[arg(long)]
    table: String,
    /// Primary key value.
    #[arg(long, conflicts_with = "by")]
    id: Option<i64>,
    /// Match on this column instead of the primary key.
    #[arg(long, requires = "equals")]
    by: Option<String>,
    /// Value to match with --by (JSON scalar or plain text).
    #[arg(long)]
    equals: Option<String>,
    /// Print only this field.
    #[arg(long)]
    field: Option<String>,
}

#[derive(Debug, Args)]
struct UpdateArgs {
    /// Table name.
    #[arg(long)]
    table: String,
    /// Row id.
    #[arg(long, allow_hyphen_values = true)]
    id: i64,
    /// Changes as a JSON object.
    #[arg(long)]
    data: String,
    /// Match the id against this column instead of the primary key.
    #[arg(long = "where")]
    where_column: Option<String>,
}

#[derive(Debug, Args)]
struct DeleteArgs {
    /// Table name.
    #[arg(long)]
    table: String,
    /// Row id.
    #[arg(long, allow_hyphen_values = true)]
    id: i64,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(err) = run(cli) {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<(), String> {
    let config = load_config(&cli)?;
    match cli.command {
        Command::Install => run_install(&config),
        Command::Status => run_status(&config),
        Command::Ddl => run_ddl(&config),
        Command::Insert(args) => run_insert(&config, args),
        Command::Get(args) => run_get(&config, args),
        Command::Update(args) => run_update(&config, args),
        Command::Delete(args) => run_delete(&config, args),
    }
}

fn load_config(cli: &Cli) -> Result<GatewayConfig, String> {
    let mut config = match &cli.config {
        Some(path) => GatewayConfig::load(path)
            .map_err(|e| format!("Failed to load config '{}': {e}", path.display()))?,
        None => GatewayConfig::default(),
    };
    if let Some(db) = &cli.db {
        config.database = Some(db.clone());
    }
    if let Some(tables) = &cli.tables {
        config.tables_dir = Some(tables.clone());
        config.package = None;
    }
    Ok(config)
}

fn load_catalog(config: &GatewayConfig) -> Result<TableCatalog, String> {
    TableCatalog::from_config(config).map_err(|e| format!("Failed to load table descriptors: {e}"))
}

fn find_table(catalog: &TableCatalog, table: &str) -> Result<TableSchema, String> {
    catalog
        .get(table)
        .cloned()
        .ok_or_else(|| format!("Unknown table '{table}'. Known tables: {}", catalog.names().join(", ")))
}

// ---------------------------------------------------------------------------
// schema commands
// ---------------------------------------------------------------------------

fn run_install(config: &GatewayConfig) -> Result<(), String> {
    let catalog = load_catalog(config)?;
    let conn = open(config).map_err(|e| format!("Failed to open database: {e}"))?;
    let reports = SchemaManager::new(&conn, &config.locale)
        .register(&catalog)
        .map_err(|e| format!("Install failed: {e}"))?;

    for report in &reports {
        let state = if report.created {
            "created".to_string()
        } else if !report.added_columns.is_empty() {
            format!("added columns: {}", report.added_columns.join(", "))
        } else {
            "up to date".to_string()
        };
        println!("  {}: {state}", report.table);
        if !report.extra_columns.is_empty() {
            println!(
                "    undeclared columns kept: {}",
                report.extra_columns.join(", ")
            );
        }
    }
    println!("Install complete ({} tables).", reports.len());
    Ok(())
}

fn run_status(config: &GatewayConfig) -> Result<(), String> {
    let catalog = load_catalog(config)?;
    let conn = open(config).map_err(|e| format!("Failed to open database: {e}"))?;
    let statuses = SchemaManager::new(&conn, &config.locale)
        .status(&catalog)
        .map_err(|e| format!("Failed to get table status: {e}"))?;

    println!("Table Status:");
    for status in statuses {
        match status.rows {
            Some(rows) if status.installed => println!("  {}: installed, {rows} rows", status.table),
            _ => println!("  {}: not installed", status.table),
        }
    }
    Ok(())
}

fn run_ddl(config: &GatewayConfig) -> Result<(), String> {
    let catalog = load_catalog(config)?;
    let conn = open(config).map_err(|e| format!("Failed to open database: {e}"))?;
    let statements = SchemaManager::new(&conn, &config.locale)
        .ddl(&catalog)
        .map_err(|e| format!("Failed to generate DDL: {e}"))?;
    for ddl in statements {
        print!("{ddl}");
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// row commands
// ---------------------------------------------------------------------------

fn run_insert(config: &GatewayConfig, args: InsertArgs) -> Result<(), String> {
    let catalog = load_catalog(config)?;
    let schema = find_table(&catalog, &args.table)?;
    let data = parse_row(&args.data)?;
    let conn = open(config).map_err(|e| format!("Failed to open database: {e}"))?;

    let id = TableGateway::new(&conn, schema)
        .with_notifier(TracingNotifier)
        .insert(&data, &args.tag)
        .map_err(|e| format!("Insert failed: {e}"))?;
    println!("{id}");
    Ok(())
}

fn run_get(config: &GatewayConfig, args: GetArgs) -> Result<(), String> {
    let catalog = load_catalog(config)?;
    let schema = find_table(&catalog, &args.table)?;
    let conn = open(config).map_err(|e| format!("Failed to open database: {e}"))?;
    let gateway = TableGateway::new(&conn, schema);

    let output = match (args.id, &args.by, &args.equals, &args.field) {
        (Some(id), None, _, None) => gateway
            .fetch_by_id(id)
            .map_err(|e| format!("Fetch failed: {e}"))?
            .map(|row| serde_json::to_string_pretty(&row)),
        (Some(id), None, _, Some(field)) => gateway
            .fetch_field(field, id)
            .map_err(|e| format!("Fetch failed: {e}"))?
            .map(|value| serde_json::to_string(&value)),
        (None, Some(by), Some(equals), None) => gateway
            .fetch_by_column(by, parse_value(equals))
            .map_err(|e| format!("Fetch failed: {e}"))?
            .map(|row| serde_json::to_string_pretty(&row)),
        (None, Some(by), Some(equals), Some(field)) => gateway
            .fetch_field_by(field, by, parse_value(equals))
            .map_err(|e| format!("Fetch failed: {e}"))?
            .map(|value| serde_json::to_string(&value)),
        _ => return Err("Specify either --id or --by with --equals".to_string()),
    };

    match output {
        Some(json) => {
            println!("{}", json.map_err(|e| format!("Failed to encode row: {e}"))?);
            Ok(())
        }
        None => Err(format!("No matching row in '{}'", args.table)),
    }
}

fn run_update(config: &GatewayConfig, args: UpdateArgs) -> Result<(), String> {
    let catalog = load_catalog(config)?;
    let schema = find_table(&catalog, &args.table)?;
    let data = parse_row(&args.data)?;
    let conn = open(config).map_err(|e| format!("Failed to open database: {e}"))?;
    let gateway = TableGateway::new(&conn, schema);

    let affected = match &args.where_column {
        Some(column) => gateway.update_where(args.id, &data, column),
        None => gateway.update(args.id, &data),
    }
    .map_err(|e| format!("Update failed: {e}"))?;
    println!("{affected}");
    Ok(())
}

fn run_delete(config: &GatewayConfig, args: DeleteArgs) -> Result<(), String> {
    let catalog = load_catalog(config)?;
    let schema = find_table(&catalog, &args.table)?;
    let conn = open(config).map_err(|e| format!("Failed to open database: {e}"))?;

    let affected = TableGateway::new(&conn, schema)
        .delete(args.id)
        .map_err(|e| format!("Delete failed: {e}"))?;
    println!("{affected}");
    Ok(())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Parses a JSON object into a row, keeping key order.
fn parse_row(raw: &str) -> Result<Row, String> {
    serde_json::from_str(raw).map_err(|e| format!("--data must be a JSON object: {e}"))
}

/// Parses a JSON scalar, falling back to the raw text.
fn parse_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::from(raw))
}

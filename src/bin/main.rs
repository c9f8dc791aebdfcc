//! Multitable CLI - inspect join configurations against a catalog
//!
//! Usage:
//!   multitable schemas --connection <name>
//!   multitable tables --connection <name> [--schema <schema>]
//!   multitable inspect --connection <name> [--schema <schema>] [--config <file.json>] [--star|--flat] [--save <datasource>]
//!   multitable origin <datasource>
//!
//! Examples:
//!   multitable tables --connection sales
//!   multitable inspect --connection sales --config joins.json --star
//!   multitable inspect --connection sales --config joins.json --save sales_model

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use multitable::config::{Settings, SettingsError};
use multitable::logging::init_logging;
use multitable::metadata::{ConnectionInfo, JsonSchemaProvider, SchemaProvider};
use multitable::persist::PersistedJoinConfig;
use multitable::refresh::{Accepted, HostError};
use multitable::session::{JoinSession, MemoryCommitSink, ModelCommitSink, WizardHost};
use multitable::store::{connection_context, DatasourceStore, StoreError};
use multitable::validation::{ModelingMode, WizardState};

#[derive(Parser)]
#[command(name = "multitable")]
#[command(about = "Multitable - configure joins between the tables of a datasource")]
#[command(version)]
struct Cli {
    /// Settings file (overrides the default lookup)
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the schemas of a connection
    Schemas {
        /// Connection name from the settings file
        #[arg(short, long)]
        connection: String,
    },

    /// List the tables of a schema with their fields
    Tables {
        /// Connection name from the settings file
        #[arg(short, long)]
        connection: String,

        /// Schema (connection default if not specified)
        #[arg(short, long)]
        schema: Option<String>,
    },

    /// Load a join configuration and report the resulting wizard state
    Inspect {
        /// Connection name from the settings file
        #[arg(short, long)]
        connection: String,

        /// Schema (connection default if not specified)
        #[arg(short, long)]
        schema: Option<String>,

        /// Saved join configuration (JSON)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Require a fact table
        #[arg(long, conflicts_with = "flat")]
        star: bool,

        /// Do not require a fact table
        #[arg(long)]
        flat: bool,

        /// Commit the configuration to the store under this datasource name
        #[arg(long)]
        save: Option<String>,
    },

    /// Report whether a stored datasource was created by this tool
    Origin {
        /// Datasource name
        datasource: String,
    },
}

/// Host that reports to the terminal.
struct ConsoleHost;

impl WizardHost for ConsoleHost {
    fn state_changed(&self, state: WizardState) {
        tracing::debug!(valid = state.valid, finishable = state.finishable, "state changed");
    }

    fn display_error(&self, error: &HostError) {
        eprintln!("Error: {}", error.message);
        eprintln!("  {}", error.detail);
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let settings = match load_settings(cli.settings.as_ref()) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error loading settings: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = init_logging(&settings.logging) {
        eprintln!("Failed to initialize logging: {}", e);
    }

    match cli.command {
        Commands::Schemas { connection } => cmd_schemas(&settings, &connection).await,
        Commands::Tables { connection, schema } => cmd_tables(&settings, &connection, schema).await,
        Commands::Inspect {
            connection,
            schema,
            config,
            star,
            flat,
            save,
        } => {
            let mode = if star {
                ModelingMode::Star
            } else if flat {
                ModelingMode::Flat
            } else {
                ModelingMode::from_star_flag(settings.wizard.star_modeling)
            };
            cmd_inspect(&settings, &connection, schema, config, mode, save).await
        }
        Commands::Origin { datasource } => cmd_origin(&settings, &datasource),
    }
}

fn load_settings(path: Option<&PathBuf>) -> Result<Settings, SettingsError> {
    match path {
        Some(path) => Settings::from_file(path),
        None => Settings::load(),
    }
}

fn connection(settings: &Settings, name: &str) -> Option<ConnectionInfo> {
    match settings.connection_info(name) {
        Ok(info) => Some(info),
        Err(e) => {
            eprintln!("Error: {}", e);
            None
        }
    }
}

fn open_store(settings: &Settings) -> Result<DatasourceStore, String> {
    let path = settings.store.resolved_path().map_err(|e| e.to_string())?;
    let store = match path {
        Some(path) => DatasourceStore::open(path),
        None => DatasourceStore::open_default(),
    };
    store.map_err(|e: StoreError| e.to_string())
}

async fn cmd_schemas(settings: &Settings, name: &str) -> ExitCode {
    let Some(conn) = connection(settings, name) else {
        return ExitCode::FAILURE;
    };

    match JsonSchemaProvider::new().list_schemas(&conn).await {
        Ok(schemas) => {
            for schema in schemas {
                let marker = if schema.is_default { " (default)" } else { "" };
                println!("{}{}", schema.name, marker);
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error listing schemas: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn cmd_tables(settings: &Settings, name: &str, schema: Option<String>) -> ExitCode {
    let Some(conn) = connection(settings, name) else {
        return ExitCode::FAILURE;
    };
    let schema = schema.or_else(|| conn.default_schema.clone()).unwrap_or_default();

    match JsonSchemaProvider::new().list_tables(&conn, &schema).await {
        Ok(tables) => {
            for table in tables {
                println!("{}", table.qualified_name());
                for field in &table.fields {
                    match &field.data_type {
                        Some(data_type) => println!("  - {} ({})", field.name, data_type),
                        None => println!("  - {}", field.name),
                    }
                }
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error listing tables: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn cmd_inspect(
    settings: &Settings,
    name: &str,
    schema: Option<String>,
    config: Option<PathBuf>,
    mode: ModelingMode,
    save: Option<String>,
) -> ExitCode {
    let Some(conn) = connection(settings, name) else {
        return ExitCode::FAILURE;
    };

    let store = if save.is_some() {
        match open_store(settings) {
            Ok(store) => Some(Arc::new(store)),
            Err(e) => {
                eprintln!("Error opening store: {}", e);
                return ExitCode::FAILURE;
            }
        }
    } else {
        None
    };

    let saved = match (&config, &store, &save) {
        (Some(path), _, _) => match PersistedJoinConfig::load(path) {
            Ok(c) => Some(c),
            Err(e) => {
                eprintln!("Error reading '{}': {}", path.display(), e);
                return ExitCode::FAILURE;
            }
        },
        (None, Some(store), Some(datasource)) if settings.wizard.restore_saved => {
            match store.load_config(datasource, &connection_context(&conn)) {
                Ok(c) => c,
                Err(e) => {
                    eprintln!("Error reading datasource '{}': {}", datasource, e);
                    return ExitCode::FAILURE;
                }
            }
        }
        _ => None,
    };

    let sink: Arc<dyn ModelCommitSink> = match &store {
        Some(store) => Arc::clone(store) as Arc<dyn ModelCommitSink>,
        None => Arc::new(MemoryCommitSink::new()),
    };

    let mut session = JoinSession::new(
        Arc::new(JsonSchemaProvider::new()),
        conn,
        Arc::new(ConsoleHost),
        sink,
    )
    .with_mode(mode);
    if let Some(saved) = saved {
        session = session.with_saved_config(saved);
    }

    if let Accepted::Failed(_) = session.fetch_schemas().await {
        return ExitCode::FAILURE;
    }
    if let Some(schema) = &schema {
        session.select_schema(schema);
    }
    if let Some(request) = session.activate_forward() {
        if let Accepted::Failed(_) = session.apply_tables(request.run().await) {
            return ExitCode::FAILURE;
        }
    }

    print_session(&session);

    if let Some(datasource) = save {
        match session.commit(&datasource) {
            Ok(snapshot) => {
                println!();
                println!(
                    "Committed '{}' ({} tables)",
                    datasource,
                    snapshot.selected_tables.len()
                );
            }
            Err(e) => {
                eprintln!("Error committing '{}': {}", datasource, e);
                return ExitCode::FAILURE;
            }
        }
    }

    ExitCode::SUCCESS
}

fn print_session<P: SchemaProvider>(session: &JoinSession<P>) {
    println!("Connection: {}", session.connection().name);
    println!("Schema: {}", session.catalog().schema().unwrap_or("-"));
    println!("Mode: {}", session.mode().as_str());
    println!();

    println!("Selected tables:");
    if session.selection().is_empty() {
        println!("  (none)");
    }
    for table in session.selection().tables() {
        println!("  - {}", table.name);
    }

    let available = session.available_tables();
    if !available.is_empty() {
        println!("Available tables:");
        for table in available {
            println!("  - {}", table.name);
        }
    }

    println!("Joins:");
    if session.joins().is_empty() {
        println!("  (none)");
    }
    for relationship in session.joins().relationships() {
        println!("  - {}", relationship);
    }

    println!(
        "Fact table: {}",
        session.fact_table().map(|t| t.name.as_str()).unwrap_or("(none)")
    );
    println!();

    let state = session.state();
    println!("valid: {}", state.valid);
    println!("finishable: {}", state.finishable);
}

fn cmd_origin(settings: &Settings, datasource: &str) -> ExitCode {
    match open_store(settings) {
        Ok(store) => {
            println!("{}", store.origin(datasource));
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error opening store: {}", e);
            ExitCode::FAILURE
        }
    }
}

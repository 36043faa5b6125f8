//! ptsupport CLI
//!
//! Command-line tool for maintaining a PostgreSQL provenance schema.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use tracing::info;

use provenance_support::logging;
use provenance_support::prelude::*;

/// Shadow-table tooling for a PostgreSQL provenance schema.
#[derive(Debug, Parser)]
#[command(name = "ptsupport")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log level.
    #[arg(short, long, global = true, value_enum, ignore_case = true, default_value_t = LogLevel::Info)]
    loglevel: LogLevel,

    /// YAML configuration file.
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    yaml: PathBuf,

    /// Use this database instead of the one in the YAML file.
    #[arg(long, global = true)]
    database: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Print the shadow table DDL and triggers for one table.
    CreateTable {
        /// Table name [schema.table].
        table_name: String,

        /// File to write to (stdout if not specified).
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the shadow table DDL for every base table of a schema.
    ModelSchema {
        /// Schema name.
        schema: String,

        /// Skip tables whose name ends with this suffix.
        #[arg(long, default_value = DEFAULT_EXCLUDE_SUFFIX)]
        exclude: String,

        /// File to write to (stdout if not specified).
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Report column drift between provenance tables and live tables.
    Audit,

    /// Log INSERT audit rows that repeat the previous INSERT.
    Dedup,
}

impl Commands {
    fn application_name(&self) -> &'static str {
        match self {
            Self::CreateTable { .. } => "create provenance table",
            Self::ModelSchema { .. } => "provenance schema maker",
            Self::Audit => "provenance audit",
            Self::Dedup => "provenance deduplication",
        }
    }
}

fn open_output(path: Option<&Path>) -> io::Result<Box<dyn Write>> {
    Ok(match path {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(io::stdout().lock()),
    })
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init(cli.loglevel)?;

    let config = Config::load(&cli.yaml)?.with_database(cli.database.clone());
    let session = Session::connect(&config.database, cli.command.application_name()).await?;
    let mut tx = session.begin_read_only().await?;

    match &cli.command {
        Commands::CreateTable { table_name, output } => {
            let mut out = open_output(output.as_deref())?;
            let name = TableMaker::new(tx.catalog())
                .create_table(table_name, &mut out)
                .await?;
            out.flush()?;
            info!(table = %name, "Shadow table generated");
        }

        Commands::ModelSchema {
            schema,
            exclude,
            output,
        } => {
            let mut out = open_output(output.as_deref())?;
            let generated = SchemaMaker::new(tx.catalog())
                .generate_schema(schema, exclude, &mut out)
                .await?;
            out.flush()?;
            info!(schema = %schema, tables = generated.len(), "Schema generated");
        }

        Commands::Audit => {
            let report = ProvenanceAudit::new(tx.catalog()).audit().await?;
            let mut drifted = 0;
            for drift in report.successes().filter_map(|(_, d)| d.as_ref()) {
                println!("{drift}");
                drifted += 1;
            }
            info!(
                scanned = report.scanned(),
                failed = report.failed(),
                drifted,
                "Audit complete"
            );
        }

        Commands::Dedup => {
            let report = ProvenanceDedup::new(tx.catalog()).remove_dups().await?;
            let duplicates: usize = report.successes().map(|(_, found)| found.len()).sum();
            info!(
                scanned = report.scanned(),
                failed = report.failed(),
                duplicates,
                "Duplicate scan complete"
            );
        }
    }

    tx.finish().await?;
    session.close().await;
    Ok(())
}

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::EnvFilter;

use schemacheck::{
    extract_tables_from_file, format_sql_diff, AuditOptions, DifferenceTableRow, EquivalencePolicy,
    Normalizer, SchemaAuditor, SchemaReport, SnapshotConnector, StatementOrigin,
};
use schemacheck::error::{ConnectionError, SchemaCheckError};
use tabled::{Table, Tabled, settings::Style};

/// Exit code when the audit ran and found differences.
const EXIT_DIFFERENCES: u8 = 2;

const DEFAULT_TABLE_PREFIX: &str = "glpi_";

#[derive(Parser)]
#[command(name = "schemacheck")]
#[command(about = "Check a live database schema against its reference CREATE TABLE file")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare the reference schema with a live schema dump
    Check {
        /// Reference schema file
        #[arg(short, long, env = "SCHEMACHECK_SCHEMA")]
        schema: PathBuf,

        /// SHOW CREATE TABLE dump of the live database
        #[arg(short, long, env = "SCHEMACHECK_LIVE_DUMP")]
        live: PathBuf,

        /// Audited namespace: core or plugin:<key>
        #[arg(short, long, default_value = "")]
        context: String,

        /// Prefix shared by every table of the installation; plugin:<key>
        /// audits tables starting with <prefix>plugin_<key>_
        #[arg(long, default_value = DEFAULT_TABLE_PREFIX, env = "SCHEMACHECK_TABLE_PREFIX")]
        table_prefix: String,

        /// Do not report live tables missing from the reference schema
        #[arg(long)]
        no_unknown_tables: bool,

        /// Print the diff of every reported table
        #[arg(long)]
        diff: bool,

        /// Output format: table, yaml, json
        #[arg(short, long, default_value = "table")]
        output: OutputFormat,

        #[command(flatten)]
        policy: PolicyArgs,
    },

    /// Print the canonical form of every table of a schema file
    Normalize {
        /// Schema file
        file: PathBuf,

        /// Only this table
        #[arg(short, long)]
        table: Option<String>,

        /// Treat the file as live SHOW CREATE TABLE output
        #[arg(long)]
        live: bool,

        #[command(flatten)]
        policy: PolicyArgs,
    },

    /// List the tables declared in a schema file
    Tables {
        /// Schema file
        file: PathBuf,

        /// Output format: table, yaml, json
        #[arg(short, long, default_value = "table")]
        output: OutputFormat,
    },
}

#[derive(Args)]
struct PolicyArgs {
    /// YAML file with base policy values
    #[arg(long, env = "SCHEMACHECK_POLICY")]
    policy: Option<PathBuf>,

    /// Text columns default to utf8mb4 on the live server
    #[arg(long)]
    utf8mb4: bool,

    /// Ignore column and index order
    #[arg(long)]
    non_strict: bool,

    #[arg(long)]
    ignore_utf8mb4_migration: bool,

    #[arg(long)]
    ignore_timestamps_migration: bool,

    #[arg(long)]
    ignore_dynamic_row_format_migration: bool,

    #[arg(long)]
    ignore_innodb_migration: bool,

    #[arg(long)]
    ignore_unsigned_keys_migration: bool,

    /// Enable every --ignore-*-migration flag
    #[arg(long)]
    ignore_all_migrations: bool,

    /// Compare implicit CURRENT_TIMESTAMP defaults of NOT NULL temporal columns
    #[arg(long)]
    keep_implicit_timestamp_defaults: bool,

    /// Regex matching key column names for --ignore-unsigned-keys-migration
    #[arg(long)]
    foreign_key_pattern: Option<String>,
}

impl PolicyArgs {
    fn resolve(&self) -> Result<EquivalencePolicy, Box<dyn std::error::Error>> {
        let mut policy = match &self.policy {
            Some(path) => EquivalencePolicy::from_yaml_file(path)?,
            None => EquivalencePolicy::default(),
        };

        policy.target_uses_utf8mb4 |= self.utf8mb4;
        if self.non_strict {
            policy.strict = false;
        }
        if self.ignore_all_migrations {
            policy = policy.ignoring_all_migrations();
        }
        policy.ignore_utf8mb4_migration |= self.ignore_utf8mb4_migration;
        policy.ignore_timestamps_migration |= self.ignore_timestamps_migration;
        policy.ignore_dynamic_row_format_migration |= self.ignore_dynamic_row_format_migration;
        policy.ignore_innodb_migration |= self.ignore_innodb_migration;
        policy.ignore_unsigned_keys_migration |= self.ignore_unsigned_keys_migration;
        if self.keep_implicit_timestamp_defaults {
            policy.implicit_timestamp_defaults = false;
        }
        if let Some(pattern) = &self.foreign_key_pattern {
            policy.foreign_key_pattern = pattern.clone();
        }

        Ok(policy)
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Table,
    Yaml,
    Json,
}

#[derive(Tabled, serde::Serialize)]
struct DeclaredTableRow {
    #[tabled(rename = "Table")]
    name: String,
    #[tabled(rename = "Lines")]
    lines: usize,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("schemacheck=debug,info")
    } else {
        EnvFilter::new("schemacheck=info,warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    if !atty::is(atty::Stream::Stdout) {
        colored::control::set_override(false);
    }

    match run(cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(EXIT_DIFFERENCES),
        Err(e) => {
            print_error(e);
            ExitCode::FAILURE
        }
    }
}

fn print_error(err: Box<dyn std::error::Error>) {
    if let Some(SchemaCheckError::Connection(conn)) = err.downcast_ref::<SchemaCheckError>() {
        print_connection_error(conn);
        return;
    }

    eprintln!("\x1b[31m✗ Error:\x1b[0m {}", err);
}

fn print_connection_error(err: &ConnectionError) {
    eprintln!("\n\x1b[31m✗ Database Error [{}]\x1b[0m", err.error_code());
    eprintln!("  {}", err);
    eprintln!("\n\x1b[33mSuggestion:\x1b[0m");
    for line in err.suggestion().lines() {
        eprintln!("  {}", line);
    }
    eprintln!();
}

/// `Ok(false)` when differences were found.
async fn run(cli: Cli) -> Result<bool, Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Check { schema, live, context, table_prefix, no_unknown_tables, diff, output, policy } => {
            let options = AuditOptions::new()
                .with_unknown_tables(!no_unknown_tables)
                .with_context(context)
                .with_table_prefix(table_prefix);
            let policy = policy.resolve()?;
            cmd_check(&schema, &live, policy, &options, diff, output).await
        }

        Commands::Normalize { file, table, live, policy } => {
            cmd_normalize(&file, table.as_deref(), live, policy.resolve()?)?;
            Ok(true)
        }

        Commands::Tables { file, output } => {
            cmd_tables(&file, output)?;
            Ok(true)
        }
    }
}

async fn cmd_check(
    schema: &Path,
    live: &Path,
    policy: EquivalencePolicy,
    options: &AuditOptions,
    show_diff: bool,
    output: OutputFormat,
) -> Result<bool, Box<dyn std::error::Error>> {
    info!("Checking {} against {}", schema.display(), live.display());

    let connector = SnapshotConnector::from_dump_file(live, policy.target_uses_utf8mb4)?;
    let auditor = SchemaAuditor::new(&connector, policy)?;
    let report = auditor.audit(schema, options).await?;

    match output {
        OutputFormat::Yaml => {
            let yaml = serde_yaml::to_string(&report)?;
            println!("{}", yaml);
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&report)?;
            println!("{}", json);
        }
        OutputFormat::Table => print_report(&report, show_diff),
    }

    Ok(report.is_clean())
}

fn print_report(report: &SchemaReport, show_diff: bool) {
    if report.is_clean() {
        println!("✓ Database schema is consistent with the reference schema");
        return;
    }

    println!("\nSchema Integrity Report\n");

    let rows: Vec<DifferenceTableRow> = report.rows();
    let mut table = Table::new(rows);
    table.with(Style::markdown());
    println!("{}", table);

    println!("\nSummary:");
    println!("  ⚠ {} altered", report.altered_count());
    println!("  ✗ {} missing", report.missing_count());
    println!("  ? {} unknown", report.unknown_count());

    if show_diff {
        println!();
        for difference in &report.differences {
            println!("{} ({})", difference.table_name, difference.kind.as_str());
            print!("{}", format_sql_diff(&difference.diff_text));
            println!();
        }
    }
}

fn cmd_normalize(
    file: &Path,
    only_table: Option<&str>,
    live: bool,
    policy: EquivalencePolicy,
) -> Result<(), Box<dyn std::error::Error>> {
    let normalizer = Normalizer::new(policy)?;
    let origin = if live { StatementOrigin::Live } else { StatementOrigin::Reference };

    let tables = extract_tables_from_file(file)?;
    let selected: Vec<_> = tables
        .iter()
        .filter(|t| only_table.map_or(true, |name| t.name == name))
        .collect();

    if selected.is_empty() {
        if let Some(name) = only_table {
            return Err(format!("Table '{}' not found in {}", name, file.display()).into());
        }
        println!("No CREATE TABLE statement found in {}", file.display());
        return Ok(());
    }

    for table in selected {
        println!("{};\n", normalizer.normalize(&table.raw_sql, origin)?);
    }

    Ok(())
}

fn cmd_tables(file: &Path, output: OutputFormat) -> Result<(), Box<dyn std::error::Error>> {
    let rows: Vec<DeclaredTableRow> = extract_tables_from_file(file)?
        .into_iter()
        .map(|t| DeclaredTableRow {
            lines: t.raw_sql.lines().count(),
            name: t.name,
        })
        .collect();

    match output {
        OutputFormat::Yaml => println!("{}", serde_yaml::to_string(&rows)?),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&rows)?),
        OutputFormat::Table => {
            println!("{} tables declared in {}\n", rows.len(), file.display());
            let mut table = Table::new(rows);
            table.with(Style::markdown());
            println!("{}", table);
        }
    }

    Ok(())
}

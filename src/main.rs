//! Supplyflow CLI - batch ETL over supply-chain order exports
//!
//! # Main Commands
//!
//! ```bash
//! supplyflow run orders.csv              # Full pipeline: validate, transform, load
//! supplyflow transform orders.csv -o out # Validate + transform + export, no load
//! supplyflow load out/transformed_data.csv --table supply_chain_data
//! ```
//!
//! # Debug Commands
//!
//! ```bash
//! supplyflow parse orders.csv            # Inspect encoding, delimiter, columns
//! supplyflow validate orders.csv         # Run the validator only
//! ```

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use supplyflow::{
    extract_file, load_csv, run, validate, RunLogger, RunOptions, SinkConfig,
};

#[derive(Parser)]
#[command(name = "supplyflow")]
#[command(about = "Batch ETL pipeline for supply-chain order data", long_about = None)]
struct Cli {
    /// Log file path
    #[arg(long, default_value = "etl.log", global = true)]
    log_file: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a source file and report what was detected
    Parse {
        /// Input CSV file
        input: PathBuf,
    },

    /// Validate a source file against the order schema
    Validate {
        /// Input CSV file
        input: PathBuf,
    },

    /// Validate, transform, and export without loading
    Transform {
        /// Input CSV file
        input: PathBuf,

        /// Output directory for the three export files
        #[arg(short, long, default_value = ".")]
        output: PathBuf,
    },

    /// Full pipeline: extract, validate, transform, export, load
    Run {
        /// Input CSV file
        input: PathBuf,

        /// Directory for the delimited exports (skipped if omitted)
        #[arg(short, long)]
        export_dir: Option<PathBuf>,

        /// Sink database path (default: DB_PATH from the environment)
        #[arg(long)]
        db: Option<String>,

        /// Target table name (default: DB_TABLE or supply_chain_data)
        #[arg(short, long)]
        table: Option<String>,

        /// Skip the load stage
        #[arg(long)]
        no_load: bool,
    },

    /// Load an already-transformed CSV into the sink
    Load {
        /// Transformed CSV file
        input: PathBuf,

        /// Sink database path (default: DB_PATH from the environment)
        #[arg(long)]
        db: Option<String>,

        /// Target table name (default: DB_TABLE or supply_chain_data)
        #[arg(short, long)]
        table: Option<String>,
    },
}

fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let logger = RunLogger::to_file(&cli.log_file).unwrap_or_else(|e| {
        eprintln!("⚠️  Cannot open log file {}: {}", cli.log_file.display(), e);
        RunLogger::stderr_only()
    });

    let result = match cli.command {
        Commands::Parse { input } => cmd_parse(&input),
        Commands::Validate { input } => cmd_validate(&input, &logger),
        Commands::Transform { input, output } => cmd_transform(&input, &output, &logger),
        Commands::Run {
            input,
            export_dir,
            db,
            table,
            no_load,
        } => cmd_run(&input, export_dir, db, table, no_load, &logger),
        Commands::Load { input, db, table } => cmd_load(&input, db, table, &logger),
    };

    logger.flush();

    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

fn cmd_parse(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("📄 Parsing: {}", input.display());

    let extraction = extract_file(input)?;

    eprintln!("   Encoding: {}", extraction.encoding);
    eprintln!("   Delimiter: '{}'", format_delimiter(extraction.delimiter));
    eprintln!("   Columns: {}", extraction.dataset.columns().join(", "));
    eprintln!("✅ Parsed {} rows", extraction.dataset.len());

    Ok(())
}

fn cmd_validate(input: &Path, logger: &RunLogger) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("✔️  Validating: {}", input.display());

    let extraction = extract_file(input)?;
    validate(&extraction.dataset, logger)?;

    eprintln!("✅ All {} rows pass the order schema", extraction.dataset.len());
    Ok(())
}

fn cmd_transform(
    input: &Path,
    output: &Path,
    logger: &RunLogger,
) -> Result<(), Box<dyn std::error::Error>> {
    let options = RunOptions {
        export_dir: Some(output.to_path_buf()),
        skip_load: true,
        ..Default::default()
    };

    let report = run(input, &options, logger)?;

    eprintln!(
        "✅ Transformed {} rows ({} regions, {} months)",
        report.rows, report.regions, report.months
    );
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn cmd_run(
    input: &Path,
    export_dir: Option<PathBuf>,
    db: Option<String>,
    table: Option<String>,
    no_load: bool,
    logger: &RunLogger,
) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("📄 Processing: {}", input.display());

    let options = RunOptions {
        export_dir,
        db_path: db,
        table,
        skip_load: no_load,
    };

    let report = run(input, &options, logger)?;

    eprintln!("   Encoding: {}", report.encoding);
    eprintln!("   Delimiter: '{}'", format_delimiter(report.delimiter));
    eprintln!("   Rows: {}", report.rows);
    if let Some(loaded) = &report.loaded {
        eprintln!("   Loaded {} rows into table '{}'", loaded.rows, loaded.table);
    }

    println!("{}", serde_json::to_string_pretty(&report)?);
    eprintln!("\n✨ Done!");
    Ok(())
}

fn cmd_load(
    input: &Path,
    db: Option<String>,
    table: Option<String>,
    logger: &RunLogger,
) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("📥 Loading: {}", input.display());

    let mut config = match db {
        Some(db_path) => SinkConfig {
            db_path,
            table: supplyflow::DEFAULT_TABLE.to_string(),
        },
        None => SinkConfig::from_env()?,
    };
    if let Some(table) = table {
        config.table = table;
    }

    let rows = load_csv(input, &config, logger)?;
    eprintln!("✅ Loaded {} rows into table '{}'", rows, config.table);
    Ok(())
}

fn format_delimiter(d: char) -> String {
    match d {
        '\t' => "\\t".to_string(),
        c => c.to_string(),
    }
}

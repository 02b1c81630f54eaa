//! rowbind CLI
//!
//! Command-line tool for binding CSV rows to records described by a JSON
//! binding config.

use clap::{Parser, Subcommand};
use rowbind_core::{
    read_csv, BindingConfig, ColumnKey, ColumnSpec, CsvSourceOptions, ExtractionMode, FieldConfig,
};
use std::collections::HashSet;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "rowbind")]
#[command(about = "Bind CSV rows to records", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Bind the rows of a CSV file and print the resulting records
    Bind {
        /// Path to binding config (JSON)
        #[arg(short, long)]
        config: PathBuf,

        /// Path to CSV file
        #[arg(short, long)]
        input: PathBuf,

        /// Discard the first row (index mode only)
        #[arg(long)]
        skip_header: bool,

        /// Skip blank rows instead of stopping at the first one
        #[arg(long)]
        keep_going: bool,

        /// Field delimiter
        #[arg(short, long, default_value_t = ',')]
        delimiter: char,

        /// Read numeric-looking fields as numbers
        #[arg(long)]
        detect_numbers: bool,

        /// Output format (json or text)
        #[arg(long, default_value = "json")]
        format: String,
    },

    /// Show the resolved binding table for a config
    Inspect {
        /// Path to binding config (JSON)
        #[arg(short, long)]
        config: PathBuf,
    },

    /// Create a binding config template
    CreateConfig {
        /// Record type name
        #[arg(short, long)]
        name: String,

        /// Output path for the config file
        #[arg(short, long)]
        output: PathBuf,

        /// Use header-based extraction
        #[arg(long)]
        headers: bool,

        /// Fields to include (name:locator[:data_type[:default]])
        #[arg(short, long)]
        field: Vec<String>,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli.command) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(command: Commands) -> rowbind_core::Result<()> {
    match command {
        Commands::Bind {
            config,
            input,
            skip_header,
            keep_going,
            delimiter,
            detect_numbers,
            format,
        } => cmd_bind(
            &config,
            &input,
            skip_header,
            keep_going,
            delimiter,
            detect_numbers,
            &format,
        ),
        Commands::Inspect { config } => cmd_inspect(&config),
        Commands::CreateConfig {
            name,
            output,
            headers,
            field,
        } => cmd_create_config(&name, &output, headers, &field),
    }
}

fn cmd_bind(
    config_path: &PathBuf,
    input: &PathBuf,
    skip_header: bool,
    keep_going: bool,
    delimiter: char,
    detect_numbers: bool,
    format: &str,
) -> rowbind_core::Result<()> {
    let config = BindingConfig::load(config_path)?;
    tracing::debug!(
        config = %config_path.display(),
        type_name = %config.name,
        fields = config.fields.len(),
        "loaded binding config"
    );

    let mut binder = config.binder()?;
    if skip_header {
        binder.set_skip_header(true);
    }
    if keep_going {
        binder.set_break_on_empty_row(false);
    }

    if !delimiter.is_ascii() {
        eprintln!("Delimiter must be a single ASCII character, got '{}'", delimiter);
        std::process::exit(1);
    }
    let source_options = CsvSourceOptions {
        delimiter: delimiter as u8,
        detect_numbers,
    };

    let rows = read_csv(input, &source_options)?;
    let row_count = rows.len();
    let records = binder.bind(rows)?;
    tracing::info!(
        input = %input.display(),
        rows = row_count,
        records = records.len(),
        "bound input"
    );

    match format.to_lowercase().as_str() {
        "json" => {
            let json = serde_json::to_string_pretty(&records)?;
            println!("{}", json);
        }
        "text" => {
            for record in &records {
                println!("{}", record);
                println!();
            }
            println!("{} record(s)", records.len());
        }
        _ => {
            eprintln!("Unknown format: {}. Supported formats: json, text", format);
            std::process::exit(1);
        }
    }

    Ok(())
}

fn cmd_inspect(config_path: &PathBuf) -> rowbind_core::Result<()> {
    let config = BindingConfig::load(config_path)?;
    let binder = config.binder()?;
    let table = binder.table();

    println!("Type: {}", config.name);
    println!("Mode: {:?}", binder.mode());
    println!("Skip header: {}", binder.skip_header());
    println!("Break on empty row: {}", binder.break_on_empty_row());
    println!();
    println!("Bindings ({}):", table.len());

    for (key, binding) in table.entries() {
        let column = match key {
            ColumnKey::Index(i) => format!("column {}", i),
            ColumnKey::Header(h) => format!("header '{}'", h),
        };
        let default = if binding.default_value.is_empty() {
            String::new()
        } else {
            format!(" (default '{}')", binding.default_value)
        };
        println!(
            "  {} -> {} : {}{}",
            column, binding.field_name, binding.data_type, default
        );
    }

    let bound: HashSet<usize> = table.entries().iter().map(|(_, b)| b.field).collect();
    let unbound: Vec<&str> = binder
        .schema()
        .fields()
        .iter()
        .enumerate()
        .filter(|(i, _)| !bound.contains(i))
        .map(|(_, f)| f.name())
        .collect();
    if !unbound.is_empty() {
        println!();
        println!("Fields without {:?} metadata: {}", binder.mode(), unbound.join(", "));
    }

    Ok(())
}

fn cmd_create_config(
    name: &str,
    output: &PathBuf,
    headers: bool,
    fields: &[String],
) -> rowbind_core::Result<()> {
    let mode = if headers {
        ExtractionMode::ColumnHeader
    } else {
        ExtractionMode::ColumnIndex
    };

    let mut config = BindingConfig {
        name: name.to_string(),
        bindable: true,
        mode,
        options: Default::default(),
        fields: Vec::new(),
    };

    // Parse fields: "name:locator[:data_type[:default]]"
    for field in fields {
        let parts: Vec<&str> = field.splitn(4, ':').collect();
        if parts.len() < 2 {
            eprintln!(
                "Warning: Invalid field format '{}', expected 'name:locator[:data_type[:default]]'",
                field
            );
            continue;
        }

        let mut spec = ColumnSpec::new(parts[1]);
        if let Some(data_type) = parts.get(2) {
            spec = spec.data_type(*data_type);
        }
        if let Some(default_value) = parts.get(3) {
            spec = spec.default_value(*default_value);
        }

        let (column_index, column_header) = match mode {
            ExtractionMode::ColumnIndex => (Some(spec), None),
            ExtractionMode::ColumnHeader => (None, Some(spec)),
        };
        config.fields.push(FieldConfig {
            name: parts[0].to_string(),
            column_index,
            column_header,
        });
    }

    // If no fields provided, add a placeholder
    if config.fields.is_empty() {
        let locator = if headers { "ColumnName" } else { "0" };
        config.fields.push(FieldConfig {
            name: "field".to_string(),
            column_index: (!headers).then(|| ColumnSpec::new(locator)),
            column_header: headers.then(|| ColumnSpec::new(locator)),
        });
    }

    config.save(output)?;
    println!("Created config file: {}", output.display());
    println!("Type: {}", name);
    println!("Fields: {}", config.fields.len());
    println!();
    println!("Edit the file to describe your columns, then run:");
    println!("  rowbind bind --config {} --input <csv>", output.display());

    Ok(())
}

// Rust Data Cleaning Pipeline - Main executable
// Author: Gabriel Demetrios Lafis

use std::fs::File;
use std::io::{self, BufWriter, Write};

use anyhow::{bail, Context};
use clap::{Arg, ArgMatches, Command};
use log::{error, info};

use rust_data_cleaning_pipeline::{
    data::{CsvSink, CsvSource, DataSet, DataSource, JsonSink},
    processing::{DropReport, GroupSummary},
    rules::{CleaningRules, PRESET_NAMES},
    utils::{init_logging, Config},
};

fn main() {
    if let Err(err) = run() {
        error!("{:#}", err);
        eprintln!("Error: {:#}", err);
        std::process::exit(1);
    }
}

fn input_args() -> [Arg<'static>; 2] {
    [
        Arg::new("input")
            .short('i')
            .long("input")
            .value_name("FILE")
            .help("Raw CSV file to clean")
            .takes_value(true)
            .required(true),
        Arg::new("rules")
            .short('r')
            .long("rules")
            .value_name("PRESET|FILE")
            .help("Built-in preset (salary, movies, food) or a YAML/JSON rules file")
            .takes_value(true)
            .required(true),
    ]
}

fn run() -> anyhow::Result<()> {
    // Parse command line arguments
    let matches = Command::new("Rust Data Cleaning Pipeline")
        .version(env!("CARGO_PKG_VERSION"))
        .author("Gabriel Demetrios Lafis")
        .about("Rule-driven cleaning of CSV survey extracts")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Sets a custom config file")
                .takes_value(true),
        )
        .arg(
            Arg::new("log-level")
                .long("log-level")
                .value_name("LEVEL")
                .help("Overrides the configured log level")
                .takes_value(true),
        )
        .subcommand_required(true)
        .subcommand(
            Command::new("clean")
                .about("Clean a CSV file and write the result")
                .args(input_args())
                .arg(
                    Arg::new("output")
                        .short('o')
                        .long("output")
                        .value_name("FILE")
                        .help("Output file (defaults to stdout)")
                        .takes_value(true),
                )
                .arg(
                    Arg::new("format")
                        .short('f')
                        .long("format")
                        .value_name("FORMAT")
                        .help("Output format")
                        .possible_values(["csv", "json"])
                        .takes_value(true),
                )
                .arg(
                    Arg::new("report")
                        .long("report")
                        .value_name("FILE")
                        .help("Write the drop report as JSON to FILE, or '-' for a text report on stderr")
                        .takes_value(true),
                ),
        )
        .subcommand(
            Command::new("summarize")
                .about("Clean a CSV file, then summarize a numeric column by group")
                .args(input_args())
                .arg(
                    Arg::new("group")
                        .short('g')
                        .long("group")
                        .value_name("COLUMN")
                        .takes_value(true)
                        .required(true),
                )
                .arg(
                    Arg::new("value")
                        .short('v')
                        .long("value")
                        .value_name("COLUMN")
                        .takes_value(true)
                        .required(true),
                ),
        )
        .subcommand(
            Command::new("rules")
                .about("Print a built-in rule table as YAML")
                .arg(
                    Arg::new("preset")
                        .value_name("PRESET")
                        .possible_values(PRESET_NAMES.iter().copied())
                        .required(true),
                ),
        )
        .get_matches();

    // Load configuration
    let mut config = match matches.value_of("config") {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("loading config file {}", path))?,
        None => Config::default(),
    };
    if let Some(level) = matches.value_of("log-level") {
        config.logging.level = level.to_string();
    }

    // Initialize logging
    if let Err(err) = init_logging(config.log_level_filter()) {
        eprintln!("Error initializing logger: {}", err);
    }

    match matches.subcommand() {
        Some(("clean", sub)) => run_clean(&config, sub),
        Some(("summarize", sub)) => run_summarize(&config, sub),
        Some(("rules", sub)) => {
            let name = sub.value_of("preset").unwrap_or_default();
            let rules = CleaningRules::load(name)?;
            print!("{}", serde_yaml::to_string(&rules)?);
            Ok(())
        }
        _ => bail!("No subcommand specified. Use --help for usage information."),
    }
}

/// Read the input file and clean it with the selected rules
fn load_and_clean(config: &Config, matches: &ArgMatches) -> anyhow::Result<(DataSet, DropReport)> {
    let input = matches.value_of("input").unwrap_or_default();
    let rules_name = matches.value_of("rules").unwrap_or_default();

    let rules = CleaningRules::load(rules_name)
        .with_context(|| format!("loading rules '{}'", rules_name))?;

    let raw = CsvSource::new(input, config.input.has_header, config.input.delimiter)
        .with_na_values(config.input.na_values.iter().cloned())
        .read()
        .with_context(|| format!("reading {}", input))?;
    info!("Loaded {} rows from {}", raw.len(), input);

    let cleaned = rules.clean(&raw)?;
    Ok(cleaned)
}

fn run_clean(config: &Config, matches: &ArgMatches) -> anyhow::Result<()> {
    let (cleaned, report) = load_and_clean(config, matches)?;

    let format = matches
        .value_of("format")
        .unwrap_or(config.output.format.as_str())
        .to_lowercase();

    let writer: Box<dyn Write> = match matches.value_of("output") {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("creating {}", path))?,
        )),
        None => Box::new(BufWriter::new(io::stdout())),
    };

    match format.as_str() {
        "csv" => CsvSink::new("-", config.output.delimiter).write_to(&cleaned, writer)?,
        "json" => JsonSink::new("-", config.output.pretty).write_to(&cleaned, writer)?,
        other => bail!("Unsupported output format: {}", other),
    }

    match matches.value_of("report") {
        Some("-") => eprintln!("{}", report),
        Some(path) => {
            let file = File::create(path).with_context(|| format!("creating {}", path))?;
            serde_json::to_writer_pretty(BufWriter::new(file), &report)?;
        }
        None => info!("{} rows written, {} dropped", report.output_rows, report.total_dropped()),
    }

    Ok(())
}

fn run_summarize(config: &Config, matches: &ArgMatches) -> anyhow::Result<()> {
    let (cleaned, _) = load_and_clean(config, matches)?;

    let group = matches.value_of("group").unwrap_or_default();
    let value = matches.value_of("value").unwrap_or_default();
    let summary = GroupSummary::new(group, value).process(&cleaned)?;

    CsvSink::new("-", config.output.delimiter).write_to(&summary, BufWriter::new(io::stdout()))?;
    Ok(())
}

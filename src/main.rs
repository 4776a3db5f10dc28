//! drawvars CLI
//!
//! Usage:
//!   drawvars [OPTIONS] [FILE]
//!
//! Options:
//!   -c, --config <FILE>      Compile configuration (TOML format)
//!   -f, --format <FORMAT>    Input format (toml, json); guessed from the extension otherwise
//!   -p, --pretty             Pretty-print the JSON output
//!       --log-level <LEVEL>  off, error, warn, info, debug, trace
//!   -h, --help               Print help

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process;
use std::str::FromStr;

use clap::{Parser, ValueEnum};
use log::{debug, info, LevelFilter};

use drawvars::{CompileConfig, Compiler, SourceFormat};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Format {
    Toml,
    Json,
}

impl From<Format> for SourceFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Toml => SourceFormat::Toml,
            Format::Json => SourceFormat::Json,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "drawvars")]
#[command(about = "Compile a drawing document into a flat variable table")]
struct Cli {
    /// Input file (reads from stdin if not provided)
    input: Option<PathBuf>,

    /// Compile configuration file (TOML format)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Input format; guessed from the file extension when omitted
    #[arg(short, long, value_enum)]
    format: Option<Format>,

    /// Pretty-print the JSON output
    #[arg(short, long)]
    pretty: bool,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "warn")]
    log_level: String,
}

fn main() {
    let cli = Cli::parse();

    let log_level = LevelFilter::from_str(&cli.log_level).unwrap_or_else(|_| {
        eprintln!("Invalid log level: {}. Using 'warn' instead.", cli.log_level);
        LevelFilter::Warn
    });
    env_logger::Builder::from_env(env_logger::Env::default())
        .filter_level(log_level)
        .init();
    debug!(cli:?; "Parsed arguments");

    let config = match &cli.config {
        Some(path) => match CompileConfig::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Error loading config '{}': {}", path.display(), e);
                process::exit(1);
            }
        },
        None => CompileConfig::default(),
    };

    let compiler = match Compiler::new(config) {
        Ok(compiler) => compiler,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    // Read input
    let (source, filename) = match &cli.input {
        Some(path) => match fs::read_to_string(path) {
            Ok(content) => (content, path.display().to_string()),
            Err(e) => {
                eprintln!("Error reading file '{}': {}", path.display(), e);
                process::exit(1);
            }
        },
        None => {
            let mut buffer = String::new();
            match io::stdin().read_to_string(&mut buffer) {
                Ok(_) => (buffer, "<stdin>".to_string()),
                Err(e) => {
                    eprintln!("Error reading from stdin: {}", e);
                    process::exit(1);
                }
            }
        }
    };

    let format = match (cli.format, &cli.input) {
        (Some(format), _) => SourceFormat::from(format),
        (None, Some(path)) => SourceFormat::from_path(path),
        (None, None) => SourceFormat::default(),
    };
    info!(filename = filename.as_str(), format:?; "Compiling");

    let table = match format
        .parse(&source)
        .map_err(drawvars::CompileError::from)
        .and_then(|node| compiler.compile(&node))
    {
        Ok(table) => table,
        Err(e) => {
            eprintln!("{}", e.format(&source, &filename));
            process::exit(1);
        }
    };

    let output = if cli.pretty {
        serde_json::to_string_pretty(&table)
    } else {
        serde_json::to_string(&table)
    };
    match output {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Error writing output: {}", e);
            process::exit(1);
        }
    }
}

//! Export a Lab Report Layout to JSON
//!
//! Reads positioned text boxes (an array of pages, each with a `boxes` array)
//! and prints the parsed record as a JSON object keyed by canonical field name.
//!
//! Usage:
//!   cargo run --release --bin lab_to_json -- layout.json
//!   cargo run --release --bin lab_to_json -- layout.json --output record.json --verbose
//!   cat layout.json | cargo run --release --bin lab_to_json -- -

use labtool::{JsonLayout, LabReportParser};
use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

struct ExportConfig {
    input: Option<PathBuf>,
    output: Option<PathBuf>,
    verbose: bool,
}

impl ExportConfig {
    fn from_args() -> Self {
        let args: Vec<String> = std::env::args().collect();
        let mut input = None;
        let mut output = None;
        let mut verbose = false;

        let mut i = 1;
        while i < args.len() {
            match args[i].as_str() {
                "--output" | "-o" => {
                    i += 1;
                    if i < args.len() {
                        output = Some(PathBuf::from(&args[i]));
                    }
                },
                "--verbose" | "-v" => {
                    verbose = true;
                },
                "-" => input = None,
                other => input = Some(PathBuf::from(other)),
            }
            i += 1;
        }

        Self {
            input,
            output,
            verbose,
        }
    }
}

fn run(config: &ExportConfig) -> Result<usize, Box<dyn std::error::Error>> {
    let layout = match &config.input {
        Some(path) => JsonLayout::open(path)?,
        None => JsonLayout::from_reader(io::stdin().lock())?,
    };

    let start = Instant::now();
    let parser = LabReportParser::new();
    let record = parser.parse_source(&layout)?;
    let elapsed = start.elapsed();

    let json = serde_json::to_string_pretty(&record.to_json()?)?;
    match &config.output {
        Some(path) => {
            let mut file = File::create(path)?;
            file.write_all(json.as_bytes())?;
            file.write_all(b"\n")?;
        },
        None => println!("{}", json),
    }

    if config.verbose {
        eprintln!("Fields: {}", record.len());
        eprintln!("Time: {:?}", elapsed);
        if let Some(path) = &config.output {
            eprintln!("Output: {}", path.display());
        }
    }

    Ok(record.len())
}

fn main() -> ExitCode {
    env_logger::init();
    let config = ExportConfig::from_args();

    match run(&config) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        },
    }
}

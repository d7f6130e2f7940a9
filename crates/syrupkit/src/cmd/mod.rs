use std::fs::File;
use std::io::Read;
use std::path::PathBuf;

use clap::{Args, Subcommand};

use crate::exit::{io_error, CliError, CliResult, DATA_INVALID};
use crate::output::OutputFormat;

pub mod decode;
pub mod encode;
pub mod inspect;
pub mod version;

/// Largest input accepted from stdin or a file: 10 MiB.
pub const MAX_INPUT_BYTES: u64 = 10 * 1024 * 1024;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Encode JSON into canonical syrup bytes.
    Encode(EncodeArgs),
    /// Decode syrup bytes and print them as JSON.
    Decode(DecodeArgs),
    /// Summarize every frame in a length-prefixed stream.
    Inspect(InspectArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Encode(args) => encode::run(args),
        Command::Decode(args) => decode::run(args),
        Command::Inspect(args) => inspect::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct EncodeArgs {
    /// Read JSON from a file instead of stdin.
    #[arg(long, short = 'i', value_name = "FILE")]
    pub input: Option<PathBuf>,
    /// Wrap the output in a length-prefixed frame.
    #[arg(long)]
    pub frame: bool,
}

#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// Read bytes from a file instead of stdin.
    #[arg(long, short = 'i', value_name = "FILE")]
    pub input: Option<PathBuf>,
    /// Input is a stream of length-prefixed frames; prints one JSON line per frame.
    #[arg(long)]
    pub frame: bool,
    /// Pretty-print JSON output.
    #[arg(long, conflicts_with = "frame")]
    pub pretty: bool,
}

#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Read the framed stream from a file instead of stdin.
    #[arg(long, short = 'i', value_name = "FILE")]
    pub input: Option<PathBuf>,
    /// Maximum accepted payload size in bytes.
    #[arg(long, value_name = "BYTES", default_value_t = syrupkit_frame::DEFAULT_MAX_PAYLOAD)]
    pub max_payload: usize,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

/// Read all input from `path`, or stdin when absent, refusing more than
/// [`MAX_INPUT_BYTES`].
pub fn read_input(path: Option<&PathBuf>) -> CliResult<Vec<u8>> {
    let (source, reader): (String, Box<dyn Read>) = match path {
        Some(path) => {
            let file = File::open(path)
                .map_err(|err| io_error(&format!("failed opening {}", path.display()), err))?;
            (path.display().to_string(), Box::new(file))
        }
        None => ("stdin".to_string(), Box::new(std::io::stdin().lock())),
    };

    let mut data = Vec::new();
    reader
        .take(MAX_INPUT_BYTES + 1)
        .read_to_end(&mut data)
        .map_err(|err| io_error(&format!("failed reading {source}"), err))?;

    if data.len() as u64 > MAX_INPUT_BYTES {
        return Err(CliError::new(
            DATA_INVALID,
            format!("{source} exceeds the {MAX_INPUT_BYTES}-byte input limit"),
        ));
    }
    tracing::debug!(source = %source, bytes = data.len(), "input read");
    Ok(data)
}

mod cmd;
mod exit;
mod logging;
mod output;

use clap::Parser;

use crate::cmd::Command;
use crate::logging::{init_logging, LogFormat, LogLevel};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "syrupkit", version, about = "Canonical syrup encoding tools")]
struct Cli {
    /// Output format for inspect.
    #[arg(long, value_name = "FORMAT", global = true)]
    format: Option<OutputFormat>,

    /// Log output format (stderr).
    #[arg(long, value_name = "FORMAT", default_value = "text", global = true)]
    log_format: LogFormat,

    /// Minimum log level (stderr).
    #[arg(long, value_name = "LEVEL", default_value = "warn", global = true)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_level);

    let format = cli.format.unwrap_or_else(OutputFormat::default_for_stdout);
    let result = cmd::run(cli.command, format);

    match result {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            tracing::debug!(code = err.code, "command failed");
            eprintln!("error: {err}");
            std::process::exit(err.code);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_encode_subcommand() {
        let cli = Cli::try_parse_from(["syrupkit", "encode", "--frame"])
            .expect("encode args should parse");
        assert!(matches!(cli.command, Command::Encode(ref args) if args.frame));
    }

    #[test]
    fn rejects_pretty_with_frame() {
        let err = Cli::try_parse_from(["syrupkit", "decode", "--frame", "--pretty"])
            .expect_err("conflicting args should fail");
        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }

    #[test]
    fn parses_inspect_with_global_format() {
        let cli = Cli::try_parse_from(["syrupkit", "inspect", "--format", "table"])
            .expect("inspect args should parse");
        assert!(matches!(cli.format, Some(OutputFormat::Table)));
        assert!(matches!(cli.command, Command::Inspect(_)));
    }
}

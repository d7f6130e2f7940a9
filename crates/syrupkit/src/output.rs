use std::io::{IsTerminal, Write};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;

use crate::exit::{io_error, CliResult};

/// Longest value preview shown per frame, in characters.
const PREVIEW_CHARS: usize = 72;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

/// One line of `inspect` output.
#[derive(Debug, Serialize)]
pub struct FrameSummary {
    pub index: usize,
    pub offset: usize,
    pub payload_size: usize,
    pub kind: String,
    pub preview: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

pub fn print_summaries(frames: &[FrameSummary], format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            for frame in frames {
                println!(
                    "{}",
                    serde_json::to_string(frame).unwrap_or_else(|_| "{}".to_string())
                );
            }
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["#", "OFFSET", "SIZE", "KIND", "VALUE"]);
            for frame in frames {
                table.add_row(vec![
                    frame.index.to_string(),
                    frame.offset.to_string(),
                    frame.payload_size.to_string(),
                    frame.kind.clone(),
                    frame.error.clone().unwrap_or_else(|| frame.preview.clone()),
                ]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            for frame in frames {
                match &frame.error {
                    Some(err) => println!(
                        "frame {} offset={} size={} error: {}",
                        frame.index, frame.offset, frame.payload_size, err
                    ),
                    None => println!(
                        "frame {} offset={} size={} {} {}",
                        frame.index, frame.offset, frame.payload_size, frame.kind, frame.preview
                    ),
                }
            }
        }
    }
}

/// Write bytes to stdout unchanged.
pub fn print_raw(data: &[u8]) -> CliResult<()> {
    let mut out = std::io::stdout().lock();
    out.write_all(data)
        .and_then(|()| out.flush())
        .map_err(|err| io_error("failed writing stdout", err))
}

/// Shorten `text` to [`PREVIEW_CHARS`], marking the cut with an ellipsis.
pub fn preview(text: &str) -> String {
    match text.char_indices().nth(PREVIEW_CHARS) {
        Some((cut, _)) => format!("{}…", &text[..cut]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preview_keeps_short_text() {
        assert_eq!(preview("[1, 2]"), "[1, 2]");
    }

    #[test]
    fn preview_cuts_on_char_boundary() {
        let long = "é".repeat(PREVIEW_CHARS + 5);
        let short = preview(&long);
        assert_eq!(short.chars().count(), PREVIEW_CHARS + 1);
        assert!(short.ends_with('…'));
    }
}

use syrupkit_frame::{Accumulator, FrameConfig, FrameError, HEADER_SIZE};
use syrupkit_value::Decoder;

use crate::cmd::{read_input, InspectArgs, MAX_INPUT_BYTES};
use crate::exit::{frame_error, CliError, CliResult, DATA_INVALID, SUCCESS};
use crate::output::{preview, print_summaries, FrameSummary, OutputFormat};

/// Bytes handed to the accumulator per step, like one socket read.
const FEED_CHUNK: usize = 16 * 1024;

pub fn run(args: InspectArgs, format: OutputFormat) -> CliResult<i32> {
    let input = read_input(args.input.as_ref())?;
    let config = FrameConfig {
        max_payload_size: args.max_payload,
        ..FrameConfig::default()
    };
    let decoder = config.decoder();
    // Nothing larger than the input cap can arrive complete.
    let capacity = args.max_payload.min(MAX_INPUT_BYTES as usize) + HEADER_SIZE;
    let mut acc = Accumulator::with_config(capacity, config);

    let mut summaries = Vec::new();
    let mut rest = input.as_slice();
    let mut offset = 0usize;
    let mut rejected = 0usize;

    loop {
        let index = summaries.len();
        let next = acc
            .next_frame()
            .map(|frame| frame.map(|payload| summarize(&decoder, index, offset, payload)));

        match next {
            Ok(Some(summary)) => {
                offset += HEADER_SIZE + summary.payload_size;
                if summary.error.is_some() {
                    rejected += 1;
                }
                summaries.push(summary);
            }
            Ok(None) if rest.is_empty() => break,
            Ok(None) => {
                let n = acc.extend_from_slice(&rest[..rest.len().min(FEED_CHUNK)]);
                rest = &rest[n..];
            }
            Err(FrameError::MessageTooLarge { size, max }) => {
                summaries.push(FrameSummary {
                    index,
                    offset,
                    payload_size: size,
                    kind: "oversized".to_string(),
                    preview: String::new(),
                    error: Some(format!("payload of {size} bytes exceeds limit of {max}")),
                });
                offset += HEADER_SIZE + size;
                rejected += 1;
            }
            Err(err) => return Err(frame_error("inspect failed", err)),
        }
    }

    print_summaries(&summaries, format);
    tracing::debug!(frames = summaries.len(), rejected, "stream inspected");

    if !acc.is_empty() || offset > input.len() {
        return Err(CliError::new(
            DATA_INVALID,
            format!("stream ends mid-frame at offset {offset}"),
        ));
    }
    if rejected > 0 {
        return Err(CliError::new(
            DATA_INVALID,
            format!("{rejected} of {} frames rejected", summaries.len()),
        ));
    }
    Ok(SUCCESS)
}

fn summarize(decoder: &Decoder, index: usize, offset: usize, payload: &[u8]) -> FrameSummary {
    let (kind, preview_text, error) = match decoder.decode(payload) {
        Ok(value) => (value.kind().to_string(), preview(&value.to_string()), None),
        Err(err) => ("invalid".to_string(), String::new(), Some(err.to_string())),
    };
    FrameSummary {
        index,
        offset,
        payload_size: payload.len(),
        kind,
        preview: preview_text,
        error,
    }
}

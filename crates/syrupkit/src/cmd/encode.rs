use syrupkit_frame::FrameWriter;
use syrupkit_value::to_vec;

use crate::cmd::{read_input, EncodeArgs};
use crate::exit::{
    encode_error, frame_error, json_error, CliError, CliResult, DATA_INVALID, SUCCESS,
};
use crate::output::print_raw;

pub fn run(args: EncodeArgs) -> CliResult<i32> {
    let input = read_input(args.input.as_ref())?;
    let text = std::str::from_utf8(&input)
        .map_err(|err| CliError::new(DATA_INVALID, format!("input is not UTF-8: {err}")))?;
    let value =
        syrupkit_json::from_json_str(text).map_err(|err| json_error("invalid input", err))?;

    if args.frame {
        let mut writer = FrameWriter::new(std::io::stdout().lock());
        writer
            .write_value(&value)
            .map_err(|err| frame_error("encode failed", err))?;
    } else {
        let bytes = to_vec(&value).map_err(|err| encode_error("encode failed", err))?;
        print_raw(&bytes)?;
    }

    tracing::debug!(kind = %value.kind(), framed = args.frame, "value encoded");
    Ok(SUCCESS)
}

use bytes::{Bytes, BytesMut};
use syrupkit_frame::{split_frame, DEFAULT_MAX_PAYLOAD};
use syrupkit_json::to_json_string;
use syrupkit_value::{decode_bytes, Value};

use crate::cmd::{read_input, DecodeArgs};
use crate::exit::{
    decode_error, frame_error, json_error, CliError, CliResult, DATA_INVALID, SUCCESS,
};

pub fn run(args: DecodeArgs) -> CliResult<i32> {
    let input = read_input(args.input.as_ref())?;

    if !args.frame {
        let value = decode_bytes(&Bytes::from(input))
            .map_err(|err| decode_error("decode failed", err))?;
        print_json(&value, args.pretty)?;
        return Ok(SUCCESS);
    }

    let mut buf = BytesMut::from(input.as_slice());
    let mut index = 0usize;
    while let Some(payload) = split_frame(&mut buf, DEFAULT_MAX_PAYLOAD)
        .map_err(|err| frame_error(&format!("frame {index}"), err))?
    {
        let value =
            decode_bytes(&payload).map_err(|err| decode_error(&format!("frame {index}"), err))?;
        print_json(&value, false)?;
        index += 1;
    }

    if !buf.is_empty() {
        return Err(CliError::new(
            DATA_INVALID,
            format!("frame {index}: stream ends mid-frame ({} bytes left over)", buf.len()),
        ));
    }

    tracing::debug!(frames = index, "framed stream decoded");
    Ok(SUCCESS)
}

fn print_json(value: &Value, pretty: bool) -> CliResult<()> {
    let text =
        to_json_string(value, pretty).map_err(|err| json_error("cannot show as JSON", err))?;
    println!("{text}");
    Ok(())
}

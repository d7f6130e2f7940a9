use crate::cmd::VersionArgs;
use crate::exit::{CliResult, SUCCESS};

pub fn run(args: VersionArgs) -> CliResult<i32> {
    if !args.extended {
        println!("syrupkit {}", env!("CARGO_PKG_VERSION"));
        return Ok(SUCCESS);
    }

    println!("name: syrupkit");
    println!("version: {}", env!("CARGO_PKG_VERSION"));
    println!(
        "target: {}",
        option_env!("SYRUPKIT_BUILD_TARGET").unwrap_or("unknown")
    );
    println!("target_os: {}", std::env::consts::OS);
    println!("target_arch: {}", std::env::consts::ARCH);
    println!("features: async={}, cli=true", cfg!(feature = "async"));
    println!(
        "limits: max_payload={} max_depth={} max_input={}",
        syrupkit_frame::DEFAULT_MAX_PAYLOAD,
        syrupkit_value::DEFAULT_MAX_DEPTH,
        crate::cmd::MAX_INPUT_BYTES
    );

    Ok(SUCCESS)
}

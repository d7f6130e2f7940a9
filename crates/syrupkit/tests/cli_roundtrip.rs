#![cfg(feature = "cli")]

use std::io::Write;
use std::process::{Command, Output, Stdio};

use bytes::{BufMut, BytesMut};
use syrupkit::frame::{encode_frame, encode_raw_frame, DEFAULT_MAX_PAYLOAD};
use syrupkit::value::Value;

fn run(args: &[&str], stdin: &[u8]) -> Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_syrupkit"))
        .args(["--log-level", "error"])
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("syrupkit should start");

    child
        .stdin
        .take()
        .expect("stdin should be piped")
        .write_all(stdin)
        .expect("stdin should accept input");
    child.wait_with_output().expect("syrupkit should exit")
}

#[test]
fn encode_emits_canonical_bytes() {
    let out = run(&["encode"], br#"{"b": 2, "a": [true, null, "x"]}"#);
    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
    assert_eq!(out.stdout, b"{1\"a[tn1\"x]1\"b2+}");
}

#[test]
fn encode_then_decode_round_trips() {
    let json = r#"{"id":7,"payload":{"$bytes":"00ff"},"tags":{"$set":["x","y"]}}"#;
    let encoded = run(&["encode"], json.as_bytes());
    assert!(encoded.status.success());

    let decoded = run(&["decode"], &encoded.stdout);
    assert!(decoded.status.success());
    let got: serde_json::Value = serde_json::from_slice(&decoded.stdout).unwrap();
    let want: serde_json::Value = serde_json::from_str(json).unwrap();
    assert_eq!(got, want);
}

#[test]
fn decode_rejects_non_canonical_dictionary() {
    let out = run(&["decode"], b"{1'b1+1'a2+}");
    assert_eq!(out.status.code(), Some(60));
    assert!(String::from_utf8_lossy(&out.stderr).contains("error:"));
}

#[test]
fn decode_framed_stream_prints_one_line_per_frame() {
    let mut wire = BytesMut::new();
    encode_frame(&Value::integer(1), &mut wire).unwrap();
    encode_frame(&Value::string("two"), &mut wire).unwrap();

    let out = run(&["decode", "--frame"], &wire);
    assert!(out.status.success());
    assert_eq!(String::from_utf8(out.stdout).unwrap(), "1\n\"two\"\n");
}

#[test]
fn decode_framed_stream_reports_truncation() {
    let mut wire = BytesMut::new();
    encode_frame(&Value::integer(1), &mut wire).unwrap();
    wire.put_u32(10);
    wire.put_slice(b"3\"");

    let out = run(&["decode", "--frame"], &wire);
    assert_eq!(out.status.code(), Some(60));
    assert_eq!(String::from_utf8(out.stdout).unwrap(), "1\n");
}

#[test]
fn encode_frame_then_inspect() {
    let framed = run(&["encode", "--frame"], br#"["hello", 42]"#);
    assert!(framed.status.success());
    assert_eq!(&framed.stdout[..4], &[0, 0, 0, 12]);

    let out = run(&["inspect", "--format", "json"], &framed.stdout);
    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
    let line: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(line["index"], 0);
    assert_eq!(line["payload_size"], 12);
    assert_eq!(line["kind"], "list");
}

#[test]
fn inspect_continues_past_bad_frames() {
    let mut wire = BytesMut::new();
    encode_raw_frame(b"?", &mut wire, DEFAULT_MAX_PAYLOAD).unwrap();
    encode_raw_frame(&[b'x'; 64], &mut wire, DEFAULT_MAX_PAYLOAD).unwrap();
    encode_frame(&Value::symbol("ok"), &mut wire).unwrap();

    let out = run(&["inspect", "--format", "json", "--max-payload", "32"], &wire);
    assert_eq!(out.status.code(), Some(60));

    let lines: Vec<serde_json::Value> = String::from_utf8(out.stdout)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0]["kind"], "invalid");
    assert_eq!(lines[1]["kind"], "oversized");
    assert_eq!(lines[2]["kind"], "symbol");
    assert_eq!(lines[2]["offset"], 4 + 1 + 4 + 64);
}

#[test]
fn invalid_json_is_data_error() {
    let out = run(&["encode"], b"{not json");
    assert_eq!(out.status.code(), Some(60));
}

#[test]
fn oversized_input_is_rejected() {
    let big = vec![b' '; 10 * 1024 * 1024 + 1];
    let out = run(&["encode"], &big);
    assert_eq!(out.status.code(), Some(60));
    assert!(String::from_utf8_lossy(&out.stderr).contains("input limit"));
}

#[test]
fn version_prints_name() {
    let out = run(&["version"], b"");
    assert!(out.status.success());
    assert!(String::from_utf8(out.stdout).unwrap().starts_with("syrupkit "));
}

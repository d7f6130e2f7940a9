use std::io::{ErrorKind, Write};

use bytes::{Buf, BytesMut};
use syrupkit_value::Value;

use crate::codec::{encode_frame_with, encode_raw_frame, FrameConfig};
use crate::error::{FrameError, Result};

const INITIAL_BUFFER_CAPACITY: usize = 8 * 1024;

/// Writes complete frames to any `Write` stream.
///
/// On a non-blocking stream a write may fail with `WouldBlock`. The unsent
/// tail stays buffered and goes out first on the next write or
/// [`flush`](Self::flush), so frames are never interleaved or cut short.
pub struct FrameWriter<T> {
    inner: T,
    buf: BytesMut,
    config: FrameConfig,
}

impl<T: Write> FrameWriter<T> {
    /// Create a new frame writer with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, FrameConfig::default())
    }

    /// Create a new frame writer with explicit configuration.
    pub fn with_config(inner: T, config: FrameConfig) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            config,
        }
    }

    /// Encode `value` and write it as one frame.
    pub fn write_value(&mut self, value: &Value) -> Result<()> {
        encode_frame_with(value, &mut self.buf, &self.config)?;
        self.flush()
    }

    /// Write an already-encoded payload as one frame.
    pub fn write_payload(&mut self, payload: &[u8]) -> Result<()> {
        encode_raw_frame(payload, &mut self.buf, self.config.max_payload_size)?;
        self.flush()
    }

    /// Bytes accepted but not yet written to the stream.
    pub fn pending(&self) -> usize {
        self.buf.len()
    }

    /// Write any pending bytes, then flush the underlying stream.
    pub fn flush(&mut self) -> Result<()> {
        while !self.buf.is_empty() {
            match self.inner.write(&self.buf) {
                Ok(0) => return Err(FrameError::ConnectionClosed),
                Ok(n) => self.buf.advance(n),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(FrameError::Io(err)),
            }
        }

        loop {
            match self.inner.flush() {
                Ok(()) => return Ok(()),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(FrameError::Io(err)),
            }
        }
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the writer and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Update maximum payload size for subsequent frame encoding.
    pub fn set_max_payload_size(&mut self, max_payload_size: usize) {
        self.config.max_payload_size = max_payload_size;
    }

    /// Current frame writer configuration.
    pub fn config(&self) -> &FrameConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    use super::*;
    use crate::codec::{decode_frame, frame_count};

    fn written(writer: FrameWriter<Cursor<Vec<u8>>>) -> Vec<u8> {
        writer.into_inner().into_inner()
    }

    #[test]
    fn write_single_value() {
        let mut writer = FrameWriter::new(Cursor::new(Vec::<u8>::new()));
        writer.write_value(&Value::string("hello")).unwrap();

        let wire = written(writer);
        let frame = decode_frame(&wire, usize::MAX).unwrap().unwrap();
        assert_eq!(frame.payload, b"5\"hello");
        assert_eq!(frame.consumed, wire.len());
    }

    #[test]
    fn write_multiple_values() {
        let mut writer = FrameWriter::new(Cursor::new(Vec::<u8>::new()));
        writer.write_value(&Value::integer(1)).unwrap();
        writer.write_value(&Value::integer(-2)).unwrap();
        writer.write_value(&Value::Null).unwrap();

        assert_eq!(frame_count(&written(writer), usize::MAX), 3);
    }

    #[test]
    fn payload_too_large_rejected() {
        let cfg = FrameConfig {
            max_payload_size: 4,
            ..FrameConfig::default()
        };
        let mut writer = FrameWriter::with_config(Cursor::new(Vec::<u8>::new()), cfg);

        let err = writer.write_value(&Value::string("oversized")).unwrap_err();
        assert!(matches!(err, FrameError::MessageTooLarge { size: 11, max: 4 }));
        let err = writer.write_payload(b"oversized").unwrap_err();
        assert!(matches!(err, FrameError::MessageTooLarge { size: 9, max: 4 }));
        assert!(written(writer).is_empty());
    }

    #[test]
    fn write_payload_passthrough() {
        let mut writer = FrameWriter::new(Cursor::new(Vec::<u8>::new()));
        writer.write_payload(b"3'abc").unwrap();

        let wire = written(writer);
        let frame = decode_frame(&wire, usize::MAX).unwrap().unwrap();
        assert_eq!(frame.decode().unwrap(), Value::symbol("abc"));
    }

    #[test]
    fn flush_propagates() {
        let sink = FlushTrackingWriter::default();
        let flag = Arc::clone(&sink.flushed);
        let mut writer = FrameWriter::new(sink);

        writer.write_value(&Value::Bool(false)).unwrap();

        assert!(flag.load(Ordering::SeqCst));
    }

    #[test]
    fn accessors_and_into_inner() {
        let mut writer = FrameWriter::new(Cursor::new(Vec::<u8>::new()));

        writer.set_max_payload_size(8);
        assert_eq!(writer.config().max_payload_size, 8);
        let _ = writer.get_ref();
        let _ = writer.get_mut();
        let _inner = writer.into_inner();
    }

    #[test]
    fn handles_interrupted_write_and_flush() {
        let mut writer = FrameWriter::new(FlakyWriter::failing_with(ErrorKind::Interrupted));
        writer.write_value(&Value::string("retry")).unwrap();

        let inner = writer.into_inner();
        assert!(!inner.data.is_empty());
    }

    #[test]
    fn would_block_keeps_frame_pending() {
        let mut writer = FrameWriter::new(FlakyWriter::failing_with(ErrorKind::WouldBlock));
        let err = writer.write_value(&Value::string("later")).unwrap_err();
        assert!(matches!(err, FrameError::Io(ref e) if e.kind() == ErrorKind::WouldBlock));
        assert_eq!(writer.pending(), 4 + 7);

        // Pending bytes go out before the stream flush is retried.
        let err = writer.flush().unwrap_err();
        assert!(matches!(err, FrameError::Io(ref e) if e.kind() == ErrorKind::WouldBlock));
        assert_eq!(writer.pending(), 0);

        writer.write_value(&Value::integer(2)).unwrap();
        let data = writer.into_inner().data;
        let first = decode_frame(&data, usize::MAX).unwrap().unwrap();
        assert_eq!(first.decode().unwrap(), Value::string("later"));
        let second = decode_frame(&data[first.consumed..], usize::MAX).unwrap().unwrap();
        assert_eq!(second.decode().unwrap(), Value::integer(2));
    }

    #[test]
    fn connection_closed_when_write_returns_zero() {
        let mut writer = FrameWriter::new(ZeroWriter);
        let err = writer.write_value(&Value::Null).unwrap_err();
        assert!(matches!(err, FrameError::ConnectionClosed));
    }

    #[test]
    fn written_bytes_decode() {
        let value = Value::tagged("ok", Value::integer(3));
        let mut writer = FrameWriter::new(Cursor::new(Vec::<u8>::new()));
        writer.write_value(&value).unwrap();

        let mut framed = crate::reader::FrameReader::new(Cursor::new(written(writer)));
        assert_eq!(framed.read_value().unwrap(), value);
    }

    #[derive(Default)]
    struct FlushTrackingWriter {
        flushed: Arc<AtomicBool>,
        data: Vec<u8>,
    }

    impl Write for FlushTrackingWriter {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.data.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            self.flushed.store(true, Ordering::SeqCst);
            Ok(())
        }
    }

    /// Fails the first write and the first flush with the same error kind.
    struct FlakyWriter {
        write_failure: Option<ErrorKind>,
        flush_failure: Option<ErrorKind>,
        data: Vec<u8>,
    }

    impl FlakyWriter {
        fn failing_with(kind: ErrorKind) -> Self {
            Self {
                write_failure: Some(kind),
                flush_failure: Some(kind),
                data: Vec::new(),
            }
        }
    }

    impl Write for FlakyWriter {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            if let Some(kind) = self.write_failure.take() {
                return Err(std::io::Error::from(kind));
            }
            self.data.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            if let Some(kind) = self.flush_failure.take() {
                return Err(std::io::Error::from(kind));
            }
            Ok(())
        }
    }

    struct ZeroWriter;

    impl Write for ZeroWriter {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Ok(0)
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }
}

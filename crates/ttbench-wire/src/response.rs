//! Response framing validation.

use std::fmt::Write;

use crate::codec::{self, MP_UINT32, SIZE_FIELD_LEN};
use crate::error::{WireError, WireResult};

/// Walks a batch of back-to-back responses and checks that each declares
/// the size it was expected to have.
///
/// The server's status code inside each body is not inspected.
pub fn validate_responses(buffer: &[u8], expected_sizes: &[usize]) -> WireResult<()> {
    let mut offset = 0;
    for (index, &expected) in expected_sizes.iter().enumerate() {
        let rest = &buffer[offset..];
        if rest.len() < SIZE_FIELD_LEN {
            return Err(WireError::Truncated {
                index,
                needed: SIZE_FIELD_LEN,
                available: rest.len(),
            });
        }
        if rest[0] != MP_UINT32 {
            return Err(WireError::UnexpectedSizeMarker {
                index,
                marker: rest[0],
            });
        }

        let actual = codec::get_u32_be(&rest[1..]) as usize + SIZE_FIELD_LEN;
        if actual != expected {
            let shown = &rest[..expected.min(rest.len())];
            tracing::error!(
                index,
                expected,
                actual,
                "response size mismatch, response:\n{}",
                hex_dump(shown)
            );
            return Err(WireError::ResponseSizeMismatch {
                index,
                expected,
                actual,
            });
        }
        if rest.len() < expected {
            return Err(WireError::Truncated {
                index,
                needed: expected,
                available: rest.len(),
            });
        }

        offset += expected;
    }
    Ok(())
}

/// Formats `data` as rows of 16 hex bytes in two groups of 8, followed by
/// the printable-ASCII view of the row.
pub fn hex_dump(data: &[u8]) -> String {
    let mut out = String::new();
    for row in data.chunks(16) {
        let mut hex = String::with_capacity(50);
        for (i, byte) in row.iter().enumerate() {
            let _ = write!(hex, "{byte:02X} ");
            if i == 7 || i == row.len() - 1 {
                hex.push(' ');
            }
        }
        let ascii: String = row
            .iter()
            .map(|&b| if (b' '..=b'~').contains(&b) { b as char } else { '.' })
            .collect();
        let _ = writeln!(out, "{hex:<50}|  {ascii} ");
    }
    out
}

#[cfg(test)]
mod response_tests {
    use super::*;
    use std::io;
    use std::sync::{Arc, Mutex};
    use tracing_subscriber::fmt::MakeWriter;

    fn response(body_len: u32) -> Vec<u8> {
        let mut out = vec![MP_UINT32];
        out.extend_from_slice(&body_len.to_be_bytes());
        out.extend(std::iter::repeat_n(0x80, body_len as usize));
        out
    }

    #[test]
    fn matching_sizes_pass() {
        let mut buffer = response(4);
        buffer.extend(response(10));
        buffer.extend(response(4));
        validate_responses(&buffer, &[9, 15, 9]).unwrap();
    }

    #[test]
    fn mismatch_reports_index() {
        let mut buffer = response(4);
        buffer.extend(response(6));
        buffer.extend(response(4));
        let err = validate_responses(&buffer, &[9, 9, 11]).unwrap_err();
        assert_eq!(
            err,
            WireError::ResponseSizeMismatch {
                index: 1,
                expected: 9,
                actual: 11,
            }
        );
    }

    #[test]
    fn wrong_marker_reports_index() {
        let mut buffer = response(4);
        buffer.extend(response(4));
        buffer[9] = 0xCD;
        let err = validate_responses(&buffer, &[9, 9]).unwrap_err();
        assert_eq!(
            err,
            WireError::UnexpectedSizeMarker {
                index: 1,
                marker: 0xCD
            }
        );
        assert!(err.to_string().starts_with("response #1:"), "{err}");
    }

    /// Collects everything a `fmt` subscriber writes.
    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for CapturedLogs {
        type Writer = CapturedLogs;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    #[test]
    fn mismatch_logs_hex_dump_of_response() {
        let mut buffer = response(4);
        buffer.extend(response(6));
        buffer.extend(response(4));

        let logs = CapturedLogs::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(logs.clone())
            .with_ansi(false)
            .finish();
        let result = tracing::subscriber::with_default(subscriber, || {
            validate_responses(&buffer, &[9, 9, 11])
        });
        assert!(result.is_err());

        let output = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
        assert!(output.contains("ERROR"), "{output}");
        assert!(output.contains("response size mismatch"), "{output}");
        // The second response, cut to its expected 9 bytes.
        assert!(output.contains(&hex_dump(&buffer[9..18])), "{output}");
    }

    #[test]
    fn short_buffer_is_truncated() {
        let buffer = response(4);
        assert!(matches!(
            validate_responses(&buffer[..3], &[9]),
            Err(WireError::Truncated { index: 0, .. })
        ));
        assert!(matches!(
            validate_responses(&buffer[..7], &[9]),
            Err(WireError::Truncated { index: 0, needed: 9, available: 7 })
        ));
    }

    #[test]
    fn hex_dump_layout() {
        let data: Vec<u8> = (0x41..0x41 + 18).collect();
        let dump = hex_dump(&data);
        let lines: Vec<&str> = dump.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[0],
            "41 42 43 44 45 46 47 48  49 4A 4B 4C 4D 4E 4F 50  |  ABCDEFGHIJKLMNOP "
        );
        assert_eq!(lines[1], format!("{:<50}|  QR ", "51 52  "));
    }

    #[test]
    fn hex_dump_masks_unprintable() {
        let dump = hex_dump(&[0xCE, b'a', 0x00]);
        assert!(dump.ends_with("|  .a. \n"));
    }
}

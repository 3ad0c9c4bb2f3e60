//! NUL-terminated string scanning.
//!
//! Namespace, relation and column names are sent as C-strings. The scan is
//! bounded so that a missing terminator cannot make the decoder walk an
//! arbitrarily large buffer, and decoding is best-effort: every byte is
//! decoded on its own, and a byte that does not decode is dropped and
//! reported while the rest of the string is kept. Non-ASCII names lose their
//! multi-byte characters.

use crate::diagnostics::DiagnosticSink;
use crate::{Error, Result};

/// Maximum number of bytes examined when looking for a terminator.
pub const DEFAULT_CSTRING_SCAN_LIMIT: usize = 128;

/// Scans a C-string starting at `start`.
///
/// Returns the position just past the terminator, or `start + limit` when
/// no terminator was found within `limit` bytes, together with the decoded
/// string. Hitting the end of `buffer` first is an error.
pub fn scan_cstring<S>(
    buffer: &[u8],
    start: usize,
    limit: usize,
    sink: &S,
) -> Result<(usize, String)>
where
    S: DiagnosticSink + ?Sized,
{
    if start > buffer.len() {
        return Err(Error::UnexpectedEof {
            position: start,
            needed: 1,
            available: 0,
        });
    }

    let mut position = start;
    let mut terminated = false;

    while position - start < limit {
        match buffer.get(position) {
            Some(0) => {
                terminated = true;
                break;
            }
            Some(_) => position += 1,
            None => {
                return Err(Error::UnexpectedEof {
                    position,
                    needed: 1,
                    available: 0,
                })
            }
        }
    }

    let text = decode_tolerant(&buffer[start..position], start, sink);
    let end = if terminated { position + 1 } else { position };

    Ok((end, text))
}

// Each byte is decoded on its own, so only ASCII survives. Bytes of a
// multi-byte character are dropped one by one like any other bad byte.
fn decode_tolerant<S>(raw: &[u8], offset: usize, sink: &S) -> String
where
    S: DiagnosticSink + ?Sized,
{
    let mut text = String::with_capacity(raw.len());

    for (i, byte) in raw.iter().enumerate() {
        match std::str::from_utf8(std::slice::from_ref(byte)) {
            Ok(decoded) => text.push_str(decoded),
            Err(_) => sink.warn(&format!(
                "could not decode byte {:#04x} at offset {} in string, skipping",
                byte,
                offset + i
            )),
        }
    }

    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::RecordingSink;

    fn scan(buffer: &[u8], start: usize) -> (Result<(usize, String)>, RecordingSink) {
        let sink = RecordingSink::new();
        let result = scan_cstring(buffer, start, DEFAULT_CSTRING_SCAN_LIMIT, &sink);
        (result, sink)
    }

    #[test]
    fn test_scan_terminated_string() {
        let (result, sink) = scan(b"ab\x00", 0);
        assert_eq!(result.unwrap(), (3, "ab".to_string()));
        assert!(sink.is_empty());
    }

    #[test]
    fn test_scan_from_offset() {
        let (result, _) = scan(b"\x00\x00\x00\x07public\x00users\x00", 4);
        assert_eq!(result.unwrap(), (11, "public".to_string()));
    }

    #[test]
    fn test_scan_empty_string() {
        let (result, _) = scan(b"\x00rest", 0);
        assert_eq!(result.unwrap(), (1, String::new()));
    }

    #[test]
    fn test_scan_stops_at_limit() {
        let buffer = vec![b'a'; 200];
        let (result, sink) = scan(&buffer, 0);
        let (end, text) = result.unwrap();

        assert_eq!(end, 128);
        assert_eq!(text, "a".repeat(128));
        assert!(sink.is_empty());
    }

    #[test]
    fn test_scan_terminator_on_last_examined_byte() {
        let mut buffer = vec![b'x'; 127];
        buffer.push(0);
        let (result, _) = scan(&buffer, 0);
        assert_eq!(result.unwrap(), (128, "x".repeat(127)));
    }

    #[test]
    fn test_scan_custom_limit() {
        let sink = RecordingSink::new();
        let (end, text) = scan_cstring(b"abcdef\x00", 0, 3, &sink).unwrap();
        assert_eq!((end, text.as_str()), (3, "abc"));
    }

    #[test]
    fn test_scan_skips_invalid_bytes() {
        let (result, sink) = scan(b"a\xffb\x00", 0);
        assert_eq!(result.unwrap(), (4, "ab".to_string()));
        assert_eq!(sink.len(), 1);
        assert!(sink.lines()[0].contains("0xff"));
    }

    #[test]
    fn test_scan_drops_each_byte_of_multibyte_character() {
        let mut buffer = "café".as_bytes().to_vec();
        buffer.push(0);
        let (result, sink) = scan(&buffer, 0);
        assert_eq!(result.unwrap(), (6, "caf".to_string()));

        let lines = sink.lines();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("0xc3") && lines[0].contains("offset 3"));
        assert!(lines[1].contains("0xa9") && lines[1].contains("offset 4"));
    }

    #[test]
    fn test_scan_truncated_multibyte_sequence() {
        // 0xc3 starts a two-byte sequence that never completes
        let (result, sink) = scan(b"ok\xc3\x00", 0);
        assert_eq!(result.unwrap(), (4, "ok".to_string()));
        assert_eq!(sink.len(), 1);
    }

    #[test]
    fn test_scan_runs_off_buffer() {
        let (result, _) = scan(b"abc", 0);
        assert!(matches!(result, Err(Error::UnexpectedEof { position: 3, .. })));

        let (result, _) = scan(b"abc", 10);
        assert!(matches!(result, Err(Error::UnexpectedEof { .. })));
    }
}

//! Interpreter output decoding (non-UTF8-safe).
//!
//! Shell commands can emit arbitrary bytes. Using `BufReader::lines()` would
//! terminate the reader on invalid UTF-8, so lines are read as bytes and
//! decoded lossily.

use std::io;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};

/// Byte-based line reader with lossy UTF-8 decoding.
pub struct LossyLines<R> {
    reader: BufReader<R>,
    buf: Vec<u8>,
}

impl<R: AsyncRead + Unpin> LossyLines<R> {
    pub fn new(stream: R) -> Self {
        Self {
            reader: BufReader::new(stream),
            buf: Vec::with_capacity(1024),
        }
    }

    /// Next line without its line terminator, or `None` at EOF.
    pub async fn next_line(&mut self) -> io::Result<Option<String>> {
        self.buf.clear();
        if self.reader.read_until(b'\n', &mut self.buf).await? == 0 {
            return Ok(None);
        }

        if self.buf.last() == Some(&b'\n') {
            self.buf.pop();
            if self.buf.last() == Some(&b'\r') {
                self.buf.pop();
            }
        }

        Ok(Some(String::from_utf8_lossy(&self.buf).into_owned()))
    }
}

/// Split an end-of-command marker line.
///
/// The marker is echoed right after the command, so when the command's
/// output does not end with a newline the marker shares a line with it.
/// Returns the output prefix (if any) and the exit code, or `None` when
/// `line` is ordinary output.
pub fn parse_marker<'a>(line: &'a str, marker: &str) -> Option<(Option<&'a str>, i32)> {
    let pos = line.rfind(marker)?;
    let code = line[pos + marker.len()..].trim().parse().ok()?;
    let prefix = &line[..pos];
    Some(((!prefix.is_empty()).then_some(prefix), code))
}

#[cfg(test)]
mod tests {
    use super::*;

    const MARKER: &str = "RSHELL:0123abcd";

    #[tokio::test]
    async fn test_reads_lines_and_strips_terminators() {
        let stream = tokio_test::io::Builder::new()
            .read(b"first\nsec")
            .read(b"ond\r\nlast")
            .build();
        let mut lines = LossyLines::new(stream);

        assert_eq!(lines.next_line().await.unwrap().as_deref(), Some("first"));
        assert_eq!(lines.next_line().await.unwrap().as_deref(), Some("second"));
        assert_eq!(lines.next_line().await.unwrap().as_deref(), Some("last"));
        assert_eq!(lines.next_line().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_invalid_utf8_does_not_stop_reader() {
        let stream = tokio_test::io::Builder::new()
            .read(b"bad \xff byte\nok\n")
            .build();
        let mut lines = LossyLines::new(stream);

        let first = lines.next_line().await.unwrap().unwrap();
        assert!(first.starts_with("bad "));
        assert!(first.contains('\u{FFFD}'));
        assert_eq!(lines.next_line().await.unwrap().as_deref(), Some("ok"));
    }

    #[test]
    fn test_parse_marker_on_own_line() {
        let line = format!("{MARKER} 0");
        assert_eq!(parse_marker(&line, MARKER), Some((None, 0)));

        let line = format!("{MARKER} 130");
        assert_eq!(parse_marker(&line, MARKER), Some((None, 130)));
    }

    #[test]
    fn test_parse_marker_after_unterminated_output() {
        let line = format!("no newline{MARKER} 1");
        assert_eq!(parse_marker(&line, MARKER), Some((Some("no newline"), 1)));
    }

    #[test]
    fn test_parse_marker_ignores_plain_output() {
        assert_eq!(parse_marker("hello", MARKER), None);
        let line = format!("{MARKER} not-a-code");
        assert_eq!(parse_marker(&line, MARKER), None);
    }
}

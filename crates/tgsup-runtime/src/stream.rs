//! Child output readers (non-UTF8-safe).
//!
//! The server can emit non-UTF8 bytes on stdout/stderr. `BufReader::lines()`
//! would end the reader task on the first invalid sequence, so lines are
//! read as bytes and decoded lossily instead. A line longer than
//! [`MAX_LINE_BYTES`] is forwarded in chunks of at most that size.

use std::sync::Arc;
use tgsup_core::{OutputLine, OutputSinkPort, OutputStream};
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, BufReader};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Longest chunk of a single output line held in memory.
pub const MAX_LINE_BYTES: usize = 64 * 1024;

/// Spawn a task forwarding each line of `stream` to `sink`.
///
/// The task ends when the stream reaches EOF, which happens when the child
/// exits or closes the pipe.
pub fn spawn_stream_reader(
    stream: impl AsyncRead + Unpin + Send + 'static,
    pid: u32,
    kind: OutputStream,
    sink: Option<Arc<dyn OutputSinkPort>>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut reader = BufReader::new(stream);
        let mut buf: Vec<u8> = Vec::with_capacity(1024);
        // Set when the previous chunk was cut at the limit, so the newline
        // that ends the long line does not surface as an empty line.
        let mut after_split = false;

        loop {
            buf.clear();
            let mut limited = (&mut reader).take(MAX_LINE_BYTES as u64);
            match limited.read_until(b'\n', &mut buf).await {
                Ok(0) => break, // EOF
                Ok(_) => {
                    let split = buf.len() >= MAX_LINE_BYTES && buf.last() != Some(&b'\n');
                    if buf.last() == Some(&b'\n') {
                        buf.pop();
                        if buf.last() == Some(&b'\r') {
                            buf.pop();
                        }
                    }
                    if after_split && buf.is_empty() {
                        after_split = split;
                        continue;
                    }
                    after_split = split;

                    let text = String::from_utf8_lossy(&buf).into_owned();
                    debug!(pid, stream = kind.as_str(), "{}", text);
                    if let Some(ref s) = sink {
                        s.append(OutputLine::new(kind, text));
                    }
                }
                Err(e) => {
                    warn!(pid, stream = kind.as_str(), error = %e, "output reader exiting due to read error");
                    break;
                }
            }
        }

        debug!(pid, stream = kind.as_str(), "output reader task exiting");
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn collecting_sink() -> (Arc<dyn OutputSinkPort>, Arc<Mutex<Vec<OutputLine>>>) {
        let lines = Arc::new(Mutex::new(Vec::new()));
        let collector = Arc::clone(&lines);
        let sink: Arc<dyn OutputSinkPort> = Arc::new(move |line: OutputLine| {
            collector.lock().unwrap().push(line);
        });
        (sink, lines)
    }

    #[tokio::test]
    async fn reader_splits_lines_and_strips_crlf() {
        let (sink, lines) = collecting_sink();
        let input: &[u8] = b"first\r\nsecond\nlast-without-newline";

        spawn_stream_reader(input, 1, OutputStream::Stdout, Some(sink))
            .await
            .unwrap();

        let texts: Vec<String> = lines.lock().unwrap().iter().map(|l| l.text.clone()).collect();
        assert_eq!(texts, vec!["first", "second", "last-without-newline"]);
    }

    #[tokio::test]
    async fn reader_survives_invalid_utf8() {
        let (sink, lines) = collecting_sink();
        let input: &[u8] = b"ok\n\xff\xfebad\nafter\n";

        spawn_stream_reader(input, 1, OutputStream::Stderr, Some(sink))
            .await
            .unwrap();

        let lines = lines.lock().unwrap();
        assert_eq!(lines.len(), 3);
        assert!(lines[1].text.ends_with("bad"));
        assert_eq!(lines[2].to_string(), "[Error] after");
    }

    #[tokio::test]
    async fn reader_splits_overlong_lines() {
        let (sink, lines) = collecting_sink();
        let mut input = vec![b'x'; MAX_LINE_BYTES * 2];
        input.extend_from_slice(b"\nnext\n");

        spawn_stream_reader(std::io::Cursor::new(input), 1, OutputStream::Stdout, Some(sink))
            .await
            .unwrap();

        let lines = lines.lock().unwrap();
        let lens: Vec<usize> = lines.iter().map(|l| l.text.len()).collect();
        assert_eq!(lens, vec![MAX_LINE_BYTES, MAX_LINE_BYTES, 4]);
        assert_eq!(lines[2].text, "next");
    }

    #[tokio::test]
    async fn reader_without_sink_drains() {
        let input: &[u8] = b"a\nb\n";
        spawn_stream_reader(input, 1, OutputStream::Stdout, None)
            .await
            .unwrap();
    }
}
